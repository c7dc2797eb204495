//! Access descriptor: everything needed to reach one Kubernetes API server.
//!
//! Descriptors are plain values. They are built once by a loader and then
//! copied into alias maps, never mutated in place.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::KcrError;

/// TLS trust settings for an API server endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
    /// Skip server certificate verification.
    pub insecure: bool,
    /// PEM-encoded CA bundle. `None` means the system trust store.
    pub ca_data: Option<Vec<u8>>,
}

impl TlsConfig {
    /// Short label for display purposes.
    pub fn mode(&self) -> &'static str {
        if self.insecure {
            "insecure"
        } else if self.ca_data.is_some() {
            "ca"
        } else {
            "system"
        }
    }
}

/// Authentication material presented to the API server.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthMaterial {
    #[default]
    None,
    BearerToken(String),
    /// PEM-encoded client certificate and private key.
    ClientCertificate { cert: Vec<u8>, key: Vec<u8> },
}

impl AuthMaterial {
    /// Short label for display purposes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BearerToken(_) => "token",
            Self::ClientCertificate { .. } => "client-cert",
        }
    }
}

// Secrets never reach logs through Debug.
impl fmt::Debug for AuthMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Self::ClientCertificate { cert, .. } => f
                .debug_struct("ClientCertificate")
                .field("cert_len", &cert.len())
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Endpoint, TLS trust and credentials for a single cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessDescriptor {
    pub host: String,
    pub tls: TlsConfig,
    pub auth: AuthMaterial,
}

impl AccessDescriptor {
    pub fn new(host: impl Into<String>, tls: TlsConfig, auth: AuthMaterial) -> Self {
        Self {
            host: host.into(),
            tls,
            auth,
        }
    }

    /// Convert into a `kube::Config` ready for `kube::Client::try_from`.
    pub fn to_kube_config(&self) -> Result<kube::Config, KcrError> {
        let cluster_url = self
            .host
            .parse::<http::Uri>()
            .map_err(|e| KcrError::InvalidEndpoint {
                host: self.host.clone(),
                reason: e.to_string(),
            })?;

        let mut config = kube::Config::new(cluster_url);
        config.accept_invalid_certs = self.tls.insecure;

        if let Some(ca_pem) = &self.tls.ca_data {
            let invalid_ca = |reason: String| KcrError::InvalidCaData {
                host: self.host.clone(),
                reason,
            };
            let ca_certs = pem_to_der_certs(ca_pem).map_err(invalid_ca)?;
            if ca_certs.is_empty() {
                return Err(invalid_ca("no certificates found".to_string()));
            }
            debug!("Loaded {} CA certificate(s) for {}", ca_certs.len(), self.host);
            config.root_cert = Some(ca_certs);
        }

        config.auth_info = match &self.auth {
            AuthMaterial::None => kube::config::AuthInfo::default(),
            AuthMaterial::BearerToken(token) => kube::config::AuthInfo {
                token: Some(secrecy::SecretString::from(token.clone())),
                ..Default::default()
            },
            AuthMaterial::ClientCertificate { cert, key } => kube::config::AuthInfo {
                client_certificate_data: Some(STANDARD.encode(cert)),
                client_key_data: Some(secrecy::SecretString::from(STANDARD.encode(key))),
                ..Default::default()
            },
        };

        Ok(config)
    }
}

/// Split PEM data into DER-encoded certificate bytes.
fn pem_to_der_certs(pem_data: &[u8]) -> Result<Vec<Vec<u8>>, String> {
    let text = std::str::from_utf8(pem_data).map_err(|e| format!("not valid UTF-8: {}", e))?;

    let mut certs = Vec::new();
    let mut in_cert = false;
    let mut b64_buf = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed == "-----BEGIN CERTIFICATE-----" {
            in_cert = true;
            b64_buf.clear();
        } else if trimmed == "-----END CERTIFICATE-----" {
            if in_cert {
                let der = STANDARD
                    .decode(&b64_buf)
                    .map_err(|e| format!("invalid certificate body: {}", e))?;
                certs.push(der);
            }
            in_cert = false;
        } else if in_cert {
            b64_buf.push_str(trimmed);
        }
    }

    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &[u8] = b"-----BEGIN CERTIFICATE-----\n\
                         SGVsbG8=\n\
                         -----END CERTIFICATE-----\n";

    fn token_descriptor() -> AccessDescriptor {
        AccessDescriptor::new(
            "https://api.build01.example.com:6443",
            TlsConfig {
                insecure: true,
                ca_data: None,
            },
            AuthMaterial::BearerToken("foobar".to_string()),
        )
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(token_descriptor(), token_descriptor());

        let mut other = token_descriptor();
        other.auth = AuthMaterial::BearerToken("other".to_string());
        assert_ne!(token_descriptor(), other);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", token_descriptor());
        assert!(!rendered.contains("foobar"));
        assert!(rendered.contains("<redacted>"));

        let cert = AuthMaterial::ClientCertificate {
            cert: b"cert".to_vec(),
            key: b"private-key".to_vec(),
        };
        assert!(!format!("{:?}", cert).contains("private-key"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(token_descriptor().tls.mode(), "insecure");
        assert_eq!(token_descriptor().auth.kind(), "token");
        assert_eq!(TlsConfig::default().mode(), "system");
        assert_eq!(AuthMaterial::None.kind(), "none");
        let tls = TlsConfig {
            insecure: false,
            ca_data: Some(PEM.to_vec()),
        };
        assert_eq!(tls.mode(), "ca");
    }

    #[test]
    fn test_pem_to_der_certs() {
        let certs = pem_to_der_certs(PEM).unwrap();
        assert_eq!(certs, vec![b"Hello".to_vec()]);
    }

    #[test]
    fn test_pem_to_der_certs_multiple() {
        let pem = b"-----BEGIN CERTIFICATE-----\n\
                    SGVsbG8=\n\
                    -----END CERTIFICATE-----\n\
                    -----BEGIN CERTIFICATE-----\n\
                    V29ybGQ=\n\
                    -----END CERTIFICATE-----\n";
        let certs = pem_to_der_certs(pem).unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[1], b"World");
    }

    #[test]
    fn test_to_kube_config_token() {
        let config = token_descriptor().to_kube_config().unwrap();
        assert_eq!(config.cluster_url.host(), Some("api.build01.example.com"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));
        assert!(config.accept_invalid_certs);
        assert!(config.root_cert.is_none());
        assert!(config.auth_info.token.is_some());
        assert!(config.auth_info.client_certificate_data.is_none());
    }

    #[test]
    fn test_to_kube_config_client_certificate() {
        let descriptor = AccessDescriptor::new(
            "https://10.0.0.1",
            TlsConfig {
                insecure: false,
                ca_data: Some(PEM.to_vec()),
            },
            AuthMaterial::ClientCertificate {
                cert: b"cert".to_vec(),
                key: b"key".to_vec(),
            },
        );
        let config = descriptor.to_kube_config().unwrap();
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.root_cert, Some(vec![b"Hello".to_vec()]));
        assert_eq!(
            config.auth_info.client_certificate_data.as_deref(),
            Some("Y2VydA==")
        );
        assert!(config.auth_info.client_key_data.is_some());
        assert!(config.auth_info.token.is_none());
    }

    #[test]
    fn test_to_kube_config_rejects_empty_ca() {
        let descriptor = AccessDescriptor::new(
            "https://10.0.0.1",
            TlsConfig {
                insecure: false,
                ca_data: Some(b"not a pem bundle".to_vec()),
            },
            AuthMaterial::None,
        );
        assert!(matches!(
            descriptor.to_kube_config(),
            Err(KcrError::InvalidCaData { .. })
        ));
    }

    #[test]
    fn test_to_kube_config_rejects_malformed_ca() {
        let bad_body = b"-----BEGIN CERTIFICATE-----\n\
                         %%%\n\
                         -----END CERTIFICATE-----\n";
        for ca_data in [bad_body.to_vec(), vec![0xff, 0xfe, 0x00]] {
            let descriptor = AccessDescriptor::new(
                "https://10.0.0.1",
                TlsConfig {
                    insecure: false,
                    ca_data: Some(ca_data),
                },
                AuthMaterial::None,
            );
            match descriptor.to_kube_config() {
                Err(KcrError::InvalidCaData { host, .. }) => assert_eq!(host, "https://10.0.0.1"),
                other => panic!("Expected InvalidCaData, got {:?}", other.err()),
            }
        }
    }

    #[test]
    fn test_to_kube_config_invalid_host() {
        let descriptor =
            AccessDescriptor::new("not a url", TlsConfig::default(), AuthMaterial::None);
        assert!(matches!(
            descriptor.to_kube_config(),
            Err(KcrError::InvalidEndpoint { .. })
        ));
    }
}
