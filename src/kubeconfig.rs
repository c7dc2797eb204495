//! Kubeconfig loader.
//!
//! Turns a multi-context kubeconfig document into one [`AccessDescriptor`]
//! per context, keyed by context name, plus the document's
//! `current-context` pointer. Document parsing is delegated to
//! [`kube::config::Kubeconfig`]; this module only flattens the
//! context -> cluster/user indirection into self-contained descriptors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kube::config::{AuthInfo, Cluster, Kubeconfig};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::descriptor::{AccessDescriptor, AuthMaterial, TlsConfig};
use crate::error::ParseError;
use crate::resolver::AliasMap;

/// Load a kubeconfig file.
///
/// Returns the context map and the document's `current-context` verbatim
/// (empty when the document declares none).
pub fn load(path: impl AsRef<Path>) -> Result<(AliasMap, String), ParseError> {
    let path = path.as_ref();
    // read_from rewrites relative file references against the file's directory
    let kubeconfig = Kubeconfig::read_from(path).map_err(|source| ParseError::Kubeconfig {
        path: path.to_path_buf(),
        source,
    })?;

    flatten(kubeconfig, path)
}

/// Parse kubeconfig content that was read from `path`.
///
/// `path` is used in error messages and as the base directory for
/// relative file references inside the document.
pub fn parse(content: &str, path: &Path) -> Result<(AliasMap, String), ParseError> {
    let kubeconfig = Kubeconfig::from_yaml(content).map_err(|source| ParseError::Kubeconfig {
        path: path.to_path_buf(),
        source,
    })?;

    flatten(kubeconfig, path)
}

fn flatten(kubeconfig: Kubeconfig, path: &Path) -> Result<(AliasMap, String), ParseError> {
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let clusters: HashMap<&str, Option<&Cluster>> = kubeconfig
        .clusters
        .iter()
        .map(|c| (c.name.as_str(), c.cluster.as_ref()))
        .collect();
    let users: HashMap<&str, Option<&AuthInfo>> = kubeconfig
        .auth_infos
        .iter()
        .map(|u| (u.name.as_str(), u.auth_info.as_ref()))
        .collect();

    let mut descriptors = AliasMap::new();
    for named in &kubeconfig.contexts {
        let (cluster_name, user_name) = match &named.context {
            Some(context) => (context.cluster.as_str(), context.user.as_deref().unwrap_or("")),
            None => ("", ""),
        };

        let cluster = *clusters
            .get(cluster_name)
            .ok_or_else(|| ParseError::MissingCluster {
                context: named.name.clone(),
                cluster: cluster_name.to_string(),
            })?;
        let server = cluster
            .and_then(|c| c.server.as_deref())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParseError::MissingServer {
                cluster: cluster_name.to_string(),
            })?;

        // A context without a user is anonymous access
        let auth = if user_name.is_empty() {
            AuthMaterial::None
        } else {
            let user = *users
                .get(user_name)
                .ok_or_else(|| ParseError::MissingUser {
                    context: named.name.clone(),
                    user: user_name.to_string(),
                })?;
            match user {
                Some(user) => resolve_auth(user_name, user, base_dir)?,
                None => AuthMaterial::None,
            }
        };

        let tls = match cluster {
            Some(cluster) => resolve_tls(cluster_name, cluster, base_dir)?,
            None => TlsConfig::default(),
        };

        debug!(
            "Loaded context '{}' (server: {}, tls: {}, auth: {})",
            named.name,
            server,
            tls.mode(),
            auth.kind()
        );
        descriptors.insert(named.name.clone(), AccessDescriptor::new(server, tls, auth));
    }

    Ok((descriptors, kubeconfig.current_context.unwrap_or_default()))
}

/// Load several kubeconfig files into one context map.
///
/// A context name defined by more than one file is rejected. The current
/// context is the first non-empty one in argument order.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<(AliasMap, String), ParseError> {
    let mut merged = AliasMap::new();
    let mut current = String::new();

    for path in paths {
        let path = path.as_ref();
        let (contexts, file_current) = load(path)?;
        debug!("Loaded {} context(s) from {}", contexts.len(), path.display());

        for (name, descriptor) in contexts {
            if merged.contains_key(&name) {
                return Err(ParseError::DuplicateContext {
                    context: name,
                    path: path.to_path_buf(),
                });
            }
            merged.insert(name, descriptor);
        }

        if current.is_empty() {
            current = file_current;
        }
    }

    Ok((merged, current))
}

fn resolve_tls(name: &str, cluster: &Cluster, base_dir: &Path) -> Result<TlsConfig, ParseError> {
    let ca_data = match (&cluster.certificate_authority_data, &cluster.certificate_authority) {
        (Some(data), _) if !data.is_empty() => {
            Some(decode_field("certificate-authority-data", name, data)?)
        }
        (_, Some(file)) if !file.is_empty() => Some(read_referenced(base_dir, file)?),
        _ => None,
    };

    let insecure = cluster.insecure_skip_tls_verify.unwrap_or(false);
    if insecure && ca_data.is_some() {
        return Err(ParseError::ConflictingTls {
            cluster: name.to_string(),
        });
    }

    Ok(TlsConfig { insecure, ca_data })
}

/// Pick the credentials a user entry presents.
///
/// A client certificate needs both halves; a lone certificate or key is
/// rejected even when a token is also set. When a user carries both a
/// token and a complete client certificate, the bearer token is used.
fn resolve_auth(
    name: &str,
    user: &AuthInfo,
    base_dir: &Path,
) -> Result<AuthMaterial, ParseError> {
    let token = match (&user.token, &user.token_file) {
        (Some(token), _) if !token.expose_secret().is_empty() => {
            Some(token.expose_secret().to_string())
        }
        (_, Some(file)) if !file.is_empty() => {
            let raw = read_referenced(base_dir, file)?;
            Some(String::from_utf8_lossy(&raw).trim().to_string())
        }
        _ => None,
    };

    let cert = match (&user.client_certificate_data, &user.client_certificate) {
        (Some(data), _) if !data.is_empty() => {
            Some(decode_field("client-certificate-data", name, data)?)
        }
        (_, Some(file)) if !file.is_empty() => Some(read_referenced(base_dir, file)?),
        _ => None,
    };
    let key = match (&user.client_key_data, &user.client_key) {
        (Some(data), _) if !data.expose_secret().is_empty() => {
            Some(decode_field("client-key-data", name, data.expose_secret())?)
        }
        (_, Some(file)) if !file.is_empty() => Some(read_referenced(base_dir, file)?),
        _ => None,
    };

    let client_certificate = match (cert, key) {
        (Some(cert), Some(key)) => Some((cert, key)),
        (None, None) => None,
        _ => {
            return Err(ParseError::IncompleteClientCertificate {
                user: name.to_string(),
            });
        }
    };

    match (token, client_certificate) {
        (Some(token), Some(_)) => {
            debug!("User '{}' sets a token and a client certificate, using the token", name);
            Ok(AuthMaterial::BearerToken(token))
        }
        (Some(token), None) => Ok(AuthMaterial::BearerToken(token)),
        (None, Some((cert, key))) => Ok(AuthMaterial::ClientCertificate { cert, key }),
        (None, None) => Ok(AuthMaterial::None),
    }
}

fn decode_field(field: &'static str, owner: &str, value: &str) -> Result<Vec<u8>, ParseError> {
    STANDARD
        .decode(value.trim())
        .map_err(|source| ParseError::InvalidBase64 {
            field,
            owner: owner.to_string(),
            source,
        })
}

fn read_referenced(base_dir: &Path, file: &str) -> Result<Vec<u8>, ParseError> {
    let file = Path::new(file);
    let path: PathBuf = if file.is_absolute() {
        file.to_path_buf()
    } else {
        base_dir.join(file)
    };
    std::fs::read(&path).map_err(|source| ParseError::Read { path, source })
}
