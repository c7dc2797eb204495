//! Build-cluster override file.
//!
//! Maps an alias to the endpoint and client certificate of a build cluster.
//! Older files hold a single cluster with no alias level; that cluster is
//! treated as `default`.

use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, info};

use crate::descriptor::{AccessDescriptor, AuthMaterial, TlsConfig};
use crate::error::KcrError;
use crate::resolver::{AliasMap, DEFAULT_ALIAS};

/// One build cluster entry. Binary fields are base64-encoded PEM.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildCluster {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub client_certificate: Option<String>,
    #[serde(default)]
    pub client_key: Option<String>,
    #[serde(default)]
    pub cluster_ca_certificate: Option<String>,
}

/// Load a build-cluster file into an override map.
pub fn load(path: impl AsRef<Path>) -> Result<AliasMap, KcrError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| KcrError::BuildCluster {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse(&content, path)
}

/// Parse build-cluster content read from `path`.
pub fn parse(content: &str, path: &Path) -> Result<AliasMap, KcrError> {
    let fail = |reason: String| KcrError::BuildCluster {
        path: path.to_path_buf(),
        reason,
    };

    if content.trim().is_empty() {
        return Err(fail("empty document".to_string()));
    }

    let clusters = match serde_yaml::from_str::<BTreeMap<String, BuildCluster>>(content) {
        Ok(clusters) => clusters,
        // Legacy files are recognised by a top-level endpoint
        Err(map_err) => match serde_yaml::from_str::<BuildCluster>(content) {
            Ok(single) if !single.endpoint.is_empty() => {
                info!(
                    "Build cluster file {} uses the single-cluster format, binding it to '{}'",
                    path.display(),
                    DEFAULT_ALIAS
                );
                BTreeMap::from([(DEFAULT_ALIAS.to_string(), single)])
            }
            _ => return Err(fail(map_err.to_string())),
        },
    };

    if clusters.is_empty() {
        return Err(fail("no clusters defined".to_string()));
    }

    let mut overrides = AliasMap::new();
    for (alias, cluster) in clusters {
        let descriptor = cluster
            .to_descriptor()
            .map_err(|reason| fail(format!("{}: {}", alias, reason)))?;
        debug!("Loaded build cluster '{}' ({})", alias, descriptor.host);
        overrides.insert(alias, descriptor);
    }

    Ok(overrides)
}

impl BuildCluster {
    /// Convert into an access descriptor.
    pub fn to_descriptor(&self) -> Result<AccessDescriptor, String> {
        if self.endpoint.is_empty() {
            return Err("missing endpoint".to_string());
        }

        let ca_data = decode_optional("clusterCaCertificate", &self.cluster_ca_certificate)?;
        let cert = decode_optional("clientCertificate", &self.client_certificate)?;
        let key = decode_optional("clientKey", &self.client_key)?;

        let auth = match (cert, key) {
            (Some(cert), Some(key)) => AuthMaterial::ClientCertificate { cert, key },
            (None, None) => AuthMaterial::None,
            _ => return Err("clientCertificate and clientKey must be set together".to_string()),
        };

        Ok(AccessDescriptor::new(
            self.endpoint.clone(),
            TlsConfig {
                insecure: false,
                ca_data,
            },
            auth,
        ))
    }
}

fn decode_optional(field: &str, value: &Option<String>) -> Result<Option<Vec<u8>>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(encoded) => STANDARD
            .decode(encoded)
            .map(Some)
            .map_err(|e| format!("invalid base64 in {}: {}", field, e)),
    }
}
