//! In-cluster discovery from the pod's service account.

use std::path::Path;

use tracing::debug;

use crate::descriptor::{AccessDescriptor, AuthMaterial, TlsConfig};
use crate::error::KcrError;

/// Directory the kubelet mounts the service account into.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

const HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
const PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";

/// Build the local descriptor when running inside a pod.
///
/// Returns `Ok(None)` outside a cluster.
pub fn discover() -> Result<Option<AccessDescriptor>, KcrError> {
    discover_from(
        std::env::var(HOST_ENV).ok(),
        std::env::var(PORT_ENV).ok(),
        Path::new(SERVICE_ACCOUNT_DIR),
    )
}

/// Same as [`discover`] with explicit inputs.
pub fn discover_from(
    host: Option<String>,
    port: Option<String>,
    service_account_dir: &Path,
) -> Result<Option<AccessDescriptor>, KcrError> {
    let (Some(host), Some(port)) = (host, port) else {
        debug!("{} or {} not set, not running in a cluster", HOST_ENV, PORT_ENV);
        return Ok(None);
    };
    if host.is_empty() || port.is_empty() {
        return Ok(None);
    }

    let token_path = service_account_dir.join("token");
    let token = std::fs::read_to_string(&token_path).map_err(|e| {
        KcrError::InCluster(format!("Failed to read {}: {}", token_path.display(), e))
    })?;

    let ca_path = service_account_dir.join("ca.crt");
    let ca_data = std::fs::read(&ca_path)
        .map_err(|e| KcrError::InCluster(format!("Failed to read {}: {}", ca_path.display(), e)))?;

    let endpoint = if host.contains(':') {
        format!("https://[{}]:{}", host, port)
    } else {
        format!("https://{}:{}", host, port)
    };
    debug!("Discovered in-cluster API server at {}", endpoint);

    Ok(Some(AccessDescriptor::new(
        endpoint,
        TlsConfig {
            insecure: false,
            ca_data: Some(ca_data),
        },
        AuthMaterial::BearerToken(token.trim().to_string()),
    )))
}
