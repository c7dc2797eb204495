//! Kubernetes client builder for resolved cluster aliases.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use kcr::{AccessDescriptor, KcrError};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of probing one alias.
#[derive(Debug)]
pub struct ProbeResult {
    pub alias: String,
    pub host: String,
    pub outcome: Result<String, String>,
}

/// Build a Kubernetes client from an access descriptor.
pub fn build_client(descriptor: &AccessDescriptor) -> Result<kube::Client> {
    let mut config = descriptor.to_kube_config()?;
    config.connect_timeout = Some(PROBE_TIMEOUT);
    config.read_timeout = Some(PROBE_TIMEOUT);

    let client = kube::Client::try_from(config)
        .map_err(|e| KcrError::KubernetesApi(e.to_string()))
        .with_context(|| format!("Failed to build Kubernetes client for {}", descriptor.host))?;

    Ok(client)
}

/// Fetch the API server's git version, e.g. `v1.31.2`.
pub async fn server_version(client: &kube::Client) -> Result<String> {
    let info = tokio::time::timeout(PROBE_TIMEOUT, client.apiserver_version())
        .await
        .map_err(|_| KcrError::KubernetesApi("timed out".to_string()))?
        .map_err(|e| KcrError::KubernetesApi(e.to_string()))?;

    Ok(info.git_version)
}

/// Connect to one alias and report its version or the failure.
pub async fn probe(alias: &str, descriptor: &AccessDescriptor) -> ProbeResult {
    debug!("Probing alias '{}' at {}", alias, descriptor.host);

    let outcome = match build_client(descriptor) {
        Ok(client) => server_version(&client).await,
        Err(e) => Err(e),
    };

    ProbeResult {
        alias: alias.to_string(),
        host: descriptor.host.clone(),
        outcome: outcome.map_err(|e| format!("{:#}", e)),
    }
}
