//! Custom error types for kcr.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a kubeconfig document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load kubeconfig {}: {source}", path.display())]
    Kubeconfig {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    #[error("Context '{context}' references unknown cluster '{cluster}'")]
    MissingCluster { context: String, cluster: String },

    #[error("Context '{context}' references unknown user '{user}'")]
    MissingUser { context: String, user: String },

    #[error("Cluster '{cluster}' has no server")]
    MissingServer { cluster: String },

    #[error("Invalid base64 in {field} of '{owner}': {source}")]
    InvalidBase64 {
        field: &'static str,
        owner: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Cluster '{cluster}' sets both CA data and insecure-skip-tls-verify")]
    ConflictingTls { cluster: String },

    #[error("User '{user}' needs both client-certificate and client-key")]
    IncompleteClientCertificate { user: String },

    #[error("Context '{context}' from {} is already defined", path.display())]
    DuplicateContext { context: String, path: PathBuf },
}

/// Precondition violations detected while resolving the alias map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no cluster configured")]
    NoClusterConfigured,

    #[error("overrides require a local cluster")]
    OverridesRequireLocal,

    #[error("overrides missing default")]
    OverridesMissingDefault,

    #[error("current context required (got '{current}')")]
    CurrentContextRequired { current: String },
}

/// Errors surfaced by the end-to-end loading path and the CLI.
#[derive(Error, Debug)]
pub enum KcrError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("In-cluster config error: {0}")]
    InCluster(String),

    #[error("Build cluster file {}: {reason}", path.display())]
    BuildCluster { path: PathBuf, reason: String },

    #[error("Invalid endpoint '{host}': {reason}")]
    InvalidEndpoint { host: String, reason: String },

    #[error("Invalid CA data for '{host}': {reason}")]
    InvalidCaData { host: String, reason: String },

    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    #[error("Kubernetes API error: {0}")]
    KubernetesApi(String),
}
