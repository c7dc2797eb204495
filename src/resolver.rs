//! Cluster alias resolution.
//!
//! Merges the in-process cluster, kubeconfig contexts and the build-cluster
//! override map into a single alias map. Two aliases are reserved:
//! [`IN_CLUSTER_ALIAS`] and [`DEFAULT_ALIAS`]. Every successful resolution
//! binds both of them.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::descriptor::AccessDescriptor;
use crate::error::ConfigError;

/// Alias for the cluster the process runs in.
pub const IN_CLUSTER_ALIAS: &str = "in-cluster";

/// Alias used when a caller does not name a cluster.
pub const DEFAULT_ALIAS: &str = "default";

/// Alias (or context name) to access descriptor.
pub type AliasMap = BTreeMap<String, AccessDescriptor>;

/// Which source supplied an explicit `default` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitSource {
    Kubeconfig,
    Overrides,
}

/// Where the `default` alias is bound from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultSource<'a> {
    /// The in-process cluster.
    Local,
    /// The kubeconfig context named by `current-context`.
    CurrentContext(&'a str),
    /// A `default` entry supplied verbatim by one of the inputs.
    Explicit(ExplicitSource),
}

impl fmt::Display for DefaultSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local cluster"),
            Self::CurrentContext(name) => write!(f, "current context '{}'", name),
            Self::Explicit(ExplicitSource::Kubeconfig) => write!(f, "kubeconfig default"),
            Self::Explicit(ExplicitSource::Overrides) => write!(f, "build cluster overrides"),
        }
    }
}

/// Decide where `default` comes from.
///
/// Overrides beat everything, then the local cluster, then an explicit
/// kubeconfig `default`, and finally the current context.
pub fn default_source<'a>(
    has_local: bool,
    foreign: &AliasMap,
    current: &'a str,
    overrides: &AliasMap,
) -> DefaultSource<'a> {
    if !overrides.is_empty() {
        DefaultSource::Explicit(ExplicitSource::Overrides)
    } else if has_local {
        DefaultSource::Local
    } else if foreign.contains_key(DEFAULT_ALIAS) {
        DefaultSource::Explicit(ExplicitSource::Kubeconfig)
    } else {
        DefaultSource::CurrentContext(current)
    }
}

/// Check the input combination before anything is built.
fn validate(has_local: bool, foreign: &AliasMap, overrides: &AliasMap) -> Result<(), ConfigError> {
    if !has_local && foreign.is_empty() && overrides.is_empty() {
        return Err(ConfigError::NoClusterConfigured);
    }
    if !overrides.is_empty() && !has_local {
        return Err(ConfigError::OverridesRequireLocal);
    }
    if !overrides.is_empty() && !overrides.contains_key(DEFAULT_ALIAS) {
        return Err(ConfigError::OverridesMissingDefault);
    }
    Ok(())
}

/// Resolve the final alias map.
///
/// `foreign` holds kubeconfig contexts keyed by name and `current` is the
/// kubeconfig `current-context` (may be empty). `overrides` is the
/// build-cluster map. Nothing is returned unless every check passes.
pub fn resolve(
    local: Option<&AccessDescriptor>,
    foreign: &AliasMap,
    current: &str,
    overrides: &AliasMap,
) -> Result<AliasMap, ConfigError> {
    validate(local.is_some(), foreign, overrides)?;

    let in_cluster = match local {
        Some(local) => local,
        None => current_descriptor(foreign, current)?,
    };

    let mut resolved = foreign.clone();
    resolved.insert(IN_CLUSTER_ALIAS.to_string(), in_cluster.clone());

    let source = default_source(local.is_some(), foreign, current, overrides);
    match source {
        DefaultSource::Local | DefaultSource::CurrentContext(_) => {
            resolved.insert(DEFAULT_ALIAS.to_string(), in_cluster.clone());
        }
        // Already present: seeded from the kubeconfig or merged below
        DefaultSource::Explicit(_) => {}
    }

    // Overrides replace any colliding key, including `in-cluster` when they
    // supply one. Nothing observed pins this case down; uniform precedence
    // for the override map is an assumption.
    for (alias, descriptor) in overrides {
        if alias == IN_CLUSTER_ALIAS {
            debug!("Build cluster overrides replace the '{}' alias", IN_CLUSTER_ALIAS);
        }
        resolved.insert(alias.clone(), descriptor.clone());
    }

    debug!("Resolved {} cluster alias(es), default from {}", resolved.len(), source);

    Ok(resolved)
}

fn current_descriptor<'a>(
    foreign: &'a AliasMap,
    current: &str,
) -> Result<&'a AccessDescriptor, ConfigError> {
    if current.is_empty() {
        return Err(ConfigError::CurrentContextRequired {
            current: String::new(),
        });
    }
    foreign
        .get(current)
        .ok_or_else(|| ConfigError::CurrentContextRequired {
            current: current.to_string(),
        })
}
