//! End-to-end loading: discover every configured source, then resolve.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::KcrError;
use crate::resolver::{self, AliasMap};
use crate::{build_cluster, in_cluster, kubeconfig};

/// Where cluster credentials come from.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// Kubeconfig files, loaded in order.
    pub kubeconfigs: Vec<PathBuf>,
    /// Build-cluster override file.
    pub build_cluster: Option<PathBuf>,
    /// Look up the pod's own service account.
    pub in_cluster: bool,
}

/// Load every configured source and resolve the alias map.
pub fn load_cluster_configs(sources: &Sources) -> Result<AliasMap, KcrError> {
    let local = if sources.in_cluster {
        match in_cluster::discover() {
            Ok(local) => local,
            Err(e) => {
                warn!("Could not build in-cluster config, continuing without it: {}", e);
                None
            }
        }
    } else {
        debug!("In-cluster discovery disabled");
        None
    };

    let (foreign, current) = kubeconfig::load_all(&sources.kubeconfigs)?;

    let overrides = match &sources.build_cluster {
        Some(path) => build_cluster::load(path)?,
        None => AliasMap::new(),
    };

    info!(
        "Cluster sources: in-cluster={}, kubeconfig contexts={}, build clusters={}",
        local.is_some(),
        foreign.len(),
        overrides.len()
    );

    Ok(resolver::resolve(local.as_ref(), &foreign, &current, &overrides)?)
}
