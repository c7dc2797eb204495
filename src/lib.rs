//! kcr - Kubernetes cluster alias resolver.
//!
//! Builds the alias -> cluster credentials map used to dispatch work to
//! several Kubernetes clusters from the in-process service account,
//! kubeconfig files and a build-cluster override file.

pub mod build_cluster;
pub mod descriptor;
pub mod error;
pub mod in_cluster;
pub mod kubeconfig;
pub mod loader;
pub mod resolver;

pub use descriptor::{AccessDescriptor, AuthMaterial, TlsConfig};
pub use error::{ConfigError, KcrError, ParseError};
pub use loader::{Sources, load_cluster_configs};
pub use resolver::{AliasMap, DEFAULT_ALIAS, IN_CLUSTER_ALIAS, resolve};
