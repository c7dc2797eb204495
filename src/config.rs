//! CLI configuration and argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use kcr::Sources;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Kubernetes cluster alias resolver.
///
/// Merges the in-cluster service account, kubeconfig contexts and a
/// build-cluster override file into one alias map.
#[derive(Parser, Debug, Clone)]
#[command(name = "kcr")]
#[command(about = "Kubernetes cluster alias resolver")]
#[command(version = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION, COMMIT, BUILD_DATE
))]
pub struct Args {
    /// Kubeconfig file(s), repeatable or colon-separated
    // Kept as strings so empty segments ("a::b", trailing ':') parse and get dropped
    #[arg(long, global = true, env = "KUBECONFIG", value_delimiter = ':')]
    pub kubeconfig: Vec<String>,

    /// Build cluster override file
    #[arg(long, global = true, env = "KCR_BUILD_CLUSTER")]
    pub build_cluster: Option<PathBuf>,

    /// Skip in-cluster service account discovery
    #[arg(long, global = true, default_value = "false")]
    pub no_in_cluster: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "KCR_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List resolved cluster aliases
    List,

    /// Connect to clusters and print their API server version
    #[command(after_help = r#"Examples:
  kcr check             Check every alias
  kcr check default     Check a single alias"#)]
    Check {
        /// Alias to check (all aliases when omitted)
        #[arg(value_name = "ALIAS")]
        alias: Option<String>,
    },
}

/// Application configuration derived from CLI args.
#[derive(Debug, Clone)]
pub struct Config {
    pub sources: Sources,
    pub log_level: String,
    pub log_format: LogFormat,
    pub command: Command,
}

impl Config {
    /// Create config from CLI arguments.
    pub fn from_args(args: Args) -> Self {
        let kubeconfigs = args
            .kubeconfig
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();

        Self {
            sources: Sources {
                kubeconfigs,
                build_cluster: args.build_cluster,
                in_cluster: !args.no_in_cluster,
            },
            log_level: args.log_level,
            log_format: args.log_format,
            command: args.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Config {
        Config::from_args(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_list_defaults() {
        let config = parse(&["kcr", "--kubeconfig", "/tmp/a", "list"]);
        assert!(matches!(config.command, Command::List));
        assert_eq!(config.sources.kubeconfigs, vec![PathBuf::from("/tmp/a")]);
        assert!(config.sources.in_cluster);
        assert!(config.sources.build_cluster.is_none());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_kubeconfig_colon_separated() {
        let config = parse(&["kcr", "--kubeconfig", "/tmp/a:/tmp/b", "list"]);
        assert_eq!(
            config.sources.kubeconfigs,
            vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")]
        );
    }

    #[test]
    fn test_empty_kubeconfig_segments_dropped() {
        let config = parse(&["kcr", "--kubeconfig", "/tmp/a::", "list"]);
        assert_eq!(config.sources.kubeconfigs, vec![PathBuf::from("/tmp/a")]);

        let config = parse(&["kcr", "--kubeconfig", ":/tmp/a::/tmp/b:", "list"]);
        assert_eq!(
            config.sources.kubeconfigs,
            vec![PathBuf::from("/tmp/a"), PathBuf::from("/tmp/b")]
        );

        let config = parse(&["kcr", "--kubeconfig", "", "list"]);
        assert!(config.sources.kubeconfigs.is_empty());
    }

    #[test]
    fn test_check_with_alias() {
        let config = parse(&[
            "kcr",
            "check",
            "default",
            "--no-in-cluster",
            "--build-cluster",
            "/etc/build/clusters.yaml",
            "--log-format",
            "json",
        ]);
        if let Command::Check { alias } = &config.command {
            assert_eq!(alias.as_deref(), Some("default"));
        } else {
            panic!("Expected Check command");
        }
        assert!(!config.sources.in_cluster);
        assert_eq!(
            config.sources.build_cluster,
            Some(PathBuf::from("/etc/build/clusters.yaml"))
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
