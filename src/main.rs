//! kcr - Kubernetes cluster alias resolver CLI.
//!
//! Resolves the alias -> cluster map from the in-cluster service account,
//! kubeconfig files and a build-cluster override file, then lists or
//! probes the result.

mod config;
mod k8s;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use config::{Args, Command, Config, LogFormat};
use kcr::{AliasMap, KcrError};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = Config::from_args(args);

    if let Err(e) = init_tracing(&config.log_level, config.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!("Starting kcr - Kubernetes cluster alias resolver");

    if let Err(e) = run(&config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(config: &Config) -> Result<()> {
    let aliases = kcr::load_cluster_configs(&config.sources)?;

    match &config.command {
        Command::List => {
            output::table::print_aliases(&aliases);
            Ok(())
        }
        Command::Check { alias } => run_check(&aliases, alias.as_deref()).await,
    }
}

/// Probe one alias, or all of them.
async fn run_check(aliases: &AliasMap, alias: Option<&str>) -> Result<()> {
    let targets: Vec<(&String, _)> = match alias {
        Some(name) => {
            let (key, descriptor) = aliases
                .get_key_value(name)
                .ok_or_else(|| KcrError::AliasNotFound(name.to_string()))?;
            vec![(key, descriptor)]
        }
        None => aliases.iter().collect(),
    };

    let mut results = Vec::with_capacity(targets.len());
    for (name, descriptor) in targets {
        results.push(k8s::client::probe(name, descriptor).await);
    }

    output::table::print_probes(&results);

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} cluster(s) unreachable", failed, results.len());
    }

    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to initialize log filter: {}", e))?;

    match format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .init(),
    }

    Ok(())
}
