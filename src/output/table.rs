//! Alias and probe table rendering.

use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use kcr::{AliasMap, DEFAULT_ALIAS, IN_CLUSTER_ALIAS};

use crate::k8s::client::ProbeResult;

/// Row for the alias table.
#[derive(Tabled)]
struct AliasRow {
    #[tabled(rename = "ALIAS")]
    alias: String,
    #[tabled(rename = "SERVER")]
    server: String,
    #[tabled(rename = "TLS")]
    tls: String,
    #[tabled(rename = "AUTH")]
    auth: String,
}

/// Row for the probe table.
#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "ALIAS")]
    alias: String,
    #[tabled(rename = "SERVER")]
    server: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

fn alias_label(alias: &str) -> String {
    match alias {
        IN_CLUSTER_ALIAS | DEFAULT_ALIAS => alias.bold().to_string(),
        _ => alias.to_string(),
    }
}

fn alias_rows(aliases: &AliasMap) -> Vec<AliasRow> {
    aliases
        .iter()
        .map(|(alias, descriptor)| AliasRow {
            alias: alias_label(alias),
            server: descriptor.host.clone(),
            tls: descriptor.tls.mode().to_string(),
            auth: descriptor.auth.kind().to_string(),
        })
        .collect()
}

/// Print the resolved alias table.
pub fn print_aliases(aliases: &AliasMap) {
    let mut table = Table::new(alias_rows(aliases));
    table.with(Style::blank());
    println!("{}", table);
}

/// Print probe results.
pub fn print_probes(results: &[ProbeResult]) {
    let rows: Vec<ProbeRow> = results
        .iter()
        .map(|r| {
            let (version, status) = match &r.outcome {
                Ok(version) => (version.clone(), "Reachable".green().to_string()),
                Err(e) => ("-".to_string(), format!("{}: {}", "Error".red(), e)),
            };
            ProbeRow {
                alias: alias_label(&r.alias),
                server: r.host.clone(),
                version,
                status,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::blank());
    println!("{}", table);
}
