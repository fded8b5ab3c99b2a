//! Command-line surface of the mirror tool.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::azure::AzureDevOpsClient;
use crate::config::AppConfig;
use crate::git::SystemGit;
use crate::reconcile::{reconcile, ReconcileOptions, ReconcileSummary};

/// Mirrors every Git repository of an Azure DevOps organization to local disk.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Also download project wikis.
    #[arg(long)]
    pub wiki: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the build version and source revision, then exit.
    Version,
}

/// Print version information for the `version` subcommand.
pub fn print_version() {
    println!("{} {}", env!("CARGO_PKG_VERSION"), env!("GIT_REVISION"));
}

/// Run one reconciliation pass with the given configuration.
pub async fn run(args: &CliArgs, config: &AppConfig, cancel: Arc<AtomicBool>) -> Result<()> {
    let inventory =
        AzureDevOpsClient::new(&config.organization_url, &config.pat, config.http_timeout)
            .context("Failed to build the inventory client")?;
    let git = Arc::new(SystemGit);

    let options = ReconcileOptions {
        include_wikis: args.wiki,
        cancel,
    };
    let summary = reconcile(&inventory, git, config, options)
        .await
        .context("Reconciliation failed")?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ReconcileSummary) {
    if summary.cancelled {
        println!("{}", "Run stopped before completion".yellow());
    }
    println!(
        "{} cloned, {} pulled, {} empty, {} archived",
        summary.cloned.to_string().green(),
        summary.pulled.to_string().green(),
        summary.empty,
        summary.archived.to_string().yellow(),
    );
    if !summary.failed.is_empty() {
        println!("{}", format!("{} failed:", summary.failed.len()).red());
        for (key, reason) in &summary.failed {
            println!("  {key}: {reason}");
        }
    }
}
