//! Reconciliation driver.
//!
//! Drives one full pass: scan the local tree, fetch the remote inventory,
//! clone-or-pull every remote repository, then archive the local checkouts
//! that no remote repository claimed.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task;
use tracing::{info, warn};

use crate::archive;
use crate::config::AppConfig;
use crate::error::Result;
use crate::git::GitCli;
use crate::inventory::{Inventory, RemoteRepo, RepoKey, WikiKind};
use crate::scanner;
use crate::sync::{sync_checkout, SyncOutcome};

/// Options for one reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Also mirror project wikis by resolving them to their backing
    /// repositories.
    pub include_wikis: bool,
    /// Cooperative stop flag, checked before each repository's sync.
    pub cancel: Arc<AtomicBool>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            include_wikis: false,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Aggregate result of a reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Repositories freshly cloned.
    pub cloned: usize,
    /// Repositories updated in place.
    pub pulled: usize,
    /// Repositories that are remotely empty.
    pub empty: usize,
    /// Checkouts moved into the archive.
    pub archived: usize,
    /// Repositories whose sync failed, with the failure reason.
    pub failed: Vec<(RepoKey, String)>,
    /// True when the pass was stopped early by the cancel flag. The archive
    /// phase is skipped in that case.
    pub cancelled: bool,
}

/// Run one full reconciliation pass.
///
/// Every remote repository is removed from the locally-scanned set exactly
/// once, whatever its sync outcome, so the residue after the loop is exactly
/// the set of checkouts without a remote counterpart. A repository whose sync
/// fails is recorded in the summary and the pass continues; inventory fetch
/// errors and archive move errors abort the run.
pub async fn reconcile<I, G>(
    inventory: &I,
    git: Arc<G>,
    config: &AppConfig,
    options: ReconcileOptions,
) -> Result<ReconcileSummary>
where
    I: Inventory + ?Sized,
    G: GitCli + Send + Sync + 'static,
{
    let repos_root = config.repos_root();

    let scan = scanner::scan(&repos_root);
    for warning in &scan.warnings {
        warn!("{warning}");
    }
    let mut locals: BTreeSet<RepoKey> = scan.checkouts;
    info!("Repos already on disk: {}", locals.len());

    let mut remotes = inventory.list_repositories().await?;
    if options.include_wikis {
        append_wiki_repositories(inventory, &mut remotes).await?;
    }
    info!("Remote inventory lists {} repositories", remotes.len());

    let mut summary = ReconcileSummary::default();
    for repo in remotes {
        if options.cancel.load(Ordering::SeqCst) {
            warn!("Stop requested, skipping remaining repositories and the archive phase");
            summary.cancelled = true;
            return Ok(summary);
        }

        let key = repo.key();
        // Matched identities leave the local set whatever the sync outcome;
        // only the residue gets archived.
        locals.remove(&key);

        let git = Arc::clone(&git);
        let pat = config.pat.clone();
        let root = repos_root.clone();
        let sync_result =
            task::spawn_blocking(move || sync_checkout(git.as_ref(), &repo, &pat, &root)).await;

        match sync_result {
            Ok(Ok(SyncOutcome::Cloned)) => summary.cloned += 1,
            Ok(Ok(SyncOutcome::Pulled)) => summary.pulled += 1,
            Ok(Ok(SyncOutcome::Empty)) => summary.empty += 1,
            Ok(Ok(SyncOutcome::Failed { reason })) => {
                warn!("Sync of {} failed: {}", key, reason);
                summary.failed.push((key, reason));
            }
            Ok(Err(err)) => {
                warn!("Sync of {} failed: {}", key, err);
                summary.failed.push((key, err.to_string()));
            }
            Err(join_err) => {
                warn!("Sync task for {} panicked: {}", key, join_err);
                summary.failed.push((key, join_err.to_string()));
            }
        }
    }

    let archive_root = config.archive_root();
    for key in &locals {
        archive::archive_checkout(&repos_root, key, &archive_root)?;
        summary.archived += 1;
    }

    info!(
        "{} cloned, {} pulled, {} empty, {} archived, {} failed",
        summary.cloned,
        summary.pulled,
        summary.empty,
        summary.archived,
        summary.failed.len()
    );
    Ok(summary)
}

/// Resolve every project wiki to its backing repository and append it to the
/// remote set, so wiki content flows through the same pipeline as ordinary
/// repositories.
async fn append_wiki_repositories<I>(inventory: &I, remotes: &mut Vec<RemoteRepo>) -> Result<()>
where
    I: Inventory + ?Sized,
{
    for wiki in inventory.list_wikis().await? {
        if wiki.kind != WikiKind::ProjectWiki {
            continue;
        }
        info!("Found wiki {}", wiki.name);
        let repo = inventory.get_repository(&wiki.repository_id).await?;
        remotes.push(repo);
    }
    Ok(())
}
