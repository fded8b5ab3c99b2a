//! Checkout synchronizer: clone-or-pull for one remote repository.

use std::path::Path;

use tracing::{debug, info};
use url::Url;

use crate::error::{MirrorError, Result};
use crate::git::{CloneStatus, GitCli, HeadStatus, PullStatus};
use crate::inventory::RemoteRepo;

/// Classification of a single repository's reconciliation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A fresh checkout was created.
    Cloned,
    /// The existing checkout was updated.
    Pulled,
    /// The remote repository has no commits; nothing to update.
    Empty,
    /// Clone and pull both failed; `reason` explains why.
    Failed {
        /// Human-readable failure description, safe to log.
        reason: String,
    },
}

/// Bring the checkout for `repo` up to date under `repos_root`.
///
/// The destination is `repos_root/<project>/<name>`. A clone is attempted
/// first; when the destination already exists the checkout is pulled instead,
/// and a failing pull is checked against an unborn `HEAD` to recognize
/// remotely-empty repositories.
pub fn sync_checkout<G>(
    git: &G,
    repo: &RemoteRepo,
    pat: &str,
    repos_root: &Path,
) -> Result<SyncOutcome>
where
    G: GitCli + ?Sized,
{
    let key = repo.key();
    let dest = repos_root.join(key.rel_path());
    let url = authenticated_url(repo, pat)?;

    info!("Cloning {} ...", key);
    match git.clone_repo(&url, &dest)? {
        CloneStatus::Completed => return Ok(SyncOutcome::Cloned),
        CloneStatus::Failed { status, stderr } => {
            return Ok(SyncOutcome::Failed {
                reason: format!("clone exited with {status:?}: {stderr}"),
            });
        }
        CloneStatus::DestinationExists => {
            debug!("{} exists, falling back to pull", dest.display());
        }
    }

    info!("Pulling {} ...", key);
    let pull_failure = match git.pull(&dest)? {
        PullStatus::Completed => return Ok(SyncOutcome::Pulled),
        PullStatus::Failed { status, stderr } => format!("pull exited with {status:?}: {stderr}"),
    };

    // A failing pull in a checkout whose HEAD is unborn means the remote
    // repository has zero commits, which is not an error.
    info!("Checking if {} is empty ...", key);
    match git.head_commit(&dest)? {
        HeadStatus::Unborn => {
            info!("{} is empty", key);
            Ok(SyncOutcome::Empty)
        }
        HeadStatus::Present(_) => Ok(SyncOutcome::Failed {
            reason: pull_failure,
        }),
        HeadStatus::Failed { status, stderr } => Ok(SyncOutcome::Failed {
            reason: format!("{pull_failure}; rev-parse exited with {status:?}: {stderr}"),
        }),
    }
}

/// Embed the access token into an HTTP(S) remote URL.
///
/// Any username already present is replaced. Non-HTTP schemes (`ssh`,
/// `file`, ...) pass through untouched. The returned URL carries the token
/// and must never be logged or persisted.
fn authenticated_url(repo: &RemoteRepo, pat: &str) -> Result<String> {
    let mut url = Url::parse(&repo.remote_url).map_err(|err| MirrorError::RemoteUrl {
        repo: repo.key().to_string(),
        message: err.to_string(),
    })?;
    if matches!(url.scheme(), "http" | "https") {
        url.set_username(pat).map_err(|_| MirrorError::RemoteUrl {
            repo: repo.key().to_string(),
            message: "URL cannot carry credentials".to_string(),
        })?;
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGitCli;
    use std::path::PathBuf;

    fn remote(project: &str, name: &str, url: &str) -> RemoteRepo {
        RemoteRepo {
            id: "0000".to_string(),
            name: name.to_string(),
            project: project.to_string(),
            remote_url: url.to_string(),
        }
    }

    fn https_remote() -> RemoteRepo {
        remote("ProjA", "repo1", "https://acme@dev.azure.com/acme/ProjA/_git/repo1")
    }

    #[test]
    fn token_replaces_existing_username() {
        let url = authenticated_url(&https_remote(), "s3cret").unwrap();
        assert_eq!(url, "https://s3cret@dev.azure.com/acme/ProjA/_git/repo1");
    }

    #[test]
    fn token_is_inserted_when_url_has_no_username() {
        let repo = remote("ProjA", "repo1", "https://dev.azure.com/acme/_git/repo1");
        let url = authenticated_url(&repo, "s3cret").unwrap();
        assert_eq!(url, "https://s3cret@dev.azure.com/acme/_git/repo1");
    }

    #[test]
    fn non_http_urls_pass_through() {
        let repo = remote("ProjA", "repo1", "file:///srv/git/repo1");
        let url = authenticated_url(&repo, "s3cret").unwrap();
        assert_eq!(url, "file:///srv/git/repo1");
    }

    #[test]
    fn fresh_clone_is_classified_cloned() {
        let mut git = MockGitCli::new();
        git.expect_clone_repo()
            .withf(|url, dest| {
                url.contains("s3cret") && dest == PathBuf::from("/mirror/ProjA/repo1")
            })
            .times(1)
            .returning(|_, _| Ok(CloneStatus::Completed));

        let outcome =
            sync_checkout(&git, &https_remote(), "s3cret", Path::new("/mirror")).unwrap();
        assert_eq!(outcome, SyncOutcome::Cloned);
    }

    #[test]
    fn existing_checkout_is_pulled() {
        let mut git = MockGitCli::new();
        git.expect_clone_repo()
            .times(1)
            .returning(|_, _| Ok(CloneStatus::DestinationExists));
        git.expect_pull()
            .withf(|dest| dest == PathBuf::from("/mirror/ProjA/repo1"))
            .times(1)
            .returning(|_| Ok(PullStatus::Completed));

        let outcome =
            sync_checkout(&git, &https_remote(), "s3cret", Path::new("/mirror")).unwrap();
        assert_eq!(outcome, SyncOutcome::Pulled);
    }

    #[test]
    fn failing_pull_with_unborn_head_is_empty() {
        let mut git = MockGitCli::new();
        git.expect_clone_repo()
            .returning(|_, _| Ok(CloneStatus::DestinationExists));
        git.expect_pull().returning(|_| {
            Ok(PullStatus::Failed {
                status: Some(1),
                stderr: "no candidates for merging".to_string(),
            })
        });
        git.expect_head_commit()
            .times(1)
            .returning(|_| Ok(HeadStatus::Unborn));

        let outcome =
            sync_checkout(&git, &https_remote(), "s3cret", Path::new("/mirror")).unwrap();
        assert_eq!(outcome, SyncOutcome::Empty);
    }

    #[test]
    fn failing_pull_with_real_head_is_a_failure() {
        let mut git = MockGitCli::new();
        git.expect_clone_repo()
            .returning(|_, _| Ok(CloneStatus::DestinationExists));
        git.expect_pull().returning(|_| {
            Ok(PullStatus::Failed {
                status: Some(1),
                stderr: "merge conflict".to_string(),
            })
        });
        git.expect_head_commit()
            .returning(|_| Ok(HeadStatus::Present("a".repeat(40))));

        let outcome =
            sync_checkout(&git, &https_remote(), "s3cret", Path::new("/mirror")).unwrap();
        match outcome {
            SyncOutcome::Failed { reason } => assert!(reason.contains("merge conflict")),
            other => panic!("expected a failure, got {:?}", other),
        }
    }

    #[test]
    fn failing_clone_is_a_failure_not_an_error() {
        let mut git = MockGitCli::new();
        git.expect_clone_repo().returning(|_, _| {
            Ok(CloneStatus::Failed {
                status: Some(1),
                stderr: "could not resolve host".to_string(),
            })
        });

        let outcome =
            sync_checkout(&git, &https_remote(), "s3cret", Path::new("/mirror")).unwrap();
        match outcome {
            SyncOutcome::Failed { reason } => assert!(reason.contains("could not resolve host")),
            other => panic!("expected a failure, got {:?}", other),
        }
    }
}
