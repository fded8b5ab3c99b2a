//! Version-control collaborator: typed wrappers around the `git` executable.
//!
//! The synchronizer branches on the typed statuses returned here instead of
//! raw exit codes, so the 128-exit-code conventions of git stay confined to
//! this module.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{MirrorError, Result};

/// Exit code git uses both for "destination path already exists" on clone and
/// for "unknown revision" on rev-parse.
const GIT_EXIT_FATAL: i32 = 128;

/// Result of a clone attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneStatus {
    /// A fresh checkout was created.
    Completed,
    /// The destination path already holds a checkout; pull instead.
    DestinationExists,
    /// Clone failed for another reason.
    Failed {
        /// Exit status of the git process, if it exited normally.
        status: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Result of a pull attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullStatus {
    /// All remotes fetched and the current branch fast-forwarded.
    Completed,
    /// Pull failed; the checkout may be an empty repository.
    Failed {
        /// Exit status of the git process, if it exited normally.
        status: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Result of resolving `HEAD` in a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadStatus {
    /// `HEAD` resolves to a commit.
    Present(String),
    /// The repository has no commits (unborn `HEAD`).
    Unborn,
    /// rev-parse failed in some other way.
    Failed {
        /// Exit status of the git process, if it exited normally.
        status: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
}

/// Operations the synchronizer needs from the version-control tool.
#[cfg_attr(test, mockall::automock)]
pub trait GitCli: Send + Sync {
    /// Clone `url` into `dest`, creating intermediate directories.
    ///
    /// Implementations must not log or persist `url`; it carries credentials.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<CloneStatus>;

    /// Fetch all remotes with pruning and merge into the current branch.
    fn pull(&self, dest: &Path) -> Result<PullStatus>;

    /// Resolve `HEAD` in the checkout at `dest`.
    fn head_commit(&self, dest: &Path) -> Result<HeadStatus>;
}

/// [`GitCli`] implementation that shells out to the `git` binary on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl SystemGit {
    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .output()
            .map_err(|source| MirrorError::GitLaunch { source })
    }
}

impl GitCli for SystemGit {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<CloneStatus> {
        let dest = dest.to_string_lossy();
        let output = self.run(&["clone", url, &dest])?;
        if output.status.success() {
            return Ok(CloneStatus::Completed);
        }
        match output.status.code() {
            Some(GIT_EXIT_FATAL) => Ok(CloneStatus::DestinationExists),
            status => Ok(CloneStatus::Failed {
                status,
                stderr: stderr_of(&output),
            }),
        }
    }

    fn pull(&self, dest: &Path) -> Result<PullStatus> {
        let dest = dest.to_string_lossy();
        let output = self.run(&["-C", &dest, "pull", "--all", "--prune"])?;
        if output.status.success() {
            Ok(PullStatus::Completed)
        } else {
            Ok(PullStatus::Failed {
                status: output.status.code(),
                stderr: stderr_of(&output),
            })
        }
    }

    fn head_commit(&self, dest: &Path) -> Result<HeadStatus> {
        let dest = dest.to_string_lossy();
        let output = self.run(&["-C", &dest, "rev-parse", "HEAD"])?;
        if output.status.success() {
            let oid = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(HeadStatus::Present(oid));
        }
        match output.status.code() {
            Some(GIT_EXIT_FATAL) => Ok(HeadStatus::Unborn),
            status => Ok(HeadStatus::Failed {
                status,
                stderr: stderr_of(&output),
            }),
        }
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
