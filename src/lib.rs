//! `devops-mirror` keeps a local directory tree in step with the repository
//! inventory of an Azure DevOps organization.
//!
//! One reconciliation pass:
//! 1. scan `repos/` for checkouts already on disk (`scanner`),
//! 2. list the remote inventory, optionally including project wikis
//!    (`inventory`, `azure`),
//! 3. clone-or-pull every remote repository, classifying each as cloned,
//!    pulled or empty (`sync`, `git`),
//! 4. move checkouts no remote repository claimed into `archive/`
//!    (`archive`), never deleting anything.
//!
//! The driver in `reconcile` wires these together and returns an aggregate
//! [`ReconcileSummary`].

/// Moves orphaned checkouts into the archive tree.
pub mod archive;
/// Azure DevOps REST implementation of the inventory interface.
pub mod azure;
/// Command-line argument definitions and the run entry point.
pub mod cli;
/// Environment-sourced configuration.
pub mod config;
/// Core error types and Result alias.
pub mod error;
/// Typed interface to the `git` executable.
pub mod git;
/// Remote inventory data model and collaborator trait.
pub mod inventory;
/// The reconciliation driver.
pub mod reconcile;
/// Local checkout discovery.
pub mod scanner;
/// Clone-or-pull synchronization of a single checkout.
pub mod sync;

pub use config::AppConfig;
pub use error::{MirrorError, Result};
pub use inventory::{Inventory, RemoteRepo, RepoKey, WikiKind, WikiRecord};
pub use reconcile::{reconcile, ReconcileOptions, ReconcileSummary};
pub use sync::SyncOutcome;
