//! Archiver: moves orphaned checkouts out of the repos tree.
//!
//! Archiving is strictly move-only. Nothing in this module deletes data.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{MirrorError, Result};
use crate::inventory::RepoKey;

/// Move the checkout for `key` from `repos_root` into `archive_root`,
/// preserving its relative path.
///
/// Intermediate directories under the archive root are created as needed.
/// An already-existing destination is reported as
/// [`MirrorError::ArchiveCollision`] rather than overwritten.
pub fn archive_checkout(repos_root: &Path, key: &RepoKey, archive_root: &Path) -> Result<()> {
    let source = repos_root.join(key.rel_path());
    let destination = archive_root.join(key.rel_path());

    if destination.exists() {
        return Err(MirrorError::ArchiveCollision { destination });
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::rename(&source, &destination).map_err(|source_err| MirrorError::ArchiveMove {
        source_path: source.clone(),
        destination: destination.clone(),
        source: source_err,
    })?;
    info!("Archived {} to {}", key, destination.display());
    Ok(())
}
