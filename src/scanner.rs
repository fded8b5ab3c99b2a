//! Local checkout scanner.
//!
//! Walks the repos root once at startup and returns the set of checkouts
//! already on disk. The scan is best-effort: unreadable paths are reported
//! alongside the partial result instead of aborting the walk.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::inventory::RepoKey;

/// Outcome of scanning the repos root.
#[derive(Debug, Default)]
pub struct LocalScan {
    /// Checkouts found on disk, keyed by their path relative to the root.
    pub checkouts: BTreeSet<RepoKey>,
    /// Paths the walk could not read, rendered as warnings for the caller.
    pub warnings: Vec<String>,
}

/// Discover every git checkout under `root`.
///
/// A directory counts as a checkout when it directly contains a `.git`
/// entry; the walk does not descend into checkouts, so nested repositories
/// are invisible. The `archive` subtree directly under `root` is skipped
/// entirely because the archiver writes into it.
pub fn scan(root: &Path) -> LocalScan {
    let mut result = LocalScan::default();
    if !root.exists() {
        debug!("Repos root {} does not exist yet, nothing on disk", root.display());
        return result;
    }

    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                result.warnings.push(format!("Skipping unreadable path: {err}"));
                continue;
            }
        };
        if !entry.file_type().is_dir() || entry.depth() == 0 {
            continue;
        }
        if entry.depth() == 1 && entry.file_name() == "archive" {
            walker.skip_current_dir();
            continue;
        }
        if entry.path().join(".git").exists() {
            let rel = entry
                .path()
                .strip_prefix(root)
                .expect("walked path is always under the root");
            if let Some(key) = RepoKey::from_rel_path(rel) {
                debug!("Found checkout {}", key);
                result.checkouts.insert(key);
            }
            walker.skip_current_dir();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn mk_checkout(root: &Path, rel: &str) -> Result<()> {
        let dir = root.join(rel).join(".git");
        fs::create_dir_all(dir)?;
        Ok(())
    }

    #[test]
    fn finds_checkouts_two_levels_deep() -> Result<()> {
        let temp = tempdir()?;
        mk_checkout(temp.path(), "ProjA/repo1")?;
        mk_checkout(temp.path(), "ProjA/repo2")?;
        mk_checkout(temp.path(), "ProjB/repo1")?;

        let scan = scan(temp.path());
        assert!(scan.warnings.is_empty());
        assert_eq!(
            scan.checkouts,
            [
                RepoKey::new("ProjA", "repo1"),
                RepoKey::new("ProjA", "repo2"),
                RepoKey::new("ProjB", "repo1"),
            ]
            .into_iter()
            .collect()
        );
        Ok(())
    }

    #[test]
    fn does_not_descend_into_checkouts() -> Result<()> {
        let temp = tempdir()?;
        mk_checkout(temp.path(), "ProjA/repo1")?;
        // A vendored repository inside the checkout must not be reported.
        mk_checkout(temp.path(), "ProjA/repo1/vendor/lib")?;

        let scan = scan(temp.path());
        assert_eq!(
            scan.checkouts,
            [RepoKey::new("ProjA", "repo1")].into_iter().collect()
        );
        Ok(())
    }

    #[test]
    fn skips_the_archive_subtree() -> Result<()> {
        let temp = tempdir()?;
        mk_checkout(temp.path(), "ProjA/repo1")?;
        mk_checkout(temp.path(), "archive/ProjA/old-repo")?;

        let scan = scan(temp.path());
        assert_eq!(
            scan.checkouts,
            [RepoKey::new("ProjA", "repo1")].into_iter().collect()
        );
        Ok(())
    }

    #[test]
    fn missing_root_yields_empty_scan() {
        let temp = tempdir().unwrap();
        let scan = scan(&temp.path().join("does-not-exist"));
        assert!(scan.checkouts.is_empty());
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn checkout_directly_under_root_gets_a_bare_key() -> Result<()> {
        let temp = tempdir()?;
        mk_checkout(temp.path(), "stray")?;

        let scan = scan(temp.path());
        assert_eq!(
            scan.checkouts,
            [RepoKey::new("", "stray")].into_iter().collect()
        );
        Ok(())
    }
}
