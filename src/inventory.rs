//! Remote inventory data model and collaborator interface.
//!
//! The reconciliation core never talks to Azure DevOps directly; it consumes
//! the [`Inventory`] trait, which the REST client in [`crate::azure`]
//! implements and which tests replace with mocks.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Identity of a repository: `(project, name)`.
///
/// Uniquely names both a remote repository and its local checkout path
/// relative to the repos root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoKey {
    /// Project the repository belongs to.
    pub project: String,
    /// Repository name within the project.
    pub name: String,
}

impl RepoKey {
    /// Create a key from its two components.
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }

    /// Derive a key from a checkout path relative to the repos root.
    ///
    /// Returns `None` for an empty path. A single-component path yields a key
    /// with an empty project (a checkout sitting directly under the root);
    /// extra components beyond the second are folded into the name so that
    /// unusually deep checkouts still round-trip through the archive layout.
    pub fn from_rel_path(rel: &std::path::Path) -> Option<Self> {
        let mut components = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned());
        let first = components.next()?;
        let rest: Vec<String> = components.collect();
        if rest.is_empty() {
            Some(Self::new("", first))
        } else {
            Some(Self::new(first, rest.join("/")))
        }
    }

    /// Relative path of this checkout under a repos or archive root.
    pub fn rel_path(&self) -> PathBuf {
        if self.project.is_empty() {
            PathBuf::from(&self.name)
        } else {
            let mut path = PathBuf::from(&self.project);
            path.push(&self.name);
            path
        }
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.project.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.project, self.name)
        }
    }
}

/// A repository as reported by the remote inventory. Never mutated locally.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRepo {
    /// Stable repository identifier, used when resolving wikis.
    pub id: String,
    /// Repository name.
    pub name: String,
    /// Project the repository belongs to.
    pub project: String,
    /// HTTPS remote URL as handed out by the service.
    pub remote_url: String,
}

impl RemoteRepo {
    /// Identity of this repository.
    pub fn key(&self) -> RepoKey {
        RepoKey::new(&self.project, &self.name)
    }
}

/// Wiki classification as reported by the inventory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WikiKind {
    /// Project-scoped wiki, backed by a hidden git repository.
    ProjectWiki,
    /// Wiki published from an ordinary code repository.
    CodeWiki,
    /// Any kind introduced after this client was written.
    #[serde(other)]
    Unknown,
}

/// A wiki entry from the inventory service.
#[derive(Debug, Clone, PartialEq)]
pub struct WikiRecord {
    /// Display name of the wiki.
    pub name: String,
    /// Kind of wiki; only [`WikiKind::ProjectWiki`] entries are mirrored.
    pub kind: WikiKind,
    /// Identifier of the git repository backing this wiki.
    pub repository_id: String,
}

/// Interface to the remote inventory service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Inventory: Send + Sync {
    /// List every repository in the organization.
    async fn list_repositories(&self) -> Result<Vec<RemoteRepo>>;

    /// List every wiki in the organization.
    async fn list_wikis(&self) -> Result<Vec<WikiRecord>>;

    /// Fetch a single repository by its stable identifier.
    async fn get_repository(&self, id: &str) -> Result<RemoteRepo>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn key_from_two_component_path() {
        let key = RepoKey::from_rel_path(Path::new("ProjA/repo1")).unwrap();
        assert_eq!(key, RepoKey::new("ProjA", "repo1"));
        assert_eq!(key.to_string(), "ProjA/repo1");
        assert_eq!(key.rel_path(), PathBuf::from("ProjA/repo1"));
    }

    #[test]
    fn key_from_single_component_path() {
        let key = RepoKey::from_rel_path(Path::new("stray")).unwrap();
        assert_eq!(key.project, "");
        assert_eq!(key.name, "stray");
        assert_eq!(key.to_string(), "stray");
        assert_eq!(key.rel_path(), PathBuf::from("stray"));
    }

    #[test]
    fn key_from_deep_path_folds_extra_components() {
        let key = RepoKey::from_rel_path(Path::new("ProjA/group/repo1")).unwrap();
        assert_eq!(key.project, "ProjA");
        assert_eq!(key.name, "group/repo1");
        assert_eq!(key.rel_path(), PathBuf::from("ProjA/group/repo1"));
    }

    #[test]
    fn key_from_empty_path_is_none() {
        assert!(RepoKey::from_rel_path(Path::new("")).is_none());
    }
}
