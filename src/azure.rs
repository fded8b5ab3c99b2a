//! Azure DevOps REST implementation of the [`Inventory`] collaborator.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{MirrorError, Result};
use crate::inventory::{Inventory, RemoteRepo, WikiKind, WikiRecord};

const API_VERSION: &str = "6.0";

/// Inventory client talking to the Azure DevOps REST API, authenticating
/// with a personal access token over HTTP basic auth.
#[derive(Debug, Clone)]
pub struct AzureDevOpsClient {
    http: Client,
    organization_url: String,
    pat: String,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryPayload {
    id: String,
    name: String,
    remote_url: String,
    project: ProjectPayload,
}

#[derive(Deserialize)]
struct ProjectPayload {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WikiPayload {
    name: String,
    #[serde(rename = "type")]
    kind: WikiKind,
    repository_id: String,
}

impl From<RepositoryPayload> for RemoteRepo {
    fn from(payload: RepositoryPayload) -> Self {
        Self {
            id: payload.id,
            name: payload.name,
            project: payload.project.name,
            remote_url: payload.remote_url,
        }
    }
}

impl AzureDevOpsClient {
    /// Build a client for `organization_url` (e.g. `https://dev.azure.com/acme`).
    pub fn new(organization_url: &str, pat: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            organization_url: organization_url.trim_end_matches('/').to_string(),
            pat: pat.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!(
            "{}/{}?api-version={}",
            self.organization_url, path, API_VERSION
        );
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .basic_auth("", Some(&self.pat))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MirrorError::Inventory {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Inventory for AzureDevOpsClient {
    async fn list_repositories(&self) -> Result<Vec<RemoteRepo>> {
        let response: ListResponse<RepositoryPayload> =
            self.get_json("_apis/git/repositories").await?;
        Ok(response.value.into_iter().map(RemoteRepo::from).collect())
    }

    async fn list_wikis(&self) -> Result<Vec<WikiRecord>> {
        let response: ListResponse<WikiPayload> = self.get_json("_apis/wiki/wikis").await?;
        Ok(response
            .value
            .into_iter()
            .map(|wiki| WikiRecord {
                name: wiki.name,
                kind: wiki.kind,
                repository_id: wiki.repository_id,
            })
            .collect())
    }

    async fn get_repository(&self, id: &str) -> Result<RemoteRepo> {
        let payload: RepositoryPayload = self
            .get_json(&format!("_apis/git/repositories/{id}"))
            .await?;
        Ok(payload.into())
    }
}
