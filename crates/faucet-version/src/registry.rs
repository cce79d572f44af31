//! Release registry lookups.

use crate::error::{VersionError, VersionResult};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Public GitHub REST endpoint.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Repository owner publishing faucet releases.
pub const RELEASE_OWNER: &str = "ignite";

/// Repository publishing faucet releases.
pub const RELEASE_REPO: &str = "faucet";

/// Source of the latest published release tag.
#[async_trait]
pub trait ReleaseRegistry: Send + Sync {
    /// Latest published tag, or `None` when nothing has been released yet.
    async fn latest_release_tag(&self) -> VersionResult<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
}

/// GitHub releases client
#[derive(Debug, Clone)]
pub struct GithubReleases {
    http_client: Client,
    base_url: String,
    owner: String,
    repo: String,
}

impl GithubReleases {
    /// Client for the faucet repository on github.com.
    pub fn new() -> VersionResult<Self> {
        Self::with_base_url(GITHUB_API_URL, RELEASE_OWNER, RELEASE_REPO)
    }

    /// Client against an arbitrary GitHub-compatible API root.
    pub fn with_base_url(
        base_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> VersionResult<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("faucet/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    fn latest_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.base_url, self.owner, self.repo
        )
    }
}

#[async_trait]
impl ReleaseRegistry for GithubReleases {
    async fn latest_release_tag(&self) -> VersionResult<Option<String>> {
        let url = self.latest_url();
        debug!("Fetching latest release from {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        match response.status() {
            // GitHub answers 404 for repositories without releases
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let release: LatestRelease = response.json().await?;
                Ok(release.tag_name.filter(|tag| !tag.is_empty()))
            }
            status => Err(VersionError::Registry(format!(
                "unexpected status {} from {}",
                status, url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LATEST_PATH: &str = "/repos/ignite/faucet/releases/latest";

    async fn registry_for(server: &MockServer) -> GithubReleases {
        GithubReleases::with_base_url(server.uri(), RELEASE_OWNER, RELEASE_REPO).unwrap()
    }

    #[tokio::test]
    async fn test_latest_release_tag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tag_name": "v0.3.2",
                "name": "v0.3.2",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tag = registry_for(&server).await.latest_release_tag().await.unwrap();
        assert_eq!(tag.as_deref(), Some("v0.3.2"));
    }

    #[tokio::test]
    async fn test_no_release_published() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tag = registry_for(&server).await.latest_release_tag().await.unwrap();
        assert_eq!(tag, None);
    }

    #[tokio::test]
    async fn test_null_tag_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "tag_name": null })),
            )
            .mount(&server)
            .await;

        let tag = registry_for(&server).await.latest_release_tag().await.unwrap();
        assert_eq!(tag, None);
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = registry_for(&server).await.latest_release_tag().await;
        assert!(matches!(result, Err(VersionError::Registry(_))));
    }

    #[tokio::test]
    async fn test_unreachable_registry() {
        // Nothing listens on port 9 of localhost in test environments
        let registry =
            GithubReleases::with_base_url("http://127.0.0.1:9", RELEASE_OWNER, RELEASE_REPO)
                .unwrap();

        let result = registry.latest_release_tag().await;
        assert!(matches!(result, Err(VersionError::Network(_))));
    }

    #[test]
    fn test_latest_url() {
        let registry = GithubReleases::with_base_url("http://localhost:1234/", "o", "r").unwrap();
        assert_eq!(registry.latest_url(), "http://localhost:1234/repos/o/r/releases/latest");
    }
}
