//! HTTP client for the dependency-graph snapshot endpoint.

use anyhow::{bail, Context};
use depgraph_model::Snapshot;
use reqwest::blocking::Client;
use std::time::Duration;

/// Submits snapshots to the ingestion service.
///
/// One POST per snapshot, no retries; a failed submission surfaces the
/// response status and body.
pub struct SnapshotClient {
    client: Client,
    api_url: String,
    token: String,
}

impl SnapshotClient {
    const TIMEOUT_SECONDS: u64 = 30;

    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> anyhow::Result<Self> {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()?;

        let api_url: String = api_url.into();
        Ok(SnapshotClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn endpoint(&self, repository: &str) -> String {
        format!(
            "{}/repos/{}/dependency-graph/snapshots",
            self.api_url, repository
        )
    }

    pub fn submit(&self, repository: &str, snapshot: &Snapshot) -> anyhow::Result<()> {
        let url = self.endpoint(repository);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(snapshot)
            .send()
            .with_context(|| format!("failed to reach {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("snapshot submission failed with status {}: {}", status, body);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_format() {
        let client = SnapshotClient::new("https://api.github.com", "token").unwrap();
        assert_eq!(
            client.endpoint("octo/app"),
            "https://api.github.com/repos/octo/app/dependency-graph/snapshots"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = SnapshotClient::new("https://ghe.example.invalid/api/v3/", "token").unwrap();
        assert_eq!(
            client.endpoint("octo/app"),
            "https://ghe.example.invalid/api/v3/repos/octo/app/dependency-graph/snapshots"
        );
    }
}
