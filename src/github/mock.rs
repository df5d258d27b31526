//! Offline [`GitHubApi`] backed by an embedded fixture, for `--mock` runs.
//!
//! The fixture holds one comparison between `base` and `head`. Any other
//! pair of refs, including the reverse one, compares as empty, which is
//! enough to exercise the directional retry end to end.

use async_trait::async_trait;
use serde::Deserialize;

use super::types::{ComparePayload, CommitDetailPayload, Tag, UserRef};
use super::{classify_error, GitHubApi, GitHubError};

const SAMPLE_COMPARE: &str = include_str!("../../tests/fixtures/sample_compare.json");

#[derive(Debug, Clone, Deserialize)]
struct Fixture {
    tags: Vec<String>,
    base: String,
    head: String,
    comparison: ComparePayload,
}

pub struct FixtureClient {
    fixture: Fixture,
    has_token: bool,
}

impl FixtureClient {
    pub fn embedded(has_token: bool) -> Result<Self, GitHubError> {
        Self::from_json(SAMPLE_COMPARE, has_token)
    }

    pub fn from_json(json: &str, has_token: bool) -> Result<Self, GitHubError> {
        Ok(Self {
            fixture: serde_json::from_str(json)?,
            has_token,
        })
    }
}

#[async_trait]
impl GitHubApi for FixtureClient {
    fn has_token(&self) -> bool {
        self.has_token
    }

    async fn list_tags(&self, _owner: &str, _repo: &str) -> Result<Vec<Tag>, GitHubError> {
        Ok(self
            .fixture
            .tags
            .iter()
            .map(|name| Tag { name: name.clone() })
            .collect())
    }

    async fn compare(
        &self,
        _owner: &str,
        _repo: &str,
        base: &str,
        head: &str,
    ) -> Result<ComparePayload, GitHubError> {
        if base == self.fixture.base && head == self.fixture.head {
            Ok(self.fixture.comparison.clone())
        } else {
            Ok(ComparePayload::default())
        }
    }

    async fn current_user(&self) -> Result<UserRef, GitHubError> {
        if self.has_token {
            Ok(UserRef {
                login: "demo-user".to_string(),
            })
        } else {
            Err(GitHubError::AuthFailed)
        }
    }

    async fn commit(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> Result<CommitDetailPayload, GitHubError> {
        let commit = self
            .fixture
            .comparison
            .commits
            .iter()
            .find(|c| !sha.is_empty() && c.sha.starts_with(sha))
            .ok_or_else(|| classify_error(404, "No commit found for SHA"))?;

        Ok(CommitDetailPayload {
            sha: commit.sha.clone(),
            commit: commit.commit.clone(),
            author: commit.author.clone(),
            files: self.fixture.comparison.files.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedded_fixture_parses() {
        let client = FixtureClient::embedded(false).unwrap();
        let tags = client.list_tags("acme", "widgets").await.unwrap();
        assert_eq!(tags.len(), 3);

        let payload = client.compare("acme", "widgets", "v1.0.0", "v1.1.0").await.unwrap();
        assert_eq!(payload.commits.len(), 3);
        assert_eq!(payload.files.len(), 4);
    }

    #[tokio::test]
    async fn test_other_directions_are_empty() {
        let client = FixtureClient::embedded(false).unwrap();
        let payload = client.compare("acme", "widgets", "v1.1.0", "v1.0.0").await.unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_commit_lookup_by_prefix() {
        let client = FixtureClient::embedded(false).unwrap();
        let detail = client.commit("acme", "widgets", "3f9a1c2").await.unwrap();
        assert!(detail.sha.starts_with("3f9a1c2"));
        assert!(matches!(
            client.commit("acme", "widgets", "0000000").await,
            Err(GitHubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_current_user_depends_on_token() {
        assert!(FixtureClient::embedded(true)
            .unwrap()
            .current_user()
            .await
            .is_ok());
        assert!(matches!(
            FixtureClient::embedded(false).unwrap().current_user().await,
            Err(GitHubError::AuthFailed)
        ));
    }
}
