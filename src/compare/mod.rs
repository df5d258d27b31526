pub mod direction;
pub mod normalize;
pub mod types;

pub use types::{Commit, CommitDetail, ComparisonResult, Direction};

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, info_span, instrument, Instrument};

use crate::config::CompareStrategy;
use crate::github::{GitHubApi, GitHubError};
use direction::{DirectionalCompare, Outcome};

/// Loading/error state shared by every operation of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped each time an operation starts
    pub generation: u64,
}

/// Handle for one started operation. Only the newest ticket may update the
/// session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Entry point for the comparison pipeline: list versions, compare two refs,
/// read one file's patch, inspect a commit, check the token.
pub struct Comparator {
    api: Arc<dyn GitHubApi>,
    strategy: CompareStrategy,
    session: Mutex<SessionState>,
}

impl Comparator {
    pub fn new(api: Arc<dyn GitHubApi>, strategy: CompareStrategy) -> Self {
        Self {
            api,
            strategy,
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn status(&self) -> SessionState {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn begin(&self) -> RequestTicket {
        let mut state = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        state.generation += 1;
        state.loading = true;
        state.error = None;
        RequestTicket(state.generation)
    }

    /// Record a completion. Returns false when a newer operation has started
    /// since `ticket` was issued, in which case the state is left alone.
    fn finish<T>(&self, ticket: RequestTicket, result: &Result<T, GitHubError>) -> bool {
        let mut state = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 != state.generation {
            debug!(
                ticket = ticket.0,
                current = state.generation,
                "discarding stale completion"
            );
            return false;
        }
        state.loading = false;
        state.error = result.as_ref().err().map(|e| e.to_string());
        true
    }

    /// Tag names of the repository (first page of up to 100).
    #[instrument(skip(self))]
    pub async fn list_versions(&self, owner: &str, repo: &str) -> Result<Vec<String>, GitHubError> {
        let ticket = self.begin();
        let result = self
            .api
            .list_tags(owner, repo)
            .await
            .map(|tags| tags.into_iter().map(|t| t.name).collect::<Vec<_>>());
        if let Ok(versions) = &result {
            info!(versions = versions.len(), "listed versions");
        }
        self.finish(ticket, &result);
        result
    }

    /// Compare two refs, retrying once in the reverse direction when the
    /// first answer is empty. The reported from/to follow the request that
    /// produced the data.
    #[instrument(skip(self), fields(strategy = ?self.strategy))]
    pub async fn compare_versions(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<ComparisonResult, GitHubError> {
        let ticket = self.begin();
        let result = self.compare_inner(owner, repo, base, head).await;
        self.finish(ticket, &result);
        result
    }

    async fn compare_inner(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<ComparisonResult, GitHubError> {
        if base.trim().is_empty() || head.trim().is_empty() {
            return Err(GitHubError::InvalidRequest(
                "both versions must be non-empty".to_string(),
            ));
        }

        let outcome = match self.strategy {
            CompareStrategy::Sequential => self.compare_sequential(owner, repo, base, head).await?,
            CompareStrategy::Parallel => self.compare_parallel(owner, repo, base, head).await?,
        };

        let result = normalize::normalize(outcome.payload, owner, repo, outcome.resolved);
        info!(
            from = %result.from_version,
            to = %result.to_version,
            direction = ?result.direction,
            commits = result.stats.commits,
            files = result.stats.files_changed,
            "comparison ready"
        );
        Ok(result)
    }

    async fn compare_sequential(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Outcome, GitHubError> {
        let mut machine = DirectionalCompare::new(base, head);
        while let Some((from, to)) = machine.next_request() {
            debug!(%from, %to, "requesting comparison");
            let payload = self.api.compare(owner, repo, from, to).await?;
            machine = machine.advance(payload);
        }
        machine.outcome().ok_or_else(incomplete)
    }

    /// Both directions at once. The reverse answer (or its error) only
    /// matters when the forward one is empty, so the result matches the
    /// sequential strategy.
    async fn compare_parallel(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Outcome, GitHubError> {
        let (forward, reverse) = tokio::join!(
            self.api
                .compare(owner, repo, base, head)
                .instrument(info_span!("compare", direction = "forward")),
            self.api
                .compare(owner, repo, head, base)
                .instrument(info_span!("compare", direction = "reverse")),
        );

        let mut machine = DirectionalCompare::new(base, head).advance(forward?);
        if machine.next_request().is_some() {
            machine = machine.advance(reverse?);
        }
        machine.outcome().ok_or_else(incomplete)
    }

    /// Patch text of one file between two refs, or "" when GitHub sends none
    /// (binary or oversized files). Requests the given direction only.
    #[instrument(skip(self))]
    pub async fn fetch_file_diff(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        filename: &str,
    ) -> Result<String, GitHubError> {
        let ticket = self.begin();
        let result = self.api.compare(owner, repo, base, head).await.and_then(|payload| {
            payload
                .files
                .into_iter()
                .find(|f| f.filename == filename)
                .map(|f| f.patch.unwrap_or_default())
                .ok_or_else(|| GitHubError::FileNotInComparison(filename.to_string()))
        });
        self.finish(ticket, &result);
        result
    }

    /// One file's patch taken from a full directional comparison, so the
    /// from/to it is shown under are the ones `compare_versions` reports.
    #[instrument(skip(self))]
    pub async fn compared_file_diff(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
        filename: &str,
    ) -> Result<(ComparisonResult, String), GitHubError> {
        let ticket = self.begin();
        let result = self
            .compare_inner(owner, repo, base, head)
            .await
            .and_then(|comparison| {
                let patch = comparison
                    .file(filename)
                    .map(|f| f.patch.clone().unwrap_or_default())
                    .ok_or_else(|| GitHubError::FileNotInComparison(filename.to_string()))?;
                Ok((comparison, patch))
            });
        self.finish(ticket, &result);
        result
    }

    /// A single commit with its own file list.
    #[instrument(skip(self))]
    pub async fn commit_detail(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDetail, GitHubError> {
        let ticket = self.begin();
        let result = self
            .api
            .commit(owner, repo, sha)
            .await
            .map(normalize::normalize_commit_detail);
        self.finish(ticket, &result);
        result
    }

    /// Patch of one file as changed by a single commit, from the commit's own
    /// payload.
    #[instrument(skip(self))]
    pub async fn commit_file_diff(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        filename: &str,
    ) -> Result<(CommitDetail, String), GitHubError> {
        let ticket = self.begin();
        let result = self
            .api
            .commit(owner, repo, sha)
            .await
            .map(normalize::normalize_commit_detail)
            .and_then(|detail| {
                let patch = detail
                    .file(filename)
                    .map(|f| f.patch.clone().unwrap_or_default())
                    .ok_or_else(|| GitHubError::FileNotInComparison(filename.to_string()))?;
                Ok((detail, patch))
            });
        self.finish(ticket, &result);
        result
    }

    /// Like `commit_detail`, but never fails: on error the commit's known
    /// fields are returned with an empty file list, alongside the error.
    pub async fn commit_detail_or_fallback(
        &self,
        owner: &str,
        repo: &str,
        commit: &Commit,
    ) -> (CommitDetail, Option<GitHubError>) {
        match self.commit_detail(owner, repo, &commit.hash).await {
            Ok(detail) => (detail, None),
            Err(e) => (CommitDetail::fallback(commit), Some(e)),
        }
    }

    /// Whether the configured token is accepted.
    ///
    /// No token: `false` without any request. Rejected token: `false`.
    /// Transport failures and other statuses are returned as errors so they
    /// are not mistaken for a bad token.
    #[instrument(skip(self))]
    pub async fn validate_token(&self) -> Result<bool, GitHubError> {
        if !self.api.has_token() {
            debug!("no token configured");
            return Ok(false);
        }
        match self.api.current_user().await {
            Ok(user) => {
                info!(login = %user.login, "token accepted");
                Ok(true)
            }
            Err(e) if e.is_credential_rejection() => {
                info!(error = %e, "token rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

fn incomplete() -> GitHubError {
    GitHubError::InvalidRequest("comparison ended without a result".to_string())
}
