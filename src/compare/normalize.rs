//! Reshape raw GitHub payloads into the comparison model. Pure, no I/O.

use tracing::warn;

use super::types::{
    Commit, CommitDetail, ComparisonResult, DataWarning, Direction, FileChange, RepositoryInfo,
    Stats,
};
use crate::github::types::{
    ComparePayload, CommitDetailPayload, CommitPayload, FileChangePayload, GitCommit, UserRef,
};

const SHORT_HASH_LEN: usize = 7;

/// The labels and direction a comparison should be reported under.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub from_version: String,
    pub to_version: String,
    pub direction: Direction,
}

pub fn short_hash(sha: &str) -> String {
    sha.chars().take(SHORT_HASH_LEN).collect()
}

/// Prefer the account login; fall back to the git author name.
pub fn resolve_author(account: Option<&UserRef>, commit: &GitCommit) -> String {
    account
        .map(|u| u.login.as_str())
        .filter(|login| !login.is_empty())
        .or_else(|| {
            commit
                .author
                .as_ref()
                .map(|a| a.name.as_str())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or("unknown")
        .to_string()
}

fn commit_date(commit: &GitCommit) -> String {
    commit
        .author
        .as_ref()
        .map(|a| a.date.clone())
        .unwrap_or_default()
}

pub fn normalize_commit(payload: &CommitPayload) -> Commit {
    Commit {
        hash: short_hash(&payload.sha),
        message: payload.commit.message.clone(),
        date: commit_date(&payload.commit),
        author: resolve_author(payload.author.as_ref(), &payload.commit),
    }
}

pub fn normalize_file(payload: FileChangePayload) -> FileChange {
    FileChange {
        file: payload.filename,
        changes: payload.changes,
        insertions: payload.additions,
        deletions: payload.deletions,
        status: payload.status,
        patch: payload.patch,
    }
}

/// Sum commits, files and line counts. Insertions and deletions are always
/// the sums over `files`.
pub fn compute_stats(commits: &[Commit], files: &[FileChange]) -> Stats {
    Stats {
        commits: commits.len(),
        files_changed: files.len(),
        insertions: files
            .iter()
            .fold(0u64, |acc, f| acc.saturating_add(f.insertions)),
        deletions: files
            .iter()
            .fold(0u64, |acc, f| acc.saturating_add(f.deletions)),
    }
}

/// Files whose upstream `changes` is not `insertions + deletions`.
pub fn check_change_counts(files: &[FileChange]) -> Vec<DataWarning> {
    files
        .iter()
        .filter_map(|f| {
            let expected = f.insertions.saturating_add(f.deletions);
            (f.changes != expected).then(|| {
                warn!(file = %f.file, changes = f.changes, expected, "change count mismatch");
                DataWarning::ChangeCountMismatch {
                    file: f.file.clone(),
                    changes: f.changes,
                    expected,
                }
            })
        })
        .collect()
}

pub fn normalize(
    payload: ComparePayload,
    owner: &str,
    repo: &str,
    resolved: Resolved,
) -> ComparisonResult {
    let commits: Vec<Commit> = payload.commits.iter().map(normalize_commit).collect();
    let files: Vec<FileChange> = payload.files.into_iter().map(normalize_file).collect();
    let stats = compute_stats(&commits, &files);
    let warnings = check_change_counts(&files);

    ComparisonResult {
        from_version: resolved.from_version,
        to_version: resolved.to_version,
        commits,
        files,
        stats,
        repository: RepositoryInfo {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
        direction: resolved.direction,
        warnings,
    }
}

pub fn normalize_commit_detail(payload: CommitDetailPayload) -> CommitDetail {
    let author = resolve_author(payload.author.as_ref(), &payload.commit);
    CommitDetail {
        hash: short_hash(&payload.sha),
        date: commit_date(&payload.commit),
        message: payload.commit.message,
        author,
        files: payload.files.into_iter().map(normalize_file).collect(),
    }
}
