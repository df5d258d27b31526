//! Closed shapes for the GitHub REST payloads this tool reads.
//!
//! Only the fields the pipeline uses are declared; serde ignores the rest.

use serde::{Deserialize, Serialize};

/// Entry of `GET /repos/{owner}/{repo}/tags`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
}

/// A GitHub account attached to a commit. Null when the git author's email
/// is not linked to any account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserRef {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitActor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitCommit {
    #[serde(default)]
    pub message: String,
    pub author: Option<GitActor>,
}

/// A commit as listed in a comparison.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitPayload {
    pub sha: String,
    pub commit: GitCommit,
    pub author: Option<UserRef>,
}

/// File status as reported upstream. Statuses outside the four the tool
/// renders (`copied`, `changed`, `unchanged`) are folded into `Modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl From<&str> for FileStatus {
    fn from(s: &str) -> Self {
        match s {
            "added" => Self::Added,
            "removed" => Self::Removed,
            "renamed" => Self::Renamed,
            _ => Self::Modified,
        }
    }
}

impl From<String> for FileStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Removed => write!(f, "removed"),
            FileStatus::Renamed => write!(f, "renamed"),
        }
    }
}

/// A changed file in a comparison or a single commit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileChangePayload {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
    /// Absent for binary files and very large diffs
    pub patch: Option<String>,
}

/// Body of `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComparePayload {
    #[serde(default)]
    pub commits: Vec<CommitPayload>,
    #[serde(default)]
    pub files: Vec<FileChangePayload>,
}

impl ComparePayload {
    /// No commits and no files: either truly identical refs or the wrong
    /// direction was asked for.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.files.is_empty()
    }
}

/// Body of `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitDetailPayload {
    pub sha: String,
    pub commit: GitCommit,
    pub author: Option<UserRef>,
    #[serde(default)]
    pub files: Vec<FileChangePayload>,
}

/// A repository derived from user input by `parse_repo_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    /// Canonical `https://github.com/{owner}/{name}` form
    pub url: String,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}
