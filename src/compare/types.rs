use serde::Serialize;

pub use crate::github::types::FileStatus;

/// A commit in a comparison, reshaped for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// First 7 characters of the SHA
    pub hash: String,
    pub message: String,
    /// ISO-8601 author date, as reported upstream
    pub date: String,
    /// Account login, or the git author name when no account is linked
    pub author: String,
}

/// One changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub file: String,
    /// Copied from upstream, not recomputed
    pub changes: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl FileChange {
    /// Lines touched: insertions plus deletions.
    pub fn churn(&self) -> u64 {
        self.insertions.saturating_add(self.deletions)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub commits: usize,
    pub files_changed: usize,
    pub insertions: u64,
    pub deletions: u64,
}

impl Stats {
    /// Insertions minus deletions; negative when the range shrank the code.
    pub fn net_change(&self) -> i128 {
        i128::from(self.insertions) - i128::from(self.deletions)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryInfo {
    pub owner: String,
    pub repo: String,
}

/// Which physical request produced a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// The first request, in the order the user gave
    AsRequested,
    /// The reversed request, after the first came back empty
    Swapped,
    /// Both directions were empty: identical refs, or nothing to tell apart
    NoDifferences,
}

/// A data-quality notice raised while normalizing upstream data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DataWarning {
    /// `changes` disagrees with `insertions + deletions`
    ChangeCountMismatch {
        file: String,
        changes: u64,
        expected: u64,
    },
}

impl std::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataWarning::ChangeCountMismatch {
                file,
                changes,
                expected,
            } => write!(
                f,
                "{file}: upstream reports {changes} changes but insertions + deletions = {expected}"
            ),
        }
    }
}

/// Everything shown for one comparison between two refs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub from_version: String,
    pub to_version: String,
    pub commits: Vec<Commit>,
    pub files: Vec<FileChange>,
    pub stats: Stats,
    pub repository: RepositoryInfo,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataWarning>,
}

impl ComparisonResult {
    /// The changed file with exactly this path.
    pub fn file(&self, path: &str) -> Option<&FileChange> {
        self.files.iter().find(|f| f.file == path)
    }

    /// Up to `n` files with the most changed lines, largest first. Ties keep
    /// their upstream order.
    pub fn top_files(&self, n: usize) -> Vec<&FileChange> {
        let mut files: Vec<&FileChange> = self.files.iter().collect();
        files.sort_by_key(|f| std::cmp::Reverse(f.churn()));
        files.truncate(n);
        files
    }

    /// The first `n` commits, in upstream order.
    pub fn recent_commits(&self, n: usize) -> &[Commit] {
        &self.commits[..n.min(self.commits.len())]
    }
}

/// A single commit together with its own changed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDetail {
    pub hash: String,
    pub message: String,
    pub date: String,
    pub author: String,
    pub files: Vec<FileChange>,
}

impl CommitDetail {
    /// Minimal detail built from what the comparison already knows, used when
    /// the commit endpoint cannot be reached.
    pub fn fallback(commit: &Commit) -> Self {
        Self {
            hash: commit.hash.clone(),
            message: commit.message.clone(),
            date: commit.date.clone(),
            author: commit.author.clone(),
            files: Vec::new(),
        }
    }

    pub fn file(&self, path: &str) -> Option<&FileChange> {
        self.files.iter().find(|f| f.file == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_detail_fallback_keeps_known_fields() {
        let commit = Commit {
            hash: "a1b2c3d".to_string(),
            message: "Fix login".to_string(),
            date: "2024-05-01T10:00:00Z".to_string(),
            author: "alice".to_string(),
        };
        let detail = CommitDetail::fallback(&commit);
        assert_eq!(detail.hash, "a1b2c3d");
        assert_eq!(detail.author, "alice");
        assert!(detail.files.is_empty());
    }

    fn change(file: &str, insertions: u64, deletions: u64) -> FileChange {
        FileChange {
            file: file.to_string(),
            changes: insertions + deletions,
            insertions,
            deletions,
            status: FileStatus::Modified,
            patch: None,
        }
    }

    fn commit(hash: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            message: format!("Commit {hash}"),
            date: "2024-05-01T10:00:00Z".to_string(),
            author: "alice".to_string(),
        }
    }

    fn result_with(files: Vec<FileChange>, commits: Vec<Commit>) -> ComparisonResult {
        ComparisonResult {
            from_version: "v1".to_string(),
            to_version: "v2".to_string(),
            stats: Stats::default(),
            commits,
            files,
            repository: RepositoryInfo {
                owner: "org".to_string(),
                repo: "repo".to_string(),
            },
            direction: Direction::AsRequested,
            warnings: vec![],
        }
    }

    #[test]
    fn test_top_files_ranked_by_churn_and_truncated() {
        let result = result_with(
            vec![
                change("a.rs", 1, 0),
                change("b.rs", 10, 5),
                change("c.rs", 0, 3),
                change("d.rs", 2, 1),
                change("e.rs", 40, 0),
                change("f.rs", 0, 0),
                change("g.rs", 7, 7),
            ],
            vec![],
        );
        let top: Vec<&str> = result.top_files(5).iter().map(|f| f.file.as_str()).collect();
        assert_eq!(top, vec!["e.rs", "b.rs", "g.rs", "c.rs", "d.rs"]);
        // the result itself keeps upstream order
        assert_eq!(result.files[0].file, "a.rs");
    }

    #[test]
    fn test_top_files_ties_keep_upstream_order() {
        let result = result_with(vec![change("x.rs", 1, 1), change("y.rs", 2, 0)], vec![]);
        let top: Vec<&str> = result.top_files(5).iter().map(|f| f.file.as_str()).collect();
        assert_eq!(top, vec!["x.rs", "y.rs"]);
    }

    #[test]
    fn test_recent_commits_takes_first_n() {
        let commits = (1..=7).map(|i| commit(&format!("c{i}"))).collect();
        let result = result_with(vec![], commits);
        let recent: Vec<&str> = result.recent_commits(5).iter().map(|c| c.hash.as_str()).collect();
        assert_eq!(recent, vec!["c1", "c2", "c3", "c4", "c5"]);
        assert_eq!(result_with(vec![], vec![commit("c1")]).recent_commits(5).len(), 1);
    }

    #[test]
    fn test_file_lookup_is_exact() {
        let result = result_with(vec![change("src/main.rs", 1, 0)], vec![]);
        assert!(result.file("src/main.rs").is_some());
        assert!(result.file("main.rs").is_none());
    }

    #[test]
    fn test_net_change_can_be_negative() {
        let stats = Stats {
            commits: 1,
            files_changed: 1,
            insertions: 2,
            deletions: 9,
        };
        assert_eq!(stats.net_change(), -7);
    }

    #[test]
    fn test_data_warning_display() {
        let warning = DataWarning::ChangeCountMismatch {
            file: "src/lib.rs".to_string(),
            changes: 5,
            expected: 4,
        };
        assert_eq!(
            warning.to_string(),
            "src/lib.rs: upstream reports 5 changes but insertions + deletions = 4"
        );
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = Stats {
            commits: 1,
            files_changed: 2,
            insertions: 3,
            deletions: 4,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["filesChanged"], 2);
    }
}
