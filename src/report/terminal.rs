use colored::{ColoredString, Colorize};

use crate::compare::types::{CommitDetail, ComparisonResult, Direction, FileChange, FileStatus};
use crate::patch::{FileDiff, LineKind};
use crate::store::Theme;

/// Colors for one theme. Dark terminals get the bright variants.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
}

impl Palette {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn added(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_green(),
            Theme::Light => s.green(),
        }
    }

    pub fn removed(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_red(),
            Theme::Light => s.red(),
        }
    }

    pub fn accent(&self, s: &str) -> ColoredString {
        match self.theme {
            Theme::Dark => s.bright_cyan().bold(),
            Theme::Light => s.blue().bold(),
        }
    }

    pub fn muted(&self, s: &str) -> ColoredString {
        s.dimmed()
    }

    pub fn warning(&self, s: &str) -> ColoredString {
        s.yellow().bold()
    }

    fn status(&self, status: FileStatus) -> ColoredString {
        let label = format!("{:<8}", status.to_string());
        match status {
            FileStatus::Added => self.added(&label),
            FileStatus::Removed => self.removed(&label),
            FileStatus::Modified => self.accent(&label),
            FileStatus::Renamed => self.warning(&label),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

fn file_line(palette: &Palette, file: &FileChange) -> String {
    format!(
        "  {} {}  {} {}",
        palette.status(file.status),
        file.file,
        palette.added(&format!("+{}", file.insertions)),
        palette.removed(&format!("-{}", file.deletions)),
    )
}

pub fn render_versions(palette: &Palette, repo: &str, versions: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({} tags)\n", palette.accent(repo), versions.len()));
    if versions.is_empty() {
        out.push_str("  No tags found.\n");
    }
    for version in versions {
        out.push_str(&format!("  {version}\n"));
    }
    out
}

/// Comparison summary with commit and file lists.
///
/// acme/widgets: v1.0.0 → v1.1.0
/// Commits: 3 | Files changed: 4 | +8 -3
///
/// ═══ Commits ═══
///   3f9a1c2 Add OAuth2 login flow (alice, 2024-03-02T09:15:00Z)
pub fn render_comparison(palette: &Palette, result: &ComparisonResult) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "{}/{}: {} → {}\n",
        result.repository.owner,
        result.repository.repo,
        palette.accent(&result.from_version),
        palette.accent(&result.to_version),
    ));
    match result.direction {
        Direction::AsRequested => {}
        Direction::Swapped => out.push_str(&format!(
            "{}\n",
            palette.muted("(no changes in the requested order; showing the reverse comparison)")
        )),
        Direction::NoDifferences => out.push_str(&format!(
            "{}\n",
            palette.warning("No differences found in either direction.")
        )),
    }
    out.push_str(&format!(
        "Commits: {} | Files changed: {} | {} {}\n\n",
        result.stats.commits,
        result.stats.files_changed,
        palette.added(&format!("+{}", result.stats.insertions)),
        palette.removed(&format!("-{}", result.stats.deletions)),
    ));

    out.push_str("═══ Commits ═══\n");
    if result.commits.is_empty() {
        out.push_str("  No commits.\n");
    }
    for commit in &result.commits {
        out.push_str(&format!(
            "  {} {} {}\n",
            palette.accent(&commit.hash),
            first_line(&commit.message),
            palette.muted(&format!("({}, {})", commit.author, commit.date)),
        ));
    }
    out.push('\n');

    out.push_str("═══ Files ═══\n");
    if result.files.is_empty() {
        out.push_str("  No files changed.\n");
    }
    for file in &result.files {
        out.push_str(&file_line(palette, file));
        out.push('\n');
    }

    if !result.warnings.is_empty() {
        out.push('\n');
        out.push_str("═══ Warnings ═══\n");
        for warning in &result.warnings {
            out.push_str(&format!("  {} {}\n", palette.warning("!"), warning));
        }
    }
    out
}

const OVERVIEW_LIMIT: usize = 5;

/// Short summary: totals with the net change, the most changed files and
/// the first commits.
pub fn render_overview(palette: &Palette, result: &ComparisonResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}/{}: {} → {}\n",
        result.repository.owner,
        result.repository.repo,
        palette.accent(&result.from_version),
        palette.accent(&result.to_version),
    ));
    let net = result.stats.net_change();
    let net = if net < 0 {
        palette.removed(&net.to_string())
    } else {
        palette.added(&format!("+{net}"))
    };
    out.push_str(&format!(
        "Commits: {} | Files changed: {} | Net change: {}\n\n",
        result.stats.commits, result.stats.files_changed, net
    ));

    out.push_str(&format!("═══ Most changed files (top {OVERVIEW_LIMIT}) ═══\n"));
    let top = result.top_files(OVERVIEW_LIMIT);
    if top.is_empty() {
        out.push_str("  No files changed.\n");
    }
    for file in top {
        out.push_str(&file_line(palette, file));
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&format!("═══ Recent commits (latest {OVERVIEW_LIMIT}) ═══\n"));
    let recent = result.recent_commits(OVERVIEW_LIMIT);
    if recent.is_empty() {
        out.push_str("  No commits.\n");
    }
    for commit in recent {
        out.push_str(&format!(
            "  {} {} {}\n",
            palette.accent(&commit.hash),
            first_line(&commit.message),
            palette.muted(&format!("by {}", commit.author)),
        ));
    }
    out
}

/// One file's patch, line by line, with rendered line numbers.
pub fn render_file_diff(palette: &Palette, diff: &FileDiff) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}  {} {}\n",
        palette.accent(&diff.file),
        palette.added(&format!("+{}", diff.stats.additions)),
        palette.removed(&format!("-{}", diff.stats.deletions)),
    ));
    if diff.lines.is_empty() {
        out.push_str(&format!("{}\n", palette.muted("No textual changes (binary or empty patch).")));
        return out;
    }
    for line in &diff.lines {
        let number = palette.muted(&format!("{:>5}", line.line_number));
        let text = match line.kind {
            LineKind::Added => palette.added(&format!("+ {}", line.content)),
            LineKind::Removed => palette.removed(&format!("- {}", line.content)),
            LineKind::Context => format!("  {}", line.content).as_str().normal(),
        };
        out.push_str(&format!("{number} {text}\n"));
    }
    out
}

pub fn render_commit_detail(
    palette: &Palette,
    detail: &CommitDetail,
    error: Option<&str>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        palette.accent(&detail.hash),
        first_line(&detail.message)
    ));
    out.push_str(&format!("Author: {} | Date: {}\n", detail.author, detail.date));
    if let Some(error) = error {
        out.push_str(&format!("{} {}\n", palette.warning("Could not load commit details:"), error));
    }
    let body: Vec<&str> = detail.message.lines().skip(1).collect();
    if body.iter().any(|l| !l.trim().is_empty()) {
        out.push('\n');
        for line in body {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out.push('\n');
    out.push_str(&format!("═══ Files ({}) ═══\n", detail.files.len()));
    for file in &detail.files {
        out.push_str(&file_line(palette, file));
        out.push('\n');
    }
    out
}
