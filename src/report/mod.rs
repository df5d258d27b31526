pub mod terminal;

pub use terminal::Palette;

use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::compare::ComparisonResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and how a comparison is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

/// Output the comparison to the terminal (default), as JSON on stdout, or
/// as a markdown file when `output_path` is set.
#[instrument(skip(result, palette), fields(from = %result.from_version, to = %result.to_version))]
pub fn output(
    result: &ComparisonResult,
    format: OutputFormat,
    output_path: Option<&Path>,
    palette: &Palette,
) -> Result<(), ReportError> {
    match (output_path, format) {
        (Some(path), _) => {
            debug!(path = %path.display(), "writing markdown report");
            write_markdown_report(result, path)
        }
        (None, OutputFormat::Json) => {
            debug!("writing JSON to stdout");
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        (None, OutputFormat::Terminal) => {
            debug!("writing report to terminal");
            print!("{}", terminal::render_comparison(palette, result));
            Ok(())
        }
    }
}

/// Markdown form of a comparison:
/// # acme/widgets: v1.0.0...v1.1.0
/// **Commits:** 3 | **Files changed:** 4 | **+8 -3**
///
/// ## Commits
/// | Hash | Message | Author | Date |
///
/// ## Files
/// followed by one fenced `diff` block per file that has a patch.
pub fn render_markdown(result: &ComparisonResult) -> String {
    let mut md = String::new();
    md.push_str(&format!(
        "# {}/{}: {}...{}\n\n",
        result.repository.owner, result.repository.repo, result.from_version, result.to_version
    ));
    md.push_str(&format!(
        "**Commits:** {} | **Files changed:** {} | **+{} -{}**\n\n",
        result.stats.commits,
        result.stats.files_changed,
        result.stats.insertions,
        result.stats.deletions
    ));

    md.push_str("## Commits\n\n");
    if result.commits.is_empty() {
        md.push_str("No commits.\n\n");
    } else {
        md.push_str("| Hash | Message | Author | Date |\n|---|---|---|---|\n");
        for commit in &result.commits {
            let subject = commit.message.lines().next().unwrap_or_default();
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                commit.hash,
                escape_cell(subject),
                escape_cell(&commit.author),
                commit.date
            ));
        }
        md.push('\n');
    }

    md.push_str("## Files\n\n");
    if result.files.is_empty() {
        md.push_str("No files changed.\n");
    } else {
        md.push_str("| File | Status | + | - |\n|---|---|---|---|\n");
        for file in &result.files {
            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                file.file, file.status, file.insertions, file.deletions
            ));
        }
        md.push('\n');

        for (file, patch) in result
            .files
            .iter()
            .filter_map(|f| f.patch.as_deref().map(|p| (f, p)))
        {
            let fence = code_fence(patch);
            md.push_str(&format!("### {}\n\n{fence}diff\n{patch}\n{fence}\n\n", file.file));
        }
    }

    if !result.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for warning in &result.warnings {
            md.push_str(&format!("- {warning}\n"));
        }
    }
    md
}

/// A backtick fence longer than any backtick run inside `text`.
fn code_fence(text: &str) -> String {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn write_markdown_report(result: &ComparisonResult, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(result))?;
    Ok(())
}
