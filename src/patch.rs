use serde::Serialize;

/// Classification of a single rendered patch line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Added,
    Removed,
    Context,
}

/// One renderable line of a file's patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: LineKind,
    /// Line text with the leading `+`/`-` removed (context lines verbatim)
    pub content: String,
    /// 1-based position in the rendered output, not the source line number
    pub line_number: usize,
}

/// Added/removed line counts for one parsed patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PatchStats {
    pub additions: usize,
    pub deletions: usize,
}

/// The parsed view of one file's changes.
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    pub file: String,
    pub lines: Vec<DiffLine>,
    pub stats: PatchStats,
}

impl FileDiff {
    pub fn from_patch(file: impl Into<String>, patch: &str) -> Self {
        let lines = parse_patch(patch);
        let stats = PatchStats {
            additions: lines.iter().filter(|l| l.kind == LineKind::Added).count(),
            deletions: lines.iter().filter(|l| l.kind == LineKind::Removed).count(),
        };
        Self {
            file: file.into(),
            lines,
            stats,
        }
    }
}

/// Turn one file's unified-diff patch into a sequence of typed lines.
///
/// File headers (`+++`, `---`) and hunk headers (`@@`) are dropped, so the
/// resulting line numbers are a plain 1-based renumbering of what survives.
/// Never fails: empty or malformed input just yields fewer lines.
pub fn parse_patch(patch: &str) -> Vec<DiffLine> {
    if patch.is_empty() {
        return Vec::new();
    }

    patch
        .split('\n')
        .filter(|line| !is_header(line))
        .enumerate()
        .map(|(index, line)| {
            let (kind, content) = if let Some(rest) = line.strip_prefix('+') {
                (LineKind::Added, rest)
            } else if let Some(rest) = line.strip_prefix('-') {
                (LineKind::Removed, rest)
            } else {
                (LineKind::Context, line)
            };
            DiffLine {
                kind,
                content: content.to_string(),
                line_number: index + 1,
            }
        })
        .collect()
}

fn is_header(line: &str) -> bool {
    line.starts_with("+++") || line.starts_with("---") || line.starts_with("@@")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PATCH: &str = "@@ -1,5 +1,6 @@\n fn main() {\n-    println!(\"old\");\n+    println!(\"new\");\n+    // Added a comment\n }\n@@ -40,2 +41,2 @@\n-let a = 1;\n+let a = 2;";

    #[test]
    fn test_parse_classifies_lines() {
        let lines = parse_patch(SAMPLE_PATCH);
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Context,
                LineKind::Removed,
                LineKind::Added,
                LineKind::Added,
                LineKind::Context,
                LineKind::Removed,
                LineKind::Added,
            ]
        );
    }

    #[test]
    fn test_strips_exactly_one_prefix_char() {
        let lines = parse_patch("+    let x = 1;\n-- double dash\n++ double plus");
        // `++ double plus` is not a `+++` header, so it stays an addition
        assert_eq!(lines[0].content, "    let x = 1;");
        assert_eq!(lines[1].kind, LineKind::Removed);
        assert_eq!(lines[1].content, "- double dash");
        assert_eq!(lines[2].kind, LineKind::Added);
        assert_eq!(lines[2].content, "+ double plus");
    }

    #[test]
    fn test_context_lines_kept_verbatim() {
        let lines = parse_patch(" fn main() {\nno prefix at all\n\\ No newline at end of file");
        assert!(lines.iter().all(|l| l.kind == LineKind::Context));
        assert_eq!(lines[0].content, " fn main() {");
        assert_eq!(lines[1].content, "no prefix at all");
        assert_eq!(lines[2].content, "\\ No newline at end of file");
    }

    #[test]
    fn test_headers_are_discarded() {
        let patch = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1 +1 @@\n-old\n+new";
        let lines = parse_patch(patch);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].content, "old");
        assert_eq!(lines[1].content, "new");
    }

    #[test]
    fn test_line_numbers_ignore_hunk_positions() {
        let lines = parse_patch(SAMPLE_PATCH);
        let numbers: Vec<usize> = lines.iter().map(|l| l.line_number).collect();
        assert_eq!(numbers, (1..=lines.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_output_length_matches_surviving_lines() {
        let input_lines = SAMPLE_PATCH.split('\n').count();
        let headers = SAMPLE_PATCH.split('\n').filter(|l| l.starts_with("@@")).count();
        let lines = parse_patch(SAMPLE_PATCH);
        assert_eq!(lines.len(), input_lines - headers);

        let added = lines.iter().filter(|l| l.kind == LineKind::Added).count();
        let removed = lines.iter().filter(|l| l.kind == LineKind::Removed).count();
        let context = lines.iter().filter(|l| l.kind == LineKind::Context).count();
        assert_eq!(added + removed + context, lines.len());
    }

    #[test]
    fn test_empty_patch() {
        assert!(parse_patch("").is_empty());
    }

    #[test]
    fn test_trailing_newline_yields_empty_context_line() {
        let lines = parse_patch("+added\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].kind, LineKind::Context);
        assert_eq!(lines[1].content, "");
    }

    #[test]
    fn test_file_diff_counts() {
        let diff = FileDiff::from_patch("src/main.rs", SAMPLE_PATCH);
        assert_eq!(diff.file, "src/main.rs");
        assert_eq!(diff.stats.additions, 3);
        assert_eq!(diff.stats.deletions, 2);
    }

    #[test]
    fn test_serializes_type_field() {
        let lines = parse_patch("+x");
        let json = serde_json::to_value(&lines[0]).unwrap();
        assert_eq!(json["type"], "added");
        assert_eq!(json["lineNumber"], 1);
    }
}
