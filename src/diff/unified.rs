//! Unified-diff assembly over a line edit script.

use std::fmt::Write as _;

use crate::diff::myers::EditOp;

/// A line of unified-diff output. Body lines borrow the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifiedLine<'a> {
    FromFile(String),
    ToFile(String),
    Hunk(String),
    Context(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

impl UnifiedLine<'_> {
    pub fn is_header(&self) -> bool {
        matches!(self, Self::FromFile(_) | Self::ToFile(_) | Self::Hunk(_))
    }
}

/// Builds `---`/`+++` headers and `@@` hunks with `context` lines around each
/// change. Changes separated by at most `2 * context` equal lines share a hunk.
pub fn unified_diff<'a>(
    old: &[&'a str],
    new: &[&'a str],
    ops: &[EditOp],
    from_file: &str,
    to_file: &str,
    context: usize,
) -> Vec<UnifiedLine<'a>> {
    let hunks = hunk_ranges(ops, context);
    if hunks.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        UnifiedLine::FromFile(from_file.to_string()),
        UnifiedLine::ToFile(to_file.to_string()),
    ];

    for (start, end) in hunks {
        let slice = &ops[start..end];
        let (old_start, old_len, new_start, new_len) = hunk_extent(slice, ops, start);
        lines.push(UnifiedLine::Hunk(format!(
            "@@ -{} +{} @@",
            format_range(old_start, old_len),
            format_range(new_start, new_len)
        )));
        for op in slice {
            lines.push(match *op {
                EditOp::Equal { old: o, .. } => UnifiedLine::Context(old[o]),
                EditOp::Delete { old: o } => UnifiedLine::Removed(old[o]),
                EditOp::Insert { new: n } => UnifiedLine::Added(new[n]),
            });
        }
    }
    lines
}

/// Renders the lines as the familiar text format.
pub fn render(lines: &[UnifiedLine<'_>]) -> String {
    let mut out = String::new();
    for line in lines {
        let _ = match line {
            UnifiedLine::FromFile(name) => writeln!(out, "--- {name}"),
            UnifiedLine::ToFile(name) => writeln!(out, "+++ {name}"),
            UnifiedLine::Hunk(header) => writeln!(out, "{header}"),
            UnifiedLine::Context(text) => write_body(&mut out, ' ', text),
            UnifiedLine::Removed(text) => write_body(&mut out, '-', text),
            UnifiedLine::Added(text) => write_body(&mut out, '+', text),
        };
    }
    out
}

fn write_body(out: &mut String, marker: char, text: &str) -> std::fmt::Result {
    out.push(marker);
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
    Ok(())
}

/// Index ranges into `ops` covering each hunk, context included.
fn hunk_ranges(ops: &[EditOp], context: usize) -> Vec<(usize, usize)> {
    let changed: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| !matches!(op, EditOp::Equal { .. }))
        .map(|(idx, _)| idx)
        .collect();

    let mut hunks: Vec<(usize, usize)> = Vec::new();
    let mut prev_change: Option<usize> = None;
    for idx in changed {
        let start = idx.saturating_sub(context);
        let end = (idx + 1 + context).min(ops.len());
        match (hunks.last_mut(), prev_change) {
            (Some(last), Some(prev)) if idx - prev - 1 <= 2 * context => last.1 = end,
            _ => hunks.push((start, end)),
        }
        prev_change = Some(idx);
    }
    hunks
}

/// Zero-based starts and lengths of a hunk on both sides.
fn hunk_extent(slice: &[EditOp], ops: &[EditOp], start: usize) -> (usize, usize, usize, usize) {
    let old_len = slice
        .iter()
        .filter(|op| !matches!(op, EditOp::Insert { .. }))
        .count();
    let new_len = slice
        .iter()
        .filter(|op| !matches!(op, EditOp::Delete { .. }))
        .count();
    let old_start = ops[..start]
        .iter()
        .filter(|op| !matches!(op, EditOp::Insert { .. }))
        .count();
    let new_start = ops[..start]
        .iter()
        .filter(|op| !matches!(op, EditOp::Delete { .. }))
        .count();
    (old_start, old_len, new_start, new_len)
}

fn format_range(start: usize, len: usize) -> String {
    match len {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{}", start + 1, len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::myers;

    fn lines(text: &str) -> Vec<&str> {
        text.split_inclusive('\n').collect()
    }

    #[test]
    fn renders_single_hunk_with_headers() {
        let old = lines("line1\nline2\n");
        let new = lines("line1\nline3\n");
        let ops = myers::diff(&old, &new);
        let out = unified_diff(&old, &new, &ops, "a.txt", "b.txt", 3);
        assert_eq!(
            render(&out),
            "--- a.txt\n+++ b.txt\n@@ -1,2 +1,2 @@\n line1\n-line2\n+line3\n"
        );
    }

    #[test]
    fn identical_inputs_produce_no_output() {
        let old = lines("a\nb\n");
        let ops = myers::diff(&old, &old);
        assert!(unified_diff(&old, &old, &ops, "a", "b", 3).is_empty());
    }

    #[test]
    fn distant_changes_split_into_separate_hunks() {
        let old_text: String = (1..=20).map(|i| format!("l{i}\n")).collect();
        let new_text = old_text.replace("l2\n", "x2\n").replace("l18\n", "x18\n");
        let old = lines(&old_text);
        let new = lines(&new_text);
        let ops = myers::diff(&old, &new);
        let out = unified_diff(&old, &new, &ops, "a", "b", 3);
        let hunks: Vec<&UnifiedLine<'_>> = out
            .iter()
            .filter(|line| matches!(line, UnifiedLine::Hunk(_)))
            .collect();
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0], &UnifiedLine::Hunk("@@ -1,5 +1,5 @@".to_string()));
        assert_eq!(hunks[1], &UnifiedLine::Hunk("@@ -15,6 +15,6 @@".to_string()));
    }

    #[test]
    fn pure_insertion_into_empty_old_side() {
        let old: Vec<&str> = Vec::new();
        let new = lines("only\n");
        let ops = myers::diff(&old, &new);
        let out = unified_diff(&old, &new, &ops, "a", "b", 3);
        assert_eq!(out[2], UnifiedLine::Hunk("@@ -0,0 +1 @@".to_string()));
        assert_eq!(out[3], UnifiedLine::Added("only\n"));
    }
}
