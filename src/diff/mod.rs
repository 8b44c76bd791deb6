//! Line-oriented document diff.
//!
//! The two texts are split into lines (terminators kept), diffed with
//! [`myers`], laid out as a unified diff with [`CONTEXT_LINES`] of context, and
//! the added/removed body lines become [`Change`]s. Lines that are blank once
//! trimmed never become changes.

pub mod myers;
pub mod unified;

use tracing::{debug, enabled, trace, Level};

use crate::core::config::DEFAULT_MAX_DIFF_LINES;
use crate::core::types::{Change, ChangeKind};
use crate::parser::types::NormalizedText;
use unified::UnifiedLine;

/// Upper bound on changes returned to callers.
pub const MAX_CHANGES: usize = 50;
pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub context: usize,
    /// Inputs with more lines than this on either side get the coarse diff.
    pub max_lines: usize,
    pub from_label: String,
    pub to_label: String,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context: CONTEXT_LINES,
            max_lines: DEFAULT_MAX_DIFF_LINES,
            from_label: "document1".to_string(),
            to_label: "document2".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    /// Every change, uncapped.
    pub changes: Vec<Change>,
    /// False when the size guard skipped the structural diff.
    pub precise: bool,
}

/// Changes between `a` and `b` with default options, uncapped.
pub fn diff(a: &NormalizedText, b: &NormalizedText) -> Vec<Change> {
    diff_with_options(a, b, &DiffOptions::default()).changes
}

pub fn diff_with_options(a: &NormalizedText, b: &NormalizedText, options: &DiffOptions) -> DiffReport {
    if a == b {
        return DiffReport {
            changes: Vec::new(),
            precise: true,
        };
    }

    let old = split_lines(a.as_str());
    let new = split_lines(b.as_str());

    if old.len() > options.max_lines || new.len() > options.max_lines {
        debug!(
            old_lines = old.len(),
            new_lines = new.len(),
            max_lines = options.max_lines,
            "inputs exceed diff size guard, using coarse diff"
        );
        return DiffReport {
            changes: coarse_changes(&old, &new),
            precise: false,
        };
    }

    let ops = myers::diff(&old, &new);
    let lines = unified::unified_diff(
        &old,
        &new,
        &ops,
        &options.from_label,
        &options.to_label,
        options.context,
    );
    let changes = changes_from_unified(&lines);
    if enabled!(Level::TRACE) {
        trace!(diff = %unified::render(&lines), "unified diff");
    }
    debug!(
        old_lines = old.len(),
        new_lines = new.len(),
        diff_lines = lines.len(),
        changes = changes.len(),
        "computed line diff"
    );
    DiffReport {
        changes,
        precise: true,
    }
}

/// Keeps the first [`MAX_CHANGES`] changes; the rest are dropped.
pub fn cap_changes(mut changes: Vec<Change>) -> Vec<Change> {
    changes.truncate(MAX_CHANGES);
    changes
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

fn changes_from_unified(lines: &[UnifiedLine<'_>]) -> Vec<Change> {
    lines
        .iter()
        .filter(|line| !line.is_header())
        .filter_map(|line| match line {
            UnifiedLine::Added(text) => Change::from_line(ChangeKind::Addition, text),
            UnifiedLine::Removed(text) => Change::from_line(ChangeKind::Removal, text),
            _ => None,
        })
        .collect()
}

/// Common prefix and suffix are matched; everything between is reported as
/// removed then added.
fn coarse_changes(old: &[&str], new: &[&str]) -> Vec<Change> {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let removed = old[prefix..old.len() - suffix]
        .iter()
        .filter_map(|line| Change::from_line(ChangeKind::Removal, line));
    let added = new[prefix..new.len() - suffix]
        .iter()
        .filter_map(|line| Change::from_line(ChangeKind::Addition, line));
    removed.chain(added).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(raw: &str) -> NormalizedText {
        NormalizedText::new(raw)
    }

    #[test]
    fn single_line_replacement() {
        let changes = diff(&text("line1\nline2\n"), &text("line1\nline3\n"));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind, ChangeKind::Removal);
        assert_eq!(changes[0].text, "line2");
        assert_eq!(changes[1].kind, ChangeKind::Addition);
        assert_eq!(changes[1].text, "line3");
    }

    #[test]
    fn same_text_has_no_changes() {
        let a = text("alpha\nbeta\ngamma");
        assert!(diff(&a, &a).is_empty());
    }

    #[test]
    fn whitespace_only_line_changes_are_dropped() {
        assert!(diff(&text("x\n"), &text("x \n")).is_empty());
        let changes = diff(&text("a\n\nb"), &text("a\n   \nb"));
        assert!(changes.is_empty());
    }

    #[test]
    fn changes_are_interleaved_in_positional_order() {
        let a = text("keep\nold-1\nkeep2\nkeep3\nkeep4\nkeep5\nkeep6\nkeep7\nkeep8\nold-2\nend");
        let b = text("keep\nnew-1\nkeep2\nkeep3\nkeep4\nkeep5\nkeep6\nkeep7\nkeep8\nnew-2\nend");
        let kinds: Vec<(ChangeKind, String)> = diff(&a, &b)
            .into_iter()
            .map(|c| (c.kind, c.text))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ChangeKind::Removal, "old-1".to_string()),
                (ChangeKind::Addition, "new-1".to_string()),
                (ChangeKind::Removal, "old-2".to_string()),
                (ChangeKind::Addition, "new-2".to_string()),
            ]
        );
    }

    #[test]
    fn content_that_looks_like_headers_is_kept() {
        let changes = diff(&text("a\n-- note\nb"), &text("a\n++ note\nb"));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].text, "-- note");
        assert_eq!(changes[1].text, "++ note");
    }

    #[test]
    fn cap_keeps_first_fifty() {
        let a = text(&(0..120).map(|i| format!("a{i}\n")).collect::<String>());
        let b = text(&(0..120).map(|i| format!("b{i}\n")).collect::<String>());
        let changes = diff(&a, &b);
        assert_eq!(changes.len(), 240);
        let capped = cap_changes(changes.clone());
        assert_eq!(capped.len(), MAX_CHANGES);
        assert_eq!(capped[..], changes[..MAX_CHANGES]);
    }

    #[test]
    fn diff_is_deterministic() {
        let a = text("one\ntwo\nthree\nfour\nfive");
        let b = text("zero\none\nthree\nfour\nsix\nfive");
        assert_eq!(diff(&a, &b), diff(&a, &b));
    }

    #[test]
    fn size_guard_switches_to_coarse_diff() {
        let a = text("head\nold a\nold b\ntail");
        let b = text("head\nnew a\ntail");
        let options = DiffOptions {
            max_lines: 2,
            ..DiffOptions::default()
        };
        let report = diff_with_options(&a, &b, &options);
        assert!(!report.precise);
        let texts: Vec<&str> = report.changes.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["old a", "old b", "new a"]);
    }

    #[test]
    fn size_guard_keeps_identical_inputs_identical() {
        let a = text("x\ny\nz");
        let options = DiffOptions {
            max_lines: 1,
            ..DiffOptions::default()
        };
        let report = diff_with_options(&a, &a.clone(), &options);
        assert!(report.changes.is_empty());
        assert!(report.precise);
    }
}
