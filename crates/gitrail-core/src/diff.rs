//! Line diff engine

use crate::align::align_diff_changes;
use crate::config::DiffConfig;
use crate::edit::{AlignedRow, EditOp};
use imara_diff::{Algorithm, Diff, InternedInput};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Default number of unchanged lines that may separate two changes in one hunk
pub const DEFAULT_HUNK_CONTEXT: usize = 3;

/// Which algorithm computes the edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Full longest-common-subsequence table. O(N*M) time and space.
    #[default]
    Lcs,
    /// Histogram diff for large inputs. Same ordering convention, different tie-breaks.
    Histogram,
}

/// Split text into lines, accepting both LF and CRLF endings.
///
/// Empty text has no lines and a trailing newline does not start a new one.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Classify every line of `original` and `modified` as kept, inserted or deleted.
///
/// Walks the LCS table back from the end. When both directions are equally
/// good the insert is taken first, so in the final script a changed block
/// lists its deletes before its inserts.
pub fn compute_diff<S: AsRef<str>>(original: &[S], modified: &[S]) -> Vec<EditOp> {
    let n = original.len();
    let m = modified.len();
    let width = m + 1;

    let mut table = vec![0usize; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if original[i - 1].as_ref() == modified[j - 1].as_ref() {
                table[(i - 1) * width + (j - 1)] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + (j - 1)])
            };
        }
    }

    let common = table[n * width + m];
    let mut ops = Vec::with_capacity(n + m - common);
    let (mut i, mut j) = (n, m);

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && original[i - 1].as_ref() == modified[j - 1].as_ref() {
            ops.push(EditOp::keep(original[i - 1].as_ref(), i, j));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i * width + (j - 1)] >= table[(i - 1) * width + j]) {
            ops.push(EditOp::insert(modified[j - 1].as_ref(), j));
            j -= 1;
        } else {
            ops.push(EditOp::delete(original[i - 1].as_ref(), i));
            i -= 1;
        }
    }

    ops.reverse();
    ops
}

/// Histogram diff via imara-diff. Returns `None` when a line holds an embedded
/// newline, since the tokenizer would split it into several tokens.
fn histogram_diff<S: AsRef<str>>(original: &[S], modified: &[S]) -> Option<Vec<EditOp>> {
    let has_newline = |lines: &[S]| lines.iter().any(|l| l.as_ref().contains('\n'));
    if has_newline(original) || has_newline(modified) {
        return None;
    }

    let join = |lines: &[S]| {
        let mut text = String::with_capacity(lines.iter().map(|l| l.as_ref().len() + 1).sum());
        for l in lines {
            text.push_str(l.as_ref());
            text.push('\n');
        }
        text
    };
    let before = join(original);
    let after = join(modified);

    let input = InternedInput::new(before.as_str(), after.as_str());
    let diff = Diff::compute(Algorithm::Histogram, &input);

    let mut ops = Vec::with_capacity(original.len().max(modified.len()));
    let (mut i, mut j) = (0usize, 0usize);
    let keep_until = |ops: &mut Vec<EditOp>, i: &mut usize, j: &mut usize, end: usize| {
        while *i < end {
            ops.push(EditOp::keep(original[*i].as_ref(), *i + 1, *j + 1));
            *i += 1;
            *j += 1;
        }
    };

    for hunk in diff.hunks() {
        let removed = hunk.before.start as usize..hunk.before.end as usize;
        let added = hunk.after.start as usize..hunk.after.end as usize;

        keep_until(&mut ops, &mut i, &mut j, removed.start);
        for k in removed.clone() {
            ops.push(EditOp::delete(original[k].as_ref(), k + 1));
        }
        for k in added.clone() {
            ops.push(EditOp::insert(modified[k].as_ref(), k + 1));
        }
        i = removed.end;
        j = added.end;
    }
    keep_until(&mut ops, &mut i, &mut j, original.len());

    Some(ops)
}

/// A group of nearby changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub id: usize,
    /// Indices into `DiffResult::ops`, first change through last change
    pub ops: Range<usize>,
    /// 1-based, half-open line range in the original text
    pub original: Range<usize>,
    /// 1-based, half-open line range in the modified text
    pub modified: Range<usize>,
    pub insertions: usize,
    pub deletions: usize,
}

impl Hunk {
    fn starting_at(id: usize, op: usize, original: usize, modified: usize) -> Self {
        Self {
            id,
            ops: op..op,
            original: original..original,
            modified: modified..modified,
            insertions: 0,
            deletions: 0,
        }
    }
}

fn group_hunks(ops: &[EditOp], context: usize) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    let mut gap = 0usize;
    let (mut original, mut modified) = (1usize, 1usize);

    for (idx, op) in ops.iter().enumerate() {
        if !op.is_change() {
            original += 1;
            modified += 1;
            gap += 1;
            continue;
        }

        if current.is_none() || gap > context {
            if let Some(done) = current.take() {
                hunks.push(done);
            }
            current = Some(Hunk::starting_at(hunks.len(), idx, original, modified));
        }
        gap = 0;

        match op {
            EditOp::Insert { .. } => modified += 1,
            EditOp::Delete { .. } => original += 1,
            EditOp::Keep { .. } => {}
        }

        if let Some(hunk) = current.as_mut() {
            hunk.ops.end = idx + 1;
            hunk.original.end = original;
            hunk.modified.end = modified;
            match op {
                EditOp::Insert { .. } => hunk.insertions += 1,
                EditOp::Delete { .. } => hunk.deletions += 1,
                EditOp::Keep { .. } => {}
            }
        }
    }

    hunks.extend(current);
    hunks
}

/// The outcome of diffing two texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub ops: Vec<EditOp>,
    /// The algorithm that produced `ops`
    pub algorithm: DiffAlgorithm,
    pub insertions: usize,
    pub deletions: usize,
    pub hunks: Vec<Hunk>,
}

impl DiffResult {
    fn from_ops(ops: Vec<EditOp>, algorithm: DiffAlgorithm, context: usize) -> Self {
        let insertions = ops
            .iter()
            .filter(|op| matches!(op, EditOp::Insert { .. }))
            .count();
        let deletions = ops
            .iter()
            .filter(|op| matches!(op, EditOp::Delete { .. }))
            .count();
        let hunks = group_hunks(&ops, context);
        Self {
            ops,
            algorithm,
            insertions,
            deletions,
            hunks,
        }
    }

    /// Rows for a two-pane view
    pub fn aligned(&self) -> Vec<AlignedRow> {
        align_diff_changes(&self.ops)
    }

    pub fn is_identical(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }

    /// The hunk whose op range covers `index`
    pub fn hunk_for_op(&self, index: usize) -> Option<&Hunk> {
        self.hunks.iter().find(|h| h.ops.contains(&index))
    }
}

/// Configurable diff entry point
#[derive(Debug, Clone)]
pub struct DiffEngine {
    algorithm: DiffAlgorithm,
    lcs_cell_limit: Option<usize>,
    context: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            algorithm: DiffAlgorithm::Lcs,
            lcs_cell_limit: None,
            context: DEFAULT_HUNK_CONTEXT,
        }
    }

    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            algorithm: config.algorithm,
            lcs_cell_limit: config.lcs_cell_limit,
            context: config.context,
        }
    }

    pub fn with_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Switch to histogram diff once the LCS table would exceed `limit` cells
    pub fn with_lcs_cell_limit(mut self, limit: Option<usize>) -> Self {
        self.lcs_cell_limit = limit;
        self
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    /// The algorithm that will run for inputs of this size
    pub fn algorithm_for(&self, original_len: usize, modified_len: usize) -> DiffAlgorithm {
        match (self.algorithm, self.lcs_cell_limit) {
            (DiffAlgorithm::Lcs, Some(limit)) => {
                let cells = (original_len + 1).saturating_mul(modified_len + 1);
                if cells > limit {
                    DiffAlgorithm::Histogram
                } else {
                    DiffAlgorithm::Lcs
                }
            }
            (algorithm, _) => algorithm,
        }
    }

    pub fn diff_strings(&self, old: &str, new: &str) -> DiffResult {
        self.diff_lines(&split_lines(old), &split_lines(new))
    }

    pub fn diff_lines<S: AsRef<str>>(&self, original: &[S], modified: &[S]) -> DiffResult {
        let algorithm = self.algorithm_for(original.len(), modified.len());
        debug!(
            original = original.len(),
            modified = modified.len(),
            ?algorithm,
            "computing line diff"
        );

        let (ops, algorithm) = match algorithm {
            DiffAlgorithm::Lcs => (compute_diff(original, modified), DiffAlgorithm::Lcs),
            DiffAlgorithm::Histogram => match histogram_diff(original, modified) {
                Some(ops) => (ops, DiffAlgorithm::Histogram),
                None => {
                    debug!("embedded newline in input, falling back to lcs");
                    (compute_diff(original, modified), DiffAlgorithm::Lcs)
                }
            },
        };

        DiffResult::from_ops(ops, algorithm, self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditKind;

    fn kinds(ops: &[EditOp]) -> Vec<EditKind> {
        ops.iter().map(EditOp::kind).collect()
    }

    #[test]
    fn test_single_replacement() {
        let ops = compute_diff(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(
            ops,
            vec![
                EditOp::keep("a", 1, 1),
                EditOp::delete("b", 2),
                EditOp::insert("x", 2),
                EditOp::keep("c", 3, 3),
            ]
        );
    }

    #[test]
    fn test_identical_input_is_all_keep() {
        let lines = ["fn main() {", "    run();", "}"];
        let ops = compute_diff(&lines, &lines);
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().all(|op| op.kind() == EditKind::Keep));
        assert_eq!(ops[2].original_line(), Some(3));
        assert_eq!(ops[2].modified_line(), Some(3));
    }

    #[test]
    fn test_empty_sides() {
        let ops = compute_diff(&[], &["x", "y"]);
        assert_eq!(ops, vec![EditOp::insert("x", 1), EditOp::insert("y", 2)]);

        let ops = compute_diff(&["x", "y"], &[]);
        assert_eq!(ops, vec![EditOp::delete("x", 1), EditOp::delete("y", 2)]);

        let empty: [&str; 0] = [];
        assert!(compute_diff(&empty, &empty).is_empty());
    }

    #[test]
    fn test_tie_prefers_insert_while_backtracking() {
        // Swapped lines: either could be kept, the backtrack keeps "b".
        let ops = compute_diff(&["a", "b"], &["b", "a"]);
        assert_eq!(
            ops,
            vec![
                EditOp::delete("a", 1),
                EditOp::keep("b", 2, 1),
                EditOp::insert("a", 2),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_significant() {
        let ops = compute_diff(&["a "], &["a"]);
        assert_eq!(kinds(&ops), vec![EditKind::Delete, EditKind::Insert]);
    }

    #[test]
    fn test_split_lines_normalizes_crlf() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn test_diff_strings_counts() {
        let engine = DiffEngine::new();
        let diff = engine.diff_strings("foo\nbar\nbaz", "foo\nqux\nbaz\nend\n");
        assert_eq!(diff.insertions, 2);
        assert_eq!(diff.deletions, 1);
        assert!(!diff.is_identical());

        let same = engine.diff_strings("a\r\nb", "a\nb\n");
        assert!(same.is_identical());
        assert!(same.hunks.is_empty());
    }

    #[test]
    fn test_hunks_split_on_distant_changes() {
        let old = "a\nb\nc\nd\ne\nf\ng\nh\ni\nj\nk\nl";
        let new = "a\nB\nc\nd\ne\nf\ng\nh\ni\nj\nK\nl";

        let diff = DiffEngine::new().diff_strings(old, new);
        assert_eq!(diff.hunks.len(), 2);

        let first = &diff.hunks[0];
        assert_eq!(first.id, 0);
        assert_eq!(first.original, 2..3);
        assert_eq!(first.modified, 2..3);
        assert_eq!((first.insertions, first.deletions), (1, 1));

        let second = &diff.hunks[1];
        assert_eq!(second.id, 1);
        assert_eq!(second.original, 11..12);
        assert_eq!(diff.hunk_for_op(second.ops.start).map(|h| h.id), Some(1));
    }

    #[test]
    fn test_hunks_merge_within_context() {
        let old = "a\nb\nc\nd\ne";
        let new = "A\nb\nc\nd\nE";

        let diff = DiffEngine::new().diff_strings(old, new);
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].original, 1..6);
        assert_eq!(diff.hunks[0].ops, 0..diff.ops.len());

        let tight = DiffEngine::new().with_context(2).diff_strings(old, new);
        assert_eq!(tight.hunks.len(), 2);
    }

    #[test]
    fn test_pure_insert_hunk_has_empty_original_range() {
        let diff = DiffEngine::new().diff_strings("a\nb", "a\nnew\nb");
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].original, 2..2);
        assert_eq!(diff.hunks[0].modified, 2..3);
    }

    #[test]
    fn test_histogram_matches_lcs_on_simple_edit() {
        let old = ["a", "b", "c"];
        let new = ["a", "x", "c"];
        let lcs = DiffEngine::new().diff_lines(&old, &new);
        let hist = DiffEngine::new()
            .with_algorithm(DiffAlgorithm::Histogram)
            .diff_lines(&old, &new);
        assert_eq!(lcs.ops, hist.ops);
    }

    #[test]
    fn test_histogram_reconstructs_both_sides() {
        let old = ["use a;", "", "fn f() {", "    1", "}", "", "fn g() {}"];
        let new = ["use a;", "use b;", "", "fn f() {", "    2", "}", "fn h() {}"];
        let diff = DiffEngine::new()
            .with_algorithm(DiffAlgorithm::Histogram)
            .diff_lines(&old, &new);

        let left: Vec<&str> = diff
            .ops
            .iter()
            .filter(|op| op.kind() != EditKind::Insert)
            .map(EditOp::content)
            .collect();
        let right: Vec<&str> = diff
            .ops
            .iter()
            .filter(|op| op.kind() != EditKind::Delete)
            .map(EditOp::content)
            .collect();
        assert_eq!(left, old);
        assert_eq!(right, new);
    }

    #[test]
    fn test_histogram_falls_back_on_embedded_newline() {
        let old = ["a\nb"];
        let new = ["a\nb", "c"];
        let diff = DiffEngine::new()
            .with_algorithm(DiffAlgorithm::Histogram)
            .diff_lines(&old, &new);
        assert_eq!(kinds(&diff.ops), vec![EditKind::Keep, EditKind::Insert]);
        assert_eq!(diff.algorithm, DiffAlgorithm::Lcs);
    }

    #[test]
    fn test_cell_limit_selects_histogram() {
        let engine = DiffEngine::new().with_lcs_cell_limit(Some(100));
        assert_eq!(engine.algorithm_for(5, 5), DiffAlgorithm::Lcs);
        assert_eq!(engine.algorithm_for(20, 20), DiffAlgorithm::Histogram);
        assert_eq!(DiffEngine::new().algorithm_for(10_000, 10_000), DiffAlgorithm::Lcs);
    }

    #[test]
    fn test_cell_limit_runs_histogram_diff() {
        let old: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        let mut new = old.clone();
        new[4] = "changed".to_string();
        new.push("tail".to_string());

        let engine = DiffEngine::new().with_lcs_cell_limit(Some(100));
        let diff = engine.diff_lines(&old, &new);
        assert_eq!(diff.algorithm, DiffAlgorithm::Histogram);
        assert_eq!((diff.insertions, diff.deletions), (2, 1));
        assert_eq!(diff.ops[4], EditOp::delete("line 4", 5));
        assert_eq!(diff.ops[5], EditOp::insert("changed", 5));

        let small = engine.diff_lines(&old[..3], &new[..3]);
        assert_eq!(small.algorithm, DiffAlgorithm::Lcs);
        assert!(small.is_identical());
    }
}
