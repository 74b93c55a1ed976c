//! Side-by-side alignment of an edit script

use crate::edit::{AlignedRow, EditOp};

/// Group a flat edit script into two-pane rows.
///
/// A run of deletes is paired positionally with the run of inserts directly
/// after it. Inserts with no delete run in front get an empty left side.
pub fn align_diff_changes(edits: &[EditOp]) -> Vec<AlignedRow> {
    let mut rows = Vec::with_capacity(edits.len());
    let mut i = 0;

    while i < edits.len() {
        match &edits[i] {
            op @ EditOp::Keep { .. } => {
                rows.push(AlignedRow::kept(op));
                i += 1;
            }
            EditOp::Delete { .. } => {
                let delete_start = i;
                while i < edits.len() && matches!(edits[i], EditOp::Delete { .. }) {
                    i += 1;
                }
                let insert_start = i;
                while i < edits.len() && matches!(edits[i], EditOp::Insert { .. }) {
                    i += 1;
                }

                let deletes = &edits[delete_start..insert_start];
                let inserts = &edits[insert_start..i];
                for k in 0..deletes.len().max(inserts.len()) {
                    rows.push(AlignedRow::paired(deletes.get(k), inserts.get(k)));
                }
            }
            op @ EditOp::Insert { .. } => {
                rows.push(AlignedRow::paired(None, Some(op)));
                i += 1;
            }
        }
    }

    rows
}
