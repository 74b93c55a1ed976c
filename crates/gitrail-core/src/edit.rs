//! Edit script and side-by-side row types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of an edit, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Keep,
    Insert,
    Delete,
}

/// A single classified line in an edit script.
///
/// Line numbers are 1-based. `Keep` carries both, `Insert` only the
/// modified side and `Delete` only the original side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EditOp {
    Keep {
        content: String,
        #[serde(rename = "originalLine")]
        original_line: usize,
        #[serde(rename = "modifiedLine")]
        modified_line: usize,
    },
    Insert {
        content: String,
        #[serde(rename = "modifiedLine")]
        modified_line: usize,
    },
    Delete {
        content: String,
        #[serde(rename = "originalLine")]
        original_line: usize,
    },
}

impl EditOp {
    pub fn keep(content: impl Into<String>, original_line: usize, modified_line: usize) -> Self {
        EditOp::Keep {
            content: content.into(),
            original_line,
            modified_line,
        }
    }

    pub fn insert(content: impl Into<String>, modified_line: usize) -> Self {
        EditOp::Insert {
            content: content.into(),
            modified_line,
        }
    }

    pub fn delete(content: impl Into<String>, original_line: usize) -> Self {
        EditOp::Delete {
            content: content.into(),
            original_line,
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            EditOp::Keep { .. } => EditKind::Keep,
            EditOp::Insert { .. } => EditKind::Insert,
            EditOp::Delete { .. } => EditKind::Delete,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            EditOp::Keep { content, .. }
            | EditOp::Insert { content, .. }
            | EditOp::Delete { content, .. } => content,
        }
    }

    /// Line number in the original text, absent for inserts
    pub fn original_line(&self) -> Option<usize> {
        match self {
            EditOp::Keep { original_line, .. } | EditOp::Delete { original_line, .. } => {
                Some(*original_line)
            }
            EditOp::Insert { .. } => None,
        }
    }

    /// Line number in the modified text, absent for deletes
    pub fn modified_line(&self) -> Option<usize> {
        match self {
            EditOp::Keep { modified_line, .. } | EditOp::Insert { modified_line, .. } => {
                Some(*modified_line)
            }
            EditOp::Delete { .. } => None,
        }
    }

    /// True for inserts and deletes
    pub fn is_change(&self) -> bool {
        !matches!(self, EditOp::Keep { .. })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlignedRowError {
    #[error("Row has neither a left nor a right side")]
    Empty,
    #[error("Kept line must appear unchanged on both sides")]
    UnevenKeep,
    #[error("{0:?} line on the wrong side of the row")]
    WrongSide(EditKind),
}

/// Wire form of `AlignedRow`, checked before it becomes one
#[derive(Deserialize)]
struct RawAlignedRow {
    left: Option<EditOp>,
    right: Option<EditOp>,
}

impl TryFrom<RawAlignedRow> for AlignedRow {
    type Error = AlignedRowError;

    fn try_from(raw: RawAlignedRow) -> Result<Self, Self::Error> {
        match (&raw.left, &raw.right) {
            (None, None) => return Err(AlignedRowError::Empty),
            (Some(left @ EditOp::Keep { .. }), right)
            | (right, Some(left @ EditOp::Keep { .. })) => {
                if right.as_ref() != Some(left) {
                    return Err(AlignedRowError::UnevenKeep);
                }
            }
            (left, right) => {
                if let Some(op @ EditOp::Insert { .. }) = left {
                    return Err(AlignedRowError::WrongSide(op.kind()));
                }
                if let Some(op @ EditOp::Delete { .. }) = right {
                    return Err(AlignedRowError::WrongSide(op.kind()));
                }
            }
        }
        Ok(Self {
            left: raw.left,
            right: raw.right,
        })
    }
}

/// One row of a two-pane diff view.
///
/// At least one side is always present. A kept line appears on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAlignedRow")]
pub struct AlignedRow {
    left: Option<EditOp>,
    right: Option<EditOp>,
}

impl AlignedRow {
    pub(crate) fn kept(op: &EditOp) -> Self {
        Self {
            left: Some(op.clone()),
            right: Some(op.clone()),
        }
    }

    /// Pair a deleted line with an inserted one. Callers never pass two `None`s.
    pub(crate) fn paired(left: Option<&EditOp>, right: Option<&EditOp>) -> Self {
        debug_assert!(left.is_some() || right.is_some());
        Self {
            left: left.cloned(),
            right: right.cloned(),
        }
    }

    pub fn left(&self) -> Option<&EditOp> {
        self.left.as_ref()
    }

    pub fn right(&self) -> Option<&EditOp> {
        self.right.as_ref()
    }

    pub fn is_keep(&self) -> bool {
        matches!(self.left, Some(EditOp::Keep { .. }))
    }

    /// A deleted line shown next to the line that replaced it
    pub fn is_change_pair(&self) -> bool {
        matches!(
            (&self.left, &self.right),
            (Some(EditOp::Delete { .. }), Some(EditOp::Insert { .. }))
        )
    }
}
