//! Gitrail Core - line diffs and commit graph layout
//!
//! This library computes edit scripts between two texts, aligns them for
//! side-by-side display, and assigns lanes to commits so a history graph
//! can be drawn without overlapping rails.

pub mod align;
pub mod config;
pub mod diff;
pub mod edit;
pub mod graph;

pub use align::align_diff_changes;
pub use config::{Config, ConfigError, DiffConfig, LayoutConfig};
pub use diff::{compute_diff, split_lines, DiffAlgorithm, DiffEngine, DiffResult, Hunk};
pub use edit::{AlignedRow, AlignedRowError, EditKind, EditOp};
pub use graph::{
    commits_from_json, layout_graph, layout_graph_with, CommitRecord, EdgePath, EdgeShape,
    GraphError, GraphLayout, GraphRow, NodePosition, Point, RailSegment,
};
