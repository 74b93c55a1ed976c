//! Commit graph lane layout
//!
//! Commits are laid out newest first, one per row. Each commit gets a lane
//! (a horizontal track). A first parent inherits its child's lane so the
//! mainline stays straight, while merge parents fan out into fresh lanes.
//! Rails are the vertical lines drawn through a row for lanes whose commit
//! has not been reached yet.

use crate::config::LayoutConfig;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid commit list: {0}")]
    Json(#[from] serde_json::Error),
}

/// A commit as delivered by the history provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRecord {
    pub id: String,
    /// First entry is the mainline parent, the rest are merge parents
    #[serde(default)]
    pub parent_ids: Vec<String>,
    pub timestamp: i64,
}

impl CommitRecord {
    pub fn new<I, P>(id: impl Into<String>, parent_ids: I, timestamp: i64) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            id: id.into(),
            parent_ids: parent_ids.into_iter().map(Into::into).collect(),
            timestamp,
        }
    }
}

/// Parse the JSON array of commits a history provider emits
pub fn commits_from_json(json: &str) -> Result<Vec<CommitRecord>, GraphError> {
    Ok(serde_json::from_str(json)?)
}

/// A vertical line passing through a row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RailSegment {
    pub lane: usize,
    pub color: usize,
    /// Midpoint of the previous row
    pub from_y: f64,
    /// Midpoint of this row
    pub to_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRow {
    pub commit: CommitRecord,
    pub lane: usize,
    pub x: f64,
    pub y: f64,
    /// Palette index
    pub color: usize,
    pub vertical_rails: Vec<RailSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    pub color: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeShape {
    /// Child and parent share a column
    Straight,
    /// Cubic connector, vertical at both ends
    Curve { c1: Point, c2: Point },
}

/// Connector from a child node down to one of its parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePath {
    pub child: String,
    pub parent: String,
    pub from: Point,
    pub to: Point,
    pub shape: EdgeShape,
    pub color: usize,
    pub is_merge: bool,
}

impl EdgePath {
    fn between(
        child: &str,
        parent: &str,
        from: Point,
        to: Point,
        color: usize,
        is_merge: bool,
    ) -> Self {
        let shape = if from.x == to.x {
            EdgeShape::Straight
        } else {
            let mid = (from.y + to.y) / 2.0;
            EdgeShape::Curve {
                c1: Point { x: from.x, y: mid },
                c2: Point { x: to.x, y: mid },
            }
        };
        Self {
            child: child.to_string(),
            parent: parent.to_string(),
            from,
            to,
            shape,
            color,
            is_merge,
        }
    }

    /// SVG path data for this edge
    pub fn svg_path(&self) -> String {
        match self.shape {
            EdgeShape::Straight => format!(
                "M {} {} L {} {}",
                self.from.x, self.from.y, self.to.x, self.to.y
            ),
            EdgeShape::Curve { c1, c2 } => format!(
                "M {} {} C {} {}, {} {}, {} {}",
                self.from.x, self.from.y, c1.x, c1.y, c2.x, c2.y, self.to.x, self.to.y
            ),
        }
    }
}

/// Lane assignments and coordinates for a window of history
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    pub rows: Vec<GraphRow>,
    pub total_height: f64,
    pub node_index: FxHashMap<String, NodePosition>,
}

impl GraphLayout {
    /// Number of lanes spanned by the laid out rows
    pub fn lane_count(&self) -> usize {
        self.rows.iter().map(|r| r.lane + 1).max().unwrap_or(0)
    }

    pub fn row(&self, id: &str) -> Option<&GraphRow> {
        self.rows.iter().find(|r| r.commit.id == id)
    }

    pub fn position(&self, id: &str) -> Option<&NodePosition> {
        self.node_index.get(id)
    }

    /// Connectors for every parent present in this window.
    ///
    /// Parents outside the window are skipped. First-parent edges take the
    /// child's color, merge edges the color of the merged lane.
    pub fn edges(&self) -> Vec<EdgePath> {
        let mut edges = Vec::new();
        for row in &self.rows {
            let from = Point { x: row.x, y: row.y };
            for (idx, parent) in row.commit.parent_ids.iter().enumerate() {
                let Some(pos) = self.node_index.get(parent) else {
                    continue;
                };
                let is_merge = idx > 0;
                let color = if is_merge { pos.color } else { row.color };
                let to = Point { x: pos.x, y: pos.y };
                edges.push(EdgePath::between(
                    &row.commit.id,
                    parent,
                    from,
                    to,
                    color,
                    is_merge,
                ));
            }
        }
        edges
    }
}

/// Lane slots for one layout pass
#[derive(Default)]
struct LaneTable<'a> {
    /// Commit currently owning each lane, `None` once released
    slots: Vec<Option<&'a str>>,
    assigned: FxHashMap<&'a str, usize>,
}

impl<'a> LaneTable<'a> {
    fn lane_of(&self, id: &str) -> Option<usize> {
        self.assigned.get(id).copied()
    }

    fn free_slot(&mut self) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(lane) => lane,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        }
    }

    /// Give `commit` its lane and reserve lanes for its parents
    fn place(&mut self, commit: &'a CommitRecord, reclaim: bool) -> usize {
        let lane = match self.lane_of(&commit.id) {
            Some(lane) => lane,
            None => self.free_slot(),
        };
        self.assigned.insert(commit.id.as_str(), lane);
        self.slots[lane] = Some(commit.id.as_str());

        let mut hands_on = false;
        if let Some((first, merges)) = commit.parent_ids.split_first() {
            if !self.assigned.contains_key(first.as_str()) {
                self.assigned.insert(first.as_str(), lane);
                hands_on = true;
            }
            for parent in merges {
                if !self.assigned.contains_key(parent.as_str()) {
                    self.slots.push(Some(parent.as_str()));
                    self.assigned.insert(parent.as_str(), self.slots.len() - 1);
                }
            }
        }

        if reclaim && !hands_on {
            self.slots[lane] = None;
        }

        trace!(commit = %commit.id, lane, hands_on, "placed commit");
        lane
    }
}

/// Lay out commits with the default geometry
pub fn layout_graph(commits: &[CommitRecord]) -> GraphLayout {
    layout_graph_with(commits, &LayoutConfig::default())
}

/// Lay out commits with explicit geometry.
///
/// `config` is expected to pass `LayoutConfig::validate`. Configs loaded with
/// `Config::from_toml_str` already do; hand-built ones are only checked in
/// debug builds.
pub fn layout_graph_with(commits: &[CommitRecord], config: &LayoutConfig) -> GraphLayout {
    debug_assert!(
        config.validate().is_ok(),
        "invalid layout config: {config:?}"
    );
    let mut order: Vec<&CommitRecord> = commits.iter().collect();
    // Stable, so equal timestamps keep input order
    order.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let present: FxHashSet<&str> = commits.iter().map(|c| c.id.as_str()).collect();
    let lane_width = config.lane_width;
    let row_height = config.row_height;

    let mut lanes = LaneTable::default();
    let mut active: BTreeMap<usize, usize> = BTreeMap::new();
    let mut rows = Vec::with_capacity(order.len());
    let mut node_index: FxHashMap<String, NodePosition> = FxHashMap::default();

    for (index, commit) in order.into_iter().enumerate() {
        let lane = lanes.place(commit, config.reclaim_lanes);
        let color = config.color(lane);
        let x = lane as f64 * lane_width + lane_width / 2.0;
        let y = index as f64 * row_height + row_height / 2.0;
        node_index.insert(commit.id.clone(), NodePosition { x, y, color });

        active.remove(&lane);
        let vertical_rails = active
            .iter()
            .map(|(&lane, &color)| RailSegment {
                lane,
                color,
                from_y: y - row_height,
                to_y: y,
            })
            .collect();

        for parent in &commit.parent_ids {
            if !present.contains(parent.as_str()) || node_index.contains_key(parent) {
                continue;
            }
            if let Some(parent_lane) = lanes.lane_of(parent) {
                active.insert(parent_lane, config.color(parent_lane));
            }
        }

        rows.push(GraphRow {
            commit: commit.clone(),
            lane,
            x,
            y,
            color,
            vertical_rails,
        });
    }

    let layout = GraphLayout {
        total_height: rows.len() as f64 * row_height,
        rows,
        node_index,
    };
    debug!(
        commits = layout.rows.len(),
        lanes = layout.lane_count(),
        "laid out commit graph"
    );
    layout
}
