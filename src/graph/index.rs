use std::sync::Arc;

use ahash::AHashMap;

use crate::types::Level;

use super::graph::HierarchyGraph;

/// Lookup structures computed in one pass over the node set after a load.
///
/// Built once, queried many times: the graph is never mutated after the
/// index exists, so there is no incremental update path. Reloading the graph
/// rebuilds the index from scratch.
#[derive(Debug, Default)]
pub struct HierarchyIndex {
    by_level: AHashMap<Level, Vec<Arc<str>>>,
    by_label: AHashMap<Arc<str>, Vec<Arc<str>>>,
    unlabelled: Vec<Arc<str>>,
}

impl HierarchyIndex {
    /// Index every node by level and by exact label. Nodes without a label
    /// are grouped in a separate null bucket, which label queries never see.
    pub fn build(graph: &HierarchyGraph) -> Self {
        let mut index = Self::default();
        for region in graph.nodes() {
            index.by_level.entry(region.level).or_default().push(region.id.clone());
            match &region.label {
                Some(label) => {
                    index.by_label.entry(label.clone()).or_default().push(region.id.clone())
                }
                None => index.unlabelled.push(region.id.clone()),
            }
        }
        index
    }

    /// Ids of all nodes at `level`, in graph insertion order.
    pub fn level(&self, level: Level) -> &[Arc<str>] {
        self.by_level.get(&level).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Ids of all nodes carrying exactly `label`. A label can appear at
    /// multiple levels (a suburb name reused as a postal-area name).
    pub fn label(&self, label: &str) -> &[Arc<str>] {
        self.by_label.get(label).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Ids of nodes with no label (the finest, unnamed levels).
    pub fn unlabelled(&self) -> &[Arc<str>] {
        &self.unlabelled
    }

    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.by_level.keys().copied()
    }
}
