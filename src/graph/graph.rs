use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use anyhow::{bail, ensure, Result};

use crate::types::Region;

/// The boundary hierarchy: a directed graph of containment edges, conceptually
/// a forest rooted at one synthetic country node.
///
/// Adjacency lists preserve insertion order so that persistence and exports
/// are deterministic; an edge set gives O(1) duplicate rejection.
#[derive(Debug, Default, Clone)]
pub struct HierarchyGraph {
    nodes: AHashMap<Arc<str>, Region>,
    order: Vec<Arc<str>>,
    children: AHashMap<Arc<str>, Vec<Arc<str>>>,
    parents: AHashMap<Arc<str>, Vec<Arc<str>>>,
    edge_set: AHashSet<(Arc<str>, Arc<str>)>,
}

impl HierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. First-seen attributes win: if the id is already present
    /// the stored region is left untouched and `false` is returned.
    pub fn add_node(&mut self, region: Region) -> bool {
        if self.nodes.contains_key(region.id.as_ref()) {
            return false;
        }
        self.order.push(region.id.clone());
        self.nodes.insert(region.id.clone(), region);
        true
    }

    /// Insert a containment edge parent -> child. Inserting an existing edge
    /// is a no-op (`Ok(false)`). Both endpoints must already be nodes.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<bool> {
        let Some((parent, _)) = self.nodes.get_key_value(parent) else {
            bail!("edge references unknown parent node {parent:?}");
        };
        let parent = parent.clone();
        let Some((child, _)) = self.nodes.get_key_value(child) else {
            bail!("edge references unknown child node {child:?}");
        };
        let child = child.clone();

        if !self.edge_set.insert((parent.clone(), child.clone())) {
            return Ok(false);
        }
        self.children.entry(parent.clone()).or_default().push(child.clone());
        self.parents.entry(child).or_default().push(parent);
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Region> {
        self.nodes.get(id)
    }

    /// Regions in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Region> {
        self.order.iter().filter_map(|id| self.nodes.get(id.as_ref()))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &Arc<str>> {
        self.order.iter()
    }

    /// Ids of the regions directly contained in `id`.
    pub fn successors(&self, id: &str) -> &[Arc<str>] {
        self.children.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Ids of the regions directly containing `id`.
    pub fn predecessors(&self, id: &str) -> &[Arc<str>] {
        self.parents.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_set.len()
    }

    /// All edges as (parent, child) pairs, grouped by parent in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&Arc<str>, &Arc<str>)> {
        self.order.iter().flat_map(move |parent| {
            self.successors(parent).iter().map(move |child| (parent, child))
        })
    }

    /// Check the structural invariants: `root_id` exists and has no parent,
    /// every node is reachable from it, and no containment cycle exists.
    pub fn validate(&self, root_id: &str) -> Result<()> {
        ensure!(self.contains(root_id), "root node {root_id:?} is missing from the graph");
        ensure!(
            self.predecessors(root_id).is_empty(),
            "root node {root_id:?} has a containing parent"
        );

        // Reachability: a child-to-parent chain from any node must terminate
        // at the single root, which is equivalent to the root reaching all.
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut queue: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
        visited.insert(root_id);
        queue.push_back(root_id);
        while let Some(id) = queue.pop_front() {
            for child in self.successors(id) {
                if visited.insert(child.as_ref()) {
                    queue.push_back(child.as_ref());
                }
            }
        }
        if visited.len() != self.node_count() {
            let orphan = self
                .order
                .iter()
                .find(|id| !visited.contains(id.as_ref()))
                .map(|id| id.to_string())
                .unwrap_or_default();
            bail!(
                "{} of {} nodes unreachable from root {root_id:?} (e.g. {orphan:?})",
                self.node_count() - visited.len(),
                self.node_count()
            );
        }

        self.check_acyclic()
    }

    /// An accidental cycle in the source data would otherwise hang the
    /// unbounded ancestor walks, so it is rejected at build time.
    fn check_acyclic(&self) -> Result<()> {
        const WHITE: u8 = 0;
        const GRAY: u8 = 1;
        const BLACK: u8 = 2;

        let mut color: AHashMap<&str, u8> = AHashMap::new();
        for start in &self.order {
            if color.get(start.as_ref()).copied().unwrap_or(WHITE) != WHITE {
                continue;
            }
            // Explicit stack of (node, next-child-index) instead of recursion.
            let mut stack: Vec<(&str, usize)> = vec![(start.as_ref(), 0)];
            color.insert(start.as_ref(), GRAY);
            while let Some((id, next)) = stack.pop() {
                let succ = self.successors(id);
                if next < succ.len() {
                    stack.push((id, next + 1));
                    let child = succ[next].as_ref();
                    match color.get(child).copied().unwrap_or(WHITE) {
                        WHITE => {
                            color.insert(child, GRAY);
                            stack.push((child, 0));
                        }
                        GRAY => bail!("containment cycle detected through node {child:?}"),
                        _ => {}
                    }
                } else {
                    color.insert(id, BLACK);
                }
            }
        }
        Ok(())
    }
}
