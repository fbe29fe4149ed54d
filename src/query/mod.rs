//! Query operations over a loaded hierarchy: level/label lookups, ancestor
//! searches, bounded traversals, and tabular projections.

mod table;

pub use table::{RegionTable, CRS_EPSG};

use std::{collections::VecDeque, sync::Arc};

use ahash::AHashSet;
use anyhow::Result;

use crate::{
    error::QueryError,
    graph::HierarchyGraph,
    hierarchy::Hierarchy,
    types::{Level, Region},
};

/// Labels carrying these markers are residual categories ("Rest of Qld",
/// "Other Territories"), not addressable capital-city regions.
const RESIDUAL_LABEL_MARKERS: [&str; 2] = ["Rest of", "Other"];

/// Direction of a bounded traversal.
#[derive(Clone, Copy)]
enum Walk {
    Up,
    Down,
}

impl Hierarchy {
    /// Nodes matching a level, an exact label, or both (intersection).
    /// Giving neither is an invalid query.
    pub fn get_nodes(
        &self,
        level: Option<Level>,
        label: Option<&str>,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        match (level, label) {
            (None, None) => Err(QueryError::EmptyQuery),
            (Some(level), None) => Ok(self.index().level(level).to_vec()),
            (None, Some(label)) => Ok(self.index().label(label).to_vec()),
            (Some(level), Some(label)) => {
                let labelled: AHashSet<&str> =
                    self.index().label(label).iter().map(|id| id.as_ref()).collect();
                Ok(self
                    .index()
                    .level(level)
                    .iter()
                    .filter(|id| labelled.contains(id.as_ref()))
                    .cloned()
                    .collect())
            }
        }
    }

    /// All nodes at `level` whose ancestor chain (any number of hops) passes
    /// through a node whose label contains `ancestor_label`.
    ///
    /// The candidate set comes from the level index; each candidate gets an
    /// explicit work-stack walk up the parent chains, short-circuiting on the
    /// first match. Depth is bounded in practice by the fixed number of
    /// classification levels.
    pub fn nodes_under(&self, level: Level, ancestor_label: &str) -> Vec<Arc<str>> {
        self.index()
            .level(level)
            .iter()
            .filter(|id| self.has_ancestor_matching(id, ancestor_label))
            .cloned()
            .collect()
    }

    fn has_ancestor_matching(&self, id: &str, needle: &str) -> bool {
        let graph = self.graph();
        let mut visited: AHashSet<&str> = AHashSet::new();
        let mut stack: Vec<&str> = graph.predecessors(id).iter().map(|p| p.as_ref()).collect();
        while let Some(ancestor) = stack.pop() {
            if !visited.insert(ancestor) {
                continue;
            }
            if graph.node(ancestor).is_some_and(|r| r.label_contains(needle)) {
                return true;
            }
            stack.extend(graph.predecessors(ancestor).iter().map(|p| p.as_ref()));
        }
        false
    }

    /// Level search, optionally constrained to descendants of areas whose
    /// label contains `ancestor_label`. The constrained form fails loudly
    /// when nothing matches.
    pub fn search_nodes(
        &self,
        level: Level,
        ancestor_label: Option<&str>,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        match ancestor_label {
            Some(ancestor) => {
                let found = self.nodes_under(level, ancestor);
                if found.is_empty() {
                    return Err(QueryError::NoMatchingAreas {
                        level,
                        ancestor: ancestor.to_string(),
                    });
                }
                Ok(found)
            }
            None => Ok(self.index().level(level).to_vec()),
        }
    }

    /// Top-level query entry point: a level tag (`"SA3"`), optionally scoped
    /// to areas under a labelled ancestor. Empty results are errors — an
    /// empty set almost always means a typo, not missing data.
    pub fn query(
        &self,
        level_tag: &str,
        belonging_to: Option<&str>,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        let level = Level::from_tag(level_tag)
            .ok_or_else(|| QueryError::UnknownLevel(level_tag.to_string()))?;
        let ids = match belonging_to {
            Some(ancestor) => self.search_nodes(level, Some(ancestor))?,
            None => self.get_nodes(Some(level), None)?,
        };
        if ids.is_empty() {
            return Err(QueryError::NotFound {
                level: Some(level),
                label: belonging_to.map(String::from),
            });
        }
        Ok(ids)
    }

    /// [`Hierarchy::query`], materialised as a geometry-bearing table.
    pub fn query_table(
        &self,
        level_tag: &str,
        belonging_to: Option<&str>,
    ) -> Result<RegionTable> {
        let ids = self.query(level_tag, belonging_to)?;
        self.table_for_ids(&ids)
    }

    /// Ancestors within `depth` hops, breadth-first: closer relatives first.
    /// Depth 0 is empty (self is excluded); the bound is inclusive.
    pub fn get_parents(&self, id: &str, depth: usize) -> Result<Vec<Arc<str>>, QueryError> {
        self.bounded_walk(id, depth, Walk::Up)
    }

    /// Descendants within `depth` hops, breadth-first; same bounds as
    /// [`Hierarchy::get_parents`].
    pub fn get_children(&self, id: &str, depth: usize) -> Result<Vec<Arc<str>>, QueryError> {
        self.bounded_walk(id, depth, Walk::Down)
    }

    fn bounded_walk(
        &self,
        start: &str,
        depth: usize,
        direction: Walk,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        let graph = self.graph();
        let start = graph
            .node(start)
            .ok_or_else(|| QueryError::UnknownNode(start.to_string()))?;

        let mut out = Vec::new();
        if depth == 0 {
            return Ok(out);
        }

        let mut visited: AHashSet<&str> = AHashSet::new();
        visited.insert(start.id.as_ref());
        let mut queue: VecDeque<(&Arc<str>, usize)> = VecDeque::new();
        queue.push_back((&start.id, 0));
        while let Some((id, hops)) = queue.pop_front() {
            if hops == depth {
                continue;
            }
            let neighbours = match direction {
                Walk::Up => graph.predecessors(id),
                Walk::Down => graph.successors(id),
            };
            for next in neighbours {
                if visited.insert(next.as_ref()) {
                    out.push(next.clone());
                    queue.push_back((next, hops + 1));
                }
            }
        }
        Ok(out)
    }

    /// Shallowest descendants at `child_level`: descent stops on each branch
    /// at the first node matching the target level.
    pub fn get_children_with_level(
        &self,
        id: &str,
        child_level: Level,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        self.shallowest_matching(id, |region| region.level == child_level)
    }

    /// Shallowest descendants whose label contains `child_label`.
    pub fn get_children_with_label(
        &self,
        id: &str,
        child_label: &str,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        self.shallowest_matching(id, |region| region.label_contains(child_label))
    }

    fn shallowest_matching(
        &self,
        start: &str,
        matches: impl Fn(&Region) -> bool,
    ) -> Result<Vec<Arc<str>>, QueryError> {
        let graph = self.graph();
        if !graph.contains(start) {
            return Err(QueryError::UnknownNode(start.to_string()));
        }

        let mut out = Vec::new();
        let mut visited: AHashSet<&str> = AHashSet::new();
        visited.insert(start);
        let mut queue: VecDeque<&Arc<str>> =
            graph.successors(start).iter().collect();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id.as_ref()) {
                continue;
            }
            let Some(region) = graph.node(id) else { continue };
            if matches(region) {
                // Matching branch ends here; deeper matches stay hidden.
                out.push(id.clone());
                continue;
            }
            queue.extend(graph.successors(id).iter());
        }
        Ok(out)
    }

    /// Induced subgraph of all nodes within `depth` hops of `id` in either
    /// direction (the ego-network), optionally stripped of geometry for
    /// non-geometry-aware exports.
    pub fn subnetwork(
        &self,
        id: &str,
        depth: usize,
        strip_geometry: bool,
    ) -> Result<HierarchyGraph, QueryError> {
        let graph = self.graph();
        if !graph.contains(id) {
            return Err(QueryError::UnknownNode(id.to_string()));
        }

        let mut keep: AHashSet<&str> = AHashSet::new();
        keep.insert(id);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
        queue.push_back((id, 0));
        while let Some((node, hops)) = queue.pop_front() {
            if hops == depth {
                continue;
            }
            let up = graph.predecessors(node).iter();
            let down = graph.successors(node).iter();
            for next in up.chain(down) {
                if keep.insert(next.as_ref()) {
                    queue.push_back((next.as_ref(), hops + 1));
                }
            }
        }

        let mut ego = HierarchyGraph::new();
        for region in graph.nodes() {
            if !keep.contains(region.id.as_ref()) {
                continue;
            }
            let mut region = region.clone();
            if strip_geometry {
                region.geometry = None;
            }
            ego.add_node(region);
        }
        for (parent, child) in graph.edges() {
            if keep.contains(parent.as_ref()) && keep.contains(child.as_ref()) {
                // Both endpoints were just added, so this cannot fail.
                let _ = ego.add_edge(parent, child);
            }
        }
        Ok(ego)
    }

    fn table_for_ids(&self, ids: &[Arc<str>]) -> Result<RegionTable> {
        let regions: Vec<&Region> =
            ids.iter().filter_map(|id| self.graph().node(id)).collect();
        RegionTable::from_regions(regions)
    }

    fn level_table(&self, level: Level, exclude_residual: bool) -> Result<RegionTable> {
        let mut ids = self.get_nodes(Some(level), None)?;
        if exclude_residual {
            ids.retain(|id| {
                !self.graph().node(id).is_some_and(|region| {
                    RESIDUAL_LABEL_MARKERS.iter().any(|marker| region.label_contains(marker))
                })
            });
        }
        if ids.is_empty() {
            return Err(QueryError::NotFound { level: Some(level), label: None }.into());
        }
        self.table_for_ids(&ids)
    }

    // Thin level projections for callers that think in ASGS structures.

    pub fn country(&self) -> Result<RegionTable> {
        self.level_table(Level::Country, false)
    }

    pub fn states(&self) -> Result<RegionTable> {
        self.level_table(Level::State, false)
    }

    /// Greater capital city areas, excluding the residual "Rest of ..." and
    /// "Other ..." categories.
    pub fn greater_capital_areas(&self) -> Result<RegionTable> {
        self.level_table(Level::Gccsa, true)
    }

    pub fn sa4s(&self) -> Result<RegionTable> {
        self.level_table(Level::Sa4, false)
    }

    pub fn sa3s(&self) -> Result<RegionTable> {
        self.level_table(Level::Sa3, false)
    }

    pub fn sa2s(&self) -> Result<RegionTable> {
        self.level_table(Level::Sa2, false)
    }

    pub fn sa1s(&self) -> Result<RegionTable> {
        self.level_table(Level::Sa1, false)
    }

    pub fn mesh_blocks(&self) -> Result<RegionTable> {
        self.level_table(Level::MeshBlock, false)
    }

    pub fn local_government_areas(&self) -> Result<RegionTable> {
        self.level_table(Level::Lga, false)
    }

    pub fn electoral_divisions(&self) -> Result<RegionTable> {
        self.level_table(Level::Ced, false)
    }

    pub fn postal_areas(&self) -> Result<RegionTable> {
        self.level_table(Level::Poa, false)
    }

    pub fn indigenous_regions(&self) -> Result<RegionTable> {
        self.level_table(Level::IndigenousRegion, false)
    }

    pub fn indigenous_areas(&self) -> Result<RegionTable> {
        self.level_table(Level::IndigenousArea, false)
    }

    pub fn significant_urban_areas(&self) -> Result<RegionTable> {
        self.level_table(Level::Sua, false)
    }

    pub fn tourism_regions(&self) -> Result<RegionTable> {
        self.level_table(Level::TourismRegion, false)
    }
}
