use std::{path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::{
    build::{BuildReport, HierarchyBuilder},
    config::HierarchyConfig,
    graph::{HierarchyGraph, HierarchyIndex},
    io,
    types::Level,
};

/// A loaded boundary hierarchy: the graph plus its lookup indices.
///
/// Construction is the expensive step (source-layer I/O bound); a value of
/// this type is always queryable. The "unbuilt" state is simply the absence
/// of a value — [`Hierarchy::load`] returns `Ok(None)` until a graph has been
/// built and persisted.
#[derive(Debug)]
pub struct Hierarchy {
    graph: HierarchyGraph,
    index: HierarchyIndex,
    root_id: Arc<str>,
}

impl Hierarchy {
    /// Run the full build from source layers, validate the result, and index
    /// it. Failed layers are reported, not fatal.
    pub fn build(config: &HierarchyConfig) -> Result<(Self, BuildReport)> {
        let (graph, report) = HierarchyBuilder::new(config).build()?;
        graph
            .validate(&config.root_id)
            .context("built hierarchy violates its structural invariants")?;
        info!(nodes = graph.node_count(), edges = graph.edge_count(), "hierarchy ready");
        Ok((Self::with_graph(graph)?, report))
    }

    /// Adopt an already-materialised graph, rebuilding the indices. The graph
    /// must contain exactly one country-level node, which becomes the root.
    pub fn with_graph(graph: HierarchyGraph) -> Result<Self> {
        let root_id = {
            let mut roots = graph.nodes().filter(|r| r.level == Level::Country);
            match (roots.next(), roots.next()) {
                (Some(root), None) => root.id.clone(),
                (None, _) => bail!("graph has no country-level root node"),
                (Some(a), Some(b)) => {
                    bail!("graph has multiple country-level nodes: {:?}, {:?}", a.id, b.id)
                }
            }
        };
        let index = HierarchyIndex::build(&graph);
        Ok(Self { graph, index, root_id })
    }

    /// Load a persisted hierarchy. `Ok(None)` when no graph has been saved
    /// yet ("no cache" is an expected first-run condition, not an error).
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match io::load_graph(path)? {
            Some(graph) => Ok(Some(Self::with_graph(graph)?)),
            None => Ok(None),
        }
    }

    /// Persist the graph so later runs can skip the build.
    pub fn save(&self, path: &Path) -> Result<()> {
        io::save_graph(&self.graph, path)
    }

    /// Load the persisted hierarchy if present, otherwise build from source
    /// layers and persist for next time.
    pub fn load_or_build(config: &HierarchyConfig) -> Result<Self> {
        let path = config.graph_path();
        if let Some(hierarchy) = Self::load(&path)? {
            return Ok(hierarchy);
        }
        let (hierarchy, report) = Self::build(config)?;
        if !report.is_complete() {
            info!(failed = report.failed.len(), "built with missing layers");
        }
        hierarchy.save(&path)?;
        Ok(hierarchy)
    }

    pub fn graph(&self) -> &HierarchyGraph {
        &self.graph
    }

    pub fn index(&self) -> &HierarchyIndex {
        &self.index
    }

    pub fn root_id(&self) -> &Arc<str> {
        &self.root_id
    }
}
