//! Merging independently structured source layers into one hierarchy graph.

mod layer;

pub use layer::{read_geojson_layer, LayerRow, SourceLayer};

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};

use crate::{
    config::{HierarchyConfig, LayerDescriptor},
    graph::HierarchyGraph,
    types::{Level, Region},
};

/// Outcome of a build: totals plus the layers that failed. A missing or
/// malformed layer aborts only that layer; nodes and edges from the others
/// are retained.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub layers_loaded: usize,
    pub nodes_added: usize,
    pub edges_added: usize,
    /// (layer name, error) for each layer that could not be processed.
    pub failed: Vec<(String, String)>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds a single consistent [`HierarchyGraph`] from the configured layer
/// descriptors, deduplicating nodes that recur across layers.
pub struct HierarchyBuilder<'a> {
    config: &'a HierarchyConfig,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(config: &'a HierarchyConfig) -> Self {
        Self { config }
    }

    /// Process every descriptor in order, best-effort. The returned graph
    /// always contains at least the synthetic root.
    pub fn build(&self) -> Result<(HierarchyGraph, BuildReport)> {
        let mut graph = HierarchyGraph::new();
        let mut report = BuildReport::default();

        graph.add_node(
            Region::new(self.config.root_id.as_str(), Level::Country)
                .with_label(self.config.root_label.as_str()),
        );

        // A layer can back several descriptors; read each file once.
        let mut layers: AHashMap<String, SourceLayer> = AHashMap::new();
        let mut broken: AHashSet<String> = AHashSet::new();

        for descriptor in &self.config.descriptors {
            if broken.contains(&descriptor.layer) {
                continue;
            }
            if !layers.contains_key(&descriptor.layer) {
                let path = self.config.layer_path(&descriptor.layer);
                match read_geojson_layer(&descriptor.layer, &path) {
                    Ok(layer) => {
                        debug!(layer = %descriptor.layer, rows = layer.rows.len(), "loaded source layer");
                        report.layers_loaded += 1;
                        layers.insert(descriptor.layer.clone(), layer);
                    }
                    Err(err) => {
                        warn!(layer = %descriptor.layer, error = %format!("{err:#}"), "skipping source layer");
                        report.failed.push((descriptor.layer.clone(), format!("{err:#}")));
                        broken.insert(descriptor.layer.clone());
                        continue;
                    }
                }
            }

            let layer = &layers[&descriptor.layer];
            match self.apply_descriptor(&mut graph, layer, descriptor) {
                Ok((nodes, edges)) => {
                    report.nodes_added += nodes;
                    report.edges_added += edges;
                }
                Err(err) => {
                    warn!(
                        layer = %descriptor.layer,
                        node_column = %descriptor.node_column,
                        error = %format!("{err:#}"),
                        "skipping descriptor"
                    );
                    report.failed.push((descriptor.layer.clone(), format!("{err:#}")));
                }
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            layers = report.layers_loaded,
            failed = report.failed.len(),
            "hierarchy build finished"
        );
        Ok((graph, report))
    }

    /// Insert the edge set one descriptor declares over one source layer.
    fn apply_descriptor(
        &self,
        graph: &mut HierarchyGraph,
        layer: &SourceLayer,
        descriptor: &LayerDescriptor,
    ) -> Result<(usize, usize)> {
        let node_level = Level::from_code_column(&descriptor.node_column).ok_or_else(|| {
            anyhow!(
                "unrecognised node code column {:?} in layer {:?}",
                descriptor.node_column,
                layer.name
            )
        })?;
        let parent = match &descriptor.parent_column {
            Some(column) => {
                let level = Level::from_code_column(column).ok_or_else(|| {
                    anyhow!("unrecognised parent code column {column:?} in layer {:?}", layer.name)
                })?;
                Some((column.as_str(), level))
            }
            None => None,
        };

        let mut nodes_added = 0;
        let mut edges_added = 0;
        for row in &layer.rows {
            // Offshore/unassigned rows carry the sentinel country code.
            if row.text(&self.config.country_column).as_deref()
                == Some(self.config.excluded_code.as_str())
            {
                continue;
            }
            let Some(node_id) = row.text(&descriptor.node_column) else {
                continue;
            };

            // Top-most layers hang directly under the synthetic root.
            let parent_id = match parent {
                None => self.config.root_id.clone(),
                Some((column, _)) => match row.text(column) {
                    Some(id) => id,
                    None => continue,
                },
            };

            // A parent first seen here is synthesised from this row. Its
            // geometry and area are the child's; a later authoritative row
            // for the same id will not overwrite them (first-seen wins).
            if let Some((column, level)) = parent {
                if !graph.contains(&parent_id) {
                    let region = self.region_from_row(row, parent_id.clone(), column, level);
                    if graph.add_node(region) {
                        nodes_added += 1;
                    }
                }
            }

            if !graph.contains(&node_id) {
                let region =
                    self.region_from_row(row, node_id.clone(), &descriptor.node_column, node_level);
                if graph.add_node(region) {
                    nodes_added += 1;
                }
            }

            if graph
                .add_edge(&parent_id, &node_id)
                .with_context(|| format!("inserting edge in layer {:?}", layer.name))?
            {
                edges_added += 1;
            }
        }

        Ok((nodes_added, edges_added))
    }

    /// Build a region from one source row. The name column shares the code
    /// column's prefix with a NAME suffix; unnamed levels get no label.
    fn region_from_row(
        &self,
        row: &LayerRow,
        id: String,
        code_column: &str,
        level: Level,
    ) -> Region {
        let label: Option<Arc<str>> = if level.has_published_name() {
            row.text(&code_column.replace("_CODE", "_NAME")).map(Arc::from)
        } else {
            None
        };
        Region {
            id: Arc::from(id),
            label,
            level,
            area_sqkm: row.number(&self.config.area_column),
            geometry: row.geometry.clone(),
            uri: row.text(&self.config.uri_column),
        }
    }
}
