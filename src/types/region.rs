use std::sync::Arc;

use geo::MultiPolygon;

use super::level::Level;

/// One geographic unit in the hierarchy.
///
/// Keep the original code text (with leading zeros) but avoid repeated owned
/// Strings: ids are shared between the graph, its indices, and query results.
#[derive(Debug, Clone)]
pub struct Region {
    /// Opaque key from the originating dataset's per-level code column.
    pub id: Arc<str>,
    /// Display name; `None` for levels without published names and null cells.
    pub label: Option<Arc<str>>,
    /// Classification scheme and granularity this region belongs to.
    pub level: Level,
    /// Area in square kilometres; non-finite source values become `None`.
    pub area_sqkm: Option<f64>,
    /// Boundary in EPSG:4326 (lon/lat degrees).
    pub geometry: Option<MultiPolygon<f64>>,
    /// Provenance link (LOCI URI), when the dataset carries one.
    pub uri: Option<String>,
}

impl Region {
    pub fn new(id: impl Into<Arc<str>>, level: Level) -> Self {
        Self {
            id: id.into(),
            label: None,
            level,
            area_sqkm: None,
            geometry: None,
            uri: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Substring containment against the region's label. An absent label
    /// matches nothing, not even the empty query string.
    pub fn label_contains(&self, needle: &str) -> bool {
        match &self.label {
            Some(label) => label.contains(needle),
            None => false,
        }
    }
}
