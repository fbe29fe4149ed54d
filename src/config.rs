use std::path::PathBuf;

/// One set of containment edges: which source layer, which column keys the
/// node, and which column keys its containing parent.
///
/// Several descriptors may reference the same layer; a layer can define more
/// than one edge set. A descriptor with no parent column marks a top-most
/// layer whose rows hang directly under the synthetic root.
#[derive(Debug, Clone)]
pub struct LayerDescriptor {
    pub layer: String,
    pub node_column: String,
    pub parent_column: Option<String>,
}

impl LayerDescriptor {
    pub fn edge(layer: &str, node_column: &str, parent_column: &str) -> Self {
        Self {
            layer: layer.to_string(),
            node_column: node_column.to_string(),
            parent_column: Some(parent_column.to_string()),
        }
    }

    pub fn top(layer: &str, node_column: &str) -> Self {
        Self {
            layer: layer.to_string(),
            node_column: node_column.to_string(),
            parent_column: None,
        }
    }
}

/// Explicit build/query configuration, passed into the builder rather than
/// living in process-wide state. One config per dataset release; a new census
/// year gets a new config and a full rebuild.
#[derive(Debug, Clone)]
pub struct HierarchyConfig {
    /// Root of the on-disk dataset; boundary files live in `<dir>/boundary/`.
    pub dataset_dir: PathBuf,
    /// Release year embedded in file names, e.g. "2021".
    pub year: String,
    /// Reserved id for the synthetic country root.
    pub root_id: String,
    pub root_label: String,
    /// Country-code column checked for the excluded-row sentinel.
    pub country_column: String,
    /// Sentinel code marking unassigned/offshore rows, filtered before insertion.
    pub excluded_code: String,
    /// Column carrying area in square kilometres.
    pub area_column: String,
    /// Column carrying the provenance URI.
    pub uri_column: String,
    /// Ordered edge-set declarations processed by the builder.
    pub descriptors: Vec<LayerDescriptor>,
}

impl HierarchyConfig {
    /// Full ASGS 2021 configuration: the main statistical structure plus the
    /// non-ABS, indigenous, urban, and tourism structures, all anchored under
    /// the states.
    pub fn asgs_2021(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            year: "2021".to_string(),
            root_id: "AUS".to_string(),
            root_label: "Australia".to_string(),
            country_column: "AUS_CODE21".to_string(),
            excluded_code: "ZZZ".to_string(),
            area_column: "AREASQKM21".to_string(),
            uri_column: "LOCI_URI21".to_string(),
            descriptors: vec![
                LayerDescriptor::top("STE", "STE_CODE21"),
                LayerDescriptor::edge("GCCSA", "GCC_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("SA4", "SA4_CODE21", "GCC_CODE21"),
                LayerDescriptor::edge("SA3", "SA3_CODE21", "SA4_CODE21"),
                LayerDescriptor::edge("SA2", "SA2_CODE21", "SA3_CODE21"),
                LayerDescriptor::edge("SA1", "SA1_CODE21", "SA2_CODE21"),
                LayerDescriptor::edge("MB", "MB_CODE21", "SA1_CODE21"),
                LayerDescriptor::edge("LGA", "LGA_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("CED", "CED_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("POA", "POA_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("IREG", "IREG_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("IARE", "IARE_CODE21", "IREG_CODE21"),
                LayerDescriptor::edge("ILOC", "ILOC_CODE21", "IARE_CODE21"),
                LayerDescriptor::edge("SUA", "SUA_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("SOS", "SOS_CODE21", "STE_CODE21"),
                LayerDescriptor::edge("SOSR", "SOSR_CODE21", "SOS_CODE21"),
                LayerDescriptor::edge("UCL", "UCL_CODE21", "SOSR_CODE21"),
                LayerDescriptor::edge("TR", "TR_CODE21", "STE_CODE21"),
            ],
        }
    }

    /// Path of a boundary layer file, following the ABS download naming,
    /// e.g. `boundary/SA3_2021_AUST_GDA2020.geojson`.
    pub fn layer_path(&self, layer: &str) -> PathBuf {
        self.dataset_dir
            .join("boundary")
            .join(format!("{layer}_{}_AUST_GDA2020.geojson", self.year))
    }

    /// Default location of the persisted graph blob.
    pub fn graph_path(&self) -> PathBuf {
        self.dataset_dir.join(format!("hierarchy_{}.abhg", self.year))
    }

    pub fn with_descriptors(mut self, descriptors: Vec<LayerDescriptor>) -> Self {
        self.descriptors = descriptors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_paths_follow_abs_naming() {
        let config = HierarchyConfig::asgs_2021("/data/asgs2021");
        assert_eq!(
            config.layer_path("SA3"),
            PathBuf::from("/data/asgs2021/boundary/SA3_2021_AUST_GDA2020.geojson")
        );
    }

    #[test]
    fn default_descriptors_cover_the_main_structure() {
        let config = HierarchyConfig::asgs_2021(".");
        let top: Vec<&str> = config
            .descriptors
            .iter()
            .filter(|d| d.parent_column.is_none())
            .map(|d| d.layer.as_str())
            .collect();
        assert_eq!(top, vec!["STE"]);
        assert!(config.descriptors.iter().any(|d| d.layer == "MB"));
    }
}
