#![doc = "Australian statistical boundary hierarchy: graph builder, indices, and query engine"]
//!
//! Source boundary layers (ASGS GeoJSON downloads) are merged into a single
//! directed containment graph rooted at a synthetic country node, persisted
//! to a compact binary blob, and queried by level, label, and ancestry.
//! Query results come back as ids or as geometry-bearing tables in EPSG:4326
//! for downstream mapping and area-of-interest selection.

mod build;
mod config;
mod error;
mod geom;
mod graph;
mod hierarchy;
mod io;
mod query;
mod types;

#[doc(inline)]
pub use build::{read_geojson_layer, BuildReport, HierarchyBuilder, LayerRow, SourceLayer};

#[doc(inline)]
pub use config::{HierarchyConfig, LayerDescriptor};

#[doc(inline)]
pub use error::QueryError;

#[doc(inline)]
pub use graph::{HierarchyGraph, HierarchyIndex};

#[doc(inline)]
pub use hierarchy::Hierarchy;

#[doc(inline)]
pub use io::{export_node_link_json, load_graph, read_graph, save_graph, write_graph};

#[doc(inline)]
pub use query::{RegionTable, CRS_EPSG};

#[doc(inline)]
pub use types::{Level, Region};
