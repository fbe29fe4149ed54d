//! Geometry-stripped node-link JSON export, for external graph tooling that
//! does not understand geometry payloads.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::graph::HierarchyGraph;

#[derive(Serialize)]
struct NodeEntry<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    area_sqkm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<&'a str>,
}

#[derive(Serialize)]
struct LinkEntry<'a> {
    source: &'a str,
    target: &'a str,
}

#[derive(Serialize)]
struct NodeLink<'a> {
    directed: bool,
    nodes: Vec<NodeEntry<'a>>,
    links: Vec<LinkEntry<'a>>,
}

/// Write the graph in node-link form: node attributes minus geometry, plus
/// the directed edge list.
pub fn export_node_link_json(graph: &HierarchyGraph, writer: &mut impl Write) -> Result<()> {
    let document = NodeLink {
        directed: true,
        nodes: graph
            .nodes()
            .map(|region| NodeEntry {
                id: &region.id,
                label: region.label.as_deref(),
                level: region.level.as_tag(),
                area_sqkm: region.area_sqkm,
                uri: region.uri.as_deref(),
            })
            .collect(),
        links: graph
            .edges()
            .map(|(parent, child)| LinkEntry { source: parent, target: child })
            .collect(),
    };
    serde_json::to_writer(writer, &document).context("failed to serialise node-link JSON")
}
