// Round-trip tests for the persisted graph blob and the node-link export.

use asgs_graph::{
    export_node_link_json, load_graph, read_graph, save_graph, write_graph, Hierarchy,
    HierarchyGraph, Level, Region,
};
use geo::{polygon, MultiPolygon};

fn sample_graph() -> HierarchyGraph {
    let mut g = HierarchyGraph::new();
    g.add_node(Region {
        id: "AUS".into(),
        label: Some("Australia".into()),
        level: Level::Country,
        area_sqkm: Some(7_688_094.0),
        geometry: None,
        uri: Some("https://linked.data.gov.au/dataset/asgsed3/AUS/AUS".to_string()),
    });
    g.add_node(Region {
        id: "3".into(),
        label: Some("Queensland".into()),
        level: Level::State,
        area_sqkm: Some(1_730_171.0),
        geometry: Some(MultiPolygon(vec![polygon![
            (x: 138.0, y: -29.0),
            (x: 153.5, y: -29.0),
            (x: 153.5, y: -10.0),
            (x: 138.0, y: -10.0),
            (x: 138.0, y: -29.0),
        ]])),
        uri: None,
    });
    g.add_node(Region {
        id: "30101100101".into(),
        label: None,
        level: Level::Sa1,
        area_sqkm: None,
        geometry: None,
        uri: None,
    });
    g.add_edge("AUS", "3").unwrap();
    g.add_edge("3", "30101100101").unwrap();
    g
}

#[test]
fn graph_round_trips_through_bytes() {
    let graph = sample_graph();
    let mut bytes = Vec::new();
    write_graph(&graph, &mut bytes).unwrap();
    let loaded = read_graph(&mut bytes.as_slice()).unwrap();

    assert_eq!(loaded.node_count(), graph.node_count());
    assert_eq!(loaded.edge_count(), graph.edge_count());
    for original in graph.nodes() {
        let restored = loaded.node(&original.id).unwrap();
        assert_eq!(restored.label, original.label);
        assert_eq!(restored.level, original.level);
        assert_eq!(restored.area_sqkm, original.area_sqkm);
        assert_eq!(restored.uri, original.uri);
        // f64 coordinates are stored verbatim, so geometry is bit-identical.
        assert_eq!(restored.geometry, original.geometry);
    }
    let original_edges: Vec<(String, String)> = graph
        .edges()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect();
    let restored_edges: Vec<(String, String)> = loaded
        .edges()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect();
    assert_eq!(restored_edges, original_edges);
}

#[test]
fn graph_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hierarchy_2021.abhg");

    save_graph(&sample_graph(), &path).unwrap();
    let loaded = load_graph(&path).unwrap().expect("file was just written");
    assert_eq!(loaded.node_count(), 3);
}

#[test]
fn missing_file_loads_as_unbuilt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does_not_exist.abhg");
    assert!(load_graph(&path).unwrap().is_none());
    assert!(Hierarchy::load(&path).unwrap().is_none());
}

#[test]
fn bad_magic_is_an_error() {
    let bytes = b"NOPE\x01whatever";
    assert!(read_graph(&mut bytes.as_slice()).is_err());
}

#[test]
fn wrong_version_is_an_error() {
    let graph = sample_graph();
    let mut bytes = Vec::new();
    write_graph(&graph, &mut bytes).unwrap();
    bytes[4] = 99;
    assert!(read_graph(&mut bytes.as_slice()).is_err());
}

#[test]
fn truncated_body_is_an_error() {
    let graph = sample_graph();
    let mut bytes = Vec::new();
    write_graph(&graph, &mut bytes).unwrap();
    bytes.truncate(bytes.len() / 2);
    assert!(read_graph(&mut bytes.as_slice()).is_err());
}

#[test]
fn node_link_export_strips_geometry() {
    let graph = sample_graph();
    let mut out = Vec::new();
    export_node_link_json(&graph, &mut out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["directed"], true);
    let nodes = value["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0]["id"], "AUS");
    assert_eq!(nodes[0]["level"], "AUS");
    assert!(nodes[0].get("geometry").is_none());
    // Unnamed node serialises without a label key at all.
    assert!(nodes[2].get("label").is_none());

    let links = value["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["source"], "AUS");
    assert_eq!(links[0]["target"], "3");
}
