// End-to-end builder tests over on-disk GeoJSON fixtures.

use std::fs;
use std::path::Path;

use asgs_graph::{Hierarchy, HierarchyBuilder, HierarchyConfig, LayerDescriptor, Level};
use serde_json::{json, Value};

fn polygon_feature(props: Value, x0: f64, y0: f64) -> Value {
    json!({
        "type": "Feature",
        "properties": props,
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[x0, y0], [x0 + 0.5, y0], [x0 + 0.5, y0 + 0.5], [x0, y0]]]
        }
    })
}

fn write_layer(dataset_dir: &Path, layer: &str, features: Vec<Value>, crs: Option<&str>) {
    let boundary = dataset_dir.join("boundary");
    fs::create_dir_all(&boundary).unwrap();
    let mut doc = json!({"type": "FeatureCollection", "features": features});
    if let Some(crs) = crs {
        doc["crs"] = json!({"type": "name", "properties": {"name": crs}});
    }
    fs::write(
        boundary.join(format!("{layer}_2021_AUST_GDA2020.geojson")),
        serde_json::to_vec(&doc).unwrap(),
    )
    .unwrap();
}

fn ste_features() -> Vec<Value> {
    vec![
        polygon_feature(
            json!({
                "STE_CODE21": "3", "STE_NAME21": "Queensland",
                "AUS_CODE21": "AUS", "AREASQKM21": 1730171.0,
                "LOCI_URI21": "https://linked.data.gov.au/dataset/asgsed3/STE/3"
            }),
            140.0,
            -25.0,
        ),
        polygon_feature(
            json!({
                "STE_CODE21": "2", "STE_NAME21": "Victoria",
                "AUS_CODE21": "AUS", "AREASQKM21": 227444.0
            }),
            144.0,
            -37.0,
        ),
        // Offshore/unassigned sentinel row, must be filtered out.
        polygon_feature(
            json!({"STE_CODE21": "Z", "STE_NAME21": "Outside Australia", "AUS_CODE21": "ZZZ"}),
            0.0,
            0.0,
        ),
    ]
}

#[test]
fn build_assembles_the_hierarchy_from_layers() {
    let dir = tempfile::tempdir().unwrap();
    write_layer(dir.path(), "STE", ste_features(), None);
    write_layer(
        dir.path(),
        "GCCSA",
        vec![polygon_feature(
            json!({
                "GCC_CODE21": "3GBRI", "GCC_NAME21": "Greater Brisbane",
                "STE_CODE21": "3", "STE_NAME21": "Queensland",
                "AUS_CODE21": "AUS", "AREASQKM21": 15842.0
            }),
            152.0,
            -27.0,
        )],
        None,
    );

    let config = HierarchyConfig::asgs_2021(dir.path()).with_descriptors(vec![
        LayerDescriptor::top("STE", "STE_CODE21"),
        LayerDescriptor::edge("GCCSA", "GCC_CODE21", "STE_CODE21"),
    ]);
    let (hierarchy, report) = Hierarchy::build(&config).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.layers_loaded, 2);

    let graph = hierarchy.graph();
    // Root + two states + one GCCSA; the ZZZ row is gone.
    assert_eq!(graph.node_count(), 4);
    assert!(!graph.contains("Z"));

    let root = graph.node("AUS").unwrap();
    assert_eq!(root.label.as_deref(), Some("Australia"));
    assert_eq!(root.level, Level::Country);

    let qld = graph.node("3").unwrap();
    assert_eq!(qld.label.as_deref(), Some("Queensland"));
    assert_eq!(qld.area_sqkm, Some(1730171.0));
    assert!(qld.uri.as_deref().unwrap().ends_with("/STE/3"));

    let brisbane = graph.node("3GBRI").unwrap();
    assert_eq!(brisbane.level, Level::Gccsa);
    assert_eq!(brisbane.label.as_deref(), Some("Greater Brisbane"));

    assert_eq!(
        hierarchy.get_children("AUS", 1).unwrap().len(),
        2,
        "both states hang under the root"
    );
    assert_eq!(hierarchy.get_parents("3GBRI", 2).unwrap().len(), 2);
}

#[test]
fn missing_layer_aborts_only_that_layer() {
    let dir = tempfile::tempdir().unwrap();
    write_layer(dir.path(), "STE", ste_features(), None);
    // No SA3 file on disk.

    let config = HierarchyConfig::asgs_2021(dir.path()).with_descriptors(vec![
        LayerDescriptor::top("STE", "STE_CODE21"),
        LayerDescriptor::edge("SA3", "SA3_CODE21", "SA4_CODE21"),
    ]);
    let (graph, report) = HierarchyBuilder::new(&config).build().unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "SA3");
    // The STE layer's nodes survived the SA3 failure.
    assert!(graph.contains("3"));
    assert!(graph.contains("2"));
}

#[test]
fn unrecognised_code_column_is_a_configuration_error_for_the_layer() {
    let dir = tempfile::tempdir().unwrap();
    write_layer(dir.path(), "STE", ste_features(), None);

    let config = HierarchyConfig::asgs_2021(dir.path()).with_descriptors(vec![
        LayerDescriptor::top("STE", "STE_CODE21"),
        LayerDescriptor::edge("STE", "BOGUS_CODE21", "STE_CODE21"),
    ]);
    let (graph, report) = HierarchyBuilder::new(&config).build().unwrap();

    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("BOGUS_CODE21"));
    assert!(graph.contains("3"));
}

#[test]
fn unseen_parent_is_synthesised_from_the_child_row() {
    let dir = tempfile::tempdir().unwrap();
    // Only the GCCSA layer: its STE parent never gets an authoritative row.
    write_layer(
        dir.path(),
        "GCCSA",
        vec![polygon_feature(
            json!({
                "GCC_CODE21": "8ACTE", "GCC_NAME21": "Australian Capital Territory",
                "STE_CODE21": "8", "STE_NAME21": "Australian Capital Territory",
                "AUS_CODE21": "AUS", "AREASQKM21": 2358.0
            }),
            149.0,
            -35.3,
        )],
        None,
    );

    let config = HierarchyConfig::asgs_2021(dir.path()).with_descriptors(vec![
        LayerDescriptor::edge("GCCSA", "GCC_CODE21", "STE_CODE21"),
    ]);
    let (graph, _) = HierarchyBuilder::new(&config).build().unwrap();

    let placeholder = graph.node("8").unwrap();
    assert_eq!(placeholder.level, Level::State);
    // Placeholder attributes are borrowed from the child row, including its
    // geometry and area; first-seen wins if a real row arrives later.
    assert_eq!(placeholder.label.as_deref(), Some("Australian Capital Territory"));
    assert_eq!(placeholder.area_sqkm, Some(2358.0));
    assert!(placeholder.geometry.is_some());
    assert_eq!(graph.successors("8").len(), 1);
}

#[test]
fn projected_layers_are_reprojected_to_wgs84() {
    let dir = tempfile::tempdir().unwrap();
    // A square at the Australian Albers origin, which sits on lon 132.
    write_layer(
        dir.path(),
        "STE",
        vec![polygon_feature(
            json!({"STE_CODE21": "7", "STE_NAME21": "Northern Territory", "AUS_CODE21": "AUS"}),
            0.0,
            0.0,
        )],
        Some("urn:ogc:def:crs:EPSG::3577"),
    );

    let config = HierarchyConfig::asgs_2021(dir.path())
        .with_descriptors(vec![LayerDescriptor::top("STE", "STE_CODE21")]);
    let (graph, report) = HierarchyBuilder::new(&config).build().unwrap();
    assert!(report.is_complete());

    let nt = graph.node("7").unwrap();
    let geom = nt.geometry.as_ref().unwrap();
    let origin = geom.0[0].exterior().0[0];
    assert!((origin.x - 132.0).abs() < 1e-6);
    assert!(origin.y.abs() < 1e-6);
}

#[test]
fn load_or_build_persists_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    write_layer(dir.path(), "STE", ste_features(), None);

    let config = HierarchyConfig::asgs_2021(dir.path())
        .with_descriptors(vec![LayerDescriptor::top("STE", "STE_CODE21")]);

    assert!(Hierarchy::load(&config.graph_path()).unwrap().is_none());

    let built = Hierarchy::load_or_build(&config).unwrap();
    assert!(config.graph_path().exists());

    // Second run takes the persisted path and sees the same structure.
    let reloaded = Hierarchy::load_or_build(&config).unwrap();
    assert_eq!(reloaded.graph().node_count(), built.graph().node_count());
    assert_eq!(reloaded.graph().edge_count(), built.graph().edge_count());
    assert_eq!(reloaded.root_id().as_ref(), "AUS");
}
