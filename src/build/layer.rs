//! Reading one boundary source layer: a GeoJSON FeatureCollection of
//! polygon/multipolygon features with attribute columns.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::geom::proj;

/// One feature row: its attribute map plus its geometry, already reprojected
/// to EPSG:4326.
#[derive(Debug)]
pub struct LayerRow {
    attrs: serde_json::Map<String, Value>,
    pub geometry: Option<MultiPolygon<f64>>,
}

impl LayerRow {
    /// Attribute as text. Numeric codes are normalised to their string form;
    /// null and missing cells are `None`.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.attrs.get(column)? {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Attribute as a finite float; non-finite and non-numeric cells are `None`.
    pub fn number(&self, column: &str) -> Option<f64> {
        let value = match self.attrs.get(column)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }
}

/// A fully parsed source layer.
#[derive(Debug)]
pub struct SourceLayer {
    pub name: String,
    pub rows: Vec<LayerRow>,
}

/// Read a boundary layer from a GeoJSON file, reprojecting geometry to
/// EPSG:4326 when the file declares a projected CRS.
pub fn read_geojson_layer(name: &str, path: &Path) -> Result<SourceLayer> {
    let file = File::open(path)
        .with_context(|| format!("cannot open layer {name:?} at {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("layer {name:?} is not valid GeoJSON"))?;

    let epsg = proj::epsg_from_geojson(&value)
        .with_context(|| format!("layer {name:?} declares an unusable CRS"))?;

    let Some(features) = value["features"].as_array() else {
        bail!("layer {name:?} has no features array");
    };

    let mut attrs = Vec::with_capacity(features.len());
    let mut shapes = Vec::with_capacity(features.len());
    for feature in features {
        let props = feature["properties"]
            .as_object()
            .cloned()
            .unwrap_or_default();
        attrs.push(props);
        shapes.push(parse_geometry(&feature["geometry"])?);
    }

    // Reproject only present geometries, keeping row alignment.
    let rows = if proj::is_geographic(epsg) {
        attrs.into_iter()
            .zip(shapes)
            .map(|(attrs, geometry)| LayerRow { attrs, geometry })
            .collect()
    } else {
        let present: Vec<MultiPolygon<f64>> = shapes.iter().flatten().cloned().collect();
        let mut projected = proj::reproject_to_wgs84(present, epsg)
            .with_context(|| format!("failed to reproject layer {name:?} from EPSG:{epsg}"))?
            .into_iter();
        attrs.into_iter()
            .zip(shapes)
            .map(|(attrs, geometry)| LayerRow {
                attrs,
                geometry: geometry.and_then(|_| projected.next()),
            })
            .collect()
    };

    Ok(SourceLayer { name: name.to_string(), rows })
}

/// Parse a GeoJSON geometry object into a MultiPolygon. Polygon features are
/// wrapped; point/line features and nulls yield `None`.
fn parse_geometry(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    let Some(geom_type) = geometry["type"].as_str() else {
        return Ok(None);
    };
    let Some(coords) = geometry["coordinates"].as_array() else {
        return Ok(None);
    };
    match geom_type {
        "MultiPolygon" => Ok(Some(parse_multipolygon_coords(coords)?)),
        "Polygon" => Ok(Some(MultiPolygon(vec![parse_polygon_coords(coords)?]))),
        _ => Ok(None),
    }
}

/// Parse GeoJSON MultiPolygon coordinates: an array of polygons, each an
/// array of rings, each an array of [x, y] positions.
fn parse_multipolygon_coords(coords: &[Value]) -> Result<MultiPolygon<f64>> {
    let mut polygons = Vec::with_capacity(coords.len());
    for polygon_coords in coords {
        let Some(rings) = polygon_coords.as_array() else { continue };
        polygons.push(parse_polygon_coords(rings)?);
    }
    Ok(MultiPolygon(polygons))
}

fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let exterior = rings
        .first()
        .and_then(|v| v.as_array())
        .map(|ring| parse_ring_coords(ring))
        .transpose()?
        .unwrap_or_else(|| LineString(vec![]));

    let mut interiors = Vec::new();
    for ring in rings.iter().skip(1) {
        if let Some(ring_array) = ring.as_array() {
            interiors.push(parse_ring_coords(ring_array)?);
        }
    }
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring: [[x, y], [x, y], ...]. Rings are closed if the source left
/// them open.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());
    for coord_pair in coords {
        let Some(coord_array) = coord_pair.as_array() else { continue };
        if coord_array.len() < 2 {
            continue;
        }
        let x = coord_array[0]
            .as_f64()
            .context("invalid coordinate: x must be a number")?;
        let y = coord_array[1]
            .as_f64()
            .context("invalid coordinate: y must be a number")?;
        points.push(Coord { x, y });
    }

    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
    Ok(LineString(points))
}
