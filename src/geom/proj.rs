use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Geographic CRSs the ABS publishes boundaries in; coordinates are already
/// lon/lat degrees and need no transform.
const GEOGRAPHIC_EPSG: [u32; 3] = [4326, 4283, 7844]; // WGS84, GDA94, GDA2020

/// PROJ.4 string for a supported projected source CRS.
fn projected_proj4(epsg: u32) -> Option<&'static str> {
    match epsg {
        // Australian Albers (GDA94 / GDA2020) — same GRS80 ellipsoid.
        3577 | 7845 => Some(
            "+proj=aea +lat_1=-18 +lat_2=-36 +lat_0=0 +lon_0=132 +x_0=0 +y_0=0 \
             +ellps=GRS80 +units=m +no_defs +type=crs",
        ),
        _ => None,
    }
}

/// Whether geometries in `epsg` can be used as-is for EPSG:4326 output.
pub(crate) fn is_geographic(epsg: u32) -> bool {
    GEOGRAPHIC_EPSG.contains(&epsg)
}

/// Reproject shapes from a projected source CRS to lon/lat degrees (EPSG:4326).
pub(crate) fn reproject_to_wgs84(
    shapes: Vec<MultiPolygon<f64>>,
    epsg: u32,
) -> Result<Vec<MultiPolygon<f64>>> {
    if is_geographic(epsg) {
        return Ok(shapes);
    }

    let from = {
        let proj_string = projected_proj4(epsg)
            .ok_or_else(|| anyhow!("unsupported source CRS EPSG:{epsg}"))?;
        Proj4::from_proj_string(proj_string)
            .with_context(|| anyhow!("failed to build source PROJ.4: {proj_string}"))?
    };

    let to = {
        let proj_string = "+proj=longlat +ellps=GRS80 +no_defs +type=crs";
        Proj4::from_proj_string(proj_string)
            .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?
    };

    // Map coords → meters in, radians out, degrees stored.
    shapes
        .into_iter()
        .map(|shape| {
            shape.try_map_coords(|coord: Coord<f64>| {
                let mut point = (coord.x, coord.y, 0.0);
                transform(&from, &to, &mut point)
                    .with_context(|| anyhow!("CRS transform failed for EPSG:{epsg}"))?;
                Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
            })
        })
        .collect()
}

/// Parse the EPSG code out of a GeoJSON `crs` member such as
/// `urn:ogc:def:crs:EPSG::7844`. Absent or unparseable means EPSG:4326,
/// per the GeoJSON default.
pub(crate) fn epsg_from_geojson(value: &serde_json::Value) -> Result<u32> {
    let Some(name) = value
        .get("crs")
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
    else {
        return Ok(4326);
    };

    // Both "EPSG:4326" and "urn:ogc:def:crs:EPSG::4326" spellings occur.
    if name == "urn:ogc:def:crs:OGC:1.3:CRS84" {
        return Ok(4326);
    }
    match name.rsplit(':').next().and_then(|code| code.parse::<u32>().ok()) {
        Some(code) => Ok(code),
        None => bail!("unrecognised CRS name in GeoJSON: {name:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use serde_json::json;

    #[test]
    fn geographic_sources_pass_through() {
        let shapes = vec![MultiPolygon(vec![polygon![
            (x: 153.0, y: -27.5),
            (x: 153.1, y: -27.5),
            (x: 153.1, y: -27.4),
            (x: 153.0, y: -27.5),
        ]])];
        let out = reproject_to_wgs84(shapes.clone(), 7844).unwrap();
        assert_eq!(out, shapes);
    }

    #[test]
    fn albers_origin_maps_to_central_meridian() {
        // The Australian Albers origin (0, 0) sits at lon_0=132, lat_0=0.
        let shapes = vec![MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1000.0, y: 0.0),
            (x: 1000.0, y: 1000.0),
            (x: 0.0, y: 0.0),
        ]])];
        let out = reproject_to_wgs84(shapes, 3577).unwrap();
        let origin = out[0].0[0].exterior().0[0];
        assert!((origin.x - 132.0).abs() < 1e-6, "lon was {}", origin.x);
        assert!(origin.y.abs() < 1e-6, "lat was {}", origin.y);
    }

    #[test]
    fn unknown_projected_crs_is_an_error() {
        assert!(reproject_to_wgs84(vec![], 27700).is_err());
    }

    #[test]
    fn epsg_parsing_from_geojson() {
        assert_eq!(epsg_from_geojson(&json!({})).unwrap(), 4326);
        let urn = json!({"crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::7844"}}});
        assert_eq!(epsg_from_geojson(&urn).unwrap(), 7844);
        let plain = json!({"crs": {"type": "name", "properties": {"name": "EPSG:3577"}}});
        assert_eq!(epsg_from_geojson(&plain).unwrap(), 3577);
        let crs84 = json!({"crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}}});
        assert_eq!(epsg_from_geojson(&crs84).unwrap(), 4326);
    }
}
