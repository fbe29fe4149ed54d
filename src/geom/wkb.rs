//! Minimal WKB encoding for MultiPolygon geometries stored in the persisted
//! graph. Little-endian throughout; no external WKB crate needed.

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use std::io::{Read, Write};

/// WKB geometry type for Polygon
const WKB_POLYGON: u32 = 3;
/// WKB geometry type for MultiPolygon
const WKB_MULTIPOLYGON: u32 = 6;
/// WKB byte order: little endian
const WKB_LE: u8 = 1;

fn write_ring(out: &mut Vec<u8>, ring: &LineString<f64>) -> Result<()> {
    out.write_all(&(ring.0.len() as u32).to_le_bytes())?;
    for coord in ring.coords() {
        out.write_all(&coord.x.to_le_bytes())?;
        out.write_all(&coord.y.to_le_bytes())?;
    }
    Ok(())
}

/// Encode a MultiPolygon to WKB bytes.
pub(crate) fn multipolygon_to_wkb(mp: &MultiPolygon<f64>) -> Result<Vec<u8>> {
    let mut wkb = Vec::new();

    wkb.write_all(&[WKB_LE])?;
    wkb.write_all(&WKB_MULTIPOLYGON.to_le_bytes())?;
    wkb.write_all(&(mp.0.len() as u32).to_le_bytes())?;

    for poly in mp.0.iter() {
        wkb.write_all(&[WKB_LE])?;
        wkb.write_all(&WKB_POLYGON.to_le_bytes())?;

        let num_rings = (1 + poly.interiors().len()) as u32;
        wkb.write_all(&num_rings.to_le_bytes())?;

        write_ring(&mut wkb, poly.exterior())?;
        for interior in poly.interiors() {
            write_ring(&mut wkb, interior)?;
        }
    }

    Ok(wkb)
}

fn read_u8(reader: &mut impl Read) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64(reader: &mut impl Read) -> Result<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_ring(reader: &mut impl Read) -> Result<LineString<f64>> {
    let num_points = read_u32(reader)? as usize;
    let mut points = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        let x = read_f64(reader)?;
        let y = read_f64(reader)?;
        points.push(Coord { x, y });
    }
    Ok(LineString(points))
}

/// Decode a MultiPolygon from WKB bytes written by [`multipolygon_to_wkb`].
pub(crate) fn multipolygon_from_wkb(reader: &mut impl Read) -> Result<MultiPolygon<f64>> {
    let order = read_u8(reader).context("missing WKB byte order")?;
    if order != WKB_LE {
        bail!("unsupported WKB byte order: {order}");
    }
    let geom_type = read_u32(reader)?;
    if geom_type != WKB_MULTIPOLYGON {
        bail!("expected WKB MultiPolygon, found geometry type {geom_type}");
    }

    let num_polygons = read_u32(reader)? as usize;
    let mut polygons = Vec::with_capacity(num_polygons);
    for _ in 0..num_polygons {
        let order = read_u8(reader)?;
        if order != WKB_LE {
            bail!("unsupported WKB byte order: {order}");
        }
        let geom_type = read_u32(reader)?;
        if geom_type != WKB_POLYGON {
            bail!("expected WKB Polygon, found geometry type {geom_type}");
        }

        let num_rings = read_u32(reader)? as usize;
        if num_rings == 0 {
            bail!("WKB polygon with zero rings");
        }
        let exterior = read_ring(reader)?;
        let mut interiors = Vec::with_capacity(num_rings - 1);
        for _ in 1..num_rings {
            interiors.push(read_ring(reader)?);
        }
        polygons.push(Polygon::new(exterior, interiors));
    }

    Ok(MultiPolygon(polygons))
}
