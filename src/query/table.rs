use anyhow::Result;
use geo::{BooleanOps, MultiPolygon};
use polars::{frame::DataFrame, prelude::Column};

use crate::types::Region;

/// Coordinate reference system of all query results.
pub const CRS_EPSG: u32 = 4326;

/// A geometry-bearing tabular query result: one row per region, sorted by
/// (level, label), rows without geometry dropped. Geometry rides alongside
/// the frame row-for-row, in EPSG:4326.
#[derive(Debug)]
pub struct RegionTable {
    pub data: DataFrame,
    pub geoms: Vec<MultiPolygon<f64>>,
}

impl RegionTable {
    pub(crate) fn from_regions(mut regions: Vec<&Region>) -> Result<Self> {
        regions.retain(|r| r.geometry.is_some());
        regions.sort_by(|a, b| {
            (a.level.rank(), a.label.as_deref(), a.id.as_ref())
                .cmp(&(b.level.rank(), b.label.as_deref(), b.id.as_ref()))
        });

        let ids: Vec<&str> = regions.iter().map(|r| r.id.as_ref()).collect();
        let labels: Vec<Option<&str>> = regions.iter().map(|r| r.label.as_deref()).collect();
        let levels: Vec<&str> = regions.iter().map(|r| r.level.as_tag()).collect();
        let areas: Vec<Option<f64>> = regions.iter().map(|r| r.area_sqkm).collect();
        let uris: Vec<Option<&str>> = regions.iter().map(|r| r.uri.as_deref()).collect();

        let data = DataFrame::new(vec![
            Column::new("id".into(), ids),
            Column::new("label".into(), labels),
            Column::new("level".into(), levels),
            Column::new("area_sqkm".into(), areas),
            Column::new("uri".into(), uris),
        ])?;

        // retain() guarantees every row still has its geometry.
        let geoms = regions.iter().filter_map(|r| r.geometry.clone()).collect();

        Ok(Self { data, geoms })
    }

    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    /// Region ids in table order.
    pub fn ids(&self) -> Vec<String> {
        self.data
            .column("id")
            .ok()
            .and_then(|col| col.str().ok().map(|s| s.into_iter().flatten().map(String::from).collect()))
            .unwrap_or_default()
    }

    /// Union of all row geometries: the area-of-interest polygon consumed by
    /// the building-footprint fetch and similar spatial bounds.
    pub fn area_of_interest(&self) -> Option<MultiPolygon<f64>> {
        self.geoms.iter().cloned().reduce(|acc, mp| acc.union(&mp))
    }
}
