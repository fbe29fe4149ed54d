//! Writing the persisted graph blob.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use ahash::AHashMap;
use anyhow::{Context, Result};
use flate2::{write::GzEncoder, Compression};
use tracing::debug;

use crate::{geom::wkb, graph::HierarchyGraph};

use super::{MAGIC, VERSION};

fn write_str(out: &mut impl Write, s: &str) -> Result<()> {
    out.write_all(&(s.len() as u32).to_le_bytes())?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn write_opt_str(out: &mut impl Write, s: Option<&str>) -> Result<()> {
    match s {
        Some(s) => {
            out.write_all(&[1])?;
            write_str(out, s)?;
        }
        None => out.write_all(&[0])?,
    }
    Ok(())
}

/// Serialise the graph: magic + version header, then a gzip body holding the
/// node table (attributes and WKB geometry) and the edge list as index pairs.
pub fn write_graph(graph: &HierarchyGraph, writer: &mut impl Write) -> Result<()> {
    writer.write_all(MAGIC).context("failed to write magic bytes")?;
    writer.write_all(&[VERSION]).context("failed to write version")?;

    let mut body = GzEncoder::new(writer, Compression::default());

    body.write_all(&(graph.node_count() as u32).to_le_bytes())?;
    let mut positions: AHashMap<&str, u32> = AHashMap::with_capacity(graph.node_count());
    for (position, region) in graph.nodes().enumerate() {
        positions.insert(region.id.as_ref(), position as u32);

        write_str(&mut body, &region.id)?;
        write_opt_str(&mut body, region.label.as_deref())?;
        write_str(&mut body, region.level.as_tag())?;
        match region.area_sqkm {
            Some(area) => {
                body.write_all(&[1])?;
                body.write_all(&area.to_le_bytes())?;
            }
            None => body.write_all(&[0])?,
        }
        write_opt_str(&mut body, region.uri.as_deref())?;
        match &region.geometry {
            Some(geometry) => {
                let bytes = wkb::multipolygon_to_wkb(geometry)?;
                body.write_all(&[1])?;
                body.write_all(&(bytes.len() as u32).to_le_bytes())?;
                body.write_all(&bytes)?;
            }
            None => body.write_all(&[0])?,
        }
    }

    body.write_all(&(graph.edge_count() as u32).to_le_bytes())?;
    for (parent, child) in graph.edges() {
        // Both endpoints are nodes, so both positions exist.
        let parent_pos = positions[parent.as_ref()];
        let child_pos = positions[child.as_ref()];
        body.write_all(&parent_pos.to_le_bytes())?;
        body.write_all(&child_pos.to_le_bytes())?;
    }

    body.finish().context("failed to finish compressed graph body")?;
    Ok(())
}

/// Write the graph blob to `path`, creating parent directories as needed.
pub fn save_graph(graph: &HierarchyGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("cannot create graph file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_graph(graph, &mut writer)?;
    writer.flush()?;
    debug!(path = %path.display(), nodes = graph.node_count(), "persisted hierarchy graph");
    Ok(())
}
