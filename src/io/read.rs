//! Reading the persisted graph blob.

use std::{fs::File, io::{BufReader, Read}, path::Path};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tracing::debug;

use crate::{geom::wkb, graph::HierarchyGraph, types::{Level, Region}};

use super::{MAGIC, VERSION};

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

fn read_string(reader: &mut impl Read) -> Result<String> {
    let len = read_u32(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    String::from_utf8(buf).context("invalid UTF-8 in graph file")
}

fn read_opt_string(reader: &mut impl Read) -> Result<Option<String>> {
    Ok(match read_u8(reader)? {
        0 => None,
        _ => Some(read_string(reader)?),
    })
}

/// Deserialise a graph written by [`super::write_graph`].
pub fn read_graph(reader: &mut impl Read) -> Result<HierarchyGraph> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).context("graph file too short for header")?;
    if &magic != MAGIC {
        bail!("not a hierarchy graph file (bad magic bytes)");
    }
    let version = read_u8(reader)?;
    if version != VERSION {
        bail!("unsupported graph file version: {version}");
    }

    let mut body = GzDecoder::new(reader);
    let mut graph = HierarchyGraph::new();

    let node_count = read_u32(&mut body)? as usize;
    let mut ids = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let id = read_string(&mut body)?;
        let label = read_opt_string(&mut body)?;
        let tag = read_string(&mut body)?;
        let level = Level::from_tag(&tag)
            .with_context(|| format!("unknown level tag {tag:?} in graph file"))?;
        let area_sqkm = match read_u8(&mut body)? {
            0 => None,
            _ => Some(read_f64(&mut body)?),
        };
        let uri = read_opt_string(&mut body)?;
        let geometry = match read_u8(&mut body)? {
            0 => None,
            _ => {
                let len = read_u32(&mut body)? as usize;
                let mut bytes = vec![0u8; len];
                body.read_exact(&mut bytes)?;
                Some(wkb::multipolygon_from_wkb(&mut bytes.as_slice())?)
            }
        };

        let region = Region {
            id: id.clone().into(),
            label: label.map(Into::into),
            level,
            area_sqkm,
            geometry,
            uri,
        };
        if !graph.add_node(region) {
            bail!("duplicate node id {id:?} in graph file");
        }
        ids.push(id);
    }

    let edge_count = read_u32(&mut body)? as usize;
    for _ in 0..edge_count {
        let parent = read_u32(&mut body)? as usize;
        let child = read_u32(&mut body)? as usize;
        let (Some(parent), Some(child)) = (ids.get(parent), ids.get(child)) else {
            bail!("edge references node position out of range in graph file");
        };
        graph.add_edge(parent, child)?;
    }

    Ok(graph)
}

/// Load a persisted graph. A missing file is the expected first-run state
/// and yields `Ok(None)` rather than an error.
pub fn load_graph(path: &Path) -> Result<Option<HierarchyGraph>> {
    if !path.exists() {
        debug!(path = %path.display(), "no persisted hierarchy graph yet");
        return Ok(None);
    }
    let file = File::open(path)
        .with_context(|| format!("cannot open graph file {}", path.display()))?;
    let graph = read_graph(&mut BufReader::new(file))
        .with_context(|| format!("cannot read graph file {}", path.display()))?;
    debug!(path = %path.display(), nodes = graph.node_count(), "loaded hierarchy graph");
    Ok(Some(graph))
}
