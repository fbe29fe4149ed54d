mod json;
mod read;
mod write;

pub use json::export_node_link_json;
pub use read::{load_graph, read_graph};
pub use write::{save_graph, write_graph};

/// Magic bytes at the start of every persisted graph file.
pub(crate) const MAGIC: &[u8; 4] = b"ABHG";

/// Current file format version.
pub(crate) const VERSION: u8 = 1;
