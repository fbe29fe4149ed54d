mod graph;
mod index;

pub use graph::HierarchyGraph;
pub use index::HierarchyIndex;
