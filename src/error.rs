use thiserror::Error;

use crate::types::Level;

/// Typed query failures, so callers can tell a bad query (typo in a label,
/// wrong level tag) apart from an empty-but-valid dataset. Empty result sets
/// are surfaced as errors, never as silently-successful empties.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    /// Neither a level nor a label was given.
    #[error("invalid query: needs at least a level or a label")]
    EmptyQuery,

    /// The query string does not name a known classification level.
    #[error("unknown level tag {0:?}")]
    UnknownLevel(String),

    /// An ancestor-constrained search matched nothing.
    #[error("no areas at level {level} with an ancestor matching {ancestor:?}")]
    NoMatchingAreas { level: Level, ancestor: String },

    /// A level/label lookup matched nothing.
    #[error("no areas found (level: {level:?}, label: {label:?})")]
    NotFound {
        level: Option<Level>,
        label: Option<String>,
    },

    /// The named node does not exist in the graph.
    #[error("unknown node {0:?}")]
    UnknownNode(String),
}
