use thiserror::Error;

use crate::source::SourceError;

/// Errors returned while reading atoms.
#[derive(Debug, Error)]
pub enum AtomError {
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("failed to read {field} for atom at {offset:#x}: {source}")]
    Io {
        field: &'static str,
        offset: u64,
        #[source]
        source: SourceError,
    },
    #[error("truncated {field} for atom in {name} at {offset:#x}: need {needed} bytes, {available} available")]
    TruncatedRead {
        name: String,
        field: &'static str,
        offset: u64,
        needed: usize,
        available: u64,
    },
    #[error("invalid size {size} for {kind} atom in {name} at {offset:#x}: {remaining} bytes remain")]
    InvalidSize {
        name: String,
        kind: String,
        offset: u64,
        size: u64,
        remaining: u64,
    },
    #[error("no sibling of {after} atom in {name} with target type {target}")]
    NotFound {
        name: String,
        after: String,
        target: String,
        #[source]
        source: Box<AtomError>,
    },
}
