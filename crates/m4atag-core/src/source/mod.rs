mod file;

pub use file::{FileSource, SeekSource};

use thiserror::Error;

/// Random-access byte source that atoms are read from.
///
/// Every read is positioned; implementations keep no cursor semantics that
/// callers rely on between reads.
pub trait ByteSource {
    /// Name used in diagnostics (usually the file path).
    fn name(&self) -> &str;

    /// Total length of the source in bytes.
    fn len(&self) -> u64;

    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns `SourceError::Truncated` when fewer than `buf.len()` bytes are
    /// available at `offset`, and `SourceError::Io` for underlying failures.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error on {name} at {offset:#x}: {source}")]
    Io {
        name: String,
        offset: u64,
        #[source]
        source: std::io::Error,
    },
    #[error("{name}: need {needed} bytes at {offset:#x}, {available} available")]
    Truncated {
        name: String,
        offset: u64,
        needed: usize,
        available: u64,
    },
}
