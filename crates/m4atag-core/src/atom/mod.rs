//! MPEG-4 atom framing.
//!
//! An atom starts with a 4-byte big-endian size (header included) followed by
//! a 4-character type tag. `layout` holds the byte positions, `reader` the
//! bounds-checked access over in-memory buffers, and `parser` the traversal
//! operations (sibling reads from a `ByteSource`, child search in memory).
//!
//! Child search is deliberately fuzzy: a type matches when it contains the
//! target (so `"nam"` finds the vendor-prefixed `"\xa9nam"`), and a position
//! that fails to decode is skipped by a fixed 4-byte step instead of aborting.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::AtomError;
pub use parser::{
    find_child_with_type, parse_atom, read_atom_at, read_sibling, read_sibling_with_type,
};

/// One node of the atom tree, covering `[start, end)` in its source.
///
/// `contents` holds the whole atom including its 8-byte header. The default
/// value (size 0) is the "absent" sentinel returned by child search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Atom {
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub kind: [u8; 4],
    pub contents: Vec<u8>,
}

impl Atom {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.size == 0
    }

    /// Type tag as text, with non-UTF-8 bytes replaced.
    pub fn kind_str(&self) -> String {
        String::from_utf8_lossy(&self.kind).into_owned()
    }

    /// Bytes following the 8-byte header.
    pub fn payload(&self) -> &[u8] {
        self.contents.get(layout::HEADER_LEN..).unwrap_or(&[])
    }
}

/// Whether a type tag contains `target` anywhere.
pub(crate) fn fourcc_contains(kind: &[u8; 4], target: &[u8]) -> bool {
    target.is_empty() || kind.windows(target.len()).any(|window| window == target)
}
