//! m4atag core library for reading iTunes-style tags from `.m4a` files.
//!
//! The crate walks the MPEG-4 atom tree from the file root down to the
//! metadata item list (`ftyp -> moov -> udta -> meta -> ilst`) and decodes the
//! known items into a flat [`Metadata`] record. Byte access is isolated in
//! `source`; atom framing lives in `atom` (layout/reader/parser) and item
//! decoding in `tags`, so the container walk in `container` stays linear.
//!
//! Invariants:
//! - Atoms are decoded on demand and never retained across calls.
//! - A zero-size atom is the "absent" sentinel and is never dereferenced.
//! - Missing or malformed items degrade to empty strings; only a broken
//!   container walk is a hard error.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use m4atag_core::{MetadataService, Service};
//!
//! let metadata = MetadataService.metadata(Path::new("song.m4a"))?;
//! println!("title: {}", metadata.title);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod atom;
mod container;
mod service;
mod source;
mod tags;

pub use atom::{
    Atom, AtomError, find_child_with_type, parse_atom, read_atom_at, read_sibling,
    read_sibling_with_type,
};
pub use container::{M4aError, is_m4a_container, parse_m4a_file, parse_m4a_source};
pub use service::{MetadataError, MetadataService, Service};
pub use source::{ByteSource, FileSource, SeekSource, SourceError};
pub use tags::genre::predefined_genre_name;

/// Tag values decoded from an audio file.
///
/// Every field is a plain string; an empty string means the tag is absent.
///
/// # Examples
/// ```
/// use m4atag_core::Metadata;
///
/// let metadata = Metadata {
///     title: "Test Song".to_string(),
///     ..Metadata::default()
/// };
/// assert!(metadata.artist.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Metadata {
    pub title: String,
    pub artist: String,
    pub artist_sort: String,
    pub album: String,
    pub album_sort: String,
    pub year: String,
    /// Track number rendered as decimal text.
    pub track: String,
    /// Predefined genre name or free-text genre.
    pub genre: String,
    pub comment: String,
    pub lyrics: String,
    /// Final component of the input path.
    pub file_base: String,
    /// Directory of the input path (`"."` when the path has none).
    pub file_dir: String,
}
