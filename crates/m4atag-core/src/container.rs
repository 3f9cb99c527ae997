use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::Metadata;
use crate::atom::{
    Atom, AtomError, find_child_with_type, layout, read_atom_at, read_sibling_with_type,
};
use crate::source::{ByteSource, FileSource, SourceError};
use crate::tags::decode_item_list;

#[derive(Debug, Error)]
pub enum M4aError {
    #[error("I/O error: {0}")]
    Io(#[from] SourceError),
    #[error("{name} does not use the M4A container")]
    UnsupportedContainer { name: String },
    #[error("atom error: {0}")]
    Atom(#[from] AtomError),
    #[error("failed to parse {atom} atom")]
    MissingAtom { atom: &'static str },
}

/// Parse the tags of the `.m4a` file at `path`.
///
/// The file handle is owned by this call and closed before it returns.
///
/// # Errors
/// See [`parse_m4a_source`]; opening the file can also fail with
/// `M4aError::Io`.
pub fn parse_m4a_file(path: &Path) -> Result<Metadata, M4aError> {
    let mut source = FileSource::open(path)?;
    parse_m4a_source(&mut source, path)
}

/// Walk `ftyp -> moov -> udta -> meta -> ilst` in `source` and decode the
/// item list. `path` only provides the file name fields of the record.
///
/// # Errors
/// - `M4aError::UnsupportedContainer` when the `ftypM4A` signature is missing.
/// - `M4aError::Atom` when `ftyp` or `moov` cannot be read.
/// - `M4aError::MissingAtom` when `udta`, `meta`, or `ilst` is absent.
pub fn parse_m4a_source<S: ByteSource + ?Sized>(
    source: &mut S,
    path: &Path,
) -> Result<Metadata, M4aError> {
    if !is_m4a_container(source)? {
        return Err(M4aError::UnsupportedContainer {
            name: source.name().to_string(),
        });
    }

    let ftyp = read_atom_at(source, 0)?;
    located(&ftyp);
    let moov = read_sibling_with_type(source, &ftyp, layout::MOOV)?;
    located(&moov);
    let udta = require_child(&moov, layout::UDTA, "udta")?;
    let meta = require_child(&udta, layout::META, "meta")?;
    let ilst = require_child(&meta, layout::ILST, "ilst")?;

    Ok(decode_item_list(&ilst, path))
}

/// Check the file-type signature (`ftypM4A`, any case) at offset 4.
///
/// A source too short to hold the signature is not an M4A container.
///
/// # Errors
/// Returns `SourceError` when the signature bytes cannot be read.
pub fn is_m4a_container<S: ByteSource + ?Sized>(source: &mut S) -> Result<bool, SourceError> {
    let needed = layout::SIGNATURE_OFFSET + layout::SIGNATURE.len() as u64;
    if source.len() < needed {
        return Ok(false);
    }
    let mut signature = [0u8; 7];
    source.read_exact_at(layout::SIGNATURE_OFFSET, &mut signature)?;
    Ok(signature.eq_ignore_ascii_case(layout::SIGNATURE))
}

fn require_child(parent: &Atom, target: &[u8], atom: &'static str) -> Result<Atom, M4aError> {
    let child = find_child_with_type(parent, target);
    if child.is_absent() {
        return Err(M4aError::MissingAtom { atom });
    }
    located(&child);
    Ok(child)
}

fn located(atom: &Atom) {
    debug!(
        "located {} atom at {:#x} ({} bytes)",
        atom.kind_str(),
        atom.start,
        atom.size
    );
}
