use log::trace;

use crate::source::{ByteSource, SourceError};

use super::error::AtomError;
use super::{Atom, fourcc_contains};
use super::layout;
use super::reader::AtomReader;

/// Read the atom starting at `offset` in `source`.
///
/// The size field, the type field, and the full contents are read in turn.
/// A size smaller than the 8-byte header or larger than the bytes remaining
/// in the source is rejected before anything is allocated.
///
/// # Errors
/// Returns `AtomError::TruncatedRead` when a field runs past the end of the
/// source, `AtomError::InvalidSize` for an implausible size, and
/// `AtomError::Io` for underlying read failures.
pub fn read_atom_at<S: ByteSource + ?Sized>(
    source: &mut S,
    offset: u64,
) -> Result<Atom, AtomError> {
    let mut header = [0u8; layout::HEADER_LEN];
    read_field(source, offset, "size", &mut header[layout::SIZE_RANGE])?;
    let type_offset = offset.saturating_add(layout::TYPE_RANGE.start as u64);
    read_field(source, type_offset, "type", &mut header[layout::TYPE_RANGE])?;

    let reader = AtomReader::new(&header);
    let size = u64::from(reader.read_size()?);
    let kind = reader.read_kind()?;

    let remaining = source.len().saturating_sub(offset);
    let invalid_size = || AtomError::InvalidSize {
        name: source.name().to_string(),
        kind: String::from_utf8_lossy(&kind).into_owned(),
        offset,
        size,
        remaining,
    };
    if size < layout::HEADER_LEN as u64 || size > remaining {
        return Err(invalid_size());
    }
    let len = usize::try_from(size).map_err(|_| invalid_size())?;

    let mut contents = vec![0u8; len];
    read_field(source, offset, "content", &mut contents)?;

    Ok(Atom {
        start: offset,
        end: offset + size,
        size,
        kind,
        contents,
    })
}

/// Read the atom that immediately follows `atom` in `source`.
///
/// # Errors
/// Propagates the errors of [`read_atom_at`].
pub fn read_sibling<S: ByteSource + ?Sized>(
    source: &mut S,
    atom: &Atom,
) -> Result<Atom, AtomError> {
    trace!("reading sibling of {} atom at {:#x}", atom.kind_str(), atom.end);
    read_atom_at(source, atom.end)
}

/// Walk the siblings following `atom` until one has exactly `target` as type.
///
/// The walk ends when a read fails; every successful read moves forward by at
/// least one header, so the search is bounded by the source length.
///
/// # Errors
/// Returns `AtomError::NotFound` wrapping the read failure that ended the walk.
pub fn read_sibling_with_type<S: ByteSource + ?Sized>(
    source: &mut S,
    atom: &Atom,
    target: &[u8],
) -> Result<Atom, AtomError> {
    let mut current =
        read_sibling(source, atom).map_err(|err| not_found(source, atom, target, err))?;
    loop {
        if current.kind[..] == *target {
            return Ok(current);
        }
        current = match read_sibling(source, &current) {
            Ok(sibling) => sibling,
            Err(err) => return Err(not_found(source, &current, target, err)),
        };
    }
}

/// Search the contents of `parent` for an immediate child whose type contains
/// `target`.
///
/// Scanning starts past the parent's own header. A position that does not
/// decode as an atom is skipped by `RESYNC_STEP` bytes. Returns the absent
/// sentinel when nothing matches.
pub fn find_child_with_type(parent: &Atom, target: &[u8]) -> Atom {
    if parent.is_absent() {
        return Atom::absent();
    }

    let mut cursor = layout::HEADER_LEN;
    while let Some(remaining) = parent.contents.get(cursor..) {
        if remaining.is_empty() {
            break;
        }
        let offset = parent.start + cursor as u64;
        match parse_header(remaining) {
            Some((size, kind)) if fourcc_contains(&kind, target) => {
                return build_atom(&remaining[..size], offset, kind);
            }
            Some((size, _)) => cursor += size,
            None => {
                trace!(
                    "resync in {} atom at {:#x}",
                    String::from_utf8_lossy(&parent.kind),
                    offset
                );
                cursor += layout::RESYNC_STEP;
            }
        }
    }

    Atom::absent()
}

/// Decode an atom from the start of `bytes`, which sit at `offset` in the
/// source.
///
/// Returns `None` when fewer than 8 bytes are available, or when the size
/// field is smaller than the header or larger than `bytes`.
pub fn parse_atom(bytes: &[u8], offset: u64) -> Option<Atom> {
    let (size, kind) = parse_header(bytes)?;
    Some(build_atom(&bytes[..size], offset, kind))
}

fn parse_header(bytes: &[u8]) -> Option<(usize, [u8; 4])> {
    let reader = AtomReader::new(bytes);
    reader.require_len(layout::HEADER_LEN).ok()?;
    let size = usize::try_from(reader.read_size().ok()?).ok()?;
    if size < layout::HEADER_LEN || size > bytes.len() {
        return None;
    }
    Some((size, reader.read_kind().ok()?))
}

fn build_atom(contents: &[u8], offset: u64, kind: [u8; 4]) -> Atom {
    let size = contents.len() as u64;
    Atom {
        start: offset,
        end: offset + size,
        size,
        kind,
        contents: contents.to_vec(),
    }
}

fn read_field<S: ByteSource + ?Sized>(
    source: &mut S,
    offset: u64,
    field: &'static str,
    buf: &mut [u8],
) -> Result<(), AtomError> {
    source
        .read_exact_at(offset, buf)
        .map_err(|err| match err {
            SourceError::Truncated {
                name,
                offset,
                needed,
                available,
            } => AtomError::TruncatedRead {
                name,
                field,
                offset,
                needed,
                available,
            },
            err => AtomError::Io {
                field,
                offset,
                source: err,
            },
        })
}

fn not_found<S: ByteSource + ?Sized>(
    source: &S,
    after: &Atom,
    target: &[u8],
    err: AtomError,
) -> AtomError {
    AtomError::NotFound {
        name: source.name().to_string(),
        after: after.kind_str(),
        target: String::from_utf8_lossy(target).into_owned(),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        find_child_with_type, parse_atom, read_atom_at, read_sibling, read_sibling_with_type,
    };
    use crate::atom::{Atom, error::AtomError};
    use crate::source::{SeekSource, SourceError};
    use std::io::{self, Cursor, Read, Seek, SeekFrom};

    /// Serves the first read, then fails every later one.
    struct FailingReader {
        inner: Cursor<Vec<u8>>,
        reads: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            if self.reads > 1 {
                return Err(io::Error::other("disk gone"));
            }
            self.inner.read(buf)
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let size = (8 + payload.len()) as u32;
        let mut bytes = Vec::with_capacity(size as usize);
        bytes.extend_from_slice(&size.to_be_bytes());
        bytes.extend_from_slice(kind);
        bytes.extend_from_slice(payload);
        bytes
    }

    fn memory(bytes: Vec<u8>) -> SeekSource<Cursor<Vec<u8>>> {
        SeekSource::new(Cursor::new(bytes), "memory").unwrap()
    }

    fn parent(kind: &[u8; 4], children: &[Vec<u8>]) -> Atom {
        let bytes = atom(kind, &children.concat());
        parse_atom(&bytes, 0).unwrap()
    }

    #[test]
    fn read_atom_at_decodes_header() {
        let mut bytes = atom(b"ftyp", b"M4A \0\0\0\0");
        bytes.extend(atom(b"free", &[]));
        let mut source = memory(bytes);

        let ftyp = read_atom_at(&mut source, 0).unwrap();
        assert_eq!(&ftyp.kind, b"ftyp");
        assert_eq!(ftyp.start, 0);
        assert_eq!(ftyp.size, 16);
        assert_eq!(ftyp.end - ftyp.start, ftyp.size);
        assert_eq!(ftyp.contents.len(), 16);
        assert_eq!(ftyp.payload(), b"M4A \0\0\0\0");

        let free = read_atom_at(&mut source, 16).unwrap();
        assert_eq!(&free.kind, b"free");
        assert_eq!(free.end, 24);
    }

    #[test]
    fn read_atom_at_truncated_size() {
        let mut source = memory(vec![0x00, 0x00]);
        let err = read_atom_at(&mut source, 0).unwrap_err();
        assert!(matches!(err, AtomError::TruncatedRead { field: "size", .. }));
    }

    #[test]
    fn read_atom_at_truncated_type() {
        let mut source = memory(vec![0x00, 0x00, 0x00, 0x10, b'm', b'o']);
        let err = read_atom_at(&mut source, 0).unwrap_err();
        assert!(matches!(
            err,
            AtomError::TruncatedRead {
                field: "type",
                offset: 4,
                ..
            }
        ));
    }

    #[test]
    fn read_atom_at_rejects_zero_size() {
        let mut bytes = atom(b"moov", &[0u8; 8]);
        bytes[..4].copy_from_slice(&0u32.to_be_bytes());
        let mut source = memory(bytes);
        let err = read_atom_at(&mut source, 0).unwrap_err();
        assert!(matches!(err, AtomError::InvalidSize { size: 0, .. }));
    }

    #[test]
    fn read_atom_at_rejects_size_past_end() {
        let mut bytes = atom(b"moov", &[0u8; 8]);
        bytes[..4].copy_from_slice(&u32::MAX.to_be_bytes());
        let mut source = memory(bytes);
        let err = read_atom_at(&mut source, 0).unwrap_err();
        match err {
            AtomError::InvalidSize {
                kind,
                size,
                remaining,
                ..
            } => {
                assert_eq!(kind, "moov");
                assert_eq!(size, u64::from(u32::MAX));
                assert_eq!(remaining, 16);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_atom_at_rejects_size_below_header() {
        let mut bytes = atom(b"moov", &[]);
        bytes[..4].copy_from_slice(&4u32.to_be_bytes());
        let mut source = memory(bytes);
        let err = read_atom_at(&mut source, 0).unwrap_err();
        assert!(matches!(err, AtomError::InvalidSize { size: 4, .. }));
    }

    #[test]
    fn read_atom_at_reports_io_failure_with_field_and_offset() {
        let reader = FailingReader {
            inner: Cursor::new(atom(b"moov", &[0u8; 8])),
            reads: 0,
        };
        let mut source = SeekSource::new(reader, "flaky").unwrap();
        let err = read_atom_at(&mut source, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to read type for atom at 0x4: I/O error on flaky at 0x4: disk gone"
        );
        match err {
            AtomError::Io {
                field,
                offset,
                source: SourceError::Io { name, offset: source_offset, .. },
            } => {
                assert_eq!(field, "type");
                assert_eq!(offset, 4);
                assert_eq!(name, "flaky");
                assert_eq!(source_offset, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_sibling_reads_following_atom() {
        let bytes = [atom(b"ftyp", b"M4A "), atom(b"moov", b"abc")].concat();
        let mut source = memory(bytes);
        let ftyp = read_atom_at(&mut source, 0).unwrap();
        let moov = read_sibling(&mut source, &ftyp).unwrap();
        assert_eq!(&moov.kind, b"moov");
        assert_eq!(moov.start, ftyp.end);
        assert_eq!(moov.payload(), b"abc");
    }

    #[test]
    fn read_sibling_with_type_returns_first_match() {
        let bytes = [
            atom(b"ftyp", b"M4A "),
            atom(b"aaaa", b"1"),
            atom(b"bbbb", b"22"),
            atom(b"cccc", b"333"),
            atom(b"bbbb", b"4444"),
        ]
        .concat();
        let mut source = memory(bytes);
        let ftyp = read_atom_at(&mut source, 0).unwrap();

        let found = read_sibling_with_type(&mut source, &ftyp, b"bbbb").unwrap();
        assert_eq!(found.start, 12 + 9);
        assert_eq!(found.payload(), b"22");

        let found = read_sibling_with_type(&mut source, &ftyp, b"cccc").unwrap();
        assert_eq!(found.payload(), b"333");
    }

    #[test]
    fn read_sibling_with_type_requires_exact_type() {
        let bytes = [atom(b"ftyp", b"M4A "), atom(b"xmoo", &[])].concat();
        let mut source = memory(bytes);
        let ftyp = read_atom_at(&mut source, 0).unwrap();
        let err = read_sibling_with_type(&mut source, &ftyp, b"moo").unwrap_err();
        assert!(matches!(err, AtomError::NotFound { .. }));
    }

    #[test]
    fn read_sibling_with_type_not_found_at_end_of_source() {
        let bytes = [atom(b"ftyp", b"M4A "), atom(b"free", &[])].concat();
        let mut source = memory(bytes);
        let ftyp = read_atom_at(&mut source, 0).unwrap();

        let err = read_sibling_with_type(&mut source, &ftyp, b"moov").unwrap_err();
        match err {
            AtomError::NotFound {
                after,
                target,
                source,
                ..
            } => {
                assert_eq!(after, "free");
                assert_eq!(target, "moov");
                assert!(matches!(*source, AtomError::TruncatedRead { field: "size", .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_sibling_with_type_stops_on_zero_size() {
        let mut zero = atom(b"skip", &[0u8; 4]);
        zero[..4].copy_from_slice(&0u32.to_be_bytes());
        let bytes = [atom(b"ftyp", b"M4A "), zero, atom(b"moov", &[])].concat();
        let mut source = memory(bytes);
        let ftyp = read_atom_at(&mut source, 0).unwrap();

        let err = read_sibling_with_type(&mut source, &ftyp, b"moov").unwrap_err();
        match err {
            AtomError::NotFound { source, .. } => {
                assert!(matches!(*source, AtomError::InvalidSize { size: 0, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn find_child_in_childless_parent_is_absent() {
        let header_only = parent(b"udta", &[]);
        assert!(find_child_with_type(&header_only, b"meta").is_absent());

        let short = Atom {
            start: 0,
            end: 4,
            size: 4,
            kind: *b"udta",
            contents: vec![0, 0, 0, 4],
        };
        assert!(find_child_with_type(&short, b"meta").is_absent());
        assert!(find_child_with_type(&Atom::absent(), b"meta").is_absent());
    }

    #[test]
    fn find_child_skips_other_children() {
        let moov = parent(b"moov", &[atom(b"mvhd", &[0u8; 12]), atom(b"udta", b"xy")]);
        let udta = find_child_with_type(&moov, b"udta");
        assert!(!udta.is_absent());
        assert_eq!(&udta.kind, b"udta");
        assert_eq!(udta.start, 8 + 20);
        assert_eq!(udta.size, 10);
        assert_eq!(udta.payload(), b"xy");
    }

    #[test]
    fn find_child_matches_vendor_prefixed_type() {
        let ilst = parent(b"ilst", &[atom(b"trkn", &[0u8; 4]), atom(b"\xa9nam", b"title")]);
        let name = find_child_with_type(&ilst, b"nam");
        assert_eq!(&name.kind, b"\xa9nam");
        assert_eq!(name.payload(), b"title");
    }

    #[test]
    fn find_child_resyncs_after_undecodable_bytes() {
        let mut children = vec![0u8; 4];
        children.extend(atom(b"meta", b"ok"));
        let udta = parent(b"udta", &[children]);
        let meta = find_child_with_type(&udta, b"meta");
        assert_eq!(meta.start, 12);
        assert_eq!(meta.payload(), b"ok");
    }

    #[test]
    fn find_child_makes_progress_past_size_below_header() {
        let mut tiny = atom(b"junk", &[]);
        tiny[..4].copy_from_slice(&4u32.to_be_bytes());
        let udta = parent(b"udta", &[tiny, atom(b"meta", b"ok")]);
        let meta = find_child_with_type(&udta, b"meta");
        assert_eq!(&meta.kind, b"meta");
        assert_eq!(meta.start, 16);
        assert_eq!(meta.payload(), b"ok");
    }

    #[test]
    fn find_child_resyncs_past_oversized_child() {
        let mut broken = atom(b"junk", &[]);
        broken[..4].copy_from_slice(&1000u32.to_be_bytes());
        let udta = parent(b"udta", &[broken, atom(b"meta", &[])]);
        let meta = find_child_with_type(&udta, b"meta");
        assert_eq!(&meta.kind, b"meta");
        assert_eq!(meta.start, 16);
    }

    #[test]
    fn find_child_returns_absent_when_exhausted() {
        let mut trailing = atom(b"free", &[]);
        trailing.extend_from_slice(&[1, 2, 3]);
        let udta = parent(b"udta", &[trailing]);
        assert!(find_child_with_type(&udta, b"meta").is_absent());
    }

    #[test]
    fn parse_atom_rejects_bad_sizes() {
        assert!(parse_atom(&[0u8; 7], 0).is_none());
        let mut bytes = atom(b"data", b"x");
        assert!(parse_atom(&bytes, 0).is_some());
        bytes[..4].copy_from_slice(&10u32.to_be_bytes());
        assert!(parse_atom(&bytes, 0).is_none());
        bytes[..4].copy_from_slice(&0u32.to_be_bytes());
        assert!(parse_atom(&bytes, 0).is_none());
    }
}
