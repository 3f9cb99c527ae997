use std::path::Path;

use log::debug;

use crate::Metadata;
use crate::atom::{Atom, find_child_with_type};

use super::error::TagError;
use super::genre::predefined_genre_name;
use super::layout;
use super::reader::{DataAtomReader, ValueReader};

/// Decode the known items of an `ilst` atom into a `Metadata` record.
///
/// `path` only feeds the file base name and directory; the file itself is
/// not touched.
pub fn decode_item_list(ilst: &Atom, path: &Path) -> Metadata {
    let (file_base, file_dir) = path_parts(path);
    Metadata {
        title: decode_item(ilst, layout::TITLE, decode_text),
        artist: decode_item(ilst, layout::ARTIST, decode_text),
        artist_sort: decode_item(ilst, layout::ARTIST_SORT, decode_text),
        album: decode_item(ilst, layout::ALBUM, decode_text),
        album_sort: decode_item(ilst, layout::ALBUM_SORT, decode_text),
        year: decode_item(ilst, layout::YEAR, decode_text),
        track: decode_item(ilst, layout::TRACK, decode_track),
        genre: decode_genre(ilst),
        comment: decode_item(ilst, layout::COMMENT, decode_text),
        lyrics: decode_item(ilst, layout::LYRICS, decode_text),
        file_base,
        file_dir,
    }
}

fn decode_item(
    ilst: &Atom,
    code: &[u8],
    decode: fn(&[u8]) -> Result<String, TagError>,
) -> String {
    let item = find_child_with_type(ilst, code);
    if item.is_absent() {
        debug!("{} item absent", String::from_utf8_lossy(code));
        return String::new();
    }
    decode_value(&item, decode)
}

fn decode_value(item: &Atom, decode: fn(&[u8]) -> Result<String, TagError>) -> String {
    let reader = DataAtomReader::new(&item.contents);
    match reader.read_header() {
        Ok(header) if &header.kind != layout::DATA => debug!(
            "{} item at {:#x} holds {} instead of data",
            item.kind_str(),
            item.start,
            String::from_utf8_lossy(&header.kind)
        ),
        Ok(header) => debug!(
            "{} item at {:#x}: type set {}, well-known type {}, country {}, language {}, {} bytes",
            item.kind_str(),
            item.start,
            header.type_set,
            header.well_known_type,
            header.country,
            header.language,
            header.size
        ),
        Err(_) => {}
    }

    match reader.value().and_then(decode) {
        Ok(value) => value,
        Err(err) => {
            debug!("{} item at {:#x} ignored: {}", item.kind_str(), item.start, err);
            String::new()
        }
    }
}

fn decode_text(value: &[u8]) -> Result<String, TagError> {
    Ok(ValueReader::new(value).read_text())
}

fn decode_track(value: &[u8]) -> Result<String, TagError> {
    let number = ValueReader::new(value).read_u32_be(layout::TRACK_NUMBER_RANGE)?;
    Ok(number.to_string())
}

fn decode_genre(ilst: &Atom) -> String {
    let coded = find_child_with_type(ilst, layout::GENRE_CODE);
    if !coded.is_absent() {
        return decode_value(&coded, decode_genre_code);
    }
    decode_item(ilst, layout::GENRE_TEXT, decode_text)
}

/// Stored codes are 1-based; an unmapped code falls back to the raw bytes.
fn decode_genre_code(value: &[u8]) -> Result<String, TagError> {
    let reader = ValueReader::new(value);
    let name = reader
        .read_u16_be(layout::GENRE_CODE_RANGE)
        .ok()
        .and_then(|code| code.checked_sub(1))
        .and_then(predefined_genre_name);
    Ok(match name {
        Some(name) => name.to_string(),
        None => reader.read_text(),
    })
}

fn path_parts(path: &Path) -> (String, String) {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let dir = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => ".".to_string(),
        Some(parent) => parent.display().to_string(),
        None => path.display().to_string(),
    };
    (base, dir)
}
