/// Size and type of the item atom that wraps the `data` atom.
pub const ITEM_HEADER_LEN: usize = 8;

// Data atom header, relative to the start of the data atom.
pub const DATA_SIZE_RANGE: std::ops::Range<usize> = 0..4;
pub const DATA_TYPE_RANGE: std::ops::Range<usize> = 4..8;
pub const DATA_TYPE_SET_OFFSET: usize = 8;
pub const DATA_WELL_KNOWN_TYPE_RANGE: std::ops::Range<usize> = 9..12;
pub const DATA_COUNTRY_RANGE: std::ops::Range<usize> = 12..14;
pub const DATA_LANGUAGE_RANGE: std::ops::Range<usize> = 14..16;
pub const DATA_HEADER_LEN: usize = 16;

/// Offset of the raw value within the item atom.
pub const VALUE_OFFSET: usize = ITEM_HEADER_LEN + DATA_HEADER_LEN;

pub const DATA: &[u8; 4] = b"data";

pub const TITLE: &[u8] = b"nam";
pub const ARTIST: &[u8] = b"ART";
pub const ARTIST_SORT: &[u8] = b"soar";
pub const ALBUM: &[u8] = b"alb";
pub const ALBUM_SORT: &[u8] = b"soal";
pub const YEAR: &[u8] = b"day";
pub const TRACK: &[u8] = b"trkn";
pub const GENRE_CODE: &[u8] = b"gnre";
pub const GENRE_TEXT: &[u8] = b"gen";
pub const COMMENT: &[u8] = b"cmt";
pub const LYRICS: &[u8] = b"lyr";

// Value layouts.
pub const TRACK_NUMBER_RANGE: std::ops::Range<usize> = 0..4;
pub const GENRE_CODE_RANGE: std::ops::Range<usize> = 0..2;
