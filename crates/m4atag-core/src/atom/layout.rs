pub const SIZE_RANGE: std::ops::Range<usize> = 0..4;
pub const TYPE_RANGE: std::ops::Range<usize> = 4..8;
pub const HEADER_LEN: usize = 8;

/// Step taken by child search after a position fails to decode.
pub const RESYNC_STEP: usize = 4;

pub const SIGNATURE_OFFSET: u64 = 4;
pub const SIGNATURE: &[u8; 7] = b"ftypM4A";

pub const MOOV: &[u8; 4] = b"moov";
pub const UDTA: &[u8; 4] = b"udta";
pub const META: &[u8; 4] = b"meta";
pub const ILST: &[u8; 4] = b"ilst";
