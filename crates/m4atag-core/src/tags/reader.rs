use super::error::TagError;
use super::layout;

/// Fixed header of the `data` atom nested in an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub size: u32,
    pub kind: [u8; 4],
    pub type_set: u8,
    pub well_known_type: u32,
    pub country: u16,
    pub language: u16,
}

/// Reads the `data` atom of an item atom (`contents` includes the item's
/// own 8-byte header).
///
/// The data header is always assumed to be the 16-byte minimal layout.
pub struct DataAtomReader<'a> {
    item: &'a [u8],
}

impl<'a> DataAtomReader<'a> {
    pub fn new(item: &'a [u8]) -> Self {
        Self { item }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), TagError> {
        if self.item.len() < needed {
            return Err(TagError::TooShort {
                needed,
                actual: self.item.len(),
            });
        }
        Ok(())
    }

    pub fn read_header(&self) -> Result<DataHeader, TagError> {
        self.require_len(layout::VALUE_OFFSET)?;
        let data = ValueReader::new(&self.item[layout::ITEM_HEADER_LEN..]);
        let kind = data.read_slice(layout::DATA_TYPE_RANGE)?;
        let well_known_type = data.read_slice(layout::DATA_WELL_KNOWN_TYPE_RANGE)?;
        Ok(DataHeader {
            size: data.read_u32_be(layout::DATA_SIZE_RANGE)?,
            kind: [kind[0], kind[1], kind[2], kind[3]],
            type_set: data.read_u8(layout::DATA_TYPE_SET_OFFSET)?,
            well_known_type: u32::from_be_bytes([
                0,
                well_known_type[0],
                well_known_type[1],
                well_known_type[2],
            ]),
            country: data.read_u16_be(layout::DATA_COUNTRY_RANGE)?,
            language: data.read_u16_be(layout::DATA_LANGUAGE_RANGE)?,
        })
    }

    /// Raw value following the data header.
    pub fn value(&self) -> Result<&'a [u8], TagError> {
        self.require_len(layout::VALUE_OFFSET)?;
        self.item.get(layout::VALUE_OFFSET..).ok_or(TagError::TooShort {
            needed: layout::VALUE_OFFSET,
            actual: self.item.len(),
        })
    }
}

/// Bounds-checked big-endian access to an item value.
pub struct ValueReader<'a> {
    value: &'a [u8],
}

impl<'a> ValueReader<'a> {
    pub fn new(value: &'a [u8]) -> Self {
        Self { value }
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, TagError> {
        self.value.get(offset).copied().ok_or(TagError::TooShort {
            needed: offset + 1,
            actual: self.value.len(),
        })
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, TagError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(TagError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32_be(&self, range: std::ops::Range<usize>) -> Result<u32, TagError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 4 {
            return Err(TagError::TooShort {
                needed: 4,
                actual: bytes.len(),
            });
        }
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], TagError> {
        self.value.get(range.clone()).ok_or(TagError::TooShort {
            needed: range.end,
            actual: self.value.len(),
        })
    }

    pub fn read_text(&self) -> String {
        String::from_utf8_lossy(self.value).into_owned()
    }
}
