use super::error::AtomError;
use super::layout;

pub struct AtomReader<'a> {
    bytes: &'a [u8],
}

impl<'a> AtomReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), AtomError> {
        if self.bytes.len() < needed {
            return Err(AtomError::TooShort {
                needed,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], AtomError> {
        self.bytes.get(range.clone()).ok_or(AtomError::TooShort {
            needed: range.end,
            actual: self.bytes.len(),
        })
    }

    pub fn read_u32_be(&self, range: std::ops::Range<usize>) -> Result<u32, AtomError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 4 {
            return Err(AtomError::TooShort {
                needed: 4,
                actual: bytes.len(),
            });
        }
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_fourcc(&self, range: std::ops::Range<usize>) -> Result<[u8; 4], AtomError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 4 {
            return Err(AtomError::TooShort {
                needed: 4,
                actual: bytes.len(),
            });
        }
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    pub fn read_size(&self) -> Result<u32, AtomError> {
        self.read_u32_be(layout::SIZE_RANGE)
    }

    pub fn read_kind(&self) -> Result<[u8; 4], AtomError> {
        self.read_fourcc(layout::TYPE_RANGE)
    }
}
