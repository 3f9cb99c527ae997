use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use super::{ByteSource, SourceError};

/// `ByteSource` over any seekable reader.
///
/// The length is measured once when the source is created.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use m4atag_core::{ByteSource, SeekSource};
///
/// let mut source = SeekSource::new(Cursor::new(vec![1, 2, 3, 4]), "memory").unwrap();
/// let mut buf = [0u8; 2];
/// source.read_exact_at(2, &mut buf).unwrap();
/// assert_eq!(buf, [3, 4]);
/// ```
#[derive(Debug)]
pub struct SeekSource<R> {
    inner: R,
    name: String,
    len: u64,
}

/// File-backed source; the handle is closed when the value is dropped.
pub type FileSource = SeekSource<File>;

impl<R: Read + Seek> SeekSource<R> {
    /// Wrap a seekable reader.
    ///
    /// # Errors
    /// Returns `SourceError::Io` when the reader cannot seek to its end.
    pub fn new(mut inner: R, name: impl Into<String>) -> Result<Self, SourceError> {
        let name = name.into();
        let len = inner
            .seek(SeekFrom::End(0))
            .map_err(|source| SourceError::Io {
                name: name.clone(),
                offset: 0,
                source,
            })?;
        Ok(Self { inner, name, len })
    }
}

impl SeekSource<File> {
    /// Open a file for positioned reads.
    ///
    /// # Errors
    /// Returns `SourceError::Open` when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let name = path.display().to_string();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: name.clone(),
            source,
        })?;
        Self::new(file, name)
    }
}

impl<R: Read + Seek> ByteSource for SeekSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<(), SourceError> {
        let available = self.len.saturating_sub(offset);
        if (buf.len() as u64) > available {
            return Err(self.truncated(offset, buf.len(), available));
        }
        self.inner
            .seek(SeekFrom::Start(offset))
            .map_err(|source| SourceError::Io {
                name: self.name.clone(),
                offset,
                source,
            })?;
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            // The reader shrank after the length was measured.
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                Err(self.truncated(offset, buf.len(), available))
            }
            Err(source) => Err(SourceError::Io {
                name: self.name.clone(),
                offset,
                source,
            }),
        }
    }
}

impl<R> SeekSource<R> {
    fn truncated(&self, offset: u64, needed: usize, available: u64) -> SourceError {
        SourceError::Truncated {
            name: self.name.clone(),
            offset,
            needed,
            available,
        }
    }
}
