use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::Metadata;
use crate::container::{M4aError, parse_m4a_file};

/// Caller-facing errors. Internal offsets stay in the `source` chain.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to parse metadata for filepath: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: M4aError,
    },
    #[error("unable to parse metadata for extension: {extension}")]
    UnsupportedContainer { extension: String },
}

/// Fetches the metadata of an audio file.
pub trait Service {
    fn metadata(&self, path: &Path) -> Result<Metadata, MetadataError>;
}

/// Selects a parser by file extension; only `.m4a` is handled.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataService;

impl Service for MetadataService {
    fn metadata(&self, path: &Path) -> Result<Metadata, MetadataError> {
        let extension = extension_of(path);
        match extension.as_str() {
            ".m4a" => parse_m4a_file(path).map_err(|source| MetadataError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            _ => Err(MetadataError::UnsupportedContainer { extension }),
        }
    }
}

/// Lowercased extension with its leading dot, or an empty string.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{MetadataError, MetadataService, Service, extension_of};
    use std::error::Error;
    use std::path::Path;

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(extension_of(Path::new("a/Song.M4A")), ".m4a");
        assert_eq!(extension_of(Path::new("song.mp3")), ".mp3");
        assert_eq!(extension_of(Path::new("song")), "");
    }

    #[test]
    fn unsupported_extension() {
        let err = MetadataService
            .metadata(Path::new("song.mp3"))
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::UnsupportedContainer { ref extension } if extension == ".mp3"
        ));
        assert_eq!(
            err.to_string(),
            "unable to parse metadata for extension: .mp3"
        );
    }

    #[test]
    fn parse_failure_hides_details_but_keeps_source() {
        let err = MetadataService
            .metadata(Path::new("missing/dir/song.m4a"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "failed to parse metadata for filepath: {}",
                Path::new("missing/dir/song.m4a").display()
            )
        );
        assert!(err.source().is_some());
    }
}
