use thiserror::Error;

/// Errors raised while unwrapping a single item.
///
/// These never leave the `tags` module; the decoder turns them into empty
/// fields.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("item too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}
