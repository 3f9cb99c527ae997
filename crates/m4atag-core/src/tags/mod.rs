//! Item-list (`ilst`) decoding.
//!
//! Each known item is located by child search on the `ilst` atom, then its
//! `data` sub-atom is unwrapped with a fixed 16-byte header and the value is
//! decoded as text, a 32-bit track number, or a 16-bit genre code.
//!
//! Decoding never fails: an absent or malformed item becomes an empty string.

pub mod error;
pub mod genre;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::decode_item_list;
