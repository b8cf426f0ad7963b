//! Core type definitions for docmeta.
//!
//! This crate defines the addressing scheme every other layer agrees on:
//! - [`Path`]: dot-separated field paths with numeric array indexes
//! - [`ANY`]: the single-segment wildcard used by array elements and projections
//!
//! Field Tree full paths, projection rules and role-map entries are all
//! expressed as [`Path`]s, so they compare with the same matching rules.

mod path;

pub use path::{ANY, Path};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or building a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid path '{0}': empty segment")]
    EmptySegment(String),
}
