//! Fuzzy file lookup over cached directory indices.
//!
//! Searching is case- and diacritic-insensitive: file names and queries are
//! both normalized before substring comparison. Indices are built once per
//! directory and reused until explicitly dropped.

pub mod cache;
pub mod normalize;

pub use cache::{IndexCache, NameIndex};
pub use normalize::normalize;
