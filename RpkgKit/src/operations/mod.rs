//! File-level operations used by the toolkit and CLI

pub mod conversion;
pub mod hashing;
