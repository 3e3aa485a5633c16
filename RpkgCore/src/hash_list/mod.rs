//! Hash list loading and lookup
//!
//! - [`parser`] reads the `hash_list.txt` text format
//! - [`registry`] holds the loaded list for concurrent lookup

pub mod parser;
pub mod registry;

use std::path::{Path, PathBuf};

pub use parser::{HashEntry, HashList, parse_hash_list, read_hash_list};
pub use registry::{HashRegistry, LoadOutcome};

/// File name of the hash list the tool ships with.
pub const HASH_LIST_FILE_NAME: &str = "hash_list.txt";

/// Default hash list location.
///
/// Prefers `hash_list.txt` next to the running executable, falling back to
/// the working directory.
#[must_use]
pub fn default_hash_list_path() -> PathBuf {
    let exe = std::env::current_exe().ok();
    hash_list_path_near(exe.as_deref().and_then(Path::parent))
}

/// `hash_list.txt` in `dir` if it exists there, else the relative name.
fn hash_list_path_near(dir: Option<&Path>) -> PathBuf {
    dir.map(|dir| dir.join(HASH_LIST_FILE_NAME))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(HASH_LIST_FILE_NAME))
}
