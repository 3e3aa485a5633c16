//! Registered resource packages

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// An `.rpkg` archive known to the toolkit.
///
/// The archive itself is not opened here; only its location is tracked, in
/// registration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageEntry {
    pub path: PathBuf,
}

impl PackageEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Archive file name, e.g. `chunk0patch2.rpkg`.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let base = PackageEntry::new("Runtime/chunk0.rpkg");
        let patch = PackageEntry::new("Runtime/chunk0patch3.rpkg");
        assert_eq!(base.name(), "chunk0.rpkg");
        assert_eq!(patch.name(), "chunk0patch3.rpkg");
        assert_eq!(PackageEntry::new("chunk1.rpkg").path(), Path::new("chunk1.rpkg"));
    }
}
