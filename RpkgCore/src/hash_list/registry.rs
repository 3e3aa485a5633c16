//! Shared hash registry
//!
//! Holds the currently loaded [`HashList`] as an immutable snapshot behind a
//! read-write lock. A reload parses the new list completely before taking the
//! write lock, so readers only ever see the old list or the new one.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use super::default_hash_list_path;
use super::parser::{HashEntry, HashList, read_hash_list};
use crate::error::{Error, Result};
use crate::hash::parse_hash;

/// Result of [`HashRegistry::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadOutcome {
    /// The list was parsed and replaced the previous one.
    Loaded {
        path: PathBuf,
        entries: usize,
        version: Option<u32>,
        generation: u64,
    },
    /// Loading failed and was absorbed; the previous state is unchanged.
    Skipped { path: PathBuf, reason: String },
}

impl LoadOutcome {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Process-wide hash → metadata registry.
#[derive(Debug, Default)]
pub struct HashRegistry {
    current: RwLock<Option<Arc<HashList>>>,
    generation: AtomicU64,
}

impl HashRegistry {
    /// Create an empty, unloaded registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a hash list from `path`, or from the default location when `path`
    /// is `None` or empty.
    ///
    /// With `fail_if_missing` set, a missing or malformed list is returned as
    /// an error. Otherwise the failure is logged and reported as
    /// [`LoadOutcome::Skipped`]. Either way the registry is left untouched on
    /// failure.
    pub fn load(&self, path: Option<&Path>, fail_if_missing: bool) -> Result<LoadOutcome> {
        let path = match path {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => default_hash_list_path(),
        };
        tracing::info!("Loading hash list from {}", path.display());

        match read_hash_list(&path) {
            Ok(list) => Ok(self.install(list, path)),
            Err(err) if !fail_if_missing => {
                tracing::warn!("Hash list not loaded ({}): {err}", path.display());
                Ok(LoadOutcome::Skipped {
                    path,
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Replace the current list with an already parsed one.
    pub fn install(&self, list: HashList, path: PathBuf) -> LoadOutcome {
        let entries = list.len();
        let version = list.version;
        // The returned generation must name this snapshot.
        let generation = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = Some(Arc::new(list));
            self.generation.fetch_add(1, Ordering::AcqRel) + 1
        };
        tracing::info!(
            "Hash list loaded: {entries} entries, version {}, generation {generation}",
            version.map_or_else(|| "unknown".to_string(), |v| v.to_string())
        );
        LoadOutcome::Loaded {
            path,
            entries,
            version,
            generation,
        }
    }

    /// Current snapshot, if a list has been loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<HashList>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current snapshot, or [`Error::HashListNotLoaded`].
    pub fn require_loaded(&self) -> Result<Arc<HashList>> {
        self.snapshot().ok_or(Error::HashListNotLoaded)
    }

    /// Look up a hash. Returns `None` both for unknown hashes and when no
    /// list is loaded; use [`is_loaded`](Self::is_loaded) to tell them apart.
    #[must_use]
    pub fn lookup(&self, hash: u64) -> Option<HashEntry> {
        self.snapshot()
            .and_then(|list| list.get(hash).cloned())
    }

    /// Look up a hash given as a string.
    pub fn lookup_str(&self, hash: &str) -> Result<Option<HashEntry>> {
        Ok(self.lookup(parse_hash(hash)?))
    }

    /// Hash a resource path and look it up.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> Option<HashEntry> {
        self.snapshot()
            .and_then(|list| list.resolve_path(path).cloned())
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of successful loads (and clears) so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Version header of the loaded list.
    #[must_use]
    pub fn version(&self) -> Option<u32> {
        self.snapshot().and_then(|list| list.version)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().map_or(0, |list| list.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the loaded list.
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.take().is_some() {
            self.generation.fetch_add(1, Ordering::AcqRel);
            tracing::debug!("Hash list unloaded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn write_list(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_lookup_before_load_misses() {
        let registry = HashRegistry::new();
        assert!(!registry.is_loaded());
        assert_eq!(registry.lookup(0x1234), None);
        assert_eq!(registry.generation(), 0);
        assert!(matches!(
            registry.require_loaded().unwrap_err(),
            Error::HashListNotLoaded
        ));
    }

    #[test]
    fn test_load_and_lookup() {
        let temp = TempDir::new().unwrap();
        let path = write_list(&temp, "hash_list.txt", "#version: 4\n0000000000001234.TEMP,foo.entity\n");

        let registry = HashRegistry::new();
        let outcome = registry.load(Some(&path), true).unwrap();
        assert!(outcome.is_loaded());
        assert!(registry.is_loaded());
        assert_eq!(registry.generation(), 1);
        assert_eq!(registry.version(), Some(4));
        assert_eq!(registry.lookup(0x1234).unwrap().value_string, "foo.entity");
        assert_eq!(registry.lookup(0x9999), None);
    }

    #[test]
    fn test_reload_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = write_list(
            &temp,
            "hash_list.txt",
            "0000000000001234.TEMP,foo.entity\n0000000000005678.TBLU,bar.entity\n",
        );

        let once = HashRegistry::new();
        once.load(Some(&path), true).unwrap();

        let twice = HashRegistry::new();
        twice.load(Some(&path), true).unwrap();
        twice.load(Some(&path), true).unwrap();

        assert_eq!(twice.generation(), 2);
        assert_eq!(*once.snapshot().unwrap(), *twice.snapshot().unwrap());
        for hash in [0x1234, 0x5678, 0x9999] {
            assert_eq!(once.lookup(hash), twice.lookup(hash));
        }
    }

    #[test]
    fn test_corrupt_reload_keeps_previous() {
        let temp = TempDir::new().unwrap();
        let good = write_list(&temp, "good.txt", "0000000000001234.TEMP,foo.entity\n");
        let corrupt = write_list(&temp, "corrupt.txt", "this is not a hash list\n\u{1}\u{2}\n");

        let registry = HashRegistry::new();
        registry.load(Some(&good), true).unwrap();

        let outcome = registry.load(Some(&corrupt), false).unwrap();
        assert!(!outcome.is_loaded());
        assert_eq!(registry.generation(), 1);
        assert_eq!(registry.lookup(0x1234).unwrap().value_string, "foo.entity");
    }

    #[test]
    fn test_fail_if_missing() {
        let temp = TempDir::new().unwrap();
        let registry = HashRegistry::new();

        let err = registry
            .load(Some(&temp.path().join("nope.txt")), true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let outcome = registry
            .load(Some(&temp.path().join("nope.txt")), false)
            .unwrap();
        assert!(matches!(outcome, LoadOutcome::Skipped { .. }));
        assert!(!registry.is_loaded());
    }

    #[test]
    fn test_parse_error_with_fail_if_missing() {
        let temp = TempDir::new().unwrap();
        let corrupt = write_list(&temp, "corrupt.txt", "garbage\n");
        let err = HashRegistry::new().load(Some(&corrupt), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_clear() {
        let registry = HashRegistry::new();
        registry.install(HashList::default(), PathBuf::from("mem"));
        assert!(registry.is_loaded());
        registry.clear();
        assert!(!registry.is_loaded());
        assert_eq!(registry.generation(), 2);
    }

    #[test]
    fn test_missing_path_uses_default_location() {
        let registry = HashRegistry::new();
        for path in [None, Some(Path::new(""))] {
            let outcome = registry.load(path, false).unwrap();
            let (LoadOutcome::Loaded { path, .. } | LoadOutcome::Skipped { path, .. }) = outcome;
            assert_eq!(path, default_hash_list_path());
        }
    }

    #[test]
    fn test_latest_generation_names_installed_list() {
        let registry = Arc::new(HashRegistry::new());
        let installers: Vec<_> = (0..8u32)
            .map(|version| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let list = HashList {
                        version: Some(version),
                        ..HashList::default()
                    };
                    match registry.install(list, PathBuf::from("mem")) {
                        LoadOutcome::Loaded {
                            version, generation, ..
                        } => (generation, version),
                        LoadOutcome::Skipped { .. } => unreachable!(),
                    }
                })
            })
            .collect();

        let mut outcomes: Vec<_> = installers.into_iter().map(|t| t.join().unwrap()).collect();
        outcomes.sort_unstable();
        let generations: Vec<u64> = outcomes.iter().map(|(g, _)| *g).collect();
        assert_eq!(generations, (1..=8).collect::<Vec<u64>>());

        let (last_generation, last_version) = outcomes[7];
        assert_eq!(registry.generation(), last_generation);
        assert_eq!(registry.version(), last_version);
    }

    #[test]
    fn test_concurrent_readers_during_reload() {
        let temp = TempDir::new().unwrap();
        let path = write_list(&temp, "hash_list.txt", "0000000000001234.TEMP,foo.entity\n");

        let registry = Arc::new(HashRegistry::new());
        registry.load(Some(&path), true).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let entry = registry.lookup(0x1234).unwrap();
                        assert_eq!(entry.value_string, "foo.entity");
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            registry.load(Some(&path), true).unwrap();
        }
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(registry.generation(), 21);
    }
}
