//! `RpkgKit` - Hitman resource toolkit
//!
//! [`Toolkit`] is the single context object front ends work through. It owns
//! the hash registry, the attached resource converter, the registered
//! packages, and the [`SharedStatus`] a UI polls for progress.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

// Re-export rpkgcore
pub use rpkgcore;

pub mod config;
pub mod error;
pub mod operations;
pub mod packages;
pub mod status;

pub use config::KitConfig;
pub use error::{Error, Result};
pub use packages::PackageEntry;
pub use status::{SharedStatus, TaskStatus};

use rpkgcore::converter::plugin::{GameVersion, ResourceLibrary};
use rpkgcore::converter::{ConversionMode, Converter, ResourceConverter};
use rpkgcore::hash::{self, HashFormat};
use rpkgcore::hash_list::{HashEntry, HashRegistry, LoadOutcome};

/// Main toolkit interface
pub struct Toolkit {
    config: KitConfig,
    registry: Arc<HashRegistry>,
    converter: RwLock<Option<Converter>>,
    status: SharedStatus,
    packages: RwLock<Vec<PackageEntry>>,
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new(KitConfig::default())
    }
}

impl Toolkit {
    #[must_use]
    pub fn new(config: KitConfig) -> Self {
        Self {
            config,
            registry: Arc::new(HashRegistry::new()),
            converter: RwLock::new(None),
            status: SharedStatus::new(),
            packages: RwLock::new(Vec::new()),
        }
    }

    /// Toolkit using the user's saved configuration.
    #[must_use]
    pub fn from_user_config() -> Self {
        Self::new(KitConfig::load())
    }

    #[must_use]
    pub fn config(&self) -> &KitConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> &SharedStatus {
        &self.status
    }

    /// Shared registry handle, for lookups from worker threads.
    #[must_use]
    pub fn registry(&self) -> &Arc<HashRegistry> {
        &self.registry
    }

    /// Run `op` as a single task, recording its outcome in the status.
    fn track<T>(
        &self,
        task: &str,
        op: impl FnOnce() -> Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        self.status.begin_single(task);
        match op() {
            Ok(value) => {
                self.status.finish_single(&describe(&value));
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("{task} failed: {err}");
                self.status.fail_single(&err);
                Err(err)
            }
        }
    }

    // ==================== Hash list ====================

    /// Load the hash list from `path`, or from the configured location.
    /// With neither set, `hash_list.txt` next to the executable is used,
    /// then the one in the working directory.
    ///
    /// Without `fail_if_missing`, a missing or malformed list is reported as
    /// [`LoadOutcome::Skipped`] and the status ends as
    /// [`TaskStatus::Exited`]; any previously loaded list stays in place.
    pub fn load_hash_list(&self, path: Option<&Path>, fail_if_missing: bool) -> Result<LoadOutcome> {
        let path = path.or(self.config.hash_list_path.as_deref());
        self.status.begin_single("Loading hash list");

        let outcome = match self.registry.load(path, fail_if_missing) {
            Ok(outcome) => outcome,
            Err(err) => {
                let err = Error::from(err);
                self.status.fail_single(&err);
                return Err(err);
            }
        };

        match &outcome {
            LoadOutcome::Loaded { entries, .. } => {
                self.status.finish_single(&format!("Loaded {entries} hashes"));
            }
            LoadOutcome::Skipped { reason, .. } => {
                self.status
                    .exit_single(&format!("Hash list not loaded: {reason}"));
            }
        }
        Ok(outcome)
    }

    /// Look up a hash such as `00D5CB7E6D04E32C` or `00D5CB7E6D04E32C.TEMP`.
    ///
    /// `Ok(None)` means a miss; check [`HashRegistry::is_loaded`] to know
    /// whether the miss is authoritative.
    pub fn lookup_hash(&self, hash: &str) -> Result<Option<HashEntry>> {
        let loaded = self.registry.is_loaded();
        self.track(
            "Looking up hash",
            || Ok(self.registry.lookup_str(hash)?),
            |found| match found {
                Some(entry) => format!("{} → {}", entry.display_string, entry.display_name()),
                None if loaded => format!("{hash} not found in hash list"),
                None => "Hash list not loaded".to_string(),
            },
        )
    }

    /// Best human-readable name for a hash.
    ///
    /// Falls back from the value string to the file name, then to the
    /// canonical hash itself when the hash is unknown.
    pub fn resolve_hash_name(&self, text: &str) -> Result<String> {
        self.track(
            "Resolving hash name",
            || {
                let value = hash::parse_hash(text)?;
                let name = self
                    .registry
                    .lookup(value)
                    .and_then(|entry| {
                        [entry.value_string, entry.file_name, entry.display_string]
                            .into_iter()
                            .find(|candidate| !candidate.is_empty())
                    })
                    .unwrap_or_else(|| hash::format_hash(value));
                Ok(name)
            },
            Clone::clone,
        )
    }

    // ==================== Hashing ====================

    /// Hash a resource path or other string.
    pub fn compute_hash(&self, input: &str, format: HashFormat) -> String {
        self.status.begin_single("Computing hash");
        let digest = hash::compute_ioi_hash(input, format);
        self.status.finish_single(&digest);
        digest
    }

    /// Hash the whole contents of a file.
    pub fn compute_hash_from_file(&self, path: impl AsRef<Path>, format: HashFormat) -> Result<String> {
        let path = path.as_ref();
        self.track(
            "Hashing file",
            || Ok(hash::compute_ioi_hash_from_file(path, format)?),
            Clone::clone,
        )
    }

    /// Hash each non-empty line of a text file, as `(hash, line)` pairs.
    ///
    /// Runs as a multi-step task: progress is updated per line and the
    /// multiple-task status ends as `Successful` or `Exited`.
    pub fn hash_lines_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
        let path = path.as_ref();
        self.status.set_multiple_status(TaskStatus::Executing);
        let result = self.track(
            "Hashing lines",
            || {
                Ok(hash::hash_lines_from_file_with_progress(path, |index, total| {
                    self.status.update_progress(index, total);
                })?)
            },
            |pairs| format!("Hashed {} lines", pairs.len()),
        );
        self.status.set_multiple_status(if result.is_ok() {
            TaskStatus::Successful
        } else {
            TaskStatus::Exited
        });
        result
    }

    // ==================== Converter ====================

    /// Swap in `converter`, returning the one it replaces.
    fn set_converter(&self, converter: Converter) -> Option<Converter> {
        let name = converter.name().to_string();
        let previous = self
            .converter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(converter);
        if let Some(previous) = &previous {
            tracing::debug!("Replaced converter '{}'", previous.name());
        }
        tracing::info!("Converter '{name}' attached");
        previous
    }

    /// Attach a converter, replacing any current one.
    pub fn attach_converter(&self, converter: Converter) {
        self.status.begin_single("Attaching converter");
        let name = converter.name().to_string();
        self.set_converter(converter);
        self.status
            .finish_single(&format!("Converter '{name}' attached"));
    }

    /// Attach a converter engine under `name`.
    pub fn attach_engine(&self, engine: Arc<dyn ResourceConverter>, name: impl Into<String>) {
        self.attach_converter(Converter::new(engine, name));
    }

    /// Open the resource library at `path`, or the configured one.
    pub fn resource_library(
        &self,
        path: Option<&Path>,
        game: Option<GameVersion>,
    ) -> Result<ResourceLibrary> {
        let path: PathBuf = path
            .map(Path::to_path_buf)
            .or_else(|| self.config.resource_lib_path.clone())
            .ok_or_else(|| Error::converter_unavailable("no resource library configured"))?;
        let game = game.unwrap_or(self.config.game);
        Ok(ResourceLibrary::open(path, game)?)
    }

    /// Load a resource library and attach its converter for `resource_type`.
    ///
    /// On failure the current converter, if any, stays attached.
    pub fn load_converter_plugin(
        &self,
        path: Option<&Path>,
        game: Option<GameVersion>,
        resource_type: &str,
    ) -> Result<()> {
        self.track(
            "Loading resource library",
            || {
                let library = self.resource_library(path, game)?;
                let engine = library.converter_for(resource_type)?;
                let name = format!("{} {resource_type}", library.game());
                self.set_converter(Converter::new(Arc::new(engine), name.clone()));
                Ok(name)
            },
            |name| format!("Loaded converter '{name}'"),
        )?;
        Ok(())
    }

    /// Detach the current converter. Returns whether one was attached.
    pub fn detach_converter(&self) -> bool {
        self.status.begin_single("Detaching converter");
        let previous = self
            .converter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match previous {
            Some(converter) => {
                tracing::info!("Converter '{}' detached", converter.name());
                self.status
                    .finish_single(&format!("Converter '{}' detached", converter.name()));
                true
            }
            None => {
                self.status.finish_single("No converter attached");
                false
            }
        }
    }

    #[must_use]
    pub fn converter_available(&self) -> bool {
        self.converter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Handle to the attached converter, for scoped access to engine text.
    pub fn converter(&self) -> Result<Converter> {
        self.converter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::converter_unavailable("no resource converter is loaded"))
    }

    // ==================== Conversion ====================

    pub fn convert_file_to_json_file(
        &self,
        resource: impl AsRef<Path>,
        output: impl AsRef<Path>,
        mode: ConversionMode,
    ) -> Result<()> {
        let (resource, output) = (resource.as_ref(), output.as_ref());
        self.track(
            "Converting resource file",
            || Ok(self.converter()?.file_to_json_file(resource, output, mode)?),
            |_| format!("Wrote {}", output.display()),
        )
    }

    pub fn convert_memory_to_json_file(
        &self,
        data: &[u8],
        output: impl AsRef<Path>,
        mode: ConversionMode,
    ) -> Result<()> {
        let output = output.as_ref();
        self.track(
            "Converting resource data",
            || Ok(self.converter()?.memory_to_json_file(data, output, mode)?),
            |_| format!("Wrote {}", output.display()),
        )
    }

    /// Convert a resource file to JSON text.
    ///
    /// The text is also left in the status response data.
    pub fn convert_file_to_json_string(
        &self,
        resource: impl AsRef<Path>,
        mode: ConversionMode,
    ) -> Result<String> {
        let resource = resource.as_ref();
        let json = self.track(
            "Converting resource file",
            || {
                let converter = self.converter()?;
                let json = converter.file_to_json_string(resource, mode)?.into_string()?;
                Ok(json)
            },
            |json| format!("Converted {} ({} bytes)", resource.display(), json.len()),
        )?;
        self.status.set_response_data(json.clone().into_bytes());
        Ok(json)
    }

    /// Convert in-memory resource bytes to JSON text.
    ///
    /// The text is also left in the status response data.
    pub fn convert_memory_to_json_string(&self, data: &[u8], mode: ConversionMode) -> Result<String> {
        let json = self.track(
            "Converting resource data",
            || {
                let converter = self.converter()?;
                let json = converter.memory_to_json_string(data, mode)?.into_string()?;
                Ok(json)
            },
            |json| format!("Converted {} bytes ({} bytes of JSON)", data.len(), json.len()),
        )?;
        self.status.set_response_data(json.clone().into_bytes());
        Ok(json)
    }

    // ==================== Packages ====================

    /// Register an `.rpkg` archive. Already registered paths are ignored.
    pub fn add_package(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.track(
            "Adding package",
            || {
                if !path.is_file() {
                    return Err(rpkgcore::Error::FileNotFound {
                        path: path.to_path_buf(),
                    }
                    .into());
                }
                let mut packages = self.packages.write().unwrap_or_else(PoisonError::into_inner);
                let entry = PackageEntry::new(path);
                if packages.contains(&entry) {
                    tracing::debug!("Package already registered: {}", path.display());
                } else {
                    packages.push(entry);
                }
                Ok(packages.len())
            },
            |count| format!("{count} packages registered"),
        )?;
        Ok(())
    }

    /// Registered packages, in registration order.
    #[must_use]
    pub fn packages(&self) -> Vec<PackageEntry> {
        self.packages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ==================== Lifecycle ====================

    /// Release the converter, hash list, and packages, and reset the status.
    pub fn shutdown(&self) {
        self.detach_converter();
        self.registry.clear();
        self.packages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.status.reset();
        tracing::info!("Toolkit shut down");
    }
}
