//! Resource converter boundary
//!
//! Binary resource to JSON conversion is done by an external engine. The
//! engine is reached through [`ResourceConverter`], which mirrors its five
//! entry points exactly. [`Converter`] is the host side: it serializes calls
//! into the engine, turns boolean/null failure signals into [`Error`]s, and
//! hands out [`JsonText`] guards that release engine memory exactly once.
//!
//! - [`json`] - comparing simple and verbose output
//! - [`plugin`] - loading an engine from a dynamic library

pub mod json;
pub mod plugin;

use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};

/// Output fidelity for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionMode {
    /// Plain JSON values.
    #[default]
    Simple,
    /// Every value carries its type information.
    Verbose,
}

impl ConversionMode {
    #[must_use]
    pub fn from_simple(simple: bool) -> Self {
        if simple {
            ConversionMode::Simple
        } else {
            ConversionMode::Verbose
        }
    }

    #[must_use]
    pub fn is_simple(self) -> bool {
        self == ConversionMode::Simple
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionMode::Simple => write!(f, "simple"),
            ConversionMode::Verbose => write!(f, "verbose"),
        }
    }
}

/// Text allocated by a converter engine.
///
/// Only the engine that produced it can release it, via
/// [`ResourceConverter::free_json_string`]. Engines recover their concrete
/// handle type with [`into_any`](Self::into_any).
pub trait EngineText: Send {
    fn as_bytes(&self) -> &[u8];

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// Owned engine text handle.
pub type EngineJson = Box<dyn EngineText>;

/// The converter engine capability set.
///
/// Implementations report failure the way the engine does: `false` or
/// `None`. [`Converter`] adds error context on top.
pub trait ResourceConverter: Send + Sync {
    /// Convert the resource at `resource` and write JSON to `output`.
    fn file_to_json_file(&self, resource: &Path, output: &Path, mode: ConversionMode) -> bool;

    /// Convert an in-memory resource and write JSON to `output`.
    fn memory_to_json_file(&self, data: &[u8], output: &Path, mode: ConversionMode) -> bool;

    /// Convert the resource at `resource` into engine-owned text.
    fn file_to_json_string(&self, resource: &Path, mode: ConversionMode) -> Option<EngineJson>;

    /// Convert an in-memory resource into engine-owned text.
    fn memory_to_json_string(&self, data: &[u8], mode: ConversionMode) -> Option<EngineJson>;

    /// Release text returned by one of the `*_to_json_string` calls.
    fn free_json_string(&self, text: EngineJson);
}

/// Host side of the converter boundary.
///
/// Cloning shares the engine and its call lock.
#[derive(Clone)]
pub struct Converter {
    engine: Arc<dyn ResourceConverter>,
    name: String,
    call_lock: Arc<Mutex<()>>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").field("name", &self.name).finish()
    }
}

impl Converter {
    /// Wrap an engine. `name` is used in logs and error messages.
    pub fn new(engine: Arc<dyn ResourceConverter>, name: impl Into<String>) -> Self {
        Self {
            engine,
            name: name.into(),
            call_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // Engine is not known to be thread-safe: one call at a time.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.call_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Convert a resource file to a JSON file.
    pub fn file_to_json_file(
        &self,
        resource: impl AsRef<Path>,
        output: impl AsRef<Path>,
        mode: ConversionMode,
    ) -> Result<()> {
        let resource = resource.as_ref();
        let output = output.as_ref();
        ensure_exists(resource)?;
        tracing::info!(
            "Converting {} → {} ({mode})",
            resource.display(),
            output.display()
        );

        let ok = {
            let _guard = self.lock();
            self.engine.file_to_json_file(resource, output, mode)
        };
        if ok {
            Ok(())
        } else {
            Err(self.failed(format!("{} → {}", resource.display(), output.display())))
        }
    }

    /// Convert in-memory resource bytes to a JSON file.
    pub fn memory_to_json_file(
        &self,
        data: &[u8],
        output: impl AsRef<Path>,
        mode: ConversionMode,
    ) -> Result<()> {
        let output = output.as_ref();
        tracing::info!(
            "Converting {} bytes → {} ({mode})",
            data.len(),
            output.display()
        );

        let ok = {
            let _guard = self.lock();
            self.engine.memory_to_json_file(data, output, mode)
        };
        if ok {
            Ok(())
        } else {
            Err(self.failed(format!("{} bytes → {}", data.len(), output.display())))
        }
    }

    /// Convert a resource file to JSON text.
    pub fn file_to_json_string(
        &self,
        resource: impl AsRef<Path>,
        mode: ConversionMode,
    ) -> Result<JsonText<'_>> {
        let resource = resource.as_ref();
        ensure_exists(resource)?;
        tracing::debug!("Converting {} to JSON text ({mode})", resource.display());

        let raw = {
            let _guard = self.lock();
            self.engine.file_to_json_string(resource, mode)
        };
        raw.map(|raw| JsonText::new(self, raw))
            .ok_or_else(|| self.failed(resource.display().to_string()))
    }

    /// Convert in-memory resource bytes to JSON text.
    pub fn memory_to_json_string(&self, data: &[u8], mode: ConversionMode) -> Result<JsonText<'_>> {
        tracing::debug!("Converting {} bytes to JSON text ({mode})", data.len());

        let raw = {
            let _guard = self.lock();
            self.engine.memory_to_json_string(data, mode)
        };
        raw.map(|raw| JsonText::new(self, raw))
            .ok_or_else(|| self.failed(format!("{} bytes", data.len())))
    }

    fn release(&self, raw: EngineJson) {
        let _guard = self.lock();
        self.engine.free_json_string(raw);
    }

    fn failed(&self, what: String) -> Error {
        tracing::warn!("Converter '{}' failed: {what}", self.name);
        Error::ConversionFailed {
            message: format!("{} could not convert {what}", self.name),
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// JSON text owned by the converter engine.
///
/// The text is released back to the engine when the guard is dropped, or
/// earlier through [`release`](Self::release) or
/// [`into_string`](Self::into_string). Release happens exactly once.
pub struct JsonText<'c> {
    converter: &'c Converter,
    raw: Option<EngineJson>,
}

impl<'c> JsonText<'c> {
    fn new(converter: &'c Converter, raw: EngineJson) -> Self {
        Self {
            converter,
            raw: Some(raw),
        }
    }

    /// Raw bytes as produced by the engine.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_ref().map_or(&[][..], |raw| raw.as_bytes())
    }

    /// Text as UTF-8.
    pub fn as_str(&self) -> Result<&str> {
        Ok(std::str::from_utf8(self.as_bytes())?)
    }

    /// Parse the text as JSON.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(self.as_bytes())?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the text out and release the engine allocation.
    pub fn into_string(self) -> Result<String> {
        let text = self.as_str().map(str::to_owned);
        self.release();
        text
    }

    /// Release the engine allocation now.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.converter.release(raw);
        }
    }
}

impl Drop for JsonText<'_> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl fmt::Debug for JsonText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonText")
            .field("converter", &self.converter.name)
            .field("len", &self.len())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::TrackingEngine;
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn converter() -> (Arc<TrackingEngine>, Converter) {
        let engine = Arc::new(TrackingEngine::default());
        let converter = Converter::new(engine.clone(), "tracking");
        (engine, converter)
    }

    #[test]
    fn test_mode_from_simple() {
        assert_eq!(ConversionMode::from_simple(true), ConversionMode::Simple);
        assert_eq!(ConversionMode::from_simple(false), ConversionMode::Verbose);
        assert!(ConversionMode::default().is_simple());
    }

    #[test]
    fn test_memory_to_string_releases_once() {
        let (engine, converter) = converter();
        {
            let text = converter
                .memory_to_json_string(b"entity", ConversionMode::Simple)
                .unwrap();
            assert_eq!(engine.live_count(), 1);
            let value = text.to_value().unwrap();
            assert_eq!(value["name"], "entity");
        }
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.freed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_into_string_releases() {
        let (engine, converter) = converter();
        let text = converter
            .memory_to_json_string(b"entity", ConversionMode::Simple)
            .unwrap()
            .into_string()
            .unwrap();
        assert!(text.contains("entity"));
        assert_eq!(engine.live_count(), 0);
        assert_eq!(engine.freed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_explicit_release() {
        let (engine, converter) = converter();
        let a = converter
            .memory_to_json_string(b"a", ConversionMode::Simple)
            .unwrap();
        let b = converter
            .memory_to_json_string(b"b", ConversionMode::Verbose)
            .unwrap();
        assert_eq!(engine.live_count(), 2);
        a.release();
        assert_eq!(engine.live_count(), 1);
        drop(b);
        assert_eq!(engine.live_count(), 0);

        let mut freed = engine.freed.lock().unwrap().clone();
        freed.sort_unstable();
        assert_eq!(freed, vec![0, 1]);
    }

    #[test]
    fn test_failed_string_conversion() {
        let (engine, converter) = converter();
        let err = converter
            .memory_to_json_string(b"BAD data", ConversionMode::Simple)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConverterUnavailable);
        assert_eq!(engine.live_count(), 0);
        assert!(engine.freed.lock().unwrap().is_empty());
    }

    #[test]
    fn test_file_to_json_file() {
        let temp = TempDir::new().unwrap();
        let resource = temp.path().join("00D5CB7E6D04E32C.TEMP");
        let output = temp.path().join("out.json");
        std::fs::write(&resource, b"mainmenu").unwrap();

        let (_engine, converter) = converter();
        converter
            .file_to_json_file(&resource, &output, ConversionMode::Simple)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["name"], "mainmenu");
    }

    #[test]
    fn test_missing_resource_does_not_reach_engine() {
        let temp = TempDir::new().unwrap();
        let (engine, converter) = converter();
        let err = converter
            .file_to_json_file(
                temp.path().join("missing.TEMP"),
                temp.path().join("out.json"),
                ConversionMode::Simple,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(engine.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_memory_to_json_file_failure() {
        let temp = TempDir::new().unwrap();
        let (_engine, converter) = converter();
        let err = converter
            .memory_to_json_file(b"BAD", temp.path().join("out.json"), ConversionMode::Verbose)
            .unwrap_err();
        assert!(matches!(err, Error::ConversionFailed { .. }));
        assert!(!temp.path().join("out.json").exists());
    }

    #[test]
    fn test_file_to_json_string() {
        let temp = TempDir::new().unwrap();
        let resource = temp.path().join("res.TBLU");
        std::fs::write(&resource, b"blueprint").unwrap();

        let (engine, converter) = converter();
        let text = converter
            .file_to_json_string(&resource, ConversionMode::Verbose)
            .unwrap();
        assert_eq!(text.to_value().unwrap()["name"]["$val"], "blueprint");
        assert!(!text.is_empty());
        drop(text);
        assert_eq!(engine.live_count(), 0);
    }
}
