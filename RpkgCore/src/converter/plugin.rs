//! Resource library plugin loading
//!
//! The resource library is a dynamic library exporting, per game:
//!
//! - `<GAME>_GetConverterForResource(type) -> ResourceConverter*`
//! - `<GAME>_GetSupportedResourceTypes() -> ResourceTypesArray*`
//! - `<GAME>_FreeSupportedResourceTypes(ResourceTypesArray*)`
//!
//! The returned `ResourceConverter` is a table of five C function pointers,
//! wrapped here by [`PluginConverter`].

#![allow(unsafe_code)]

use std::any::Any;
use std::ffi::{CStr, CString, c_char, c_void};
use std::fmt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::str::FromStr;
use std::sync::Arc;

use libloading::{Library, Symbol};
use serde::{Deserialize, Serialize};

use super::{ConversionMode, EngineJson, EngineText, ResourceConverter};
use crate::error::{Error, Result};

/// Game whose resource formats the library should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameVersion {
    HM2016,
    HM2,
    #[default]
    HM3,
}

impl GameVersion {
    /// Export name prefix used by the resource library.
    #[must_use]
    pub fn export_prefix(self) -> &'static str {
        match self {
            GameVersion::HM2016 => "HM2016",
            GameVersion::HM2 => "HM2",
            GameVersion::HM3 => "HM3",
        }
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_prefix())
    }
}

impl FromStr for GameVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hm2016" | "hitman2016" | "h1" => Ok(GameVersion::HM2016),
            "hm2" | "hitman2" | "h2" => Ok(GameVersion::HM2),
            "hm3" | "hitman3" | "h3" | "woa" => Ok(GameVersion::HM3),
            _ => Err(format!(
                "Invalid game '{s}'. Valid values: HM2016, HM2, HM3"
            )),
        }
    }
}

// ==================== C ABI ====================

#[repr(C)]
struct RawJsonString {
    json_data: *const c_char,
    str_size: usize,
}

type FileToFileFn = unsafe extern "C" fn(*const c_char, *const c_char, bool) -> bool;
type MemoryToFileFn = unsafe extern "C" fn(*const c_void, usize, *const c_char, bool) -> bool;
type FileToStringFn = unsafe extern "C" fn(*const c_char, bool) -> *mut RawJsonString;
type MemoryToStringFn = unsafe extern "C" fn(*const c_void, usize, bool) -> *mut RawJsonString;
type FreeStringFn = unsafe extern "C" fn(*mut RawJsonString);

#[repr(C)]
struct RawResourceConverter {
    from_resource_file_to_json_file: Option<FileToFileFn>,
    from_memory_to_json_file: Option<MemoryToFileFn>,
    from_resource_file_to_json_string: Option<FileToStringFn>,
    from_memory_to_json_string: Option<MemoryToStringFn>,
    free_json_string: Option<FreeStringFn>,
}

#[repr(C)]
struct RawResourceTypesArray {
    type_count: usize,
    types: *const *const c_char,
}

type GetConverterFn = unsafe extern "C" fn(*const c_char) -> *const RawResourceConverter;
type GetSupportedTypesFn = unsafe extern "C" fn() -> *mut RawResourceTypesArray;
type FreeSupportedTypesFn = unsafe extern "C" fn(*mut RawResourceTypesArray);

// ==================== Library ====================

/// A loaded resource library.
pub struct ResourceLibrary {
    library: Arc<Library>,
    game: GameVersion,
    path: PathBuf,
}

impl fmt::Debug for ResourceLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLibrary")
            .field("game", &self.game)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ResourceLibrary {
    /// Load the resource library at `path`.
    ///
    /// A missing or unloadable module is reported as
    /// [`Error::ConverterUnavailable`].
    pub fn open(path: impl AsRef<Path>, game: GameVersion) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::unavailable(format!(
                "resource library not found: {}",
                path.display()
            )));
        }

        // SAFETY: loading runs the library's initialisers. The resource
        // library is a plain C ABI module without load-time side effects.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            Error::unavailable(format!("failed to load {}: {e}", path.display()))
        })?;

        tracing::info!("Loaded resource library {} ({game})", path.display());
        Ok(Self {
            library: Arc::new(library),
            game,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn game(&self) -> GameVersion {
        self.game
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        let export = format!("{}_{name}", self.game.export_prefix());
        let mut bytes = export.clone().into_bytes();
        bytes.push(0);
        // SAFETY: `T` is one of the function pointer types declared above,
        // matching the library's exported C signatures.
        unsafe { self.library.get::<T>(&bytes) }
            .map_err(|_| Error::ConverterEntryPointMissing { symbol: export })
    }

    /// Get the converter for a resource type such as `TEMP` or `TBLU`.
    pub fn converter_for(&self, resource_type: &str) -> Result<PluginConverter> {
        let get_converter = self.symbol::<GetConverterFn>("GetConverterForResource")?;
        let c_type = CString::new(resource_type)
            .map_err(|_| Error::InvalidPath(format!("resource type '{resource_type}'")))?;

        // SAFETY: `c_type` is a valid NUL-terminated string that outlives the call.
        let table = unsafe { get_converter(c_type.as_ptr()) };
        if table.is_null() {
            return Err(Error::unavailable(format!(
                "{} has no converter for resource type {resource_type}",
                self.path.display()
            )));
        }

        // SAFETY: non-null tables point at static data owned by the library,
        // which `self.library` keeps loaded.
        let table = unsafe { &*table };
        let missing = |field: &str| Error::ConverterEntryPointMissing {
            symbol: format!("{resource_type}::{field}"),
        };

        Ok(PluginConverter {
            file_to_file: table
                .from_resource_file_to_json_file
                .ok_or_else(|| missing("FromResourceFileToJsonFile"))?,
            memory_to_file: table
                .from_memory_to_json_file
                .ok_or_else(|| missing("FromMemoryToJsonFile"))?,
            file_to_string: table
                .from_resource_file_to_json_string
                .ok_or_else(|| missing("FromResourceFileToJsonString"))?,
            memory_to_string: table
                .from_memory_to_json_string
                .ok_or_else(|| missing("FromMemoryToJsonString"))?,
            free_string: table
                .free_json_string
                .ok_or_else(|| missing("FreeJsonString"))?,
            resource_type: resource_type.to_string(),
            _library: Arc::clone(&self.library),
        })
    }

    /// Resource types the library can convert.
    pub fn supported_resource_types(&self) -> Result<Vec<String>> {
        let get_types = self.symbol::<GetSupportedTypesFn>("GetSupportedResourceTypes")?;
        let free_types = self.symbol::<FreeSupportedTypesFn>("FreeSupportedResourceTypes")?;

        // SAFETY: no arguments; the result is freed below with the matching export.
        let array = unsafe { get_types() };
        if array.is_null() {
            return Ok(Vec::new());
        }

        // SAFETY: `array` is non-null and stays valid until `free_types`.
        // Each entry is a NUL-terminated string owned by the array.
        let types = unsafe {
            let raw = &*array;
            let mut types = Vec::with_capacity(raw.type_count);
            if !raw.types.is_null() {
                for i in 0..raw.type_count {
                    let entry = *raw.types.add(i);
                    if !entry.is_null() {
                        types.push(CStr::from_ptr(entry).to_string_lossy().into_owned());
                    }
                }
            }
            free_types(array);
            types
        };
        Ok(types)
    }
}

// ==================== Converter ====================

/// Converter for one resource type, backed by a [`ResourceLibrary`].
pub struct PluginConverter {
    file_to_file: FileToFileFn,
    memory_to_file: MemoryToFileFn,
    file_to_string: FileToStringFn,
    memory_to_string: MemoryToStringFn,
    free_string: FreeStringFn,
    resource_type: String,
    _library: Arc<Library>,
}

impl fmt::Debug for PluginConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConverter")
            .field("resource_type", &self.resource_type)
            .finish_non_exhaustive()
    }
}

impl PluginConverter {
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn wrap(&self, raw: *mut RawJsonString) -> Option<EngineJson> {
        NonNull::new(raw).map(|ptr| {
            Box::new(PluginJson {
                ptr,
                owner: self.free_string as usize,
            }) as EngineJson
        })
    }
}

fn path_to_cstring(path: &Path) -> Option<CString> {
    let text = path.to_str().or_else(|| {
        tracing::warn!("Path is not valid UTF-8: {}", path.display());
        None
    })?;
    CString::new(text).ok()
}

impl ResourceConverter for PluginConverter {
    fn file_to_json_file(&self, resource: &Path, output: &Path, mode: ConversionMode) -> bool {
        let (Some(resource), Some(output)) = (path_to_cstring(resource), path_to_cstring(output))
        else {
            return false;
        };
        // SAFETY: both strings are NUL-terminated and outlive the call.
        unsafe { (self.file_to_file)(resource.as_ptr(), output.as_ptr(), mode.is_simple()) }
    }

    fn memory_to_json_file(&self, data: &[u8], output: &Path, mode: ConversionMode) -> bool {
        let Some(output) = path_to_cstring(output) else {
            return false;
        };
        // SAFETY: `data` is valid for `data.len()` bytes for the duration of the call.
        unsafe {
            (self.memory_to_file)(
                data.as_ptr().cast(),
                data.len(),
                output.as_ptr(),
                mode.is_simple(),
            )
        }
    }

    fn file_to_json_string(&self, resource: &Path, mode: ConversionMode) -> Option<EngineJson> {
        let resource = path_to_cstring(resource)?;
        // SAFETY: `resource` is NUL-terminated and outlives the call.
        let raw = unsafe { (self.file_to_string)(resource.as_ptr(), mode.is_simple()) };
        self.wrap(raw)
    }

    fn memory_to_json_string(&self, data: &[u8], mode: ConversionMode) -> Option<EngineJson> {
        // SAFETY: `data` is valid for `data.len()` bytes for the duration of the call.
        let raw =
            unsafe { (self.memory_to_string)(data.as_ptr().cast(), data.len(), mode.is_simple()) };
        self.wrap(raw)
    }

    fn free_json_string(&self, text: EngineJson) {
        match text.into_any().downcast::<PluginJson>() {
            Ok(json) if json.owner == self.free_string as usize => {
                // SAFETY: `json.ptr` came from this library's string functions
                // and is consumed here, so it is freed exactly once.
                unsafe { (self.free_string)(json.ptr.as_ptr()) };
            }
            _ => tracing::error!(
                "Refusing to free JSON text not allocated by the {} converter",
                self.resource_type
            ),
        }
    }
}

/// JSON text allocated by the resource library.
struct PluginJson {
    ptr: NonNull<RawJsonString>,
    owner: usize,
}

// SAFETY: the allocation is not tied to the thread that created it, and it is
// only read through `&self` and freed once through the owning converter.
unsafe impl Send for PluginJson {}

impl EngineText for PluginJson {
    fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` stays valid until passed to `free_json_string`, which
        // consumes this handle.
        unsafe {
            let raw = self.ptr.as_ref();
            if raw.json_data.is_null() {
                &[]
            } else {
                std::slice::from_raw_parts(raw.json_data.cast::<u8>(), raw.str_size)
            }
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}
