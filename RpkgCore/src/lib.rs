//! # RpkgCore
//!
//! Engine-level tooling for Glacier (Hitman) resource packages.
//!
//! ## Features
//!
//! - **IOI hashing** - resource path hashes and their MD5 form
//! - **Hash lists** - parsing `hash_list.txt` and a shared registry for lookups
//! - **Resource conversion** - the boundary to an external binary-to-JSON
//!   converter, with scoped ownership of converter-allocated text
//!
//! ## Quick Start
//!
//! ### Hashing
//!
//! ```
//! use rpkgcore::hash::{compute_ioi_hash, HashFormat};
//!
//! let hash = compute_ioi_hash(
//!     "[assembly:/_pro/scenes/frontend/mainmenu.entity].pc_entitytype",
//!     HashFormat::Ioi,
//! );
//! assert_eq!(hash, "00D5CB7E6D04E32C");
//! ```
//!
//! ### Hash Lists
//!
//! ```no_run
//! use rpkgcore::hash_list::HashRegistry;
//!
//! let registry = HashRegistry::new();
//! registry.load(Some("hash_list.txt".as_ref()), true)?;
//! if let Some(entry) = registry.lookup(0x00D5CB7E6D04E32C) {
//!     println!("{}", entry.display_name());
//! }
//! # Ok::<(), rpkgcore::Error>(())
//! ```
//!
//! ### Converting Resources
//!
//! ```no_run
//! use std::sync::Arc;
//! use rpkgcore::converter::{ConversionMode, Converter};
//! use rpkgcore::converter::plugin::{GameVersion, ResourceLibrary};
//!
//! let library = ResourceLibrary::open("ResourceLib_HM3.dll", GameVersion::HM3)?;
//! let converter = Converter::new(Arc::new(library.converter_for("TEMP")?), "TEMP");
//! let json = converter
//!     .file_to_json_string("00D5CB7E6D04E32C.TEMP", ConversionMode::Simple)?
//!     .into_string()?;
//! println!("{json}");
//! # Ok::<(), rpkgcore::Error>(())
//! ```

pub mod converter;
pub mod error;
pub mod hash;
pub mod hash_list;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::converter::plugin::{GameVersion, PluginConverter, ResourceLibrary};
    pub use crate::converter::{
        ConversionMode, Converter, EngineJson, EngineText, JsonText, ResourceConverter,
    };
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::hash::{HashFormat, compute_ioi_hash, ioi_hash};
    pub use crate::hash_list::{HashEntry, HashList, HashRegistry, LoadOutcome};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
