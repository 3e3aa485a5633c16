//! Writing computed hashes back out in hash list form

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Render `(hash, value)` pairs as hash list lines.
#[must_use]
pub fn format_hash_pairs(pairs: &[(String, String)]) -> String {
    let mut out = String::with_capacity(pairs.len() * 32);
    for (hash, value) in pairs {
        let _ = writeln!(out, "{hash},{value}");
    }
    out
}

/// Write `(hash, value)` pairs to `dest`, one `HASH,value` line each.
pub fn write_hash_pairs(pairs: &[(String, String)], dest: impl AsRef<Path>) -> Result<()> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(dest, format_hash_pairs(pairs))?;
    tracing::info!("Wrote {} hashes to {}", pairs.len(), dest.display());
    Ok(())
}
