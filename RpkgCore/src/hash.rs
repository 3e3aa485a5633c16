//! IOI resource hashing
//!
//! Glacier identifies every resource by a 64-bit hash of its lowercased
//! resource path. The hash is the first eight bytes of the MD5 digest read
//! big-endian, with the top byte cleared.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{Error, Result};

/// Mask applied to the digest prefix; the top byte is reserved by the engine.
pub const IOI_HASH_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// Output form for [`compute_ioi_hash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFormat {
    /// 16 uppercase hex digits, as used in rpkg file names and hash lists.
    #[default]
    Ioi,
    /// The full 32 hex digit MD5 digest of the lowercased input.
    Md5,
}

fn lowercased_digest(input: &[u8]) -> md5::Digest {
    md5::compute(input.to_ascii_lowercase())
}

/// Numeric IOI hash of `input`.
#[must_use]
pub fn ioi_hash(input: &[u8]) -> u64 {
    let digest = lowercased_digest(input);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.0[..8]);
    u64::from_be_bytes(prefix) & IOI_HASH_MASK
}

/// Compute the hash string for `input` in the requested format.
///
/// The input is lowercased (ASCII) before hashing, so `[assembly:/Foo]` and
/// `[ASSEMBLY:/foo]` hash identically.
#[must_use]
pub fn compute_ioi_hash(input: impl AsRef<[u8]>, format: HashFormat) -> String {
    let input = input.as_ref();
    match format {
        HashFormat::Ioi => format_hash(ioi_hash(input)),
        HashFormat::Md5 => {
            let digest = lowercased_digest(input);
            let mut hex = String::with_capacity(32);
            for b in digest.iter() {
                let _ = write!(hex, "{b:02X}");
            }
            hex
        }
    }
}

/// Hash the full contents of a file.
///
/// A missing file is reported as [`Error::FileNotFound`] rather than hashing
/// empty input.
pub fn compute_ioi_hash_from_file(path: impl AsRef<Path>, format: HashFormat) -> Result<String> {
    let data = read_file(path.as_ref())?;
    Ok(compute_ioi_hash(&data, format))
}

/// Hash every non-empty line of a text file.
///
/// Returns `(hash, line)` pairs in file order. Trailing `\r` is stripped so
/// lists edited on Windows hash the same as on other platforms.
pub fn hash_lines_from_file(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    hash_lines_from_file_with_progress(path, |_, _| {})
}

/// [`hash_lines_from_file`], calling `progress(index, total)` after each
/// line is hashed. `index` is 0-based over the non-empty lines.
pub fn hash_lines_from_file_with_progress(
    path: impl AsRef<Path>,
    mut progress: impl FnMut(usize, usize),
) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let data = read_file(path)?;
    let text = String::from_utf8_lossy(&data);

    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .collect();

    let total = lines.len();
    let mut pairs = Vec::with_capacity(total);
    for (index, line) in lines.into_iter().enumerate() {
        pairs.push((compute_ioi_hash(line, HashFormat::Ioi), line.to_string()));
        progress(index, total);
    }

    tracing::debug!("Hashed {total} lines from {}", path.display());
    Ok(pairs)
}

/// Format a numeric hash as 16 uppercase hex digits.
#[must_use]
pub fn format_hash(hash: u64) -> String {
    format!("{hash:016X}")
}

/// Parse a hash string.
///
/// Accepts an optional `0x` prefix, any letter case, and an optional
/// `.TYPE` suffix (`00D5CB7E6D04E32C.TEMP`).
pub fn parse_hash(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let without_type = trimmed.split_once('.').map_or(trimmed, |(hash, _)| hash);
    let digits = without_type
        .strip_prefix("0x")
        .or_else(|| without_type.strip_prefix("0X"))
        .unwrap_or(without_type);

    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHash(text.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| Error::InvalidHash(text.to_string()))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::FileUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
