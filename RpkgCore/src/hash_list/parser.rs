//! Hash list text parser
//!
//! The hash list is a plain text file:
//!
//! ```text
//! # Hash List
//! #version: 123
//! 00D5CB7E6D04E32C.TEMP,[assembly:/_pro/scenes/frontend/mainmenu.entity].pc_entitytype
//! ```
//!
//! Comment lines start with `#`; a `#version:` comment carries the list
//! version. Every other non-blank line is `<hash>[.<type>],<value>`.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::{format_hash, ioi_hash, parse_hash};

/// Metadata for a single hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashEntry {
    /// The 64-bit IOI hash.
    pub hash: u64,
    /// Resource file name as listed, e.g. `00D5CB7E6D04E32C.TEMP`.
    pub file_name: String,
    /// Human-readable string the hash was computed from (may be empty).
    pub value_string: String,
    /// Canonical 16-digit uppercase form of the hash.
    pub display_string: String,
}

impl HashEntry {
    /// Resource type from the file name suffix (`TEMP`, `TBLU`, ...).
    #[must_use]
    pub fn resource_type(&self) -> Option<&str> {
        self.file_name
            .split_once('.')
            .map(|(_, ty)| ty)
            .filter(|ty| !ty.is_empty())
    }

    /// Best name to show for this hash: value string, else file name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.value_string.is_empty() {
            &self.file_name
        } else {
            &self.value_string
        }
    }
}

/// A fully parsed hash list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashList {
    /// Version from the `#version:` header, if present.
    pub version: Option<u32>,
    /// Entries keyed by hash, in file order.
    pub entries: IndexMap<u64, HashEntry>,
}

impl HashList {
    /// Look up a hash.
    #[must_use]
    pub fn get(&self, hash: u64) -> Option<&HashEntry> {
        self.entries.get(&hash)
    }

    /// Look up a hash given in string form (`00ABC...`, `0x...`, `...TEMP`).
    pub fn get_by_str(&self, hash: &str) -> Result<Option<&HashEntry>> {
        Ok(self.get(parse_hash(hash)?))
    }

    /// Hash a resource path and look up the result.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> Option<&HashEntry> {
        self.get(ioi_hash(path.as_bytes()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &HashEntry> {
        self.entries.values()
    }
}

/// Read and parse a hash list file.
pub fn read_hash_list(path: impl AsRef<Path>) -> Result<HashList> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::HashListNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::FileUnreadable {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let text = std::str::from_utf8(&bytes).map_err(|e| Error::HashListParse {
        line: line_of_offset(&bytes, e.valid_up_to()),
        message: "invalid UTF-8".to_string(),
    })?;
    parse_hash_list(text)
}

/// Parse hash list text.
///
/// Fails on the first malformed data line; nothing partial is returned.
pub fn parse_hash_list(text: &str) -> Result<HashList> {
    let mut list = HashList::default();
    let mut duplicates = 0usize;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim_end_matches('\r');
        let line = if line_no == 1 {
            line.trim_start_matches('\u{feff}')
        } else {
            line
        };

        if line.trim().is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if let Some(version) = parse_version(comment) {
                list.version = Some(version);
            }
            continue;
        }

        let entry = parse_entry(line, line_no)?;
        if let Some(existing) = list.entries.get_mut(&entry.hash) {
            *existing = entry;
            duplicates += 1;
        } else {
            list.entries.insert(entry.hash, entry);
        }
    }

    if duplicates > 0 {
        tracing::debug!("Hash list contained {duplicates} duplicate hashes");
    }
    Ok(list)
}

fn parse_entry(line: &str, line_no: usize) -> Result<HashEntry> {
    let (file_name, value) = line.split_once(',').ok_or_else(|| Error::HashListParse {
        line: line_no,
        message: "expected '<hash>.<type>,<value>'".to_string(),
    })?;
    let file_name = file_name.trim();
    let hash_part = file_name.split_once('.').map_or(file_name, |(hash, _)| hash);

    if hash_part.is_empty()
        || hash_part.len() > 16
        || !hash_part.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(Error::HashListParse {
            line: line_no,
            message: format!("invalid hash '{hash_part}'"),
        });
    }
    let hash = u64::from_str_radix(hash_part, 16).map_err(|e| Error::HashListParse {
        line: line_no,
        message: e.to_string(),
    })?;

    Ok(HashEntry {
        hash,
        file_name: file_name.to_string(),
        value_string: value.to_string(),
        display_string: format_hash(hash),
    })
}

/// `version: 123`, `Version=123`, ` version 123`
fn parse_version(comment: &str) -> Option<u32> {
    let rest = comment.trim_start();
    let key = rest.get(..7)?;
    if !key.eq_ignore_ascii_case("version") {
        return None;
    }
    let rest = rest.get(7..)?.trim_start();
    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix('='))
        .unwrap_or(rest);
    rest.trim().parse().ok()
}

fn line_of_offset(bytes: &[u8], offset: usize) -> usize {
    bytes[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
#        Hash List
#version: 155
#
00D5CB7E6D04E32C.TEMP,[assembly:/_pro/scenes/frontend/mainmenu.entity].pc_entitytype
0000000000001234.TBLU,foo.entity
00B63BBBE01EEED0.LOCR,
";

    #[test]
    fn test_parse_sample() {
        let list = parse_hash_list(SAMPLE).unwrap();
        assert_eq!(list.version, Some(155));
        assert_eq!(list.len(), 3);

        let entry = list.get(0x00D5CB7E6D04E32C).unwrap();
        assert_eq!(entry.file_name, "00D5CB7E6D04E32C.TEMP");
        assert_eq!(entry.display_string, "00D5CB7E6D04E32C");
        assert_eq!(entry.resource_type(), Some("TEMP"));

        let foo = list.get_by_str("0x1234").unwrap().unwrap();
        assert_eq!(foo.value_string, "foo.entity");
        assert_eq!(foo.display_name(), "foo.entity");

        let empty = list.get(0x00B63BBBE01EEED0).unwrap();
        assert_eq!(empty.value_string, "");
        assert_eq!(empty.display_name(), "00B63BBBE01EEED0.LOCR");
    }

    #[test]
    fn test_file_order_preserved() {
        let list = parse_hash_list(SAMPLE).unwrap();
        let order: Vec<u64> = list.iter().map(|e| e.hash).collect();
        assert_eq!(order, vec![0x00D5CB7E6D04E32C, 0x1234, 0x00B63BBBE01EEED0]);
    }

    #[test]
    fn test_resolve_path() {
        let list = parse_hash_list(SAMPLE).unwrap();
        let entry = list
            .resolve_path("[assembly:/_pro/scenes/frontend/mainmenu.entity].pc_entitytype")
            .unwrap();
        assert_eq!(entry.hash, 0x00D5CB7E6D04E32C);
    }

    #[test]
    fn test_value_may_contain_commas() {
        let list = parse_hash_list("0000000000000001.LINE,a,b,c\n").unwrap();
        assert_eq!(list.get(1).unwrap().value_string, "a,b,c");
    }

    #[test]
    fn test_crlf_and_bom() {
        let list = parse_hash_list("\u{feff}#version: 7\r\n0000000000000001.TEMP,x\r\n").unwrap();
        assert_eq!(list.version, Some(7));
        assert_eq!(list.get(1).unwrap().value_string, "x");
    }

    #[test]
    fn test_duplicate_keeps_position_takes_last() {
        let list = parse_hash_list(
            "0000000000000001.TEMP,first\n0000000000000002.TEMP,two\n0000000000000001.TEMP,second\n",
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().value_string, "second");
        assert_eq!(list.iter().next().unwrap().hash, 1);
    }

    #[test]
    fn test_missing_comma_is_error() {
        let err = parse_hash_list("#version: 1\n0000000000000001.TEMP\n").unwrap_err();
        match err {
            Error::HashListParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_hash_is_error() {
        assert!(parse_hash_list("NOTAHASH.TEMP,foo\n").is_err());
        assert!(parse_hash_list("00000000000000000001.TEMP,foo\n").is_err());
    }

    #[test]
    fn test_version_forms() {
        assert_eq!(parse_version(" version: 12"), Some(12));
        assert_eq!(parse_version("Version=3"), Some(3));
        assert_eq!(parse_version("VERSION 9"), Some(9));
        assert_eq!(parse_version(" Hash List"), None);
        assert_eq!(parse_version("version: abc"), None);
    }

    #[test]
    fn test_comments_only() {
        let list = parse_hash_list("# nothing here\n\n").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.version, None);
    }
}
