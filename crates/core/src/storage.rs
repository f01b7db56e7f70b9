//! JSON document files — the on-disk format shared by every Zalo store.
//!
//! Documents are pretty-printed with four-space indentation so they stay
//! human-editable. Writes go to a sibling `.tmp` file first and are then
//! renamed over the target, so a crash mid-write never leaves a truncated
//! document behind.

use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read and parse a JSON document.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::unavailable(path, e)),
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StorageError::corrupt(path, e))
}

/// Serialize `value` and atomically replace the file at `path`.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            StorageError::unavailable(path, format!("failed to create directory: {e}"))
        })?;
    }

    let content = to_pretty_json(value).map_err(|e| {
        StorageError::unavailable(path, format!("failed to serialize document: {e}"))
    })?;

    let tmp = tmp_path(path);
    std::fs::write(&tmp, content).map_err(|e| StorageError::unavailable(path, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        StorageError::unavailable(path, e)
    })
}

/// Pretty-print with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        items: BTreeMap<String, u32>,
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Option<Doc> = read_document(&dir.path().join("absent.json")).unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn write_creates_parent_dirs_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("doc.json");
        let doc = Doc {
            items: BTreeMap::from([("a".to_string(), 1)]),
        };

        write_document(&path, &doc).unwrap();

        let back: Doc = read_document(&path).unwrap().unwrap();
        assert_eq!(back, doc);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn output_is_indented_with_four_spaces() {
        let doc = Doc {
            items: BTreeMap::from([("a".to_string(), 1)]),
        };
        let json = to_pretty_json(&doc).unwrap();
        assert!(json.contains("\n    \"items\""));
        assert!(json.contains("\n        \"a\": 1"));
    }

    #[test]
    fn garbage_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "this is not json").unwrap();

        let err = read_document::<Doc>(&path).unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
