//! The resolved file: where each declared secret was written, and the
//! digest of what was written.
//!
//! The document only ever grows across runs; entries are replaced, never
//! dropped. It is written through a temporary file and renamed into place
//! so a crash mid-write leaves the previous version intact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;

/// File name of the resolved state inside a project directory.
pub const RESOLVED_NAME: &str = "Zanzifile.resolved";

/// A previously materialized secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub path: PathBuf,
    pub hash: String,
    /// Remote secret id the file was fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Logical key → resolved entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedState {
    entries: IndexMap<String, ResolvedEntry>,
}

impl ResolvedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the state at `path`; a missing or empty file is an empty state.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write the whole state to `path` atomically.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_yaml::to_writer(&mut tmp, self)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Right-biased union: entries in `updates` replace same-key entries.
    pub fn merge(mut self, updates: ResolvedState) -> Self {
        self.entries.extend(updates.entries);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: ResolvedEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ResolvedEntry)> for ResolvedState {
    fn from_iter<I: IntoIterator<Item = (String, ResolvedEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(path: &str, hash: &str) -> ResolvedEntry {
        ResolvedEntry {
            path: PathBuf::from(path),
            hash: hash.to_string(),
            id: None,
        }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = ResolvedState::load(&dir.path().join(RESOLVED_NAME)).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_merge_is_right_biased_union() {
        let existing: ResolvedState = [
            ("a".to_string(), entry("secrets/a", "1")),
            ("b".to_string(), entry("secrets/b", "2")),
        ]
        .into_iter()
        .collect();
        let updates: ResolvedState = [
            ("b".to_string(), entry("secrets/b", "3")),
            ("c".to_string(), entry("secrets/c", "4")),
        ]
        .into_iter()
        .collect();

        let merged = existing.merge(updates);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("a").unwrap().hash, "1");
        assert_eq!(merged.get("b").unwrap().hash, "3");
        assert_eq!(merged.get("c").unwrap().hash, "4");
    }

    #[test]
    fn test_persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESOLVED_NAME);

        let mut state = ResolvedState::new();
        state.insert(
            "db",
            ResolvedEntry {
                path: PathBuf::from("secrets/42_password"),
                hash: "2ab96390c7dbe3439de74d0c9b0b1767".to_string(),
                id: Some(42),
            },
        );
        state.persist(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("db:"));
        assert!(text.contains("path: secrets/42_password"));

        assert_eq!(ResolvedState::load(&path).unwrap(), state);
        // Only the resolved file is left behind, no temporaries.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_entries_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESOLVED_NAME);
        fs::write(&path, "db:\n  path: secrets/db\n  hash: abc\n").unwrap();

        let state = ResolvedState::load(&path).unwrap();
        assert_eq!(state.get("db"), Some(&entry("secrets/db", "abc")));
    }
}
