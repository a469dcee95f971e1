//! Local file operations for materialized secrets.
//!
//! Secret files are written with owner-only permissions and fingerprinted
//! with the MD5 of their bytes. The fingerprint is what the resolved file
//! records, so a later run can tell whether the local copy was touched.

use md5::{Digest, Md5};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::utils::{owner_only_options, restrict_to_owner};

/// Used when a server-provided name has nothing usable left after cleaning.
const FALLBACK_FILE_NAME: &str = "attachment";

/// Name of the ignore-marker seeded into the secret directory.
pub const IGNORE_MARKER_NAME: &str = ".gitignore";

/// Ignore everything in the secret directory except the marker itself.
pub const IGNORE_MARKER_CONTENT: &str = "*\n!.gitignore\n";

/// Hex MD5 digest of `content`.
pub fn compute_content_hash(content: &[u8]) -> String {
    hex::encode(Md5::digest(content))
}

/// Hex MD5 digest of the file at `path`.
pub fn hash_file(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    Ok(compute_content_hash(&content))
}

/// True when `path` is a regular file whose digest equals `hash`.
pub fn file_matches_hash(path: &Path, hash: &str) -> bool {
    path.is_file() && hash_file(path).is_ok_and(|h| h == hash)
}

/// Reduce a server-provided attachment name to one safe path component.
///
/// Any directory part is dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, and a name that is empty or only dots becomes `attachment`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned
    }
}

/// Write secret bytes to `path`, creating parent directories and
/// restricting the file to its owner.
pub fn write_secret_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = owner_only_options().open(path)?;
    restrict_to_owner(&file)?;
    file.write_all(content)?;
    file.sync_all()?;
    Ok(())
}

/// Make sure the secret directory exists, and when `seed_marker` is set,
/// that it holds an ignore-marker. An existing marker is never rewritten.
///
/// Returns true when a marker was created.
pub fn prepare_secret_dir(dir: &Path, seed_marker: bool) -> Result<bool> {
    fs::create_dir_all(dir)?;
    if !seed_marker {
        return Ok(false);
    }

    let marker = dir.join(IGNORE_MARKER_NAME);
    if marker.exists() {
        return Ok(false);
    }
    fs::write(&marker, IGNORE_MARKER_CONTENT)?;
    Ok(true)
}
