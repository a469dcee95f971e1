//! Owner-only access for files holding secret material.

use std::fs::{File, OpenOptions};

use crate::error::Result;

/// Open options that create or truncate a file for writing. On Unix a newly
/// created file starts out as 0600, so it is never readable by others.
pub fn owner_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// Narrow an open file to owner read/write.
///
/// The create mode is ignored for a file that already exists, so overwrites
/// go through here as well. No-op on non-Unix platforms.
pub fn restrict_to_owner(file: &File) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    let _ = file;

    Ok(())
}
