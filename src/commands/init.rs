//! Init command handler - writing a starter Zanzifile.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::credentials::ConnectionOverrides;
use crate::error::{Result, ZanzibarError};
use crate::manifest::{MANIFEST_NAME, Manifest};

/// Handle the init command.
pub fn handle_init(
    config: &Config,
    overrides: &ConnectionOverrides,
    dir: &Path,
    force: bool,
) -> Result<()> {
    let path = dir.join(MANIFEST_NAME);
    if path.exists() && !force {
        return Err(ZanzibarError::Other(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    let wsdl = overrides.wsdl.clone().or_else(|| config.wsdl());
    let domain = overrides.domain.clone().or_else(|| config.domain());

    fs::create_dir_all(dir)?;
    fs::write(&path, Manifest::template(wsdl.as_deref(), domain.as_deref()))?;
    println!("Created {}", path.display());
    Ok(())
}
