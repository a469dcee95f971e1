//! Get command handler - fetching one secret by id.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::credentials::{ConnectionOverrides, resolve_connection};
use crate::error::Result;
use crate::manifest::{MANIFEST_NAME, Manifest, Retrieval, SecretLabel};

/// Handle the get command.
///
/// A `Password` label prints the value to stdout; any other label downloads
/// the file item and prints where it was written.
pub async fn handle_get(
    config: &Config,
    overrides: &ConnectionOverrides,
    dir: &Path,
    id: i64,
    label: &str,
    path: Option<PathBuf>,
) -> Result<()> {
    // Connection settings from a Zanzifile in the project are used when present.
    let settings = match Manifest::load(&dir.join(MANIFEST_NAME)) {
        Ok(manifest) => Some(manifest.settings),
        Err(e) => {
            debug!("not using Zanzifile settings: {}", e);
            None
        }
    };

    let connection = resolve_connection(config, overrides, settings.as_ref())?;
    let client = connection.client()?;
    let label = SecretLabel::from(label);

    let result = match label.retrieval() {
        Retrieval::ValueField => client
            .get_password(id)
            .await
            .map(|password| println!("{}", password)),
        Retrieval::AttachmentDownload => {
            let dest = path.unwrap_or_else(|| PathBuf::from("."));
            client
                .download_secret_file(id, label.field_name(), &dest)
                .await
                .map(|written| println!("{}", written.display()))
        }
    };

    if let Err(e) = &result
        && e.is_authentication()
    {
        connection.forget_cached_password();
    }
    result
}
