//! Bundle and update handlers - reconciling the Zanzifile with local files.

use std::path::Path;

use crate::bundle::Bundler;
use crate::config::Config;
use crate::credentials::{Connection, ConnectionOverrides, resolve_connection};
use crate::error::Result;

/// Handle `bundle` (and `update`, with `update` set).
pub async fn handle_bundle(
    config: &Config,
    overrides: &ConnectionOverrides,
    dir: &Path,
    update: bool,
) -> Result<()> {
    let mut connection: Option<Connection> = None;

    let result = Bundler::new(dir)
        .force_update(update)
        .run(|settings| {
            let conn = resolve_connection(config, overrides, Some(settings))?;
            let client = conn.client()?;
            connection = Some(conn);
            Ok(client)
        })
        .await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if e.is_authentication()
                && let Some(conn) = &connection
            {
                conn.forget_cached_password();
            }
            return Err(e);
        }
    };

    if report.is_noop() {
        println!(
            "All {} secret(s) are up to date.",
            report.skipped.len()
        );
        return Ok(());
    }

    for key in &report.fetched {
        println!("Fetched {}", key);
    }
    println!(
        "Bundled {} secret(s), {} already up to date.",
        report.fetched.len(),
        report.skipped.len()
    );
    Ok(())
}
