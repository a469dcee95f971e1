//! Reconciliation of a Zanzifile against what is already on disk.
//!
//! A run loads the manifest, prepares the secret directory, loads the
//! resolved file, drops every secret whose local copy still matches its
//! recorded digest, and fetches the rest one at a time. The resolved file
//! is rewritten after each successful fetch, so a failure partway through
//! a bundle never costs the secrets already downloaded.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::client::{SecretServerClient, SoapTransport, save_attachment};
use crate::error::Result;
use crate::manifest::{MANIFEST_NAME, Manifest, ManifestSettings, Retrieval, SecretDeclaration};
use crate::resolved::{RESOLVED_NAME, ResolvedEntry, ResolvedState};
use crate::storage::{file_matches_hash, hash_file, prepare_secret_dir, write_secret_file};

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    /// Keys downloaded this run, in manifest order.
    pub fetched: Vec<String>,
    /// Keys whose local copy was already valid.
    pub skipped: Vec<String>,
}

impl BundleReport {
    pub fn is_noop(&self) -> bool {
        self.fetched.is_empty()
    }
}

/// Drives one reconciliation run for a project directory.
#[derive(Debug, Clone)]
pub struct Bundler {
    root: PathBuf,
    update: bool,
}

impl Bundler {
    /// Bundle the Zanzifile found in `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            update: false,
        }
    }

    /// Re-fetch every declared secret, even those with a valid local copy.
    pub fn force_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_NAME)
    }

    pub fn resolved_path(&self) -> PathBuf {
        self.root.join(RESOLVED_NAME)
    }

    /// Run the bundle.
    ///
    /// `connect` builds the client from the manifest settings. It is only
    /// called when at least one secret has to be fetched.
    pub async fn run<T, F>(&self, connect: F) -> Result<BundleReport>
    where
        T: SoapTransport,
        F: FnOnce(&ManifestSettings) -> Result<SecretServerClient<T>>,
    {
        let manifest = Manifest::load(&self.manifest_path())?;
        debug!(secrets = manifest.secrets.len(), "{} located...", MANIFEST_NAME);

        let secret_dir = self.root.join(manifest.settings.secret_dir());
        if prepare_secret_dir(&secret_dir, manifest.settings.secret_dir.is_some())? {
            debug!(dir = %secret_dir.display(), "seeded ignore marker");
        }

        let resolved_path = self.resolved_path();
        let mut resolved = ResolvedState::load(&resolved_path)?;

        let mut report = BundleReport::default();
        let mut pending: Vec<(&String, &SecretDeclaration)> = Vec::new();
        for (key, declared) in &manifest.secrets {
            if !self.update && self.is_satisfied(declared, resolved.get(key)) {
                debug!("{} found locally, skipping download...", key);
                report.skipped.push(key.clone());
            } else {
                pending.push((key, declared));
            }
        }

        if pending.is_empty() {
            debug!("No secrets to download...");
            return Ok(report);
        }

        let client = connect(&manifest.settings)?;
        for (key, declared) in pending {
            let entry = self.fetch_one(&client, &secret_dir, declared).await?;
            info!(key = %key, path = %entry.path.display(), "downloaded secret");

            resolved = resolved.merge(ResolvedState::from_iter([(key.clone(), entry)]));
            resolved.persist(&resolved_path)?;
            debug!("Updated resolved file...");
            report.fetched.push(key.clone());
        }

        Ok(report)
    }

    /// A resolved entry still stands for the declared secret: same remote id
    /// (when recorded), the file exists, and its digest is unchanged.
    fn is_satisfied(&self, declared: &SecretDeclaration, entry: Option<&ResolvedEntry>) -> bool {
        let Some(entry) = entry else {
            return false;
        };
        if entry.id.is_some_and(|id| id != declared.id) {
            debug!(
                recorded = ?entry.id,
                declared = declared.id,
                "secret id changed since last bundle"
            );
            return false;
        }
        file_matches_hash(&self.root.join(&entry.path), &entry.hash)
    }

    async fn fetch_one<T: SoapTransport>(
        &self,
        client: &SecretServerClient<T>,
        secret_dir: &Path,
        declared: &SecretDeclaration,
    ) -> Result<ResolvedEntry> {
        let dir = declared.output_dir(secret_dir);

        let path = match declared.label.retrieval() {
            Retrieval::ValueField => {
                let value = client.get_password(declared.id).await?;
                let path = dir.join(declared.value_file_name());
                write_secret_file(&path, value.as_bytes())?;
                path
            }
            Retrieval::AttachmentDownload => {
                let token = client.authenticate().await?;
                let item_id = client
                    .resolve_item_id(declared.id, declared.label.field_name(), &token)
                    .await?;
                let attachment = client.fetch_attachment(declared.id, item_id, &token).await?;
                save_attachment(&attachment, &dir, declared.name.as_deref())?
            }
        };

        let hash = hash_file(&path)?;
        Ok(ResolvedEntry {
            path: self.relative_to_root(&path),
            hash,
            id: Some(declared.id),
        })
    }

    fn relative_to_root(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
