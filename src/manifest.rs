//! The Zanzifile: connection settings plus the secrets a project needs.
//!
//! ```yaml
//! settings:
//!   wsdl: https://secrets.example.com/SecretServer/webservices/SSWebservice.asmx?wsdl
//!   domain: example.com
//!   secret_dir: secrets/
//! secrets:
//!   db_password:
//!     id: 42
//!     label: Password
//!   deploy_key:
//!     id: 1234
//!     label: Private Key
//!     prefix: ssh
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ZanzibarError};

/// File name of the manifest inside a project directory.
pub const MANIFEST_NAME: &str = "Zanzifile";

/// The `settings` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsdl: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_ssl: Option<bool>,
}

impl ManifestSettings {
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.wsdl.is_none()
            && self.secret_dir.is_none()
            && self.ignore_ssl.is_none()
    }

    /// Directory secrets are written to, relative to the manifest.
    /// Defaults to the manifest's own directory.
    pub fn secret_dir(&self) -> PathBuf {
        self.secret_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn ignore_ssl(&self) -> bool {
        self.ignore_ssl.unwrap_or(false)
    }
}

/// Field a declared secret is read from on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecretLabel {
    #[default]
    Password,
    PrivateKey,
    PublicKey,
    Attachment,
    /// Any other field name the server exposes.
    Other(String),
}

/// How a secret's content is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retrieval {
    /// Take the text value of the field.
    ValueField,
    /// Download the field's file attachment.
    AttachmentDownload,
}

impl SecretLabel {
    /// The item field name on the server.
    pub fn field_name(&self) -> &str {
        match self {
            SecretLabel::Password => "Password",
            SecretLabel::PrivateKey => "Private Key",
            SecretLabel::PublicKey => "Public Key",
            SecretLabel::Attachment => "Attachment",
            SecretLabel::Other(name) => name,
        }
    }

    pub fn retrieval(&self) -> Retrieval {
        match self {
            SecretLabel::Password => Retrieval::ValueField,
            SecretLabel::PrivateKey
            | SecretLabel::PublicKey
            | SecretLabel::Attachment
            | SecretLabel::Other(_) => Retrieval::AttachmentDownload,
        }
    }
}

impl From<String> for SecretLabel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Password" => SecretLabel::Password,
            "Private Key" => SecretLabel::PrivateKey,
            "Public Key" => SecretLabel::PublicKey,
            "Attachment" => SecretLabel::Attachment,
            _ => SecretLabel::Other(s),
        }
    }
}

impl From<&str> for SecretLabel {
    fn from(s: &str) -> Self {
        SecretLabel::from(s.to_string())
    }
}

impl From<SecretLabel> for String {
    fn from(label: SecretLabel) -> Self {
        label.field_name().to_string()
    }
}

impl fmt::Display for SecretLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One entry under `secrets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretDeclaration {
    pub id: i64,

    #[serde(default)]
    pub label: SecretLabel,

    /// Subdirectory of the secret directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Output file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SecretDeclaration {
    pub fn new(id: i64, label: impl Into<SecretLabel>) -> Self {
        Self {
            id,
            label: label.into(),
            prefix: None,
            name: None,
        }
    }

    /// Directory this secret is written into.
    pub fn output_dir(&self, secret_dir: &Path) -> PathBuf {
        match &self.prefix {
            Some(prefix) => secret_dir.join(prefix),
            None => secret_dir.to_path_buf(),
        }
    }

    /// File name for a value secret: the declared name or `<id>_password`.
    pub fn value_file_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}_password", self.id))
    }
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    settings: Option<ManifestSettings>,
    #[serde(default)]
    secrets: Option<IndexMap<String, SecretDeclaration>>,
}

/// A parsed, validated Zanzifile. Secrets keep document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub settings: ManifestSettings,
    pub secrets: IndexMap<String, SecretDeclaration>,
}

impl Manifest {
    /// Read and validate the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ZanzibarError::ManifestMissing(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate manifest text.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(ZanzibarError::manifest_invalid("the file is empty"));
        }
        let raw: RawManifest = serde_yaml::from_str(content)
            .map_err(|e| ZanzibarError::manifest_invalid(e.to_string()))?;

        let settings = raw
            .settings
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ZanzibarError::manifest_invalid("no settings declared"))?;
        let secrets = raw
            .secrets
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ZanzibarError::manifest_invalid("no secrets declared"))?;

        Ok(Self { settings, secrets })
    }

    /// Starter Zanzifile written by `zanzibar init`.
    pub fn template(wsdl: Option<&str>, domain: Option<&str>) -> String {
        format!(
            r#"---
settings:
  wsdl: {wsdl}
  domain: {domain}
  secret_dir: secrets/
  ignore_ssl: false

# Each secret is fetched into secret_dir[/prefix].
# label "Password" writes the password value to <name> (default <id>_password);
# any other label downloads that file item.
secrets:
  # ssh_key:
  #   id: 1234
  #   label: Private Key
  # db_password:
  #   id: 5678
  #   label: Password
  #   prefix: database
  #   name: db_password
"#,
            wsdl = wsdl.unwrap_or(
                "https://secrets.example.com/SecretServer/webservices/SSWebservice.asmx?wsdl"
            ),
            domain = domain.unwrap_or("example.com"),
        )
    }
}
