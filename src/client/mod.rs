//! Secret Server client.
//!
//! One `SecretServerClient` is built per run from the connection settings
//! and shared by every secret fetch. Tokens are short-lived (about ten
//! minutes), so each secret-level operation authenticates on its own
//! instead of reusing a token across a long bundle.

mod envelope;
mod soap;
mod xml;

pub use envelope::Envelope;
pub use soap::{
    HttpSoapTransport, Operation, SECRET_SERVER_NAMESPACE, SoapTransport, TransportError,
    build_envelope, endpoint_from_wsdl,
};
pub use xml::XmlElement;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ZanzibarError};
use crate::storage::{sanitize_filename, write_secret_file};

/// Field name of the item holding a secret's password.
pub const PASSWORD_FIELD: &str = "Password";

/// Login details sent with every `Authenticate` call.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub domain: String,
    pub organization: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: domain.into(),
            organization: String::new(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .field("organization", &self.organization)
            .finish()
    }
}

/// Session token returned by `Authenticate`. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// A secret as returned by `GetSecret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSecret {
    pub id: i64,
    pub name: String,
    pub items: Vec<SecretItem>,
}

/// One named field of a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretItem {
    pub id: i64,
    pub field_name: String,
    pub value: String,
    pub is_file: bool,
}

impl RemoteSecret {
    /// First item whose field name matches exactly.
    pub fn resolve_item(&self, field_name: &str) -> Result<&SecretItem> {
        self.items
            .iter()
            .find(|item| item.field_name == field_name)
            .ok_or_else(|| ZanzibarError::UnknownField {
                id: self.id,
                field_name: field_name.to_string(),
            })
    }
}

/// A decoded file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Authenticated access to a Secret Server installation.
pub struct SecretServerClient<T: SoapTransport = HttpSoapTransport> {
    transport: T,
    credentials: Credentials,
}

impl SecretServerClient<HttpSoapTransport> {
    /// Connect over HTTP to the service described at `wsdl`.
    pub fn connect(wsdl: &str, ignore_ssl: bool, credentials: Credentials) -> Result<Self> {
        let transport = HttpSoapTransport::new(wsdl, ignore_ssl)?;
        debug!(endpoint = transport.endpoint(), ignore_ssl, "Secret Server client ready");
        Ok(Self::new(transport, credentials))
    }
}

impl<T: SoapTransport> SecretServerClient<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Obtain a fresh session token.
    pub async fn authenticate(&self) -> Result<AuthToken> {
        let username = self.credentials.username.clone();
        let auth_error = |message: String, cause| ZanzibarError::Authentication {
            username: username.clone(),
            message,
            cause,
        };

        let message = [
            ("username", self.credentials.username.clone()),
            ("password", self.credentials.password.clone()),
            ("organization", self.credentials.organization.clone()),
            ("domain", self.credentials.domain.clone()),
        ];
        let reply = self
            .transport
            .call(Operation::Authenticate, &message)
            .await
            .map_err(|e| auth_error(e.to_string(), Some(e)))?;

        match envelope::decode(&reply, Operation::Authenticate, envelope::token) {
            Ok(Envelope::Ok(token)) => Ok(token),
            Ok(Envelope::RemoteError(message)) | Err(message) => Err(auth_error(message, None)),
        }
    }

    /// Fetch secret `id`, authenticating first when no token is given.
    pub async fn fetch_secret(&self, id: i64, token: Option<&AuthToken>) -> Result<RemoteSecret> {
        let token = match token {
            Some(t) => t.clone(),
            None => self.authenticate().await?,
        };

        let message = [
            ("token", token.as_str().to_string()),
            ("secretId", id.to_string()),
        ];
        let reply = self
            .transport
            .call(Operation::GetSecret, &message)
            .await
            .map_err(|e| ZanzibarError::SecretFetch {
                id,
                message: e.to_string(),
                cause: Some(e),
            })?;

        match envelope::decode(&reply, Operation::GetSecret, envelope::secret) {
            Ok(Envelope::Ok(secret)) => Ok(secret),
            Ok(Envelope::RemoteError(message)) | Err(message) => Err(ZanzibarError::SecretFetch {
                id,
                message,
                cause: None,
            }),
        }
    }

    /// The `Password` field of secret `id`.
    pub async fn get_password(&self, id: i64) -> Result<String> {
        let secret = self.fetch_secret(id, None).await?;
        Ok(secret.resolve_item(PASSWORD_FIELD)?.value.clone())
    }

    /// Item id of the field called `label` on secret `id`.
    pub async fn resolve_item_id(&self, id: i64, label: &str, token: &AuthToken) -> Result<i64> {
        let secret = self.fetch_secret(id, Some(token)).await?;
        Ok(secret.resolve_item(label)?.id)
    }

    /// Download and decode one file attachment without writing it.
    pub async fn fetch_attachment(
        &self,
        id: i64,
        item_id: i64,
        token: &AuthToken,
    ) -> Result<Attachment> {
        let message = [
            ("token", token.as_str().to_string()),
            ("secretId", id.to_string()),
            ("secretItemId", item_id.to_string()),
        ];
        let reply = self
            .transport
            .call(Operation::DownloadFileAttachmentByItemId, &message)
            .await
            .map_err(|e| ZanzibarError::AttachmentFetch {
                id,
                message: e.to_string(),
                cause: Some(e),
            })?;

        match envelope::decode(
            &reply,
            Operation::DownloadFileAttachmentByItemId,
            envelope::attachment,
        ) {
            Ok(Envelope::Ok(attachment)) => Ok(attachment),
            Ok(Envelope::RemoteError(message)) | Err(message) => {
                Err(ZanzibarError::AttachmentFetch {
                    id,
                    message,
                    cause: None,
                })
            }
        }
    }

    /// Download attachment `item_id` of secret `id` into `dest_dir`, named
    /// as the server names it. Returns the written path.
    pub async fn download_attachment(
        &self,
        id: i64,
        item_id: i64,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let token = self.authenticate().await?;
        let attachment = self.fetch_attachment(id, item_id, &token).await?;
        save_attachment(&attachment, dest_dir, None)
    }

    /// Download the file item called `label` of secret `id` into `dest_dir`,
    /// using a single token for the lookup and the download.
    pub async fn download_secret_file(
        &self,
        id: i64,
        label: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let token = self.authenticate().await?;
        let item_id = self.resolve_item_id(id, label, &token).await?;
        let attachment = self.fetch_attachment(id, item_id, &token).await?;
        save_attachment(&attachment, dest_dir, None)
    }
}

/// Write an attachment under `dest_dir`, as `file_name` if given or else
/// under the (sanitized) server-provided name.
pub fn save_attachment(
    attachment: &Attachment,
    dest_dir: &Path,
    file_name: Option<&str>,
) -> Result<PathBuf> {
    let name = match file_name {
        Some(name) => name.to_string(),
        None => sanitize_filename(&attachment.file_name),
    };
    let path = dest_dir.join(name);
    write_secret_file(&path, &attachment.bytes)?;
    Ok(path)
}
