//! Connection details for a run: where the server is and who is asking.
//!
//! Each value is taken from the first source that has it:
//! command line (or its environment variable), the Zanzifile settings, the
//! user config, and finally an interactive prompt. The password is never
//! read from a file; it comes from `ZANZIBAR_PASSWORD`, the keychain cache,
//! or the prompt.

use std::io::{self, Write};

use tracing::debug;

use crate::client::{Credentials, SecretServerClient, endpoint_from_wsdl};
use crate::config::Config;
use crate::error::{Result, ZanzibarError};
use crate::keychain::{keychain_delete, keychain_retrieve, keychain_store};
use crate::manifest::ManifestSettings;

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub wsdl: Option<String>,
    pub domain: Option<String>,
    pub ignore_ssl: bool,
}

/// Where the password of a connection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource {
    Provided,
    Keychain,
    Prompt,
}

/// Everything needed to build a client.
#[derive(Debug, Clone)]
pub struct Connection {
    pub wsdl: String,
    pub ignore_ssl: bool,
    pub credentials: Credentials,
    pub password_source: PasswordSource,
}

impl Connection {
    pub fn endpoint(&self) -> String {
        endpoint_from_wsdl(&self.wsdl)
    }

    /// Build the HTTP client for this connection.
    pub fn client(&self) -> Result<SecretServerClient> {
        SecretServerClient::connect(&self.wsdl, self.ignore_ssl, self.credentials.clone())
    }

    /// Drop a keychain-cached password, e.g. after the server rejected it.
    pub fn forget_cached_password(&self) {
        if self.password_source != PasswordSource::Provided {
            keychain_delete(
                &self.endpoint(),
                &self.credentials.domain,
                &self.credentials.username,
            );
        }
    }
}

/// First non-blank value in precedence order.
fn first_of(candidates: impl IntoIterator<Item = Option<String>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn login_name() -> Option<String> {
    first_of([std::env::var("USER").ok(), std::env::var("USERNAME").ok()])
}

/// Resolve the connection, prompting for anything still missing.
pub fn resolve_connection(
    config: &Config,
    overrides: &ConnectionOverrides,
    settings: Option<&ManifestSettings>,
) -> Result<Connection> {
    let wsdl = match first_of([
        overrides.wsdl.clone(),
        settings.and_then(|s| s.wsdl.clone()),
        config.wsdl(),
    ]) {
        Some(wsdl) => wsdl,
        None => prompt_line("Enter the URL of the Secret Server WSDL: ")?,
    };

    let domain = match first_of([
        overrides.domain.clone(),
        settings.and_then(|s| s.domain.clone()),
        config.domain(),
    ]) {
        Some(domain) => domain,
        None => prompt_line("Enter the domain of your Secret Server: ")?,
    };

    let username = match first_of([overrides.username.clone(), config.username(), login_name()]) {
        Some(username) => username,
        None => prompt_line("Enter your Secret Server username: ")?,
    };

    let ignore_ssl = overrides.ignore_ssl
        || settings
            .and_then(|s| s.ignore_ssl)
            .or(config.ignore_ssl())
            .unwrap_or(false);

    let endpoint = endpoint_from_wsdl(&wsdl);
    let ttl = config.password_cache_ttl();
    let (password, password_source) = if let Some(password) = overrides.password.clone() {
        (password, PasswordSource::Provided)
    } else if let Some(password) = (ttl > 0)
        .then(|| keychain_retrieve(&endpoint, &domain, &username, ttl))
        .flatten()
    {
        debug!("using cached password from keychain");
        (password, PasswordSource::Keychain)
    } else {
        let password = rpassword::prompt_password(format!(
            "Please enter password for {}: ",
            username
        ))?;
        if password.is_empty() {
            return Err(ZanzibarError::Cancelled);
        }
        if ttl > 0 {
            keychain_store(&endpoint, &domain, &username, &password);
        }
        (password, PasswordSource::Prompt)
    };

    Ok(Connection {
        wsdl,
        ignore_ssl,
        credentials: Credentials::new(username, password, domain),
        password_source,
    })
}

/// Ask for a single line on the terminal. An empty answer cancels.
fn prompt_line(question: &str) -> Result<String> {
    eprint!("{}", question);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim();
    if answer.is_empty() {
        return Err(ZanzibarError::Cancelled);
    }
    Ok(answer.to_string())
}
