//! Configuration type definitions.

use knuffel::Decode;

/// How long a prompted password stays cached in the OS keychain, in seconds.
pub const DEFAULT_PASSWORD_CACHE_TTL: u64 = 900;

/// Main configuration structure parsed from zanzibar.kdl.
#[derive(Debug, Decode, Clone, Default)]
pub struct Config {
    #[knuffel(child)]
    pub defaults: Option<Defaults>,
}

/// Fallback connection settings, used when neither the command line nor
/// the Zanzifile provides a value.
#[derive(Debug, Decode, Clone, Default)]
pub struct Defaults {
    #[knuffel(property)]
    pub username: Option<String>,

    #[knuffel(property)]
    pub domain: Option<String>,

    #[knuffel(property)]
    pub wsdl: Option<String>,

    #[knuffel(property(name = "ignore_ssl"))]
    pub ignore_ssl: Option<bool>,

    /// Seconds a prompted password is kept in the OS keychain. 0 disables caching.
    #[knuffel(property(name = "password_cache_ttl"))]
    pub password_cache_ttl: Option<u64>,
}

impl Config {
    pub fn username(&self) -> Option<String> {
        self.defaults.as_ref().and_then(|d| d.username.clone())
    }

    pub fn domain(&self) -> Option<String> {
        self.defaults.as_ref().and_then(|d| d.domain.clone())
    }

    pub fn wsdl(&self) -> Option<String> {
        self.defaults.as_ref().and_then(|d| d.wsdl.clone())
    }

    pub fn ignore_ssl(&self) -> Option<bool> {
        self.defaults.as_ref().and_then(|d| d.ignore_ssl)
    }

    /// Get the password cache TTL in seconds, defaulting to 900 (15 minutes)
    pub fn password_cache_ttl(&self) -> u64 {
        self.defaults
            .as_ref()
            .and_then(|d| d.password_cache_ttl)
            .unwrap_or(DEFAULT_PASSWORD_CACHE_TTL)
    }
}
