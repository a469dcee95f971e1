//! zanzibar - fetch secrets from Secret Server into a project.
//!
//! A project lists the secrets it needs in a `Zanzifile`. Bundling fetches
//! whatever is missing or was changed locally, writes it under the
//! configured secret directory, and records a digest of each file in
//! `Zanzifile.resolved` so the next run only talks to the server when
//! something needs fetching.
//!
//! # Example
//!
//! ```no_run
//! use zanzibar::{Bundler, Credentials, SecretServerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = Bundler::new(".")
//!         .run(|settings| {
//!             let wsdl = settings.wsdl.clone().unwrap_or_default();
//!             let domain = settings.domain.clone().unwrap_or_default();
//!             let credentials = Credentials::new("alice", "s3cret", domain);
//!             SecretServerClient::connect(&wsdl, settings.ignore_ssl(), credentials)
//!         })
//!         .await?;
//!
//!     println!("fetched {:?}", report.fetched);
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod keychain;
pub mod logging;
pub mod manifest;
pub mod resolved;
pub mod storage;
pub mod utils;

// Re-export commonly used types at the crate root
pub use bundle::{BundleReport, Bundler};
pub use client::{Credentials, SecretServerClient, SoapTransport};
pub use config::Config;
pub use error::{Result, ZanzibarError};
pub use manifest::Manifest;
pub use resolved::ResolvedState;
