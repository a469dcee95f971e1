//! Command handlers for the zanzibar CLI.

mod bundle;
mod get;
mod init;

pub use bundle::handle_bundle;
pub use get::handle_get;
pub use init::handle_init;
