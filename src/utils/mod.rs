//! Utility functions shared across the application.

pub(crate) mod permissions;

pub use permissions::{owner_only_options, restrict_to_owner};
