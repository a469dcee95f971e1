//! User-level configuration loading.

mod loader;
mod types;

pub use types::{Config, Defaults};
