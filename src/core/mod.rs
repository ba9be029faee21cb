//! Core fee-breakdown functionality shared by the library and the CLI

pub mod error;
pub mod layout;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod wrangle;

/// Returns the current version of the `fee-sankey` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
