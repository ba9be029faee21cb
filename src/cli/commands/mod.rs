//! CLI command handlers for `feesankey`.
//!
//! Each subcommand is implemented in its own submodule.

pub mod config;
pub mod render;
pub mod wrangle;
