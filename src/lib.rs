//! Library for `fee-sankey`
//! Loads university fee data, wrangles it into a flow graph and renders Sankey diagrams

pub mod config;
pub mod core;

pub use crate::core::get_version;
