//! Data models for fee datasets and wrangled graphs

pub mod graph;
pub mod record;

pub use graph::{FeeGraph, Link, Node};
pub use record::{Dataset, FeeRecord};
