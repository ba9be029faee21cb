//! Data wrangling: raw fee records to a flat node/link graph
//!
//! A single root node collects every record of the component type. Each such
//! record becomes its own node with a link from the root carrying the record's
//! amount; the root's value is the running sum of those amounts. Records of any
//! other type are skipped.
//!
//! Components that share a name are *not* merged: two records called
//! `"Health Fee"` produce two nodes with the same label.

use crate::core::error::LoadError;
use crate::core::models::{Dataset, FeeGraph, FeeRecord};
use logger::{debug, warn};
use std::fmt;
use std::str::FromStr;

/// Record `type` selected by default
pub const COMPONENT_TYPE: &str = "Auxiliary Comprehensive Fee Component";

/// Name of the root node by default
pub const ROOT_NAME: &str = "Auxiliary Comprehensive Fee";

/// Category of the root node
pub const ROOT_CATEGORY: &str = "Fee";

/// What to do with a selected record whose amount is missing or not numeric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAmountPolicy {
    /// Treat the amount as 0 and log a warning
    #[default]
    Zero,
    /// Fail wrangling with [`LoadError::MissingAmount`]
    Reject,
}

impl MissingAmountPolicy {
    fn resolve(self, record: &FeeRecord) -> Result<f64, LoadError> {
        match (record.amount, self) {
            (Some(amount), _) => Ok(amount),
            (None, Self::Zero) => {
                warn!(
                    "Record '{}' has no usable amount; counting it as 0",
                    record.name
                );
                Ok(0.0)
            }
            (None, Self::Reject) => Err(LoadError::MissingAmount {
                name: record.name.clone(),
            }),
        }
    }
}

impl FromStr for MissingAmountPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zero" | "coerce" => Ok(Self::Zero),
            "reject" | "error" => Ok(Self::Reject),
            _ => Err(format!("Unknown missing-amount policy: {s}")),
        }
    }
}

impl fmt::Display for MissingAmountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "zero"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Options controlling record selection and the root node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrangleOptions {
    /// Record `type` that selects a component
    pub component_type: String,
    /// Name (and title) of the root node
    pub root_name: String,
    /// Handling of missing amounts
    pub missing_amount: MissingAmountPolicy,
}

impl Default for WrangleOptions {
    fn default() -> Self {
        Self {
            component_type: COMPONENT_TYPE.to_string(),
            root_name: ROOT_NAME.to_string(),
            missing_amount: MissingAmountPolicy::default(),
        }
    }
}

/// Turn a dataset into the root-and-components graph
///
/// The root node always has id 0. Component nodes follow in record order.
///
/// # Errors
/// Returns [`LoadError::MissingAmount`] only when the policy is
/// [`MissingAmountPolicy::Reject`] and a selected record lacks an amount.
pub fn wrangle(dataset: &Dataset, options: &WrangleOptions) -> Result<FeeGraph, LoadError> {
    let mut graph = FeeGraph::new();
    let root = graph.add_node(&options.root_name, ROOT_CATEGORY, 0.0);

    let mut skipped = 0usize;
    for record in &dataset.student_costs {
        if !record.is_type(&options.component_type) {
            skipped += 1;
            continue;
        }

        let amount = options.missing_amount.resolve(record)?;
        let component = graph.add_node(&record.name, &record.subtype, amount);
        graph.add_link(root, component, amount);

        if let Some(root_node) = graph.node_mut(root) {
            root_node.value += amount;
        }
    }

    debug!(
        "Wrangled {} components ({} records skipped)",
        graph.link_count(),
        skipped
    );
    Ok(graph)
}
