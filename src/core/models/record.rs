//! Raw fee records as they appear in the input JSON document

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of the `student-costs` list
///
/// Every field is optional in the source data. Missing or `null` strings become
/// empty strings; `amount` is kept as `None` when it is missing or not numeric so
/// the wrangler can apply its missing-amount policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRecord {
    /// Record kind, e.g. `"Auxiliary Comprehensive Fee Component"` or `"Tuition"`
    #[serde(rename = "type", default, deserialize_with = "string_or_null")]
    pub record_type: String,
    /// Display name of the cost item
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,
    /// Category of the cost item, used for coloring
    #[serde(default, deserialize_with = "string_or_null")]
    pub subtype: String,
    /// Amount in currency units
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
}

impl FeeRecord {
    /// Create a record with all fields present
    #[must_use]
    pub fn new(record_type: &str, name: &str, subtype: &str, amount: f64) -> Self {
        Self {
            record_type: record_type.to_string(),
            name: name.to_string(),
            subtype: subtype.to_string(),
            amount: Some(amount),
        }
    }

    /// Whether this record has the given `type` marker
    #[must_use]
    pub fn is_type(&self, marker: &str) -> bool {
        self.record_type == marker
    }
}

/// A loaded fee dataset
///
/// Only `student-costs` is read; any other top-level fields of the document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Ordered list of cost records
    #[serde(rename = "student-costs")]
    pub student_costs: Vec<FeeRecord>,
}

impl Dataset {
    /// Create a dataset from records
    #[must_use]
    pub const fn new(student_costs: Vec<FeeRecord>) -> Self {
        Self { student_costs }
    }

    /// Parse a dataset from a JSON string
    ///
    /// # Errors
    /// Returns an error if the text is not JSON or lacks a `student-costs` array
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Number of records of the given type
    #[must_use]
    pub fn count_of_type(&self, marker: &str) -> usize {
        self.student_costs.iter().filter(|r| r.is_type(marker)).count()
    }
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}
