//! Raw SQL descriptors for predicates and orderings the structured
//! operators cannot express.

use crate::error::{MapperError, Result};
use crate::types::{FilterCondition, SortDirection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FILTER_TYPE: &str = "CustomFilterDescriptor";
const SORT_TYPE: &str = "CustomSortDescriptor";

/// Hand-written filter expression, always combined with AND
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomFilterDescriptor {
    pub expression: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(rename = "type")]
    kind: String,
}

impl CustomFilterDescriptor {
    pub fn new(expression: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            expression: expression.into(),
            params,
            kind: FILTER_TYPE.to_string(),
        }
    }

    pub fn condition(&self) -> FilterCondition {
        FilterCondition::And
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: Self = parse(json)?;
        check_kind(&descriptor.kind, FILTER_TYPE)?;
        Ok(descriptor)
    }
}

impl Default for CustomFilterDescriptor {
    fn default() -> Self {
        Self::new("", Vec::new())
    }
}

/// Hand-written ORDER BY expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomSortDescriptor {
    pub expression: String,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(rename = "type")]
    kind: String,
}

impl CustomSortDescriptor {
    pub fn new(expression: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            expression: expression.into(),
            params,
            direction: SortDirection::Asc,
            kind: SORT_TYPE.to_string(),
        }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: Self = parse(json)?;
        check_kind(&descriptor.kind, SORT_TYPE)?;
        Ok(descriptor)
    }
}

impl Default for CustomSortDescriptor {
    fn default() -> Self {
        Self::new("", Vec::new())
    }
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| MapperError::malformed_descriptor(e.to_string()))
}

fn check_kind(actual: &str, expected: &str) -> Result<()> {
    if actual != expected {
        return Err(MapperError::malformed_descriptor(format!(
            "expected type {}, got {}",
            expected, actual
        )));
    }
    Ok(())
}
