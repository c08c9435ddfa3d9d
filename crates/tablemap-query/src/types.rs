use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Result feedback behavior of a backend
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// Reports affected rows and generated ids directly (MySQL)
    PrimaryRelational,
    /// Requires follow-up introspection queries (SQLite)
    EmbeddedFile,
    /// No feedback guarantees
    Other,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::PrimaryRelational => write!(f, "primary-relational"),
            Dialect::EmbeddedFile => write!(f, "embedded-file"),
            Dialect::Other => write!(f, "other"),
        }
    }
}

/// Comparison applied by a structured filter
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    #[default]
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    StartWith,
    EndWith,
    Contains,
    In,
    NotIn,
    Between,
    BitwiseAny,
    BitwiseZero,
    BitwiseAll,
}

impl FilterOperator {
    /// Operators whose value must be a sequence
    pub fn is_variadic(&self) -> bool {
        matches!(
            self,
            FilterOperator::In | FilterOperator::NotIn | FilterOperator::Between
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterOperator::Equal => "EQUAL",
            FilterOperator::NotEqual => "NOT_EQUAL",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            FilterOperator::StartWith => "START_WITH",
            FilterOperator::EndWith => "END_WITH",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT_IN",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::BitwiseAny => "BITWISE_ANY",
            FilterOperator::BitwiseZero => "BITWISE_ZERO",
            FilterOperator::BitwiseAll => "BITWISE_ALL",
        };
        f.write_str(name)
    }
}

/// How a filter combines with the ones before it
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterCondition {
    #[default]
    And,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Mapping between an entity property and a table column
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ColumnInfo {
    /// Serialized field name on the entity
    pub property: String,
    /// Physical column name
    pub column_name: String,
    /// Owning table, filled in when added to [`EntityMetadata`]
    pub table_name: String,
    pub is_primary_key: bool,
    /// Value is assigned by the backend on insert
    pub auto_increase: bool,
}

impl ColumnInfo {
    pub fn new(property: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            column_name: column_name.into(),
            table_name: String::new(),
            is_primary_key: false,
            auto_increase: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn auto_increase(mut self) -> Self {
        self.auto_increase = true;
        self
    }

    /// Table-qualified column used in WHERE and ORDER BY clauses
    pub fn query_column(&self) -> String {
        if self.table_name.is_empty() {
            self.column_name.clone()
        } else {
            format!("{}.{}", self.table_name, self.column_name)
        }
    }
}

/// Table name and column mappings of an entity type
#[derive(Debug, Clone)]
pub struct EntityMetadata {
    table_name: String,
    columns: Vec<ColumnInfo>,
}

impl EntityMetadata {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column. A second primary key column is mapped as a plain column.
    pub fn column(mut self, mut column: ColumnInfo) -> Self {
        column.table_name = self.table_name.clone();
        if column.is_primary_key && self.key_column().is_some() {
            column.is_primary_key = false;
            column.auto_increase = false;
        }
        if !column.is_primary_key {
            column.auto_increase = false;
        }
        self.columns.push(column);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn key_column(&self) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.is_primary_key)
    }

    /// Key column when its value is generated by the backend
    pub fn generated_key_column(&self) -> Option<&ColumnInfo> {
        self.key_column().filter(|c| c.auto_increase)
    }

    pub fn find_column(&self, property: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.property == property)
    }
}

/// Parameterized SQL text with positional `?` placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlTemplate {
    pub sql_expression: String,
    pub params: Vec<serde_json::Value>,
}

impl SqlTemplate {
    pub fn new(sql_expression: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            sql_expression: sql_expression.into(),
            params,
        }
    }

    /// True for the no-op fragment
    pub fn is_empty(&self) -> bool {
        self.sql_expression.is_empty() && self.params.is_empty()
    }

    pub fn placeholder_count(&self) -> usize {
        self.sql_expression.matches('?').count()
    }
}

/// A row of data as key-value pairs
pub type DataRow = HashMap<String, serde_json::Value>;

/// Feedback reported by the driver for a write statement
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct RunResult {
    pub affected_rows: Option<u64>,
    pub insert_id: Option<u64>,
}
