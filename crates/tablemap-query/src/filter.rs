//! Compiles a structured filter (operator, column, value) into a SQL fragment.

use crate::error::{MapperError, Result};
use crate::types::{ColumnInfo, FilterOperator, SqlTemplate};
use serde_json::Value;

/// Build the fragment for one structured filter.
///
/// The value must be an array for `IN`, `NOT_IN` and `BETWEEN` (exactly two
/// elements for `BETWEEN`) and a scalar or null for every other operator.
pub fn filter_expression(
    operator: FilterOperator,
    column: &ColumnInfo,
    value: &Value,
) -> Result<SqlTemplate> {
    let values = filter_values(operator, value)?;
    let column = column.query_column();

    let template = match operator {
        FilterOperator::Equal => null_aware(&column, "=", "IS NULL", values),
        FilterOperator::NotEqual => null_aware(&column, "<>", "IS NOT NULL", values),
        FilterOperator::LessThan => comparison(&column, "<", values),
        FilterOperator::LessThanOrEqual => comparison(&column, "<=", values),
        FilterOperator::GreaterThan => comparison(&column, ">", values),
        FilterOperator::GreaterThanOrEqual => comparison(&column, ">=", values),
        FilterOperator::StartWith | FilterOperator::EndWith | FilterOperator::Contains => {
            comparison(&column, "LIKE", values)
        }
        FilterOperator::In => membership(&column, "IN", values),
        FilterOperator::NotIn => membership(&column, "NOT IN", values),
        FilterOperator::Between => {
            SqlTemplate::new(format!("{} BETWEEN ? AND ?", column), values)
        }
        FilterOperator::BitwiseAny => SqlTemplate::new(format!("{} & ? > 0", column), values),
        FilterOperator::BitwiseZero => SqlTemplate::new(format!("{} & ? = 0", column), values),
        FilterOperator::BitwiseAll => {
            let mask = values.into_iter().next().unwrap_or(Value::Null);
            SqlTemplate::new(format!("{} & ? = ?", column), vec![mask.clone(), mask])
        }
    };

    Ok(template)
}

/// Validate arity and normalize the raw value into the parameter list
fn filter_values(operator: FilterOperator, value: &Value) -> Result<Vec<Value>> {
    if operator.is_variadic() {
        let Value::Array(items) = value else {
            return Err(MapperError::invalid_filter_value(format!(
                "value of {} operator must be an array",
                operator
            )));
        };
        if operator == FilterOperator::Between && items.len() != 2 {
            return Err(MapperError::invalid_filter_value(format!(
                "BETWEEN operator needs exactly 2 values, got {}",
                items.len()
            )));
        }
        if let Some(item) = items.iter().find(|v| !is_scalar(v)) {
            return Err(MapperError::invalid_filter_value(format!(
                "{} operator values must be scalars, got {}",
                operator, item
            )));
        }
        return Ok(items.clone());
    }

    if !is_scalar(value) {
        return Err(MapperError::invalid_filter_value(format!(
            "value of {} operator can not be an array or object",
            operator
        )));
    }

    Ok(vec![pattern_value(operator, value)])
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// LIKE operators treat null as an empty string
fn pattern_value(operator: FilterOperator, value: &Value) -> Value {
    let text = || match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    match operator {
        FilterOperator::StartWith => Value::String(format!("{}%", text())),
        FilterOperator::EndWith => Value::String(format!("%{}", text())),
        FilterOperator::Contains => Value::String(format!("%{}%", text())),
        _ => value.clone(),
    }
}

fn null_aware(column: &str, op: &str, null_check: &str, values: Vec<Value>) -> SqlTemplate {
    if values.first().map_or(true, Value::is_null) {
        SqlTemplate::new(format!("{} {}", column, null_check), Vec::new())
    } else {
        SqlTemplate::new(format!("{} {} ?", column, op), values)
    }
}

fn comparison(column: &str, op: &str, values: Vec<Value>) -> SqlTemplate {
    SqlTemplate::new(format!("{} {} ?", column, op), values)
}

fn membership(column: &str, op: &str, values: Vec<Value>) -> SqlTemplate {
    if values.is_empty() {
        return SqlTemplate::default();
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    SqlTemplate::new(format!("{} {} ({})", column, op, placeholders), values)
}
