//! Assembles complete SELECT/INSERT/UPDATE/DELETE/COUNT statements from
//! entity metadata, using the filter compiler for WHERE clauses.

use crate::error::{MapperError, Result};
use crate::filter::filter_expression;
use crate::query::{DynamicQuery, Filter, Sort};
use crate::traits::TableEntity;
use crate::types::{EntityMetadata, FilterOperator, SqlTemplate};
use serde_json::{Map, Value};
use tracing::warn;

/// Statement builder for [`TableEntity`] types
pub struct SqlTemplateProvider;

impl SqlTemplateProvider {
    pub fn insert<T: TableEntity>(entity: &T, selective: bool) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        let fields = entity_fields(entity)?;

        let mut columns = Vec::new();
        let mut params = Vec::new();
        for column in metadata.columns() {
            if column.auto_increase {
                continue;
            }
            let value = field_value(&fields, &column.property);
            if selective && value.is_null() && !column.is_primary_key {
                continue;
            }
            columns.push(column.column_name.as_str());
            params.push(value);
        }

        if columns.is_empty() {
            return Err(MapperError::NothingToWrite(metadata.table_name().to_string()));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            metadata.table_name(),
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        Ok(SqlTemplate::new(sql, params))
    }

    pub fn update_by_pk<T: TableEntity>(entity: &T, selective: bool) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        let key_column = metadata
            .key_column()
            .ok_or_else(|| MapperError::MissingPrimaryKey(metadata.table_name().to_string()))?;
        let fields = entity_fields(entity)?;

        let mut assignments = Vec::new();
        let mut params = Vec::new();
        for column in metadata.columns().iter().filter(|c| !c.is_primary_key) {
            let value = field_value(&fields, &column.property);
            if selective && value.is_null() {
                continue;
            }
            assignments.push(format!("{} = ?", column.column_name));
            params.push(value);
        }

        if assignments.is_empty() {
            return Err(MapperError::NothingToWrite(metadata.table_name().to_string()));
        }

        let key = key_filter(metadata, &field_value(&fields, &key_column.property))?;
        params.extend(key.params);

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            metadata.table_name(),
            assignments.join(", "),
            key.sql_expression
        );
        Ok(SqlTemplate::new(sql, params))
    }

    pub fn select<T: TableEntity>(example: &T) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        let filter = example_filter(metadata, &entity_fields(example)?)?;
        Ok(compose(select_head(metadata), filter))
    }

    pub fn select_by_pk<T: TableEntity>(key: &Value) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        Ok(compose(select_head(metadata), key_filter(metadata, key)?))
    }

    pub fn select_by_dynamic_query<T: TableEntity>(query: &DynamicQuery) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        let mut template = compose(select_head(metadata), query_filter(metadata, query)?);

        let order = order_by(metadata, query.sorts())?;
        if !order.is_empty() {
            template.sql_expression.push_str(" ORDER BY ");
            template.sql_expression.push_str(&order.sql_expression);
            template.params.extend(order.params);
        }

        if let Some(page) = query.page() {
            template.sql_expression.push_str(" LIMIT ? OFFSET ?");
            template.params.push(page.limit.into());
            template.params.push(page.offset.into());
        }
        Ok(template)
    }

    pub fn select_count<T: TableEntity>(example: &T) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        let filter = example_filter(metadata, &entity_fields(example)?)?;
        Ok(compose(count_head(metadata), filter))
    }

    pub fn select_count_by_pk<T: TableEntity>(key: &Value) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        Ok(compose(count_head(metadata), key_filter(metadata, key)?))
    }

    pub fn select_count_by_dynamic_query<T: TableEntity>(
        query: &DynamicQuery,
    ) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        Ok(compose(count_head(metadata), query_filter(metadata, query)?))
    }

    pub fn delete<T: TableEntity>(example: &T) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        let filter = example_filter(metadata, &entity_fields(example)?)?;
        Ok(delete_statement(metadata, filter))
    }

    pub fn delete_by_pk<T: TableEntity>(key: &Value) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        Ok(delete_statement(metadata, key_filter(metadata, key)?))
    }

    pub fn delete_by_dynamic_query<T: TableEntity>(query: &DynamicQuery) -> Result<SqlTemplate> {
        let metadata = T::metadata();
        Ok(delete_statement(metadata, query_filter(metadata, query)?))
    }
}

fn entity_fields<T: TableEntity>(entity: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        _ => Err(MapperError::Serialization(format!(
            "entity of table {} does not serialize to an object",
            T::metadata().table_name()
        ))),
    }
}

fn field_value(fields: &Map<String, Value>, property: &str) -> Value {
    fields.get(property).cloned().unwrap_or(Value::Null)
}

fn select_head(metadata: &EntityMetadata) -> String {
    let columns: Vec<String> = metadata
        .columns()
        .iter()
        .map(|c| format!("{} AS {}", c.query_column(), c.property))
        .collect();
    format!("SELECT {} FROM {}", columns.join(", "), metadata.table_name())
}

fn count_head(metadata: &EntityMetadata) -> String {
    format!("SELECT COUNT(0) AS count FROM {}", metadata.table_name())
}

fn delete_statement(metadata: &EntityMetadata, filter: SqlTemplate) -> SqlTemplate {
    if filter.is_empty() {
        warn!("DELETE on {} has no WHERE clause", metadata.table_name());
    }
    compose(format!("DELETE FROM {}", metadata.table_name()), filter)
}

/// Append a WHERE clause unless the filter is the no-op fragment
fn compose(head: String, filter: SqlTemplate) -> SqlTemplate {
    if filter.sql_expression.is_empty() {
        return SqlTemplate::new(head, filter.params);
    }
    SqlTemplate::new(format!("{} WHERE {}", head, filter.sql_expression), filter.params)
}

fn and_join(parts: Vec<SqlTemplate>) -> SqlTemplate {
    let mut expressions = Vec::new();
    let mut params = Vec::new();
    for part in parts.into_iter().filter(|p| !p.sql_expression.is_empty()) {
        expressions.push(part.sql_expression);
        params.extend(part.params);
    }
    SqlTemplate::new(expressions.join(" AND "), params)
}

fn key_filter(metadata: &EntityMetadata, key: &Value) -> Result<SqlTemplate> {
    let key_column = metadata
        .key_column()
        .ok_or_else(|| MapperError::MissingPrimaryKey(metadata.table_name().to_string()))?;
    if key.is_null() {
        return Err(MapperError::MissingPrimaryKeyValue(
            metadata.table_name().to_string(),
        ));
    }
    filter_expression(FilterOperator::Equal, key_column, key)
}

/// EQUAL on every non-null field of the example
fn example_filter(metadata: &EntityMetadata, fields: &Map<String, Value>) -> Result<SqlTemplate> {
    let mut parts = Vec::new();
    for column in metadata.columns() {
        let value = field_value(fields, &column.property);
        if !value.is_null() {
            parts.push(filter_expression(FilterOperator::Equal, column, &value)?);
        }
    }
    Ok(and_join(parts))
}

fn query_filter(metadata: &EntityMetadata, query: &DynamicQuery) -> Result<SqlTemplate> {
    let mut parts = Vec::new();
    for filter in query.filters() {
        match filter {
            Filter::Structured(descriptor) => {
                let column = metadata
                    .find_column(&descriptor.property_path)
                    .ok_or_else(|| {
                        MapperError::unknown_property(
                            metadata.table_name(),
                            &descriptor.property_path,
                        )
                    })?;
                parts.push(filter_expression(
                    descriptor.operator,
                    column,
                    &descriptor.value,
                )?);
            }
            Filter::Custom(custom) if custom.expression.trim().is_empty() => {}
            Filter::Custom(custom) => {
                parts.push(SqlTemplate::new(
                    format!("({})", custom.expression),
                    custom.params.clone(),
                ));
            }
        }
    }
    Ok(and_join(parts))
}

fn order_by(metadata: &EntityMetadata, sorts: &[Sort]) -> Result<SqlTemplate> {
    let mut expressions = Vec::new();
    let mut params = Vec::new();
    for sort in sorts {
        match sort {
            Sort::Structured(descriptor) => {
                let column = metadata
                    .find_column(&descriptor.property_path)
                    .ok_or_else(|| {
                        MapperError::unknown_property(
                            metadata.table_name(),
                            &descriptor.property_path,
                        )
                    })?;
                expressions.push(format!("{} {}", column.query_column(), descriptor.direction));
            }
            Sort::Custom(custom) if custom.expression.trim().is_empty() => {}
            Sort::Custom(custom) => {
                expressions.push(format!("{} {}", custom.expression, custom.direction));
                params.extend(custom.params.iter().cloned());
            }
        }
    }
    Ok(SqlTemplate::new(expressions.join(", "), params))
}
