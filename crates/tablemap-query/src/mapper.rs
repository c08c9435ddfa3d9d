//! CRUD executor bound to one entity type.

use crate::config::MapperConfig;
use crate::error::{MapperError, Result};
use crate::feedback::{feedback_for, row_integer, WriteFeedback};
use crate::provider::SqlTemplateProvider;
use crate::query::DynamicQuery;
use crate::traits::{Connection, Relation, TableEntity};
use crate::types::{Dialect, RunResult, SqlTemplate};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Runs statements for `T` and reports results the same way on every
/// backend: affected rows as `u64`, generated keys written back onto the
/// inserted entity.
///
/// Writes on a [`Dialect::Other`] connection fail with
/// [`MapperError::UnsupportedDialect`] before any statement is sent.
pub struct TableMapper<T: TableEntity> {
    connection: Arc<dyn Connection>,
    feedback: Option<Arc<dyn WriteFeedback>>,
    config: MapperConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TableEntity> TableMapper<T> {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        let config = MapperConfig::default();
        let feedback = feedback_for(connection.dialect(), &config);
        Self {
            connection,
            feedback,
            config,
            _entity: PhantomData,
        }
    }

    pub fn with_config(connection: Arc<dyn Connection>, config: MapperConfig) -> Result<Self> {
        config.validate()?;
        let feedback = feedback_for(connection.dialect(), &config);
        Ok(Self {
            connection,
            feedback,
            config,
            _entity: PhantomData,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.connection.dialect()
    }

    pub async fn insert(&self, entity: &mut T) -> Result<u64> {
        self.insert_internal(entity, false).await
    }

    /// Insert only the non-null fields
    pub async fn insert_selective(&self, entity: &mut T) -> Result<u64> {
        self.insert_internal(entity, true).await
    }

    pub async fn update_by_primary_key(&self, entity: &T) -> Result<u64> {
        let template = SqlTemplateProvider::update_by_pk(entity, false)?;
        self.write(&template).await
    }

    /// Update only the non-null fields
    pub async fn update_by_primary_key_selective(&self, entity: &T) -> Result<u64> {
        let template = SqlTemplateProvider::update_by_pk(entity, true)?;
        self.write(&template).await
    }

    pub async fn select_by_example(
        &self,
        example: &T,
        relations: &[Arc<dyn Relation<T>>],
    ) -> Result<Vec<T>> {
        let template = SqlTemplateProvider::select(example)?;
        self.select_entities(&template, relations).await
    }

    pub async fn select_by_primary_key(
        &self,
        key: impl Into<Value> + Send,
        relations: &[Arc<dyn Relation<T>>],
    ) -> Result<Vec<T>> {
        let template = SqlTemplateProvider::select_by_pk::<T>(&key.into())?;
        self.select_entities(&template, relations).await
    }

    pub async fn select_by_dynamic_query(
        &self,
        query: &DynamicQuery,
        relations: &[Arc<dyn Relation<T>>],
    ) -> Result<Vec<T>> {
        let template = SqlTemplateProvider::select_by_dynamic_query::<T>(query)?;
        self.select_entities(&template, relations).await
    }

    pub async fn select_count_by_example(&self, example: &T) -> Result<u64> {
        let template = SqlTemplateProvider::select_count(example)?;
        self.select_count(&template).await
    }

    pub async fn select_count_by_primary_key(&self, key: impl Into<Value> + Send) -> Result<u64> {
        let template = SqlTemplateProvider::select_count_by_pk::<T>(&key.into())?;
        self.select_count(&template).await
    }

    pub async fn select_count_by_dynamic_query(&self, query: &DynamicQuery) -> Result<u64> {
        let template = SqlTemplateProvider::select_count_by_dynamic_query::<T>(query)?;
        self.select_count(&template).await
    }

    pub async fn delete_by_example(&self, example: &T) -> Result<u64> {
        let template = SqlTemplateProvider::delete(example)?;
        self.write(&template).await
    }

    pub async fn delete_by_primary_key(&self, key: impl Into<Value> + Send) -> Result<u64> {
        let template = SqlTemplateProvider::delete_by_pk::<T>(&key.into())?;
        self.write(&template).await
    }

    pub async fn delete_by_dynamic_query(&self, query: &DynamicQuery) -> Result<u64> {
        let template = SqlTemplateProvider::delete_by_dynamic_query::<T>(query)?;
        self.write(&template).await
    }

    async fn insert_internal(&self, entity: &mut T, selective: bool) -> Result<u64> {
        let feedback = self.write_feedback()?;
        let template = SqlTemplateProvider::insert(entity, selective)?;
        let result = self.run(&template).await?;

        let metadata = T::metadata();
        let table = metadata.table_name();
        let generated = match metadata.generated_key_column() {
            Some(column) => {
                let id = feedback
                    .generated_key(self.connection.as_ref(), &result, table)
                    .await?;
                Some((column.property.as_str(), id))
            }
            None => None,
        };
        let affected = feedback
            .affected_rows(self.connection.as_ref(), &result, table)
            .await?;

        if let Some((property, id)) = generated {
            debug!("Assigning generated key {} to {}.{}", id, table, property);
            entity.set_property(property, Value::from(id))?;
        }
        Ok(affected)
    }

    /// UPDATE or DELETE, normalized to an affected-row count
    async fn write(&self, template: &SqlTemplate) -> Result<u64> {
        let feedback = self.write_feedback()?;
        let result = self.run(template).await?;
        feedback
            .affected_rows(self.connection.as_ref(), &result, T::metadata().table_name())
            .await
    }

    fn write_feedback(&self) -> Result<Arc<dyn WriteFeedback>> {
        self.feedback
            .clone()
            .ok_or_else(|| MapperError::UnsupportedDialect(self.connection.dialect()))
    }

    async fn run(&self, template: &SqlTemplate) -> Result<RunResult> {
        self.log_statement(template);
        self.connection
            .run(&template.sql_expression, &template.params)
            .await
    }

    async fn select_entities(
        &self,
        template: &SqlTemplate,
        relations: &[Arc<dyn Relation<T>>],
    ) -> Result<Vec<T>> {
        self.log_statement(template);
        let rows = self
            .connection
            .select(&template.sql_expression, &template.params)
            .await?;

        let mut entities = rows
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row.into_iter().collect())))
            .collect::<std::result::Result<Vec<T>, _>>()?;

        for relation in relations {
            relation
                .load(self.connection.as_ref(), &mut entities)
                .await?;
        }

        debug!(
            "Selected {} row(s) from {}",
            entities.len(),
            T::metadata().table_name()
        );
        Ok(entities)
    }

    async fn select_count(&self, template: &SqlTemplate) -> Result<u64> {
        self.log_statement(template);
        let rows = self
            .connection
            .select(&template.sql_expression, &template.params)
            .await?;

        let count = rows
            .first()
            .and_then(|row| row_integer(row, "count"))
            .ok_or(MapperError::MissingDriverFeedback("count row"))?;
        u64::try_from(count).map_err(|_| MapperError::MissingDriverFeedback("non-negative count"))
    }

    fn log_statement(&self, template: &SqlTemplate) {
        if self.config.log_statements {
            debug!(
                "Executing statement: {} ({} params)",
                template.sql_expression,
                template.params.len()
            );
        }
    }
}
