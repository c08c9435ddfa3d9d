use crate::error::{MapperError, Result};
use crate::types::*;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A session on a relational backend.
///
/// Implementations must execute statements in the order they are issued.
/// For [`Dialect::EmbeddedFile`] the mapper follows every write with
/// introspection reads (`changes()`, the sequence table) that are only
/// correct when no other statement runs on the same session in between;
/// callers sharing a connection across tasks must serialize access.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Feedback behavior of the backend
    fn dialect(&self) -> Dialect;

    /// Execute a write statement
    async fn run(&self, sql: &str, params: &[Value]) -> Result<RunResult>;

    /// Execute a read statement and return its rows in order
    async fn select(&self, sql: &str, params: &[Value]) -> Result<Vec<DataRow>>;
}

/// A record type stored in one table.
///
/// Fields are read and written through serde, keyed by
/// [`ColumnInfo::property`].
pub trait TableEntity: Serialize + DeserializeOwned + Send + Sync {
    /// Column mappings, built once per type
    fn metadata() -> &'static EntityMetadata;

    /// Assign a single property, used to write back generated keys
    fn set_property(&mut self, property: &str, value: Value) -> Result<()> {
        let mut fields = serde_json::to_value(&*self)?;
        let Some(map) = fields.as_object_mut() else {
            return Err(MapperError::Serialization(format!(
                "entity of table {} does not serialize to an object",
                Self::metadata().table_name()
            )));
        };
        map.insert(property.to_string(), value);
        *self = serde_json::from_value(fields)?;
        Ok(())
    }
}

/// Eager-load hook run on the rows of a select
#[async_trait]
pub trait Relation<T: TableEntity>: Send + Sync {
    async fn load(&self, connection: &dyn Connection, entities: &mut [T]) -> Result<()>;
}
