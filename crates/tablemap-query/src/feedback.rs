//! Per-dialect recovery of generated keys and affected-row counts after a
//! write statement.

use crate::config::MapperConfig;
use crate::error::{MapperError, Result};
use crate::traits::Connection;
use crate::types::{DataRow, Dialect, RunResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Normalizes write feedback for one dialect
#[async_trait]
pub trait WriteFeedback: Send + Sync {
    /// Key assigned by the backend to the row just inserted into `table`
    async fn generated_key(
        &self,
        connection: &dyn Connection,
        result: &RunResult,
        table: &str,
    ) -> Result<i64>;

    /// Rows changed by the write just executed on `table`
    async fn affected_rows(
        &self,
        connection: &dyn Connection,
        result: &RunResult,
        table: &str,
    ) -> Result<u64>;
}

/// Strategy for `dialect`, or `None` when its feedback cannot be trusted
pub fn feedback_for(dialect: Dialect, config: &MapperConfig) -> Option<Arc<dyn WriteFeedback>> {
    match dialect {
        Dialect::PrimaryRelational => Some(Arc::new(DriverFeedback)),
        Dialect::EmbeddedFile => Some(Arc::new(IntrospectedFeedback::new(
            config.sequence_table.clone(),
        ))),
        Dialect::Other => None,
    }
}

/// Reads both values straight from the driver result
pub struct DriverFeedback;

#[async_trait]
impl WriteFeedback for DriverFeedback {
    async fn generated_key(
        &self,
        _connection: &dyn Connection,
        result: &RunResult,
        _table: &str,
    ) -> Result<i64> {
        let id = result
            .insert_id
            .ok_or(MapperError::MissingDriverFeedback("insert id"))?;
        i64::try_from(id).map_err(|_| MapperError::MissingDriverFeedback("insert id in i64 range"))
    }

    async fn affected_rows(
        &self,
        _connection: &dyn Connection,
        result: &RunResult,
        _table: &str,
    ) -> Result<u64> {
        result
            .affected_rows
            .ok_or(MapperError::MissingDriverFeedback("affected rows"))
    }
}

/// Issues follow-up reads on the same session after the write
pub struct IntrospectedFeedback {
    sequence_table: String,
}

impl IntrospectedFeedback {
    pub fn new(sequence_table: impl Into<String>) -> Self {
        Self {
            sequence_table: sequence_table.into(),
        }
    }
}

#[async_trait]
impl WriteFeedback for IntrospectedFeedback {
    async fn generated_key(
        &self,
        connection: &dyn Connection,
        _result: &RunResult,
        table: &str,
    ) -> Result<i64> {
        let sql = format!("SELECT seq FROM {} WHERE name = ?", self.sequence_table);
        let rows = connection
            .select(&sql, &[Value::String(table.to_string())])
            .await?;

        let seq = rows
            .first()
            .and_then(|row| row_integer(row, "seq"))
            .ok_or_else(|| MapperError::SequenceLookupFailed(table.to_string()))?;

        debug!("Recovered sequence value {} for {}", seq, table);
        Ok(seq)
    }

    async fn affected_rows(
        &self,
        connection: &dyn Connection,
        _result: &RunResult,
        table: &str,
    ) -> Result<u64> {
        let rows = connection
            .select("SELECT changes() AS affected", &[])
            .await?;

        let changes = rows
            .first()
            .and_then(|row| row_integer(row, "affected"))
            .ok_or(MapperError::MissingDriverFeedback("changes() row"))?;
        let changes = u64::try_from(changes)
            .map_err(|_| MapperError::MissingDriverFeedback("non-negative changes() count"))?;

        debug!("{} row(s) changed on {}", changes, table);
        Ok(changes)
    }
}

/// Integer cell, accepting drivers that hand back numbers as text
pub(crate) fn row_integer(row: &DataRow, column: &str) -> Option<i64> {
    match row.get(column)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok())),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
