//! Shared fixtures for table mapper integration tests
//!
//! - `ScriptedConnection`: a `Connection` that replays queued driver
//!   responses and records every statement it receives
//! - `Student` / `Customer` entities

#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use tablemap_query::{
    ColumnInfo, Connection, DataRow, Dialect, EntityMetadata, MapperError, Result, RunResult,
    TableEntity,
};
use tokio::sync::Mutex;

/// Statement received by the scripted connection
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Vec<Value>,
}

pub struct ScriptedConnection {
    dialect: Dialect,
    runs: Mutex<VecDeque<Result<RunResult>>>,
    selects: Mutex<VecDeque<Vec<DataRow>>>,
    log: Mutex<Vec<Recorded>>,
}

impl ScriptedConnection {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            runs: Mutex::new(VecDeque::new()),
            selects: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_run(&self, result: Result<RunResult>) {
        self.runs.lock().await.push_back(result);
    }

    pub async fn push_rows(&self, rows: Vec<DataRow>) {
        self.selects.lock().await.push_back(rows);
    }

    pub async fn statements(&self) -> Vec<Recorded> {
        self.log.lock().await.clone()
    }

    async fn record(&self, sql: &str, params: &[Value]) {
        self.log.lock().await.push(Recorded {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn run(&self, sql: &str, params: &[Value]) -> Result<RunResult> {
        self.record(sql, params).await;
        self.runs
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(MapperError::execution("no scripted run result")))
    }

    async fn select(&self, sql: &str, params: &[Value]) -> Result<Vec<DataRow>> {
        self.record(sql, params).await;
        Ok(self.selects.lock().await.pop_front().unwrap_or_default())
    }
}

/// Build a row from `(column, value)` pairs
pub fn row(cells: &[(&str, Value)]) -> DataRow {
    cells
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i64>,
}

impl TableEntity for Student {
    fn metadata() -> &'static EntityMetadata {
        static METADATA: Lazy<EntityMetadata> = Lazy::new(|| {
            EntityMetadata::new("student")
                .column(ColumnInfo::new("id", "id").primary_key().auto_increase())
                .column(ColumnInfo::new("name", "name"))
                .column(ColumnInfo::new("age", "age"))
        });
        &METADATA
    }
}

/// Caller-assigned string key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<String>,
    pub company_name: Option<String>,
    pub city: Option<String>,
}

impl TableEntity for Customer {
    fn metadata() -> &'static EntityMetadata {
        static METADATA: Lazy<EntityMetadata> = Lazy::new(|| {
            EntityMetadata::new("Customer")
                .column(ColumnInfo::new("id", "Id").primary_key())
                .column(ColumnInfo::new("company_name", "CompanyName"))
                .column(ColumnInfo::new("city", "City"))
        });
        &METADATA
    }
}
