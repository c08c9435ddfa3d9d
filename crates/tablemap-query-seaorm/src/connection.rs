//! `Connection` implementation over a sea-orm `DatabaseConnection`.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, QueryResult, Statement,
};
use serde_json::Value as JsonValue;
use tablemap_query::{Connection, DataRow, Dialect, MapperError, Result, RunResult};
use tracing::{debug, error, warn};

/// Dialect family the mapper sees for a sea-orm backend
pub fn dialect_of(backend: DatabaseBackend) -> Dialect {
    match backend {
        DatabaseBackend::MySql => Dialect::PrimaryRelational,
        DatabaseBackend::Sqlite => Dialect::EmbeddedFile,
        DatabaseBackend::Postgres => Dialect::Other,
    }
}

/// Wraps a sea-orm connection.
///
/// SQLite write feedback is read with follow-up statements, so an
/// embedded-file connection must keep every statement of a mapper call on
/// one session. Open SQLite pools with a single connection
/// ([`crate::establish_connection`] does this).
///
/// Postgres connections are read-only through `TableMapper`: its writes
/// fail with `UnsupportedDialect` before reaching this type.
pub struct SeaOrmConnection {
    db: DatabaseConnection,
}

impl SeaOrmConnection {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn inner(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn into_inner(self) -> DatabaseConnection {
        self.db
    }

    fn statement(&self, sql: &str, params: &[JsonValue]) -> Statement {
        let backend = self.db.get_database_backend();
        match backend {
            DatabaseBackend::Postgres => {
                let (sql, values) = postgres_statement(sql, params);
                Statement::from_sql_and_values(backend, sql, values)
            }
            _ => Statement::from_sql_and_values(backend, sql, params.iter().map(to_sea_value)),
        }
    }

    fn decode_row(&self, row: &QueryResult) -> Result<DataRow> {
        // SQLite expression columns (changes(), COUNT(0), sqlite_sequence.seq)
        // carry no declared type and would be skipped by the JSON decoder
        if self.db.get_database_backend() == DatabaseBackend::Sqlite {
            return Ok(row
                .column_names()
                .into_iter()
                .enumerate()
                .map(|(idx, name)| {
                    let cell = sqlite_cell(row, idx, &name);
                    (name, cell)
                })
                .collect());
        }

        match JsonValue::from_query_result(row, "") {
            Ok(JsonValue::Object(map)) => Ok(map.into_iter().collect()),
            Ok(other) => Err(MapperError::Serialization(format!(
                "row decoded to a non-object value: {}",
                other
            ))),
            Err(e) => Err(MapperError::execution(e)),
        }
    }
}

impl From<DatabaseConnection> for SeaOrmConnection {
    fn from(db: DatabaseConnection) -> Self {
        Self::new(db)
    }
}

#[async_trait]
impl Connection for SeaOrmConnection {
    fn dialect(&self) -> Dialect {
        dialect_of(self.db.get_database_backend())
    }

    async fn run(&self, sql: &str, params: &[JsonValue]) -> Result<RunResult> {
        let backend = self.db.get_database_backend();
        let result = self
            .db
            .execute(self.statement(sql, params))
            .await
            .map_err(|e| {
                error!("Statement failed: {}", e);
                MapperError::execution(e)
            })?;

        // Postgres has no driver-level insert id
        let insert_id = match backend {
            DatabaseBackend::Postgres => None,
            _ => Some(result.last_insert_id()),
        };

        Ok(RunResult {
            affected_rows: Some(result.rows_affected()),
            insert_id,
        })
    }

    async fn select(&self, sql: &str, params: &[JsonValue]) -> Result<Vec<DataRow>> {
        let rows = self
            .db
            .query_all(self.statement(sql, params))
            .await
            .map_err(|e| {
                error!("Query failed: {}", e);
                MapperError::execution(e)
            })?;

        debug!("Fetched {} row(s)", rows.len());

        rows.iter().map(|row| self.decode_row(row)).collect()
    }
}

/// Decode one SQLite cell by its runtime storage class
fn sqlite_cell(row: &QueryResult, idx: usize, column: &str) -> JsonValue {
    if let Ok(value) = row.try_get_by_index::<Option<i64>>(idx) {
        return value.map(JsonValue::from).unwrap_or(JsonValue::Null);
    }
    if let Ok(value) = row.try_get_by_index::<Option<f64>>(idx) {
        return value
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null);
    }
    if let Ok(value) = row.try_get_by_index::<Option<String>>(idx) {
        return value.map(JsonValue::String).unwrap_or(JsonValue::Null);
    }
    if let Ok(value) = row.try_get_by_index::<Option<Vec<u8>>>(idx) {
        return match value {
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(text) => JsonValue::String(text),
                Err(e) => JsonValue::from(e.into_bytes()),
            },
            None => JsonValue::Null,
        };
    }

    warn!("Column {} could not be decoded, reading it as null", column);
    JsonValue::Null
}

/// Convert a JSON parameter into a bindable sea-orm value
pub fn to_sea_value(value: &JsonValue) -> sea_orm::Value {
    match value {
        JsonValue::Null => sea_orm::Value::String(None),
        JsonValue::Bool(b) => sea_orm::Value::from(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                sea_orm::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                sea_orm::Value::from(u)
            } else {
                sea_orm::Value::from(n.as_f64().unwrap_or_default())
            }
        }
        JsonValue::String(s) => sea_orm::Value::from(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => sea_orm::Value::from(value.clone()),
    }
}

/// Rewrite positional `?` markers to `$1, $2, ...`, leaving quoted text alone.
///
/// Null parameters are written inline as `NULL` instead of being bound, so
/// Postgres infers their type from the surrounding expression.
pub fn postgres_statement(sql: &str, params: &[JsonValue]) -> (String, Vec<sea_orm::Value>) {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut values = Vec::with_capacity(params.len());
    let mut params = params.iter();
    let mut quote: Option<char> = None;
    let mut index = 0;

    for c in sql.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    out.push(c);
                }
                '?' => match params.next() {
                    Some(JsonValue::Null) => out.push_str("NULL"),
                    param => {
                        if let Some(param) = param {
                            values.push(to_sea_value(param));
                        }
                        index += 1;
                        out.push('$');
                        out.push_str(&index.to_string());
                    }
                },
                _ => out.push(c),
            },
        }
    }
    (out, values)
}
