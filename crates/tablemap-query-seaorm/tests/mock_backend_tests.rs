//! TableMapper driven through sea-orm's mock backend

use once_cell::sync::Lazy;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tablemap_query::{
    ColumnInfo, Dialect, DynamicQuery, EntityMetadata, FilterDescriptor, FilterOperator,
    MapperError, TableEntity, TableMapper,
};
use tablemap_query_seaorm::{table_mapper, DatabaseConfig, SeaOrmConnection};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Student {
    id: Option<i64>,
    name: Option<String>,
    age: Option<i64>,
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

fn student(name: &str) -> Student {
    Student {
        id: None,
        name: Some(name.to_string()),
        age: Some(20),
    }
}

#[tokio::test]
async fn test_mysql_insert_uses_driver_insert_id() -> anyhow::Result<()> {
    let db = MockDatabase::new(DatabaseBackend::MySql)
        .append_exec_results([MockExecResult {
            last_insert_id: 31,
            rows_affected: 1,
        }])
        .into_connection();
    let connection = Arc::new(SeaOrmConnection::new(db));
    let mapper: TableMapper<Student> = TableMapper::new(connection);

    assert_eq!(mapper.dialect(), Dialect::PrimaryRelational);

    let mut amy = student("amy");
    let affected = mapper.insert(&mut amy).await?;

    assert_eq!(affected, 1);
    assert_eq!(amy.id, Some(31));
    Ok(())
}

#[tokio::test]
async fn test_sqlite_insert_reads_sequence_and_changes() -> anyhow::Result<()> {
    let db = MockDatabase::new(DatabaseBackend::Sqlite)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .append_query_results([
            vec![BTreeMap::from([("seq", Value::BigInt(Some(8)))])],
            vec![BTreeMap::from([("affected", Value::BigInt(Some(1)))])],
        ])
        .into_connection();
    let connection = Arc::new(SeaOrmConnection::new(db));
    let config = DatabaseConfig::new("sqlite::memory:");
    let mapper = table_mapper::<Student>(connection, &config)?;

    let mut bob = student("bob");
    let affected = mapper.insert(&mut bob).await?;

    assert_eq!(affected, 1);
    assert_eq!(bob.id, Some(8));
    Ok(())
}

#[tokio::test]
async fn test_sqlite_missing_sequence_row() {
    let db = MockDatabase::new(DatabaseBackend::Sqlite)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let mapper: TableMapper<Student> = TableMapper::new(Arc::new(SeaOrmConnection::new(db)));

    let mut carl = student("carl");
    let err = mapper.insert(&mut carl).await.unwrap_err();

    assert!(matches!(err, MapperError::SequenceLookupFailed(_)));
    assert_eq!(carl.id, None);
}

#[tokio::test]
async fn test_postgres_reads_work_and_writes_are_rejected() -> anyhow::Result<()> {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([
            ("id", Value::BigInt(Some(1))),
            ("name", Value::from("dora".to_string())),
            ("age", Value::BigInt(Some(40))),
        ])]])
        .into_connection();
    let mapper: TableMapper<Student> = TableMapper::new(Arc::new(SeaOrmConnection::new(db)));

    assert_eq!(mapper.dialect(), Dialect::Other);

    let query = DynamicQuery::new().add_filter(FilterDescriptor::new(
        "age",
        FilterOperator::GreaterThan,
        serde_json::json!(30),
    ));
    let found = mapper.select_by_dynamic_query(&query, &[]).await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.as_deref(), Some("dora"));

    let err = mapper.delete_by_dynamic_query(&query).await.unwrap_err();
    assert!(matches!(err, MapperError::UnsupportedDialect(Dialect::Other)));
    Ok(())
}
