//! TableMapper against a real in-memory SQLite database

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tablemap_query::{
    ColumnInfo, Connection, Dialect, DynamicQuery, EntityMetadata, FilterDescriptor,
    FilterOperator, SortDescriptor, SortDirection, TableEntity, TableMapper,
};
use tablemap_query_seaorm::{establish_connection, DatabaseConfig, SeaOrmConnection};

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

async fn open() -> anyhow::Result<Arc<SeaOrmConnection>> {
    let connection = establish_connection(&DatabaseConfig::new("sqlite::memory:")).await?;
    connection
        .run(
            "CREATE TABLE student (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER)",
            &[],
        )
        .await?;
    Ok(connection)
}

fn student(name: &str, age: Option<i64>) -> Student {
    Student {
        id: None,
        name: Some(name.to_string()),
        age,
    }
}

#[tokio::test]
async fn test_insert_count_delete() -> anyhow::Result<()> {
    let connection = open().await?;
    let mapper: TableMapper<Student> = TableMapper::new(connection);
    assert_eq!(mapper.dialect(), Dialect::EmbeddedFile);

    let mut students = vec![
        student("amy", Some(30)),
        student("bob", None),
        student("cid", Some(12)),
    ];
    for (n, s) in students.iter_mut().enumerate() {
        assert_eq!(mapper.insert(s).await?, 1);
        assert_eq!(s.id, Some(n as i64 + 1));
    }

    let all = DynamicQuery::new();
    assert_eq!(mapper.select_count_by_dynamic_query(&all).await?, 3);
    assert_eq!(mapper.select_count_by_primary_key(2).await?, 1);

    assert_eq!(mapper.delete_by_primary_key(2).await?, 1);
    assert_eq!(mapper.delete_by_primary_key(2).await?, 0);
    assert_eq!(mapper.select_count_by_dynamic_query(&all).await?, 2);

    // Keys keep counting after a delete
    let mut dan = student("dan", Some(40));
    mapper.insert_selective(&mut dan).await?;
    assert_eq!(dan.id, Some(4));
    Ok(())
}

#[tokio::test]
async fn test_select_update_and_dynamic_delete() -> anyhow::Result<()> {
    let connection = open().await?;
    let mapper: TableMapper<Student> = TableMapper::new(connection);

    for (name, age) in [("amy", Some(30)), ("bob", None), ("cid", Some(12))] {
        mapper.insert(&mut student(name, age)).await?;
    }

    let query = DynamicQuery::new()
        .add_filter(FilterDescriptor::new(
            "age",
            FilterOperator::GreaterThan,
            serde_json::json!(10),
        ))
        .add_sort(SortDescriptor::new("id", SortDirection::Desc));
    let found = mapper.select_by_dynamic_query(&query, &[]).await?;
    let names: Vec<_> = found.iter().filter_map(|s| s.name.as_deref()).collect();
    assert_eq!(names, vec!["cid", "amy"]);

    let bob = mapper.select_by_primary_key(2, &[]).await?;
    assert_eq!(bob, vec![Student { id: Some(2), name: Some("bob".into()), age: None }]);

    let renamed = Student {
        id: Some(2),
        name: Some("rob".to_string()),
        age: None,
    };
    assert_eq!(mapper.update_by_primary_key_selective(&renamed).await?, 1);

    let young = DynamicQuery::new().add_filter(FilterDescriptor::new(
        "age",
        FilterOperator::LessThan,
        serde_json::json!(20),
    ));
    assert_eq!(mapper.delete_by_dynamic_query(&young).await?, 1);
    assert_eq!(mapper.select_count_by_example(&Student::default()).await?, 2);
    Ok(())
}
