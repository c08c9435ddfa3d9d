//! # tablemap-query
//!
//! Compiles structured filters and sorts into parameterized SQL and runs
//! CRUD statements for table entities across relational backends.
//!
//! ## Architecture
//!
//! - **filter**: turns an operator, column and value into a SQL fragment
//!   with positional `?` placeholders
//! - **descriptor**: raw filter/sort expressions for what the operators
//!   cannot express
//! - **query**: `DynamicQuery`, the structured query description
//! - **cache**: `QueryCache`, an owned store of reusable queries
//! - **provider**: assembles whole statements from entity metadata
//! - **feedback**: per-dialect recovery of generated keys and row counts
//! - **mapper**: `TableMapper`, the CRUD executor
//!
//! Backends plug in through the [`Connection`] trait. See
//! `tablemap-query-seaorm` for MySQL, SQLite and Postgres.
//!
//! ## Example
//!
//! ```rust
//! use tablemap_query::{
//!     filter_expression, ColumnInfo, EntityMetadata, FilterOperator,
//! };
//!
//! # fn example() -> tablemap_query::Result<()> {
//! let metadata = EntityMetadata::new("customer")
//!     .column(ColumnInfo::new("id", "Id").primary_key())
//!     .column(ColumnInfo::new("city", "City"));
//! let city = metadata.find_column("city").unwrap();
//!
//! let fragment = filter_expression(
//!     FilterOperator::In,
//!     city,
//!     &serde_json::json!(["Berlin", "Paris"]),
//! )?;
//! assert_eq!(fragment.sql_expression, "customer.City IN (?, ?)");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod mapper;
pub mod provider;
pub mod query;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use cache::QueryCache;
pub use config::MapperConfig;
pub use descriptor::{CustomFilterDescriptor, CustomSortDescriptor};
pub use error::{BoxError, MapperError, Result};
pub use feedback::{feedback_for, DriverFeedback, IntrospectedFeedback, WriteFeedback};
pub use filter::filter_expression;
pub use mapper::TableMapper;
pub use provider::SqlTemplateProvider;
pub use query::{DynamicQuery, Filter, FilterDescriptor, Page, Sort, SortDescriptor};
pub use traits::{Connection, Relation, TableEntity};
pub use types::{
    ColumnInfo, DataRow, Dialect, EntityMetadata, FilterCondition, FilterOperator, RunResult,
    SortDirection, SqlTemplate,
};
