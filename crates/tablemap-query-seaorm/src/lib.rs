//! sea-orm backend for tablemap-query
//!
//! Implements `Connection` for the three sea-orm backends. What each one
//! supports through `TableMapper`:
//!
//! | Backend  | Dialect             | Reads | Writes |
//! |----------|---------------------|-------|--------|
//! | MySQL    | `PrimaryRelational` | yes   | yes, key and row count from the driver |
//! | SQLite   | `EmbeddedFile`      | yes   | yes, key and row count read back on the same session |
//! | Postgres | `Other`             | yes   | **no** |
//!
//! ## Postgres is read-only
//!
//! Postgres reports neither a generated key nor a trustworthy affected-row
//! count through this adapter, so the mapper does not pretend it wrote
//! zero rows. Every insert, update and delete on a Postgres connection
//! returns `MapperError::UnsupportedDialect(Dialect::Other)` and no
//! statement is sent. Selects and counts work normally. Run writes against
//! Postgres through sea-orm directly.
//!
//! ## SQLite sessions
//!
//! SQLite feedback comes from follow-up reads (`sqlite_sequence`,
//! `changes()`), so the pool opened by [`establish_connection`] for a
//! `sqlite:` URL holds exactly one connection.

pub mod config;
pub mod connection;

pub use config::{establish_connection, DatabaseConfig};
pub use connection::{dialect_of, postgres_statement, to_sea_value, SeaOrmConnection};

use std::sync::Arc;
use tablemap_query::{Result, TableEntity, TableMapper};

/// Mapper for `T` over a sea-orm connection, using the config's mapper settings
pub fn table_mapper<T: TableEntity>(
    connection: Arc<SeaOrmConnection>,
    config: &DatabaseConfig,
) -> Result<TableMapper<T>> {
    TableMapper::with_config(connection, config.mapper.clone())
}
