//! Platform client trait and shared identifier types

use std::fmt;

use warecat_core::{ResultFrame, Schema};

/// Identifies a table on the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    /// Database name
    pub database: String,

    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableRef {
    /// Create a new table reference
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Parse a qualified `schema.table` name within a database
    ///
    /// An unqualified name resolves against the `public` schema, matching
    /// the schema driver's default.
    pub fn parse_qualified(database: impl Into<String>, qualified: &str) -> Self {
        let (schema, table) = match qualified.split_once('.') {
            Some((schema, table)) => (schema, table),
            None => ("public", qualified),
        };
        Self::new(database, schema.trim_matches('"'), table.trim_matches('"'))
    }

    /// Fully qualified name, `database.schema.table`
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.table)
    }

    /// Qualified name within the database, `schema.table`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// The platform's internal identifier for a resolved table
///
/// Handles are resolved lazily by the drivers on first access and cached
/// for the adapter instance's lifetime. They are never shared across
/// instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    /// Platform-internal table id
    pub id: i64,

    /// The table this handle was resolved for
    pub table: TableRef,
}

impl TableHandle {
    /// Create a handle binding a table reference to a platform id
    pub fn new(id: i64, table: TableRef) -> Self {
        Self { id, table }
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.table.fqn(), self.id)
    }
}

/// Errors raised by a platform client
///
/// The drivers propagate these unmodified; there is no retry policy and no
/// error vocabulary beyond what the client produces. `Clone` is required
/// for mock error injection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Trait for platform clients the drivers delegate to
///
/// One driver operation maps to one client call; the drivers add no
/// retries, caching (beyond the memoized [`TableHandle`]) or coordination
/// on top of this trait.
#[async_trait::async_trait]
pub trait PlatformClient: Send + Sync {
    /// Get the client name (e.g. "PostgreSQL", "Mock")
    fn name(&self) -> &'static str;

    /// Test the connection to the platform
    ///
    /// Useful for validating credentials before driving a catalog load.
    async fn test_connection(&self) -> Result<(), ClientError>;

    /// List schemas in a database
    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, ClientError>;

    /// List tables in a schema
    ///
    /// The returned names are table names only, not qualified.
    async fn list_tables(&self, database: &str, schema: &str)
        -> Result<Vec<String>, ClientError>;

    /// Fetch column names and types for a table without materializing data
    async fn table_columns(&self, table: &TableRef) -> Result<Schema, ClientError>;

    /// Resolve a table reference to the platform's internal identifier
    async fn resolve_table(&self, table: &TableRef) -> Result<TableHandle, ClientError>;

    /// Read a resolved table in full, one call, no pagination
    async fn read_table(&self, handle: &TableHandle) -> Result<ResultFrame, ClientError>;

    /// Execute a SQL expression and return its full result
    async fn read_sql(&self, database: &str, sql: &str) -> Result<ResultFrame, ClientError>;

    /// Execute a SQL expression and return at most `limit` rows
    ///
    /// Used for best-effort schema discovery of SQL sources.
    async fn sample_sql(
        &self,
        database: &str,
        sql: &str,
        limit: u64,
    ) -> Result<ResultFrame, ClientError>;
}
