//! The table driver: one-shot reader for a single table or SQL expression

use std::sync::Arc;

use tokio::sync::OnceCell;

use warecat_client::{ClientError, PlatformClient, TableHandle, TableRef};
use warecat_core::{ResultFrame, Schema};

/// Row cap for the bounded sample read behind SQL-source discovery
pub const DEFAULT_SAMPLE_LIMIT: u64 = 100;

/// The read/discovery contract the cataloging framework invokes
///
/// Catalog frameworks dispatch to whatever source a declaration named;
/// this trait is the surface they call.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Column names and types, without materializing the full data
    async fn discover(&self) -> Result<Schema, ClientError>;

    /// The full result in one call, no pagination or streaming
    async fn read(&self) -> Result<ResultFrame, ClientError>;
}

/// What a table source reads
#[derive(Debug, Clone)]
enum SourceKind {
    /// A qualified `schema.table` name
    Table(String),

    /// A SQL expression passed to the platform verbatim
    Sql(String),
}

/// One-shot reader for a single table or SQL expression
///
/// An instance refers to exactly one table (or expression) for its
/// lifetime. The only state it accumulates is the platform table handle,
/// resolved on first access and memoized; reads always go to the client.
pub struct TableSource {
    client: Arc<dyn PlatformClient>,
    database: String,
    kind: SourceKind,
    handle: OnceCell<TableHandle>,
    sample_limit: u64,
}

impl TableSource {
    /// Create a source reading a qualified `schema.table` name
    ///
    /// An unqualified name resolves against the `public` schema.
    pub fn table(
        client: Arc<dyn PlatformClient>,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            database: database.into(),
            kind: SourceKind::Table(table.into()),
            handle: OnceCell::new(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    /// Create a source reading a SQL expression
    pub fn sql(
        client: Arc<dyn PlatformClient>,
        database: impl Into<String>,
        sql: impl Into<String>,
    ) -> Self {
        Self {
            client,
            database: database.into(),
            kind: SourceKind::Sql(sql.into()),
            handle: OnceCell::new(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    /// Override the sample row cap used for SQL-source discovery
    pub fn with_sample_limit(mut self, limit: u64) -> Self {
        self.sample_limit = limit;
        self
    }

    /// The database this source reads from
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The table this source reads, if it is a table source
    pub fn table_ref(&self) -> Option<TableRef> {
        match &self.kind {
            SourceKind::Table(name) => Some(TableRef::parse_qualified(&self.database, name)),
            SourceKind::Sql(_) => None,
        }
    }

    /// The SQL expression this source reads, if it is a SQL source
    pub fn sql_expr(&self) -> Option<&str> {
        match &self.kind {
            SourceKind::Table(_) => None,
            SourceKind::Sql(sql) => Some(sql),
        }
    }

    /// The platform's handle for this source's table
    ///
    /// Resolved through the client on first access and reused for the
    /// instance's lifetime. SQL sources have no table to resolve.
    pub async fn handle(&self) -> Result<&TableHandle, ClientError> {
        let table = self.table_ref().ok_or_else(|| {
            ClientError::Config("SQL sources have no table handle".to_string())
        })?;

        self.handle
            .get_or_try_init(|| async { self.client.resolve_table(&table).await })
            .await
    }
}

#[async_trait::async_trait]
impl DataSource for TableSource {
    async fn discover(&self) -> Result<Schema, ClientError> {
        match &self.kind {
            SourceKind::Table(name) => {
                let table = TableRef::parse_qualified(&self.database, name);
                self.client.table_columns(&table).await
            }
            // Best effort for expressions: sample a bounded number of rows
            // and report the sampled frame's columns.
            SourceKind::Sql(sql) => {
                let frame = self
                    .client
                    .sample_sql(&self.database, sql, self.sample_limit)
                    .await?;
                Ok(frame.schema)
            }
        }
    }

    async fn read(&self) -> Result<ResultFrame, ClientError> {
        match &self.kind {
            SourceKind::Table(_) => {
                let handle = self.handle().await?;
                tracing::debug!(handle = %handle, "reading table");
                self.client.read_table(handle).await
            }
            SourceKind::Sql(sql) => self.client.read_sql(&self.database, sql).await,
        }
    }
}
