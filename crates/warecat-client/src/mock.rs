//! Mock platform client for testing
//!
//! This client serves predefined tables and query results without
//! connecting to any platform. It's useful for:
//! - Unit testing the catalog and table drivers
//! - Integration testing CI/CD pipelines
//! - Demos and examples without real credentials
//! - Simulating various error conditions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warecat_client::{MockClient, PlatformClient, TableRef};
//! use warecat_core::{Column, LogicalType, ResultFrame, Schema, Value};
//!
//! let client = MockClient::new();
//! let table = TableRef::new("analytics", "reporting", "events");
//! let frame = ResultFrame::new(
//!     Schema::from_columns(vec![Column::new("id", LogicalType::Int)]),
//!     vec![vec![Value::Int(1)]],
//! );
//! client.add_table(table.clone(), frame).await;
//!
//! let fetched = client.table_columns(&table).await?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! // Simulate connection failure
//! let client = MockClient::new().with_connection_failure();
//! assert!(client.test_connection().await.is_err());
//!
//! // Simulate network latency
//! let client = MockClient::new().with_latency(100); // 100ms delay
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use warecat_core::{ResultFrame, Schema};

use crate::client::{ClientError, PlatformClient, TableHandle, TableRef};

/// One stored mock table: its assigned platform id and its data
#[derive(Debug, Clone)]
struct MockTable {
    id: i64,
    frame: ResultFrame,
}

/// Mock platform client for testing
///
/// Tables and query results live in memory; every [`PlatformClient`]
/// operation answers from that state. Clones share state, so a test can
/// hand the same mock to several drivers and keep mutating it.
pub struct MockClient {
    /// Stored tables by FQN
    tables: Arc<RwLock<HashMap<String, MockTable>>>,

    /// Known schemas per database (registered or implied by tables)
    schemas: Arc<RwLock<HashMap<String, BTreeSet<String>>>>,

    /// Registered SQL results by (database, sql)
    queries: Arc<RwLock<HashMap<(String, String), ResultFrame>>>,

    /// Errors to return for specific tables
    errors: Arc<RwLock<HashMap<String, ClientError>>>,

    /// Next platform id to assign
    next_id: Arc<AtomicI64>,

    /// Number of resolve_table calls served
    resolve_calls: Arc<AtomicU64>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulate query latency (milliseconds)
    latency_ms: u64,

    /// Name to return from name() method
    client_name: &'static str,
}

impl MockClient {
    /// Create a new mock client with no tables
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            schemas: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            resolve_calls: Arc::new(AtomicU64::new(0)),
            fail_connection: false,
            latency_ms: 0,
            client_name: "Mock",
        }
    }

    /// Add a table with its data
    ///
    /// The table's schema is implied by the frame. The containing schema is
    /// registered as known, so `list_tables` and `list_schemas` see it.
    pub async fn add_table(&self, table: TableRef, frame: ResultFrame) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.schemas
            .write()
            .await
            .entry(table.database.clone())
            .or_default()
            .insert(table.schema.clone());
        self.tables
            .write()
            .await
            .insert(table.fqn(), MockTable { id, frame });
    }

    /// Register a schema without any tables in it
    pub async fn register_schema(&self, database: &str, schema: &str) {
        self.schemas
            .write()
            .await
            .entry(database.to_string())
            .or_default()
            .insert(schema.to_string());
    }

    /// Register the result for a SQL expression
    pub async fn add_query(&self, database: &str, sql: &str, frame: ResultFrame) {
        self.queries
            .write()
            .await
            .insert((database.to_string(), sql.to_string()), frame);
    }

    /// Configure an error to be returned for a specific table
    ///
    /// Applies to `table_columns`, `resolve_table` and `read_table`,
    /// allowing tests to simulate permission or lookup failures per table.
    pub async fn add_error_for_table(&self, table: TableRef, error: ClientError) {
        self.errors.write().await.insert(table.fqn(), error);
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure simulated latency for all operations
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom client name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.client_name = name;
        self
    }

    /// Number of tables stored
    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    /// Number of `resolve_table` calls served so far
    pub fn resolve_call_count(&self) -> u64 {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Whether a table is stored
    pub async fn has_table(&self, table: &TableRef) -> bool {
        self.tables.read().await.contains_key(&table.fqn())
    }

    /// Clear all stored tables
    pub async fn clear_tables(&self) {
        self.tables.write().await.clear();
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    async fn injected_error(&self, fqn: &str) -> Option<ClientError> {
        self.errors.read().await.get(fqn).cloned()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockClient {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            schemas: Arc::clone(&self.schemas),
            queries: Arc::clone(&self.queries),
            errors: Arc::clone(&self.errors),
            next_id: Arc::clone(&self.next_id),
            resolve_calls: Arc::clone(&self.resolve_calls),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            client_name: self.client_name,
        }
    }
}

#[async_trait::async_trait]
impl PlatformClient for MockClient {
    fn name(&self) -> &'static str {
        self.client_name
    }

    async fn test_connection(&self) -> Result<(), ClientError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(ClientError::Network(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, ClientError> {
        self.simulate_latency().await;

        let schemas = self.schemas.read().await;
        schemas
            .get(database)
            .map(|names| names.iter().cloned().collect())
            .ok_or_else(|| ClientError::DatabaseNotFound(database.to_string()))
    }

    async fn list_tables(
        &self,
        database: &str,
        schema: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.simulate_latency().await;

        let known = self
            .schemas
            .read()
            .await
            .get(database)
            .map(|names| names.contains(schema))
            .unwrap_or(false);
        if !known {
            return Err(ClientError::SchemaNotFound(format!(
                "{}.{}",
                database, schema
            )));
        }

        let prefix = format!("{}.{}.", database, schema);
        let mut names: Vec<String> = self
            .tables
            .read()
            .await
            .keys()
            .filter_map(|fqn| fqn.strip_prefix(&prefix).map(|t| t.to_string()))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn table_columns(&self, table: &TableRef) -> Result<Schema, ClientError> {
        self.simulate_latency().await;

        if let Some(error) = self.injected_error(&table.fqn()).await {
            return Err(error);
        }

        let tables = self.tables.read().await;
        tables
            .get(&table.fqn())
            .map(|t| t.frame.schema.clone())
            .ok_or_else(|| ClientError::TableNotFound(table.fqn()))
    }

    async fn resolve_table(&self, table: &TableRef) -> Result<TableHandle, ClientError> {
        self.simulate_latency().await;
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.injected_error(&table.fqn()).await {
            return Err(error);
        }

        let tables = self.tables.read().await;
        tables
            .get(&table.fqn())
            .map(|t| TableHandle::new(t.id, table.clone()))
            .ok_or_else(|| ClientError::TableNotFound(table.fqn()))
    }

    async fn read_table(&self, handle: &TableHandle) -> Result<ResultFrame, ClientError> {
        self.simulate_latency().await;

        let fqn = handle.table.fqn();
        if let Some(error) = self.injected_error(&fqn).await {
            return Err(error);
        }

        let tables = self.tables.read().await;
        tables
            .get(&fqn)
            .map(|t| t.frame.clone())
            .ok_or_else(|| ClientError::TableNotFound(fqn))
    }

    async fn read_sql(&self, database: &str, sql: &str) -> Result<ResultFrame, ClientError> {
        self.simulate_latency().await;

        let queries = self.queries.read().await;
        queries
            .get(&(database.to_string(), sql.to_string()))
            .cloned()
            .ok_or_else(|| ClientError::Query(format!("No mock result for SQL: {}", sql)))
    }

    async fn sample_sql(
        &self,
        database: &str,
        sql: &str,
        limit: u64,
    ) -> Result<ResultFrame, ClientError> {
        let frame = self.read_sql(database, sql).await?;
        Ok(frame.head(limit as usize))
    }
}

/// Builder for creating a [`MockClient`] with predefined state
///
/// ```rust,ignore
/// let client = MockClientBuilder::new()
///     .with_table(TableRef::new("db", "public", "users"), users_frame())
///     .with_latency(50)
///     .build();
/// ```
pub struct MockClientBuilder {
    tables: Vec<(TableRef, ResultFrame)>,
    queries: Vec<(String, String, ResultFrame)>,
    errors: Vec<(TableRef, ClientError)>,
    fail_connection: bool,
    latency_ms: u64,
    client_name: &'static str,
}

impl MockClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            queries: Vec::new(),
            errors: Vec::new(),
            fail_connection: false,
            latency_ms: 0,
            client_name: "Mock",
        }
    }

    /// Add a table with its data
    pub fn with_table(mut self, table: TableRef, frame: ResultFrame) -> Self {
        self.tables.push((table, frame));
        self
    }

    /// Add a SQL result
    pub fn with_query(mut self, database: &str, sql: &str, frame: ResultFrame) -> Self {
        self.queries
            .push((database.to_string(), sql.to_string(), frame));
        self
    }

    /// Add an error for a specific table
    pub fn with_error(mut self, table: TableRef, error: ClientError) -> Self {
        self.errors.push((table, error));
        self
    }

    /// Configure connection failures
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Configure latency
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set the client name
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.client_name = name;
        self
    }

    /// Build the client
    ///
    /// Table ids are assigned in insertion order starting at 1.
    pub fn build(self) -> MockClient {
        let mut client = MockClient::new();
        client.fail_connection = self.fail_connection;
        client.latency_ms = self.latency_ms;
        client.client_name = self.client_name;

        // No other handles to the locks exist yet; try_write cannot fail.
        for (table, frame) in self.tables {
            let id = client.next_id.fetch_add(1, Ordering::SeqCst);
            client
                .schemas
                .try_write()
                .expect("unshared lock")
                .entry(table.database.clone())
                .or_default()
                .insert(table.schema.clone());
            client
                .tables
                .try_write()
                .expect("unshared lock")
                .insert(table.fqn(), MockTable { id, frame });
        }
        for (database, sql, frame) in self.queries {
            client
                .queries
                .try_write()
                .expect("unshared lock")
                .insert((database, sql), frame);
        }
        for (table, error) in self.errors {
            client
                .errors
                .try_write()
                .expect("unshared lock")
                .insert(table.fqn(), error);
        }

        client
    }
}

impl Default for MockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
