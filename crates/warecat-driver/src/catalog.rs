//! The schema driver: tables of one schema exposed as catalog entries

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::OnceCell;

use warecat_client::{ClientError, PlatformClient, TableRef};

use crate::source::TableSource;

/// Schema used when a declaration omits one
pub const DEFAULT_SCHEMA: &str = "public";

/// One enumerated table, ready to become a [`TableSource`]
///
/// Entries are created at catalog-load time from the enumeration result
/// and are read-only thereafter.
#[derive(Clone)]
pub struct CatalogEntry {
    name: String,
    description: String,
    database: String,
    schema: String,
    client: Arc<dyn PlatformClient>,
}

impl CatalogEntry {
    fn new(
        client: Arc<dyn PlatformClient>,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Self {
        Self {
            name: table.to_string(),
            description: format!(
                "{} table {}.{} from {}",
                client.name(),
                schema,
                table,
                database
            ),
            database: database.to_string(),
            schema: schema.to_string(),
            client,
        }
    }

    /// Table name within the schema
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable entry description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The table this entry points at
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(&self.database, &self.schema, &self.name)
    }

    /// Construct a fresh source for this entry
    ///
    /// Each call returns an independent instance; entries share no mutable
    /// state with the sources they construct.
    pub fn to_source(&self) -> TableSource {
        TableSource::table(
            Arc::clone(&self.client),
            &self.database,
            self.table_ref().qualified(),
        )
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.name)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Catalog of the tables in one schema
///
/// Enumeration happens once, on first [`SchemaCatalog::load`]; the entry
/// set is a snapshot of what the platform reported at that moment and is
/// not kept consistent with later schema changes. A failed enumeration
/// propagates the client error; there are no partial catalogs.
pub struct SchemaCatalog {
    client: Arc<dyn PlatformClient>,
    database: String,
    schema: String,
    entries: OnceCell<BTreeMap<String, CatalogEntry>>,
}

impl SchemaCatalog {
    /// Create a catalog for `(database, schema)`
    pub fn new(
        client: Arc<dyn PlatformClient>,
        database: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            client,
            database: database.into(),
            schema: schema.into(),
            entries: OnceCell::new(),
        }
    }

    /// Create a catalog for the default `public` schema
    pub fn public(client: Arc<dyn PlatformClient>, database: impl Into<String>) -> Self {
        Self::new(client, database, DEFAULT_SCHEMA)
    }

    /// The database this catalog enumerates
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The schema this catalog enumerates
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Enumerate the schema's tables and return the entry snapshot
    ///
    /// The platform is queried once; subsequent calls return the same
    /// snapshot.
    pub async fn load(&self) -> Result<&BTreeMap<String, CatalogEntry>, ClientError> {
        self.entries
            .get_or_try_init(|| async {
                let tables = self
                    .client
                    .list_tables(&self.database, &self.schema)
                    .await?;
                tracing::debug!(
                    database = %self.database,
                    schema = %self.schema,
                    count = tables.len(),
                    "loaded catalog entries"
                );
                Ok(tables
                    .into_iter()
                    .map(|table| {
                        let entry = CatalogEntry::new(
                            Arc::clone(&self.client),
                            &self.database,
                            &self.schema,
                            &table,
                        );
                        (table, entry)
                    })
                    .collect())
            })
            .await
    }

    /// Names of the enumerated tables
    pub async fn table_names(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.load().await?.keys().cloned().collect())
    }

    /// Look up one entry by table name
    pub async fn get(&self, name: &str) -> Result<Option<&CatalogEntry>, ClientError> {
        Ok(self.load().await?.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DataSource;
    use warecat_client::MockClient;
    use warecat_core::{Column, LogicalType, ResultFrame, Schema, Value};

    fn frame(rows: Vec<Vec<Value>>) -> ResultFrame {
        ResultFrame::new(
            Schema::from_columns(vec![Column::new("id", LogicalType::Int)]),
            rows,
        )
    }

    async fn mock_reporting() -> Arc<MockClient> {
        let client = MockClient::new();
        client
            .add_table(
                TableRef::new("analytics", "reporting", "events"),
                frame(vec![vec![Value::Int(1)]]),
            )
            .await;
        client
            .add_table(
                TableRef::new("analytics", "reporting", "users"),
                frame(vec![vec![Value::Int(7)], vec![Value::Int(8)]]),
            )
            .await;
        Arc::new(client)
    }

    #[tokio::test]
    async fn catalog_enumerates_client_tables() {
        let client = mock_reporting().await;
        let catalog = SchemaCatalog::new(client.clone(), "analytics", "reporting");

        let names = catalog.table_names().await.unwrap();
        let reported = client.list_tables("analytics", "reporting").await.unwrap();
        assert_eq!(names, reported);
    }

    #[tokio::test]
    async fn catalog_entries_read_their_tables() {
        let client = mock_reporting().await;
        let catalog = SchemaCatalog::new(client, "analytics", "reporting");

        let entry = catalog.get("users").await.unwrap().unwrap();
        assert_eq!(entry.name(), "users");
        assert_eq!(
            entry.table_ref(),
            TableRef::new("analytics", "reporting", "users")
        );
        assert!(entry.description().contains("reporting.users"));

        let frame = entry.to_source().read().await.unwrap();
        assert_eq!(frame.num_rows(), 2);
    }

    #[tokio::test]
    async fn catalog_is_a_snapshot() {
        let client = mock_reporting().await;
        let catalog = SchemaCatalog::new(client.clone(), "analytics", "reporting");

        assert_eq!(catalog.table_names().await.unwrap().len(), 2);

        // Platform-side changes after discovery are not reflected
        client
            .add_table(
                TableRef::new("analytics", "reporting", "late_arrival"),
                frame(vec![]),
            )
            .await;
        assert_eq!(catalog.table_names().await.unwrap().len(), 2);

        // A fresh catalog sees the new table
        let fresh = SchemaCatalog::new(client, "analytics", "reporting");
        assert_eq!(fresh.table_names().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_schema_fails_instead_of_empty_success() {
        let client = mock_reporting().await;
        let catalog = SchemaCatalog::new(client, "analytics", "missing");

        assert!(matches!(
            catalog.load().await,
            Err(ClientError::SchemaNotFound(_))
        ));
    }

    #[tokio::test]
    async fn entries_produce_independent_sources() {
        let client = mock_reporting().await;
        let catalog = SchemaCatalog::new(client.clone(), "analytics", "reporting");

        let entry = catalog.get("events").await.unwrap().unwrap();
        let first = entry.to_source();
        let second = entry.to_source();

        // Resolving one source's handle does not touch the other's
        first.handle().await.unwrap();
        assert_eq!(client.resolve_call_count(), 1);
        second.handle().await.unwrap();
        assert_eq!(client.resolve_call_count(), 2);
    }

    #[tokio::test]
    async fn public_schema_default() {
        let client = MockClient::new();
        client
            .add_table(
                TableRef::new("analytics", "public", "users"),
                frame(vec![]),
            )
            .await;
        let catalog = SchemaCatalog::public(Arc::new(client), "analytics");

        assert_eq!(catalog.schema(), "public");
        assert_eq!(catalog.table_names().await.unwrap(), vec!["users"]);
    }
}
