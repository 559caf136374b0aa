//! The database driver: schemas of one database exposed as catalogs

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::OnceCell;

use warecat_client::{ClientError, PlatformClient};

use crate::catalog::SchemaCatalog;

/// Catalog of the schemas in one database
///
/// Same snapshot semantics as [`SchemaCatalog`]: schemas are enumerated
/// once on first load, and enumeration failures propagate the client
/// error unmodified.
pub struct DatabaseCatalog {
    client: Arc<dyn PlatformClient>,
    database: String,
    schemas: OnceCell<BTreeMap<String, SchemaCatalog>>,
}

impl DatabaseCatalog {
    /// Create a catalog for a database
    pub fn new(client: Arc<dyn PlatformClient>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
            schemas: OnceCell::new(),
        }
    }

    /// The database this catalog enumerates
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Enumerate the database's schemas and return the catalog snapshot
    pub async fn load(&self) -> Result<&BTreeMap<String, SchemaCatalog>, ClientError> {
        self.schemas
            .get_or_try_init(|| async {
                let schemas = self.client.list_schemas(&self.database).await?;
                tracing::debug!(
                    database = %self.database,
                    count = schemas.len(),
                    "loaded schema catalogs"
                );
                Ok(schemas
                    .into_iter()
                    .map(|schema| {
                        let catalog = SchemaCatalog::new(
                            Arc::clone(&self.client),
                            &self.database,
                            &schema,
                        );
                        (schema, catalog)
                    })
                    .collect())
            })
            .await
    }

    /// Names of the enumerated schemas
    pub async fn schema_names(&self) -> Result<Vec<String>, ClientError> {
        Ok(self.load().await?.keys().cloned().collect())
    }

    /// Look up one schema catalog by name
    pub async fn get(&self, name: &str) -> Result<Option<&SchemaCatalog>, ClientError> {
        Ok(self.load().await?.get(name))
    }
}
