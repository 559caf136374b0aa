//! Instantiating drivers from catalog declarations

use std::collections::BTreeMap;
use std::sync::Arc;

use warecat_client::PlatformClient;
use warecat_core::{CatalogDecl, DeclError, Driver, SourceDecl};

use crate::catalog::{SchemaCatalog, DEFAULT_SCHEMA};
use crate::database::DatabaseCatalog;
use crate::source::TableSource;

/// A driver instantiated from a declaration
pub enum CatalogSource {
    /// `warecat-table`
    Table(TableSource),

    /// `warecat-schema`
    Schema(SchemaCatalog),

    /// `warecat-database`
    Database(DatabaseCatalog),
}

impl CatalogSource {
    /// The table source, if this is one
    pub fn as_table(&self) -> Option<&TableSource> {
        match self {
            Self::Table(source) => Some(source),
            _ => None,
        }
    }

    /// The schema catalog, if this is one
    pub fn as_schema(&self) -> Option<&SchemaCatalog> {
        match self {
            Self::Schema(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// The database catalog, if this is one
    pub fn as_database(&self) -> Option<&DatabaseCatalog> {
        match self {
            Self::Database(catalog) => Some(catalog),
            _ => None,
        }
    }
}

/// Instantiate the driver one declaration entry names
///
/// The table driver requires exactly one of `table` or `sql`; the schema
/// driver falls back to the `public` schema when none is declared.
pub fn build_source(
    client: Arc<dyn PlatformClient>,
    name: &str,
    decl: &SourceDecl,
) -> Result<CatalogSource, DeclError> {
    let database = &decl.args.database;

    match Driver::from_name(&decl.driver)? {
        Driver::Table => match (&decl.args.table, &decl.args.sql) {
            (Some(table), None) => Ok(CatalogSource::Table(TableSource::table(
                client, database, table,
            ))),
            (None, Some(sql)) => Ok(CatalogSource::Table(TableSource::sql(
                client, database, sql,
            ))),
            (Some(_), Some(_)) => Err(DeclError::ConflictingArgs(name.to_string())),
            (None, None) => Err(DeclError::MissingArg {
                source: name.to_string(),
                arg: "table or sql".to_string(),
            }),
        },
        Driver::Schema => {
            let schema = decl.args.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
            Ok(CatalogSource::Schema(SchemaCatalog::new(
                client, database, schema,
            )))
        }
        Driver::Database => Ok(CatalogSource::Database(DatabaseCatalog::new(
            client, database,
        ))),
    }
}

/// Instantiate every source a declaration names
///
/// Declarations of the same table yield independent instances; nothing is
/// shared between the built sources beyond the client.
pub fn build_catalog(
    client: Arc<dyn PlatformClient>,
    decl: &CatalogDecl,
) -> Result<BTreeMap<String, CatalogSource>, DeclError> {
    decl.sources
        .iter()
        .map(|(name, source_decl)| {
            build_source(Arc::clone(&client), name, source_decl)
                .map(|source| (name.clone(), source))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecat_client::MockClient;
    use warecat_core::SourceArgs;

    fn args(database: &str) -> SourceArgs {
        SourceArgs {
            database: database.to_string(),
            schema: None,
            table: None,
            sql: None,
        }
    }

    fn client() -> Arc<MockClient> {
        Arc::new(MockClient::new())
    }

    #[test]
    fn builds_table_source_from_table_arg() {
        let decl = SourceDecl {
            driver: "warecat-table".to_string(),
            args: SourceArgs {
                table: Some("reporting.events".to_string()),
                ..args("analytics")
            },
        };

        let source = build_source(client(), "events", &decl).unwrap();
        let table = source.as_table().unwrap();
        assert_eq!(table.database(), "analytics");
        assert_eq!(table.table_ref().unwrap().qualified(), "reporting.events");
    }

    #[test]
    fn builds_table_source_from_sql_arg() {
        let decl = SourceDecl {
            driver: "warecat-table".to_string(),
            args: SourceArgs {
                sql: Some("SELECT 1".to_string()),
                ..args("analytics")
            },
        };

        let source = build_source(client(), "one", &decl).unwrap();
        assert_eq!(source.as_table().unwrap().sql_expr(), Some("SELECT 1"));
    }

    #[test]
    fn table_and_sql_together_are_rejected() {
        let decl = SourceDecl {
            driver: "warecat-table".to_string(),
            args: SourceArgs {
                table: Some("reporting.events".to_string()),
                sql: Some("SELECT 1".to_string()),
                ..args("analytics")
            },
        };

        assert!(matches!(
            build_source(client(), "bad", &decl),
            Err(DeclError::ConflictingArgs(_))
        ));
    }

    #[test]
    fn table_driver_requires_table_or_sql() {
        let decl = SourceDecl {
            driver: "warecat-table".to_string(),
            args: args("analytics"),
        };

        assert!(matches!(
            build_source(client(), "bad", &decl),
            Err(DeclError::MissingArg { .. })
        ));
    }

    #[test]
    fn schema_driver_defaults_to_public() {
        let decl = SourceDecl {
            driver: "warecat-schema".to_string(),
            args: args("analytics"),
        };

        let source = build_source(client(), "main", &decl).unwrap();
        assert_eq!(source.as_schema().unwrap().schema(), "public");
    }

    #[test]
    fn unknown_driver_is_rejected() {
        let decl = SourceDecl {
            driver: "csv".to_string(),
            args: args("analytics"),
        };

        assert!(matches!(
            build_source(client(), "bad", &decl),
            Err(DeclError::UnknownDriver(_))
        ));
    }

    #[test]
    fn build_catalog_builds_every_source() {
        let yaml = r#"
sources:
  events:
    driver: warecat-table
    args:
      database: analytics
      table: reporting.events
  reporting:
    driver: warecat-schema
    args:
      database: analytics
      schema: reporting
  analytics:
    driver: warecat-database
    args:
      database: analytics
"#;
        let decl = CatalogDecl::from_yaml(yaml).unwrap();
        let sources = build_catalog(client(), &decl).unwrap();

        assert_eq!(sources.len(), 3);
        assert!(sources["events"].as_table().is_some());
        assert!(sources["reporting"].as_schema().is_some());
        assert!(sources["analytics"].as_database().is_some());
    }
}
