//! Catalog declaration format (warecat.yaml)
//!
//! A catalog declaration maps source names to a driver and its connection
//! arguments:
//!
//! ```yaml
//! sources:
//!   events:
//!     driver: warecat-table
//!     args:
//!       database: analytics
//!       table: reporting.events
//!   reporting:
//!     driver: warecat-schema
//!     args:
//!       database: analytics
//!       schema: reporting
//! ```
//!
//! Argument validation beyond YAML shape (exactly one of `table`/`sql`,
//! required `database`) happens when a driver is instantiated from a
//! declaration, not at parse time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Driver name for the single-table source
pub const DRIVER_TABLE: &str = "warecat-table";

/// Driver name for the schema-level catalog
pub const DRIVER_SCHEMA: &str = "warecat-schema";

/// Driver name for the database-level catalog
pub const DRIVER_DATABASE: &str = "warecat-database";

/// Declared driver kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// One table (or SQL expression) exposed as a source
    Table,

    /// All tables of one schema exposed as entries
    Schema,

    /// All schemas of one database exposed as entries
    Database,
}

impl Driver {
    /// Resolve a declared driver name
    pub fn from_name(name: &str) -> Result<Self, DeclError> {
        match name {
            DRIVER_TABLE => Ok(Self::Table),
            DRIVER_SCHEMA => Ok(Self::Schema),
            DRIVER_DATABASE => Ok(Self::Database),
            other => Err(DeclError::UnknownDriver(other.to_string())),
        }
    }

    /// The declared name of this driver
    pub fn name(&self) -> &'static str {
        match self {
            Self::Table => DRIVER_TABLE,
            Self::Schema => DRIVER_SCHEMA,
            Self::Database => DRIVER_DATABASE,
        }
    }
}

/// Connection arguments of one declared source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceArgs {
    /// Database name on the platform
    pub database: String,

    /// Schema name (schema driver; defaults to `public` when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Fully qualified table name (table driver)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// SQL expression (table driver, alternative to `table`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// One declared source: a driver name and its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDecl {
    /// Driver name (`warecat-table`, `warecat-schema`, `warecat-database`)
    pub driver: String,

    /// Connection arguments
    pub args: SourceArgs,
}

/// A parsed catalog declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDecl {
    /// Declared sources by name
    pub sources: BTreeMap<String, SourceDecl>,
}

impl CatalogDecl {
    /// Parse a declaration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, DeclError> {
        serde_yaml::from_str(yaml).map_err(|e| DeclError::Parse(e.to_string()))
    }

    /// Load a declaration from a YAML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, DeclError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DeclError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Look up a declared source by name
    pub fn get(&self, name: &str) -> Option<&SourceDecl> {
        self.sources.get(name)
    }

    /// Names of all declared sources
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.keys().map(|k| k.as_str()).collect()
    }
}

/// Declaration errors
// Manual Display/Error impls: thiserror's derive treats the `source` field of
// `MissingArg` as an error source, which `String` cannot be.
#[derive(Debug)]
pub enum DeclError {
    Io(String),
    Parse(String),
    UnknownDriver(String),
    MissingArg { source: String, arg: String },
    ConflictingArgs(String),
}

impl std::fmt::Display for DeclError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclError::Io(e) => write!(f, "IO error: {e}"),
            DeclError::Parse(e) => write!(f, "Parse error: {e}"),
            DeclError::UnknownDriver(d) => write!(f, "Unknown driver: {d}"),
            DeclError::MissingArg { source, arg } => {
                write!(f, "Source '{source}' is missing required argument '{arg}'")
            }
            DeclError::ConflictingArgs(s) => {
                write!(f, "Source '{s}' must declare a table OR a sql expression, not both")
            }
        }
    }
}

impl std::error::Error for DeclError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
sources:
  events:
    driver: warecat-table
    args:
      database: analytics
      table: reporting.events
  daily_counts:
    driver: warecat-table
    args:
      database: analytics
      sql: SELECT day, count(*) FROM reporting.events GROUP BY day
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

    #[test]
    fn parse_sample_declaration() {
        let decl = CatalogDecl::from_yaml(SAMPLE).unwrap();
        assert_eq!(
            decl.source_names(),
            vec!["analytics", "daily_counts", "events", "reporting"]
        );

        let events = decl.get("events").unwrap();
        assert_eq!(events.driver, DRIVER_TABLE);
        assert_eq!(events.args.database, "analytics");
        assert_eq!(events.args.table.as_deref(), Some("reporting.events"));
        assert_eq!(events.args.sql, None);

        let reporting = decl.get("reporting").unwrap();
        assert_eq!(reporting.driver, DRIVER_SCHEMA);
        assert_eq!(reporting.args.schema.as_deref(), Some("reporting"));
    }

    #[test]
    fn schema_argument_is_optional() {
        let yaml = r#"
sources:
  main:
    driver: warecat-schema
    args:
      database: analytics
"#;
        let decl = CatalogDecl::from_yaml(yaml).unwrap();
        assert_eq!(decl.get("main").unwrap().args.schema, None);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let result = CatalogDecl::from_yaml("sources: [not, a, mapping]");
        assert!(matches!(result, Err(DeclError::Parse(_))));
    }

    #[test]
    fn missing_database_is_a_parse_error() {
        let yaml = r#"
sources:
  bad:
    driver: warecat-table
    args:
      table: reporting.events
"#;
        assert!(matches!(
            CatalogDecl::from_yaml(yaml),
            Err(DeclError::Parse(_))
        ));
    }

    #[test]
    fn driver_name_resolution() {
        assert_eq!(Driver::from_name("warecat-table").unwrap(), Driver::Table);
        assert_eq!(Driver::from_name("warecat-schema").unwrap(), Driver::Schema);
        assert_eq!(
            Driver::from_name("warecat-database").unwrap(),
            Driver::Database
        );
        assert!(matches!(
            Driver::from_name("csv"),
            Err(DeclError::UnknownDriver(_))
        ));
        assert_eq!(Driver::Table.name(), DRIVER_TABLE);
    }

    #[test]
    fn declaration_yaml_roundtrip() {
        let decl = CatalogDecl::from_yaml(SAMPLE).unwrap();
        let yaml = serde_yaml::to_string(&decl).unwrap();
        let parsed = CatalogDecl::from_yaml(&yaml).unwrap();
        assert_eq!(decl, parsed);
    }
}
