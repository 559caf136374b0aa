//! PostgreSQL platform client using information_schema
//!
//! This client serves the drivers from PostgreSQL's catalog views and works
//! with:
//! - PostgreSQL 9.4+
//! - Amazon Redshift
//! - Other PostgreSQL-compatible databases
//!
//! ## Authentication
//!
//! The client supports multiple connection methods:
//! 1. Direct password authentication
//! 2. Connection string (PostgreSQL URL format)
//! 3. Environment variables (`PGHOST`, `PGPORT`, `PGDATABASE`, `PGUSER`, `PGPASSWORD`)
//! 4. TLS/SSL connections via native-tls
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Using direct credentials
//! let client = PostgresClient::connect(
//!     "localhost", 5432, "analytics", "username", "password"
//! ).await?;
//!
//! // Using a connection string
//! let client = PostgresClient::from_connection_string(
//!     "host=localhost port=5432 dbname=analytics user=username password=password"
//! ).await?;
//! ```
//!
//! Reads return every cell typed where the wire value parses cleanly
//! (booleans, integers, floats, JSON); all other values, including decimals
//! and temporal types, are carried as their PostgreSQL text rendering.
//!
//! Reference: https://www.postgresql.org/docs/current/information-schema.html

use warecat_core::{Column, LogicalType, Nullability, ResultFrame, Schema, Value};

use crate::client::{ClientError, PlatformClient, TableHandle, TableRef};

#[cfg(feature = "postgres")]
use tokio_postgres::types::{Kind, Type};

#[cfg(feature = "postgres")]
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

#[cfg(feature = "postgres")]
use postgres_native_tls::MakeTlsConnector;

#[cfg(feature = "postgres")]
use native_tls::TlsConnector;

const FEATURE_HINT: &str =
    "PostgreSQL support not compiled. Rebuild with: cargo build --features postgres";

/// PostgreSQL platform client
///
/// One client is bound to one database for its lifetime; driver calls that
/// name a different database fail with `DatabaseNotFound` instead of being
/// routed anywhere.
pub struct PostgresClient {
    /// PostgreSQL connection (only available with postgres feature)
    #[cfg(feature = "postgres")]
    client: Client,

    /// Connection host
    host: String,

    /// Connection port
    port: u16,

    /// Connected database name
    database: String,

    /// Placeholder for when the feature is disabled
    #[cfg(not(feature = "postgres"))]
    _phantom: std::marker::PhantomData<()>,
}

impl PostgresClient {
    /// Connect with direct credentials
    ///
    /// For TLS connections use [`PostgresClient::connect_with_tls`].
    #[cfg(feature = "postgres")]
    pub async fn connect(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let host = host.into();
        let database = database.into();

        let config = format!(
            "host={} port={} dbname={} user={} password={}",
            host,
            port,
            database,
            user.into(),
            password.into()
        );

        let (client, connection) = tokio_postgres::connect(&config, NoTls)
            .await
            .map_err(|e| {
                ClientError::Authentication(format!(
                    "Failed to connect to PostgreSQL at {}:{}: {}",
                    host, port, e
                ))
            })?;

        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("PostgreSQL connection error ({}:{}): {}", host_clone, port, e);
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Connect without the postgres feature (returns an error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect(
        _host: impl Into<String>,
        _port: u16,
        _database: impl Into<String>,
        _user: impl Into<String>,
        _password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    /// Connect with TLS
    #[cfg(feature = "postgres")]
    pub async fn connect_with_tls(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let host = host.into();
        let database = database.into();

        let config = format!(
            "host={} port={} dbname={} user={} password={}",
            host,
            port,
            database,
            user.into(),
            password.into()
        );

        let connector = TlsConnector::builder().build().map_err(|e| {
            ClientError::Config(format!("Failed to create TLS connector: {}", e))
        })?;
        let tls = MakeTlsConnector::new(connector);

        let (client, connection) =
            tokio_postgres::connect(&config, tls).await.map_err(|e| {
                ClientError::Authentication(format!(
                    "Failed to connect to PostgreSQL at {}:{} with TLS: {}",
                    host, port, e
                ))
            })?;

        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(
                    "PostgreSQL TLS connection error ({}:{}): {}",
                    host_clone,
                    port,
                    e
                );
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Connect with TLS without the postgres feature (returns an error)
    #[cfg(not(feature = "postgres"))]
    pub async fn connect_with_tls(
        _host: impl Into<String>,
        _port: u16,
        _database: impl Into<String>,
        _user: impl Into<String>,
        _password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    /// Connect from a PostgreSQL connection string
    ///
    /// Supports the standard format:
    /// `host=localhost port=5432 dbname=analytics user=me password=secret`
    #[cfg(feature = "postgres")]
    pub async fn from_connection_string(conn_str: &str) -> Result<Self, ClientError> {
        let config: tokio_postgres::Config = conn_str
            .parse()
            .map_err(|e| ClientError::Config(format!("Invalid connection string: {}", e)))?;

        let host = match config.get_hosts().first() {
            Some(tokio_postgres::config::Host::Tcp(host)) => host.clone(),
            #[cfg(unix)]
            Some(tokio_postgres::config::Host::Unix(path)) => path.display().to_string(),
            None => "localhost".to_string(),
        };
        let port = config.get_ports().first().copied().unwrap_or(5432);
        let database = config.get_dbname().unwrap_or("postgres").to_string();

        let (client, connection) = tokio_postgres::connect(conn_str, NoTls)
            .await
            .map_err(|e| ClientError::Authentication(format!("Failed to connect: {}", e)))?;

        let host_clone = host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("PostgreSQL connection error ({}:{}): {}", host_clone, port, e);
            }
        });

        Ok(Self {
            client,
            host,
            port,
            database,
        })
    }

    /// Connect from a connection string without the postgres feature
    #[cfg(not(feature = "postgres"))]
    pub async fn from_connection_string(_conn_str: &str) -> Result<Self, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    /// Connect from `PG*` environment variables
    ///
    /// Reads `PGHOST`, `PGPORT` (default 5432), `PGDATABASE`, `PGUSER` and
    /// `PGPASSWORD`.
    pub async fn from_env() -> Result<Self, ClientError> {
        let require = |name: &str| {
            std::env::var(name)
                .map_err(|_| ClientError::Config(format!("{} must be set", name)))
        };

        let host = require("PGHOST")?;
        let port: u16 = std::env::var("PGPORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse()
            .map_err(|_| ClientError::Config("Invalid PGPORT".to_string()))?;
        let database = require("PGDATABASE")?;
        let user = require("PGUSER")?;
        let password = require("PGPASSWORD")?;

        Self::connect(host, port, database, user, password).await
    }

    /// Convert a PostgreSQL type string to a LogicalType
    ///
    /// Handles the information_schema renderings, including
    /// `numeric(p,s)` precision/scale and `type[]` array notation.
    pub fn map_postgres_type(pg_type: &str) -> LogicalType {
        // Array notation first: "integer[]" or internal "_int4"
        if let Some(element) = pg_type.strip_suffix("[]") {
            return LogicalType::Array {
                element_type: Box::new(Self::map_postgres_type(element)),
            };
        }
        if let Some(element) = pg_type.strip_prefix('_') {
            return LogicalType::Array {
                element_type: Box::new(Self::map_postgres_type(element)),
            };
        }

        let base_type = pg_type
            .split('(')
            .next()
            .unwrap_or(pg_type)
            .trim()
            .to_lowercase();

        match base_type.as_str() {
            "boolean" | "bool" => LogicalType::Bool,

            "smallint" | "int2" | "integer" | "int" | "int4" | "bigint" | "int8"
            | "serial" | "serial4" | "bigserial" | "serial8" | "smallserial" | "serial2"
            | "oid" => LogicalType::Int,

            "real" | "float4" | "double precision" | "float8" | "float" => LogicalType::Float,

            "numeric" | "decimal" => Self::parse_numeric_type(pg_type),

            // Money has fixed precision
            "money" => LogicalType::Decimal {
                precision: Some(19),
                scale: Some(2),
            },

            "character varying" | "varchar" | "character" | "char" | "bpchar" | "text"
            | "name" | "citext" | "uuid" | "xml" | "bytea" | "interval" | "inet" | "cidr"
            | "macaddr" | "macaddr8" => LogicalType::String,

            "date" => LogicalType::Date,

            "timestamp without time zone" | "timestamp" | "timestamp with time zone"
            | "timestamptz" | "time without time zone" | "time" | "time with time zone"
            | "timetz" => LogicalType::Timestamp,

            "json" | "jsonb" => LogicalType::Json,

            "array" => LogicalType::Array {
                element_type: Box::new(LogicalType::Unknown),
            },

            _ => LogicalType::Unknown,
        }
    }

    /// Parse numeric precision and scale
    ///
    /// `numeric` without parameters has arbitrary precision; `numeric(10)`
    /// means scale 0.
    fn parse_numeric_type(type_str: &str) -> LogicalType {
        if let Some(params) = type_str.split('(').nth(1) {
            if let Some(params) = params.strip_suffix(')') {
                let parts: Vec<&str> = params.split(',').collect();
                if parts.len() == 2 {
                    let precision = parts[0].trim().parse().ok();
                    let scale = parts[1].trim().parse().ok();
                    return LogicalType::Decimal { precision, scale };
                } else if parts.len() == 1 {
                    let precision = parts[0].trim().parse().ok();
                    return LogicalType::Decimal {
                        precision,
                        scale: Some(0),
                    };
                }
            }
        }

        LogicalType::Decimal {
            precision: None,
            scale: None,
        }
    }

    /// Get the connection host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the connection port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the connected database name
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Quote an identifier for interpolation into SQL
    fn quote_ident(ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// One client serves exactly one database
    fn check_database(&self, database: &str) -> Result<(), ClientError> {
        if database == self.database {
            Ok(())
        } else {
            Err(ClientError::DatabaseNotFound(format!(
                "connected to '{}', '{}' is not reachable through this client",
                self.database, database
            )))
        }
    }

    #[cfg(feature = "postgres")]
    fn map_query_error(e: tokio_postgres::Error, context: &str) -> ClientError {
        let err_str = e.to_string();
        if err_str.contains("does not exist") {
            ClientError::TableNotFound(format!("{}: {}", context, err_str))
        } else if err_str.contains("permission denied") {
            ClientError::PermissionDenied(format!("{}: {}", context, err_str))
        } else {
            ClientError::Query(format!("{}: {}", context, err_str))
        }
    }

    /// Convert a wire type to a LogicalType
    #[cfg(feature = "postgres")]
    fn logical_type_of(ty: &Type) -> LogicalType {
        if let Kind::Array(inner) = ty.kind() {
            return LogicalType::Array {
                element_type: Box::new(Self::logical_type_of(inner)),
            };
        }

        match *ty {
            Type::BOOL => LogicalType::Bool,
            Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => LogicalType::Int,
            Type::FLOAT4 | Type::FLOAT8 => LogicalType::Float,
            Type::NUMERIC => LogicalType::Decimal {
                precision: None,
                scale: None,
            },
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UUID => {
                LogicalType::String
            }
            Type::DATE => LogicalType::Date,
            Type::TIMESTAMP | Type::TIMESTAMPTZ | Type::TIME | Type::TIMETZ => {
                LogicalType::Timestamp
            }
            Type::JSON | Type::JSONB => LogicalType::Json,
            _ => LogicalType::Unknown,
        }
    }

    /// Parse one text-format cell into a typed value
    ///
    /// Scalar booleans, integers, floats and JSON are parsed; everything
    /// else keeps its text rendering.
    #[cfg(feature = "postgres")]
    fn parse_cell(raw: Option<&str>, logical_type: &LogicalType) -> Value {
        let Some(raw) = raw else {
            return Value::Null;
        };

        match logical_type {
            LogicalType::Bool => match raw {
                "t" | "true" => Value::Bool(true),
                "f" | "false" => Value::Bool(false),
                other => Value::Text(other.to_string()),
            },
            LogicalType::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            LogicalType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            LogicalType::Json => serde_json::from_str(raw)
                .map(Value::Json)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Run a read query and shape its result into a frame
    ///
    /// The statement is prepared once for column metadata, then executed in
    /// text format so that every warehouse type has a faithful rendering.
    #[cfg(feature = "postgres")]
    async fn read_frame(&self, sql: &str) -> Result<ResultFrame, ClientError> {
        tracing::debug!(sql, "executing read");

        let statement = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| Self::map_query_error(e, "prepare failed"))?;

        let columns: Vec<Column> = statement
            .columns()
            .iter()
            .map(|c| Column::new(c.name(), Self::logical_type_of(c.type_())))
            .collect();
        let logical_types: Vec<LogicalType> =
            columns.iter().map(|c| c.logical_type.clone()).collect();
        let schema = Schema::from_columns(columns);

        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| Self::map_query_error(e, "query failed"))?;

        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                if row.len() != logical_types.len() {
                    return Err(ClientError::InvalidResponse(format!(
                        "row has {} values, expected {}",
                        row.len(),
                        logical_types.len()
                    )));
                }
                let values = logical_types
                    .iter()
                    .enumerate()
                    .map(|(idx, lt)| Self::parse_cell(row.get(idx), lt))
                    .collect();
                rows.push(values);
            }
        }

        Ok(ResultFrame::new(schema, rows))
    }
}

#[async_trait::async_trait]
impl PlatformClient for PostgresClient {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    #[cfg(feature = "postgres")]
    async fn test_connection(&self) -> Result<(), ClientError> {
        self.client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| ClientError::Query(format!("Connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "postgres"))]
    async fn test_connection(&self) -> Result<(), ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn list_schemas(&self, database: &str) -> Result<Vec<String>, ClientError> {
        self.check_database(database)?;

        let query = r#"
            SELECT schema_name
            FROM information_schema.schemata
            WHERE schema_name NOT IN ('information_schema')
              AND schema_name NOT LIKE 'pg\_%'
            ORDER BY schema_name
        "#;

        let rows = self
            .client
            .query(query, &[])
            .await
            .map_err(|e| Self::map_query_error(e, "schema listing failed"))?;

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    #[cfg(not(feature = "postgres"))]
    async fn list_schemas(&self, _database: &str) -> Result<Vec<String>, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn list_tables(
        &self,
        database: &str,
        schema: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.check_database(database)?;

        let query = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            ORDER BY table_name
        "#;

        let rows = self
            .client
            .query(query, &[&schema])
            .await
            .map_err(|e| Self::map_query_error(e, "table listing failed"))?;

        // Distinguish an empty schema from an unknown one
        if rows.is_empty() {
            let exists = self
                .client
                .query(
                    "SELECT 1 FROM information_schema.schemata WHERE schema_name = $1",
                    &[&schema],
                )
                .await
                .map_err(|e| Self::map_query_error(e, "schema lookup failed"))?;
            if exists.is_empty() {
                return Err(ClientError::SchemaNotFound(format!(
                    "{}.{}",
                    database, schema
                )));
            }
        }

        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    #[cfg(not(feature = "postgres"))]
    async fn list_tables(
        &self,
        _database: &str,
        _schema: &str,
    ) -> Result<Vec<String>, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn table_columns(&self, table: &TableRef) -> Result<Schema, ClientError> {
        self.check_database(&table.database)?;

        let query = r#"
            SELECT
                column_name,
                data_type,
                is_nullable,
                numeric_precision,
                numeric_scale,
                udt_name
            FROM information_schema.columns
            WHERE table_schema = $1
              AND table_name = $2
            ORDER BY ordinal_position
        "#;

        let rows = self
            .client
            .query(query, &[&table.schema, &table.table])
            .await
            .map_err(|e| Self::map_query_error(e, "column lookup failed"))?;

        let mut columns = Vec::new();
        for row in rows {
            let col_name: String = row.get(0);
            let data_type: String = row.get(1);
            let is_nullable: String = row.get(2);
            let numeric_precision: Option<i32> = row.get(3);
            let numeric_scale: Option<i32> = row.get(4);
            let udt_name: String = row.get(5);

            // Rebuild the full type string for numerics and arrays
            let full_type = if data_type == "numeric" || data_type == "decimal" {
                match (numeric_precision, numeric_scale) {
                    (Some(p), Some(s)) => format!("numeric({},{})", p, s),
                    (Some(p), None) => format!("numeric({})", p),
                    _ => data_type.clone(),
                }
            } else if udt_name.starts_with('_') {
                format!("{}[]", &udt_name[1..])
            } else {
                data_type.clone()
            };

            let nullable = match is_nullable.to_uppercase().as_str() {
                "YES" => Nullability::Yes,
                "NO" => Nullability::No,
                _ => Nullability::Unknown,
            };

            columns.push(
                Column::new(col_name, Self::map_postgres_type(&full_type))
                    .with_nullability(nullable),
            );
        }

        if columns.is_empty() {
            return Err(ClientError::TableNotFound(format!(
                "Table {} not found or has no columns",
                table.fqn()
            )));
        }

        Ok(Schema::from_columns(columns))
    }

    #[cfg(not(feature = "postgres"))]
    async fn table_columns(&self, _table: &TableRef) -> Result<Schema, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn resolve_table(&self, table: &TableRef) -> Result<TableHandle, ClientError> {
        self.check_database(&table.database)?;

        let query = r#"
            SELECT c.oid::bigint
            FROM pg_catalog.pg_class c
            JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
            WHERE n.nspname = $1
              AND c.relname = $2
        "#;

        let rows = self
            .client
            .query(query, &[&table.schema, &table.table])
            .await
            .map_err(|e| Self::map_query_error(e, "table resolution failed"))?;

        let row = rows
            .first()
            .ok_or_else(|| ClientError::TableNotFound(table.fqn()))?;
        let id: i64 = row.get(0);

        tracing::debug!(table = %table.fqn(), id, "resolved table");
        Ok(TableHandle::new(id, table.clone()))
    }

    #[cfg(not(feature = "postgres"))]
    async fn resolve_table(&self, _table: &TableRef) -> Result<TableHandle, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn read_table(&self, handle: &TableHandle) -> Result<ResultFrame, ClientError> {
        self.check_database(&handle.table.database)?;

        let sql = format!(
            "SELECT * FROM {}.{}",
            Self::quote_ident(&handle.table.schema),
            Self::quote_ident(&handle.table.table)
        );
        self.read_frame(&sql).await
    }

    #[cfg(not(feature = "postgres"))]
    async fn read_table(&self, _handle: &TableHandle) -> Result<ResultFrame, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn read_sql(&self, database: &str, sql: &str) -> Result<ResultFrame, ClientError> {
        self.check_database(database)?;
        self.read_frame(sql).await
    }

    #[cfg(not(feature = "postgres"))]
    async fn read_sql(&self, _database: &str, _sql: &str) -> Result<ResultFrame, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "postgres")]
    async fn sample_sql(
        &self,
        database: &str,
        sql: &str,
        limit: u64,
    ) -> Result<ResultFrame, ClientError> {
        self.check_database(database)?;

        let sampled = format!("SELECT * FROM ({}) AS warecat_sample LIMIT {}", sql, limit);
        self.read_frame(&sampled).await
    }

    #[cfg(not(feature = "postgres"))]
    async fn sample_sql(
        &self,
        _database: &str,
        _sql: &str,
        _limit: u64,
    ) -> Result<ResultFrame, ClientError> {
        Err(ClientError::Config(FEATURE_HINT.to_string()))
    }
}
