//! Warecat drivers
//!
//! The adapters a cataloging framework loads from a declaration:
//! - [`TableSource`] - one table (or SQL expression) exposed as a readable
//!   source
//! - [`SchemaCatalog`] - the tables of one schema exposed as entries
//! - [`DatabaseCatalog`] - the schemas of one database exposed as catalogs
//! - [`registry`] - instantiating the right adapter from a declaration
//!
//! Every adapter is a stateless request/response wrapper around one
//! [`warecat_client::PlatformClient`] call; client errors propagate
//! unmodified.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warecat_client::PostgresClient;
//! use warecat_driver::{DataSource, SchemaCatalog};
//!
//! let client = Arc::new(PostgresClient::from_env().await?);
//! let catalog = SchemaCatalog::new(client, "analytics", "reporting");
//! for (name, entry) in catalog.load().await? {
//!     let frame = entry.to_source().read().await?;
//!     println!("{}: {:?}", name, frame.shape());
//! }
//! ```

pub mod catalog;
pub mod database;
pub mod registry;
pub mod source;

pub use catalog::{CatalogEntry, SchemaCatalog, DEFAULT_SCHEMA};
pub use database::DatabaseCatalog;
pub use registry::{build_catalog, build_source, CatalogSource};
pub use source::{DataSource, TableSource, DEFAULT_SAMPLE_LIMIT};
