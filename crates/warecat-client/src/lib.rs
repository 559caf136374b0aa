//! Platform client seam for the warecat drivers
//!
//! The drivers in `warecat-driver` never talk to a warehouse directly; they
//! go through the [`PlatformClient`] trait defined here. Client failures
//! (authentication, missing objects, network) surface as [`ClientError`]
//! and propagate through the drivers unmodified.
//!
//! ## Features
//!
//! Enable warehouse support via Cargo features:
//! - `postgres` - PostgreSQL/Redshift client via tokio-postgres
//!
//! ## Example
//!
//! ```rust,ignore
//! use warecat_client::{PlatformClient, PostgresClient, TableRef};
//!
//! let client = PostgresClient::connect("localhost", 5432, "analytics", "me", "secret").await?;
//! let tables = client.list_tables("analytics", "reporting").await?;
//! ```

pub mod client;
pub mod mock;
pub mod postgres;

pub use client::{ClientError, PlatformClient, TableHandle, TableRef};
pub use mock::{MockClient, MockClientBuilder};
pub use postgres::PostgresClient;
