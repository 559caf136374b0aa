//! Warecat Core
//!
//! Domain types shared by the warecat drivers:
//! - Portable logical type system and schema types
//! - Result frames (rows of named, typed columns)
//! - Catalog declaration format (YAML source declarations)

pub mod decl;
pub mod frame;
pub mod schema;

pub use decl::{CatalogDecl, DeclError, Driver, SourceArgs, SourceDecl};
pub use frame::{ResultFrame, Value};
pub use schema::{Column, LogicalType, Nullability, Schema};
