//! Extraction of relational test-specification and test-results databases
//! into an in-memory labeled tree.
//!
//! The pipeline has three stages: a [`TypedConnection`] projects declared
//! columns into typed rows, a [`Materializer`] attaches each row to the
//! [`Tree`] following a declarative [`SchemaDef`], and [`write_xml`] renders
//! the finished tree deterministically. Two schemas are built in
//! ([`schema::SPECIFICATION`] and [`schema::RESULTS`]); both can live on
//! Postgres or H2, which differ only in identifier case.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod kind;
pub mod materialize;
pub mod schema;
pub mod tree;
pub mod value;

pub use config::{Config, DatabaseConfig, ExtractConfig};
pub use db::{FieldBinding, Row, TableReader, TypedConnection, WriteMode, BATCH_SIZE};
pub use error::{ExtractError, Result};
pub use export::{to_xml, write_xml};
pub use kind::EntityKind;
pub use materialize::{Materialized, Materializer, RefMiss};
pub use schema::{Engine, SchemaDef, SchemaKind};
pub use tree::{NodeId, Tree};
pub use value::{ColumnType, PkKey, Value};
