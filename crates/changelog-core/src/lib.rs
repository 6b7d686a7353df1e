//! Change-record storage and query engine.
//!
//! Per-module change-log entries arrive as short directive lines, are
//! keyed by their `module;marker;note` composite identity in an
//! embedded SQLite store, and render as a grouped table, an RSS 2.0
//! feed, or a DocBook variable list.

mod glob;

pub mod ingest;
pub mod query;
pub mod record;
pub mod render;
pub mod scope;
pub mod sort;
pub mod sqlite_store;
pub mod store;

pub use ingest::*;
pub use query::*;
pub use record::*;
pub use render::*;
pub use scope::*;
pub use sort::*;
pub use sqlite_store::SqliteChangeStore;
pub use store::*;
