//! Relational melting - split one JSON document into linked tables
//!
//! The pipeline runs in two steps. [`SchemaAnalyzer`] walks the document
//! once, collecting table definitions into a [`TableRegistry`] and numbering
//! every row. [`Materializer`] then writes each table through a
//! [`CsvWriter`], resolving identifiers, foreign keys and positions from the
//! numbered rows.

pub mod analyzer;
pub mod materializer;
pub mod registry;
pub mod writer;

pub use analyzer::{Analysis, ParentRef, Row, RowKind, SchemaAnalyzer};
pub use materializer::Materializer;
pub use registry::{TableDef, TableRegistry};
pub use writer::{Cell, CsvSink, CsvWriter};
