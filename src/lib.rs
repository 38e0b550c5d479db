//! # Smelt - JSON to relational CSV
//!
//! Smelt takes one JSON document and splits it into relational tables,
//! writing one CSV file per table.
//!
//! - every object becomes a row in the table named after its key
//! - arrays of objects share one table, with a `seq` column for position
//! - arrays of scalars become junction tables with `index` and `value`
//! - nested rows carry a `{parent}_id` foreign key to their enclosing row
//!
//! Row identifiers start at 1 and are shared by all tables of a document.
//!
//! ## Quick Start
//!
//! ```rust
//! use smelt::melt::SchemaAnalyzer;
//! use smelt::Node;
//! use serde_json::json;
//!
//! let doc = Node::from(json!({
//!     "name": "Alice",
//!     "posts": [
//!         {"title": "First Post"},
//!         {"title": "Second Post", "draft": true}
//!     ]
//! }));
//!
//! let analysis = SchemaAnalyzer::analyze(&doc, "root");
//! assert_eq!(analysis.registry.names(), vec!["root", "posts"]);
//!
//! let posts = analysis.registry.find("posts").unwrap();
//! assert_eq!(posts.columns(), &["id", "root_id", "seq", "title", "draft"]);
//! ```
//!
//! Use [`convert`] or [`convert_reader`] to write the CSV files.

use std::io::Read;

pub mod error;
pub mod melt;
pub mod naming;
pub mod tree;
pub mod types;

pub use error::{Result, SmeltError};
pub use melt::{Materializer, SchemaAnalyzer, TableRegistry};
pub use tree::{parse_document, Node};
pub use types::{ConversionReport, ConvertConfig, RowId, SkippedTable, WrittenTable};

use melt::CsvSink;

/// Convert a parsed document into CSV files under `config.output_dir`.
///
/// A table whose file cannot be created is logged and listed in
/// [`ConversionReport::skipped`]; the remaining tables are still written.
pub fn convert(root: &Node, config: &ConvertConfig) -> Result<ConversionReport> {
    let analysis = SchemaAnalyzer::analyze(root, &config.root_key);
    tracing::debug!(
        tables = analysis.registry.len(),
        rows = analysis.rows.len(),
        "analyzed document"
    );

    let sink = CsvSink::new(&config.output_dir, config.number_precision);
    let materializer = Materializer::new(&analysis);
    let mut report = ConversionReport::default();

    if !analysis.registry.is_empty() {
        sink.prepare();
    }

    for (index, table) in analysis.registry.iter().enumerate() {
        let path = sink.path_for(&table.name);

        let written = sink
            .create(&table.name)
            .and_then(|mut out| {
                let rows = materializer.write_table(index, &mut out)?;
                Ok((rows, out.warnings()))
            });

        match written {
            Ok((rows, warnings)) => {
                tracing::debug!(table = %table.name, rows, path = %path.display(), "wrote table");
                report.warnings += warnings;
                report.written.push(WrittenTable {
                    name: table.name.clone(),
                    path,
                    rows,
                });
            }
            Err(e) => {
                tracing::error!(
                    table = %table.name,
                    path = %path.display(),
                    error = %e,
                    "could not write table, skipping"
                );
                report.skipped.push(SkippedTable {
                    name: table.name.clone(),
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Read one JSON document from `reader`, parse it and convert it.
///
/// Nothing is written when the input cannot be read or parsed.
pub fn convert_reader<R: Read>(mut reader: R, config: &ConvertConfig) -> Result<ConversionReport> {
    let root = read_document(&mut reader)?;
    convert(&root, config)
}

/// Read and parse one JSON document
pub fn read_document<R: Read>(reader: &mut R) -> Result<Node> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content).map_err(SmeltError::Read)?;
    Ok(parse_document(&mut content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_writes_every_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConvertConfig::default().with_output_dir(dir.path());

        let doc = Node::from(json!({"name": "Alice", "tags": ["a", "b"]}));
        let report = convert(&doc, &config).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.total_rows(), 3);
        assert_eq!(report.written[1].path, dir.path().join("tags.csv"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("root.csv")).unwrap(),
            "id,name\n1,\"Alice\"\n"
        );
    }

    #[test]
    fn test_convert_reader_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let config = ConvertConfig::default().with_output_dir(&out);

        let result = convert_reader(&b"{\"a\": [1, 2"[..], &config);

        assert!(matches!(result, Err(SmeltError::Parse(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_convert_reader_rejects_excessive_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let config = ConvertConfig::default().with_output_dir(&out);

        let depth = tree::MAX_DEPTH + 1;
        let input = format!("{}{}", r#"{"a":"#.repeat(depth), "}".repeat(depth));
        let result = convert_reader(input.as_bytes(), &config);

        assert!(matches!(result, Err(SmeltError::Parse(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_scalar_document_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let config = ConvertConfig::default().with_output_dir(&out);

        let report = convert_reader(&b"\"just a string\""[..], &config).unwrap();

        assert!(report.written.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn test_custom_root_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConvertConfig::default()
            .with_output_dir(dir.path())
            .with_root_key("doc");

        let report = convert(&Node::from(json!({"k": 1})), &config).unwrap();

        assert_eq!(report.written[0].name, "doc");
        assert!(dir.path().join("doc.csv").exists());
    }
}
