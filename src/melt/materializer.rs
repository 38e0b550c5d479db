//! Turning analyzed rows into CSV lines
//!
//! Rows come out of the analyzer already numbered, so each table is written
//! from its own group of rows without walking the document again. The
//! result is the same as replaying the numbering walk once per table.

use crate::melt::analyzer::{Analysis, Row, RowKind};
use crate::melt::registry::TableDef;
use crate::melt::writer::{Cell, CsvWriter};
use crate::types::TableIndex;
use std::io::{self, Write};

pub struct Materializer<'r, 'a> {
    analysis: &'r Analysis<'a>,
    groups: Vec<Vec<&'r Row<'a>>>,
}

impl<'r, 'a> Materializer<'r, 'a> {
    pub fn new(analysis: &'r Analysis<'a>) -> Self {
        Materializer {
            analysis,
            groups: analysis.rows_by_table(),
        }
    }

    /// Rows belonging to `table`, in identifier order
    pub fn rows(&self, table: TableIndex) -> &[&'r Row<'a>] {
        self.groups.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve every column of `table` for one row.
    ///
    /// Synthesized columns win over same-named properties: `id`, the row's
    /// own foreign key, both `seq` and `index` for any array element (a
    /// merged table may carry both) and `value` for scalar elements.
    /// Anything else comes from a scalar property of the row's object, or
    /// stays empty.
    pub fn cells(&self, table: &TableDef, row: &Row<'a>) -> Vec<Cell<'a>> {
        let foreign_key = row.parent.and_then(|parent| {
            self.analysis
                .registry
                .get(parent.table)
                .map(|p| (p.foreign_key_column(), parent.id))
        });
        let properties = row.properties();

        table
            .columns()
            .iter()
            .map(|column| {
                if column == "id" {
                    return Cell::Id(row.id);
                }
                if let Some((fk, parent_id)) = &foreign_key {
                    if column == fk {
                        return Cell::Id(*parent_id);
                    }
                }
                match (column.as_str(), row.position(), row.kind) {
                    ("seq" | "index", Some(position), _) => return Cell::Position(position),
                    ("value", _, RowKind::Scalar { value, .. }) => return Cell::Value(value),
                    _ => {}
                }

                properties
                    .iter()
                    .find(|(key, _)| key == column)
                    .filter(|(_, value)| !value.is_container())
                    .map(|(_, value)| Cell::Value(value))
                    .unwrap_or(Cell::Empty)
            })
            .collect()
    }

    /// Write header and rows of one table. Returns the number of rows.
    pub fn write_table<W: Write>(&self, table: TableIndex, out: &mut CsvWriter<W>) -> io::Result<usize> {
        let Some(def) = self.analysis.registry.get(table) else {
            return Ok(0);
        };

        out.write_header(def.columns())?;

        let rows = self.rows(table);
        for row in rows {
            out.write_row(&self.cells(def, row))?;
        }
        out.flush()?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melt::analyzer::SchemaAnalyzer;
    use crate::tree::Node;
    use serde_json::json;

    /// Render every table of a document into strings, keyed by name
    fn materialize(doc: &Node) -> Vec<(String, String)> {
        let analysis = SchemaAnalyzer::analyze(doc, "root");
        let materializer = Materializer::new(&analysis);

        analysis
            .registry
            .iter()
            .enumerate()
            .map(|(index, table)| {
                let mut out = CsvWriter::new(Vec::new(), 6);
                materializer.write_table(index, &mut out).unwrap();
                (table.name.clone(), String::from_utf8(out.into_inner()).unwrap())
            })
            .collect()
    }

    fn table<'t>(tables: &'t [(String, String)], name: &str) -> &'t str {
        tables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, csv)| csv.as_str())
            .unwrap()
    }

    #[test]
    fn test_flat_object() {
        let doc = Node::from(json!({"name": "Alice", "age": 30}));
        let tables = materialize(&doc);

        assert_eq!(tables.len(), 1);
        assert_eq!(table(&tables, "root"), "id,name,age\n1,\"Alice\",30\n");
    }

    #[test]
    fn test_scalar_array() {
        let doc = Node::from(json!({"tags": ["a", "b"]}));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "root"), "id\n1\n");
        assert_eq!(
            table(&tables, "tags"),
            "id,root_id,index,value\n2,1,0,\"a\"\n3,1,1,\"b\"\n"
        );
    }

    #[test]
    fn test_heterogeneous_object_array() {
        let doc = Node::from(json!({"items": [{"x": 1}, {"y": 2}]}));
        let tables = materialize(&doc);

        assert_eq!(
            table(&tables, "items"),
            "id,root_id,seq,x,y\n2,1,0,1,\n3,1,1,,2\n"
        );
    }

    #[test]
    fn test_empty_object_and_array() {
        let tables = materialize(&Node::from(json!({})));
        assert_eq!(tables, vec![("root".to_string(), "id\n1\n".to_string())]);

        let tables = materialize(&Node::from(json!({"a": []})));
        assert_eq!(tables, vec![("root".to_string(), "id\n1\n".to_string())]);
    }

    #[test]
    fn test_nested_foreign_keys() {
        let doc = Node::from(json!({
            "user": {
                "name": "Alice",
                "posts": [
                    {"title": "First", "tags": ["a", "b"]},
                    {"title": "Second", "tags": ["c"]}
                ]
            }
        }));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "user"), "id,root_id,name\n2,1,\"Alice\"\n");
        assert_eq!(
            table(&tables, "posts"),
            "id,user_id,seq,title\n3,2,0,\"First\"\n6,2,1,\"Second\"\n"
        );
        assert_eq!(
            table(&tables, "tags"),
            "id,posts_id,index,value\n4,3,0,\"a\"\n5,3,1,\"b\"\n7,6,0,\"c\"\n"
        );
    }

    #[test]
    fn test_merged_table_fills_only_own_foreign_key() {
        let doc = Node::from(json!({
            "home": {"address": {"street": "Main"}},
            "work": {"address": {"city": "Oslo"}}
        }));
        let tables = materialize(&doc);

        assert_eq!(
            table(&tables, "address"),
            "id,home_id,street,work_id,city\n3,2,\"Main\",,\n5,,,4,\"Oslo\"\n"
        );
    }

    #[test]
    fn test_synthesized_columns_win_over_properties() {
        let doc = Node::from(json!({"id": "mine", "items": [{"seq": 99, "id": 7, "v": true}]}));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "root"), "id\n1\n");
        assert_eq!(table(&tables, "items"), "id,root_id,seq,v\n2,1,0,true\n");
    }

    #[test]
    fn test_property_named_like_synthesized_column_on_plain_object() {
        // Plain objects have no position, so a `seq` property is kept
        let doc = Node::from(json!({"seq": 5, "index": "i"}));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "root"), "id,seq,index\n1,5,\"i\"\n");
    }

    #[test]
    fn test_merged_object_and_scalar_array_fill_both_positions() {
        let doc = Node::from(json!({"a": [{"x": 1, "index": "own"}], "b": {"a": ["s", "t"]}}));
        let tables = materialize(&doc);

        assert_eq!(
            table(&tables, "a"),
            "id,root_id,seq,x,index,b_id,value\n2,1,0,1,0,,\n4,,0,,0,3,\"s\"\n5,,1,,1,3,\"t\"\n"
        );
    }

    #[test]
    fn test_nulls_and_missing_are_empty() {
        let doc = Node::from(json!({"rows": [{"a": null, "b": 1}, {"b": 2}]}));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "rows"), "id,root_id,seq,a,b\n2,1,0,,1\n3,1,1,,2\n");
    }

    #[test]
    fn test_container_property_is_not_a_cell() {
        // `x` is a column because of the first element; in the second it
        // is an object and belongs to table `x` instead
        let doc = Node::from(json!({"items": [{"x": 1}, {"x": {"deep": true}}]}));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "items"), "id,root_id,seq,x\n2,1,0,1\n3,1,1,\n");
        assert_eq!(table(&tables, "x"), "id,items_id,deep\n4,3,true\n");
    }

    #[test]
    fn test_complex_scalar_array_element() {
        let doc = Node::from(json!({"vals": [1, {"a": 2}, 3]}));
        let analysis = SchemaAnalyzer::analyze(&doc, "root");
        let materializer = Materializer::new(&analysis);

        let mut out = CsvWriter::new(Vec::new(), 6);
        let rows = materializer.write_table(1, &mut out).unwrap();

        assert_eq!(rows, 3);
        assert_eq!(out.warnings(), 1);
        assert_eq!(
            String::from_utf8(out.into_inner()).unwrap(),
            "id,root_id,index,value\n2,1,0,1\n3,1,1,\n4,1,2,3\n"
        );
    }

    #[test]
    fn test_root_array_of_scalars() {
        let doc = Node::from(json!([true, null, "x"]));
        let tables = materialize(&doc);

        assert_eq!(table(&tables, "root"), "id,index,value\n1,0,true\n2,1,\n3,2,\"x\"\n");
    }

    #[test]
    fn test_unknown_table_writes_nothing() {
        let doc = Node::from(json!(1));
        let analysis = SchemaAnalyzer::analyze(&doc, "root");
        let materializer = Materializer::new(&analysis);

        let mut out = CsvWriter::new(Vec::new(), 6);
        assert_eq!(materializer.write_table(0, &mut out).unwrap(), 0);
        assert!(out.into_inner().is_empty());
    }
}
