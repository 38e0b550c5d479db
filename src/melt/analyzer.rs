//! Schema discovery and row numbering
//!
//! A single pre-order walk over the document decides which tables exist,
//! which columns they carry, and which identifier every row receives.
//! Rows are kept in an arena that borrows from the tree, so materializing a
//! table never has to walk the document again.
//!
//! Numbering rules, starting at 1 and shared across all tables:
//!
//! - every object takes the next identifier before its properties are visited
//! - every element of an array whose first element is an object takes one
//! - every element of a non-empty array of scalars takes one
//!
//! Empty arrays and scalars take none.

use crate::melt::registry::TableRegistry;
use crate::naming::sanitize_name;
use crate::tree::Node;
use crate::types::{RowId, TableIndex};

/// The row a child row points back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub table: TableIndex,
    pub id: RowId,
}

/// What a row was produced from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowKind<'a> {
    /// An object outside of any array
    Object(&'a [(String, Node)]),

    /// An element of an array of objects, at position `seq`
    Element { seq: usize, node: &'a Node },

    /// An element of an array of scalars, at position `index`
    Scalar { index: usize, value: &'a Node },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub id: RowId,
    pub table: TableIndex,
    pub parent: Option<ParentRef>,
    pub kind: RowKind<'a>,
}

impl<'a> Row<'a> {
    /// Properties of the object behind this row, if there is one
    pub fn properties(&self) -> &'a [(String, Node)] {
        match self.kind {
            RowKind::Object(props) => props,
            RowKind::Element { node, .. } => node.as_object().unwrap_or(&[]),
            RowKind::Scalar { .. } => &[],
        }
    }

    /// Position inside the enclosing array, for array rows
    pub fn position(&self) -> Option<usize> {
        match self.kind {
            RowKind::Object(_) => None,
            RowKind::Element { seq, .. } => Some(seq),
            RowKind::Scalar { index, .. } => Some(index),
        }
    }
}

/// Result of analyzing one document
#[derive(Debug, Clone, Default)]
pub struct Analysis<'a> {
    pub registry: TableRegistry,

    /// Every row, in identifier order
    pub rows: Vec<Row<'a>>,
}

impl<'a> Analysis<'a> {
    /// Rows grouped by table, each group in identifier order
    pub fn rows_by_table(&self) -> Vec<Vec<&Row<'a>>> {
        let mut grouped: Vec<Vec<&Row<'a>>> = vec![Vec::new(); self.registry.len()];
        for row in &self.rows {
            grouped[row.table].push(row);
        }
        grouped
    }

    /// Look up a row by identifier
    pub fn row(&self, id: RowId) -> Option<&Row<'a>> {
        // Identifiers are dense and start at 1
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.rows.get(index)
    }
}

/// Walks a document once to build an [`Analysis`]
pub struct SchemaAnalyzer<'a> {
    registry: TableRegistry,
    rows: Vec<Row<'a>>,
    next_id: RowId,
}

impl<'a> SchemaAnalyzer<'a> {
    pub fn new() -> Self {
        SchemaAnalyzer {
            registry: TableRegistry::new(),
            rows: Vec::new(),
            next_id: 1,
        }
    }

    /// Analyze a document filed under `root_key`
    pub fn analyze(root: &'a Node, root_key: &str) -> Analysis<'a> {
        let mut analyzer = Self::new();
        analyzer.visit(root, root_key, None);
        analyzer.finish()
    }

    pub fn finish(self) -> Analysis<'a> {
        Analysis {
            registry: self.registry,
            rows: self.rows,
        }
    }

    fn next_id(&mut self) -> RowId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Visit `node`, reached through `key`, below the row `parent`
    pub fn visit(&mut self, node: &'a Node, key: &str, parent: Option<ParentRef>) {
        match node {
            Node::Object(props) => self.visit_object(props, key, parent),
            Node::Array(items) => match items.first() {
                None => {
                    // Nothing to infer columns from
                }
                Some(Node::Object(_)) => self.visit_object_array(items, key, parent),
                Some(_) => self.visit_scalar_array(items, key, parent),
            },
            _ => {
                // Scalars only become rows through their parent
            }
        }
    }

    /// Resolve the table for `key` and give it `id` plus a foreign key
    fn open_table(&mut self, key: &str, parent: Option<ParentRef>) -> TableIndex {
        let table = self.registry.table_index_or_create(&sanitize_name(key));
        self.registry.add_column(table, "id");

        if let Some(parent) = parent {
            if let Some(fk) = self.registry.get(parent.table).map(|p| p.foreign_key_column()) {
                self.registry.add_column(table, &fk);
            }
        }

        table
    }

    fn visit_object(&mut self, props: &'a [(String, Node)], key: &str, parent: Option<ParentRef>) {
        let table = self.open_table(key, parent);
        let id = self.next_id();

        self.rows.push(Row {
            id,
            table,
            parent,
            kind: RowKind::Object(props),
        });

        self.visit_properties(props, table, id);
    }

    fn visit_object_array(&mut self, items: &'a [Node], key: &str, parent: Option<ParentRef>) {
        let table = self.open_table(key, parent);
        self.registry.add_column(table, "seq");

        for (seq, item) in items.iter().enumerate() {
            let id = self.next_id();

            self.rows.push(Row {
                id,
                table,
                parent,
                kind: RowKind::Element { seq, node: item },
            });

            // Elements that are not objects keep their row but add nothing else
            if let Node::Object(props) = item {
                self.visit_properties(props, table, id);
            }
        }
    }

    fn visit_scalar_array(&mut self, items: &'a [Node], key: &str, parent: Option<ParentRef>) {
        let table = self.open_table(key, parent);
        self.registry.add_column(table, "index");
        self.registry.add_column(table, "value");

        for (index, value) in items.iter().enumerate() {
            let id = self.next_id();

            self.rows.push(Row {
                id,
                table,
                parent,
                kind: RowKind::Scalar { index, value },
            });
        }
    }

    /// Scalars become columns of `table`; containers recurse with the row
    /// `id` as their parent
    fn visit_properties(&mut self, props: &'a [(String, Node)], table: TableIndex, id: RowId) {
        for (key, value) in props {
            if value.is_container() {
                self.visit(value, key, Some(ParentRef { table, id }));
            } else {
                self.registry.add_column(table, key);
            }
        }
    }
}

impl<'a> Default for SchemaAnalyzer<'a> {
    fn default() -> Self {
        Self::new()
    }
}
