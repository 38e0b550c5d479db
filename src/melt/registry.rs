//! Table definitions discovered while analyzing a document

use crate::naming::foreign_key_column;
use crate::types::TableIndex;
use std::collections::{HashMap, HashSet};

/// A table's name and its ordered, de-duplicated columns
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: String,
    columns: Vec<String>,
    seen: HashSet<String>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        TableDef {
            name: name.into(),
            columns: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Columns in first-seen order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append a column unless it is already present
    pub fn add_column(&mut self, column: &str) {
        if self.seen.insert(column.to_string()) {
            self.columns.push(column.to_string());
        }
    }

    /// Column that children of this table use to reference its rows
    pub fn foreign_key_column(&self) -> String {
        foreign_key_column(&self.name)
    }
}

/// Tables keyed by name, kept in discovery order
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: Vec<TableDef>,
    by_name: HashMap<String, TableIndex>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the table called `name`, creating it if needed.
    ///
    /// Different parts of a document that map to the same name share one
    /// table; their columns are merged.
    pub fn table_index_or_create(&mut self, name: &str) -> TableIndex {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }

        let index = self.tables.len();
        self.tables.push(TableDef::new(name));
        self.by_name.insert(name.to_string(), index);
        tracing::debug!(table = name, "discovered table");
        index
    }

    pub fn add_column(&mut self, index: TableIndex, column: &str) {
        self.tables[index].add_column(column);
    }

    pub fn get(&self, index: TableIndex) -> Option<&TableDef> {
        self.tables.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&TableDef> {
        self.by_name.get(name).map(|&index| &self.tables[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
