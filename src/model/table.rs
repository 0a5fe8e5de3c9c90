//! Table, column and constraint model

use std::collections::BTreeMap;

use super::types::{lookup, ColumnType, Parameter, TypeKey};
use crate::error::Result;

/// Constraint name -> ordered participating columns
pub type KeyMap = BTreeMap<String, Vec<String>>;

/// Column element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub tp: ColumnType,
    pub unsigned: bool,
    pub not_null: bool,
    pub has_default_value: bool,
    pub auto_increment: bool,
    /// Evaluated as the result of an aggregate function
    pub aggregate_call: bool,
    pub comment: String,
}

impl Column {
    pub fn new(name: impl Into<String>, tp: ColumnType) -> Self {
        Self {
            name: name.into(),
            tp,
            unsigned: false,
            not_null: false,
            has_default_value: false,
            auto_increment: false,
            aggregate_call: false,
            comment: String::new(),
        }
    }

    /// Derive the typed parameter for this column from the type mapper
    pub fn data_type(&self) -> Result<Parameter> {
        let target = lookup(TypeKey::new(self.tp, self.unsigned, self.aggregate_call))?;
        Ok(Parameter::new(
            self.name.clone(),
            target.name,
            target.dependency,
        ))
    }

    /// Go type of the column
    pub fn go_type(&self) -> Result<String> {
        self.data_type().map(|p| p.target)
    }

    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }
}

/// Primary, unique and secondary index groupings of a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraint {
    pub primary_key: KeyMap,
    pub unique_key: KeyMap,
    pub index: KeyMap,
}

impl Constraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.primary_key.is_empty() && self.unique_key.is_empty() && self.index.is_empty()
    }

    pub fn append_primary_key(&mut self, name: &str, columns: &[String]) {
        append(&mut self.primary_key, name, columns);
    }

    pub fn append_unique_key(&mut self, name: &str, columns: &[String]) {
        append(&mut self.unique_key, name, columns);
    }

    pub fn append_index(&mut self, name: &str, columns: &[String]) {
        append(&mut self.index, name, columns);
    }

    /// Union another constraint set into this one
    pub fn merge(&mut self, other: &Constraint) {
        for (name, columns) in &other.primary_key {
            self.append_primary_key(name, columns);
        }
        for (name, columns) in &other.unique_key {
            self.append_unique_key(name, columns);
        }
        for (name, columns) in &other.index {
            self.append_index(name, columns);
        }
    }
}

/// Append columns under `name`, preserving first-seen order.
///
/// A new name whose column list equals an existing entry is folded into that
/// entry, so the same key declared inline and as a table constraint is kept once.
fn append(map: &mut KeyMap, name: &str, columns: &[String]) {
    if columns.is_empty() {
        return;
    }

    let key = if name.is_empty() {
        columns.join("_")
    } else {
        name.to_string()
    };

    if !map.contains_key(&key) && map.values().any(|existing| existing.as_slice() == columns) {
        return;
    }

    let entry = map.entry(key).or_default();
    for column in columns {
        if !entry.contains(column) {
            entry.push(column.clone());
        }
    }
}

/// Table element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub schema: String,
    pub columns: Vec<Column>,
    pub constraint: Constraint,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Column names in declaration order
    pub fn column_list(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Whether the column participates in a single-column primary key
    pub fn is_primary(&self, column: &str) -> bool {
        self.constraint
            .primary_key
            .values()
            .any(|cols| cols.len() == 1 && cols[0].eq_ignore_ascii_case(column))
    }
}

/// A table definition extracted from one CREATE TABLE statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ddl {
    pub table: Table,
}
