//! Top-level parse result and the per-table view handed to renderers

use std::collections::HashSet;

use tracing::debug;

use super::dml::Dml;
use super::table::{Ddl, Table};
use crate::error::{Result, SqlGenError};

/// Table definitions and statements from one or more SQL sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dxl {
    pub ddl: Vec<Ddl>,
    pub dml: Vec<Dml>,
}

impl Dxl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another model, keeping source order
    pub fn extend(&mut self, other: Dxl) {
        self.ddl.extend(other.ddl);
        self.dml.extend(other.dml);
    }

    /// Check structural invariants before the model is handed to generation
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for ddl in &self.ddl {
            let table = &ddl.table;
            if table.name.is_empty() {
                return Err(SqlGenError::InvalidModel {
                    message: "table name is empty".to_string(),
                });
            }
            if !names.insert(table.name.to_ascii_lowercase()) {
                return Err(SqlGenError::InvalidModel {
                    message: format!("duplicate table definition: {}", table.name),
                });
            }
            if let Some(column) = table.columns.iter().find(|c| c.name.is_empty()) {
                return Err(SqlGenError::InvalidModel {
                    message: format!("empty column name in table {} ({})", table.name, column.tp),
                });
            }
        }

        for dml in &self.dml {
            dml.validate()?;
        }
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.ddl
            .iter()
            .map(|d| &d.table)
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// One table together with the statements that target it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    table: Table,
    dml: Vec<Dml>,
}

impl Context {
    /// Group statements by table and bind their clauses to the table's columns
    pub fn from_dxl(dxl: &Dxl) -> Result<Vec<Context>> {
        let mut contexts: Vec<Context> = dxl
            .ddl
            .iter()
            .map(|d| Context {
                table: d.table.clone(),
                dml: Vec::new(),
            })
            .collect();

        for dml in &dxl.dml {
            let table_name = dml.table().unwrap_or_default();
            let ctx = contexts
                .iter_mut()
                .find(|c| c.table.name.eq_ignore_ascii_case(table_name))
                .ok_or_else(|| {
                    SqlGenError::MissingTableDefinition {
                        table: table_name.to_string(),
                    }
                    .near(dml.sql_text())
                })?;

            let bound = dml.bind(dxl).map_err(|e| e.near(dml.sql_text()))?;
            ctx.dml.push(bound);
        }

        debug!(contexts = contexts.len(), "built table contexts");
        Ok(contexts)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn statements(&self) -> &[Dml] {
        &self.dml
    }

    pub fn is_primary(&self, column: &str) -> bool {
        self.table.is_primary(column)
    }
}
