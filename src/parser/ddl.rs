//! CREATE TABLE extraction

use sqlparser::ast::{ColumnDef, ColumnOption, CreateTable, Ident, Statement, TableConstraint};

use super::engine::StatementNode;
use crate::error::{Result, SqlGenError};
use crate::model::{Column, ColumnType, Constraint, Ddl, Table};
use crate::util::{last_name_part, object_name_parts};

/// Name MySQL gives every primary key
pub const PRIMARY: &str = "PRIMARY";

/// Extract a table definition from a CREATE TABLE node
pub fn extract_ddl(node: &StatementNode) -> Result<Ddl> {
    match &node.statement {
        Statement::CreateTable(create) => Ok(Ddl {
            table: extract_table(create)?,
        }),
        _ => Err(SqlGenError::UnsupportedStatement {
            near: node.text.clone(),
        }),
    }
}

fn extract_table(create: &CreateTable) -> Result<Table> {
    let name = create.name.to_string();
    let parts = object_name_parts(&name);
    let mut table = Table {
        name: last_name_part(&name),
        schema: if parts.len() > 1 {
            parts[parts.len() - 2].clone()
        } else {
            String::new()
        },
        ..Default::default()
    };
    if table.name.is_empty() {
        return Err(SqlGenError::MissingTable);
    }

    let mut constraint = Constraint::new();
    for def in &create.columns {
        let (column, inline) = extract_column(def)?;
        table.columns.push(column);
        constraint.merge(&inline);
    }
    for c in &create.constraints {
        if let Some(table_level) = extract_constraint(c) {
            constraint.merge(&table_level);
        }
    }

    table.constraint = constraint;
    Ok(table)
}

/// Convert a column definition, returning the inline key markers separately
pub fn extract_column(def: &ColumnDef) -> Result<(Column, Constraint)> {
    let (tp, unsigned) = parse_data_type(&def.data_type.to_string())?;
    let mut column = Column::new(def.name.value.clone(), tp);
    column.unsigned = unsigned;

    let mut constraint = Constraint::new();
    let key = vec![column.name.clone()];
    for opt in &def.options {
        match &opt.option {
            ColumnOption::NotNull => column.not_null = true,
            ColumnOption::Default(_) => column.has_default_value = true,
            ColumnOption::Comment(text) => column.comment = text.clone(),
            ColumnOption::Unique { is_primary: true, .. } => {
                constraint.append_primary_key(&column.name, &key);
            }
            ColumnOption::Unique { is_primary: false, .. } => {
                constraint.append_unique_key(&column.name, &key);
            }
            ColumnOption::DialectSpecific(tokens) => {
                if tokens
                    .iter()
                    .any(|t| t.to_string().eq_ignore_ascii_case("AUTO_INCREMENT"))
                {
                    column.auto_increment = true;
                }
            }
            _ => {}
        }
    }

    Ok((column, constraint))
}

/// Fold a table-level constraint; kinds other than keys and indexes are skipped
pub fn extract_constraint(constraint: &TableConstraint) -> Option<Constraint> {
    let mut ret = Constraint::new();
    match constraint {
        TableConstraint::PrimaryKey {
            name,
            index_name,
            columns,
            ..
        } => {
            let columns = column_set(columns);
            let key = constraint_name(index_name, name);
            let key = if key.is_empty() { PRIMARY.to_string() } else { key };
            ret.append_primary_key(&key, &columns);
        }
        TableConstraint::Unique {
            name,
            index_name,
            columns,
            ..
        } => {
            let columns = column_set(columns);
            ret.append_unique_key(&constraint_name(index_name, name), &columns);
        }
        TableConstraint::Index { name, columns, .. } => {
            let columns = column_set(columns);
            ret.append_index(&constraint_name(name, &None), &columns);
        }
        _ => return None,
    }

    if ret.is_empty() {
        None
    } else {
        Some(ret)
    }
}

fn constraint_name(primary: &Option<Ident>, fallback: &Option<Ident>) -> String {
    primary
        .as_ref()
        .or(fallback.as_ref())
        .map(|i| i.value.clone())
        .unwrap_or_default()
}

/// Key columns in first-seen order, duplicates dropped
fn column_set(columns: &[Ident]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for ident in columns {
        if !out.contains(&ident.value) {
            out.push(ident.value.clone());
        }
    }
    out
}

/// Split a rendered data type such as `BIGINT(20) UNSIGNED` into its type code and signedness
pub fn parse_data_type(text: &str) -> Result<(ColumnType, bool)> {
    let bare = strip_parenthesized(text);
    let words: Vec<&str> = bare.split_whitespace().collect();
    let unsigned = words.iter().any(|w| w.eq_ignore_ascii_case("UNSIGNED"));

    let base = words
        .iter()
        .filter(|w| {
            !["UNSIGNED", "SIGNED", "ZEROFILL"]
                .iter()
                .any(|m| w.eq_ignore_ascii_case(m))
        })
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let tp = ColumnType::from_name(&base)
        .or_else(|| {
            base.split_whitespace()
                .next()
                .and_then(ColumnType::from_name)
        })
        .ok_or_else(|| SqlGenError::UnsupportedType {
            tp: base.to_ascii_lowercase(),
        })?;
    Ok((tp, unsigned))
}

/// Drop `(...)` groups, e.g. lengths and enum members
fn strip_parenthesized(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '(' => {
                depth += 1;
                out.push(' ');
            }
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}
