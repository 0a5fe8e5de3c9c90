//! INSERT / SELECT / UPDATE / DELETE and transaction extraction

use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_relations, Delete, FromTable, Insert, ObjectName, Query, SetExpr, Statement,
    TableFactor, TableWithJoins,
};

use super::engine::StatementNode;
use super::expr::{
    extract_clause, extract_group_by, extract_limit, extract_order_by, extract_projection,
};
use super::splitter::TransactionUnit;
use crate::error::{Result, SqlGenError};
use crate::model::{
    Clause, DeleteStmt, Dml, InsertStmt, SelectStmt, Transaction, UpdateStmt,
};
use crate::util::last_name_part;

/// Extract a single query; failures carry the statement text
pub fn extract_dml(node: &StatementNode) -> Result<Dml> {
    extract(node).map_err(|e| e.near(&node.text))
}

fn extract(node: &StatementNode) -> Result<Dml> {
    match &node.statement {
        Statement::Insert(insert) => extract_insert(node, insert),
        Statement::Query(query) => extract_select(node, query),
        Statement::Update {
            table,
            assignments,
            from,
            selection,
            ..
        } => {
            if from.is_some() {
                return Err(SqlGenError::MultipleTable);
            }
            let table_name = single_table(std::slice::from_ref(table))?;
            let columns = assignments
                .iter()
                .map(|a| last_name_part(&a.target.to_string()))
                .collect();
            Ok(Dml::Update(UpdateStmt {
                comment: node.comment.clone(),
                sql: node.text.clone(),
                where_clause: where_clause(selection.as_ref(), &table_name)?,
                table: table_name,
                columns,
                order_by: extract_order_by(&node.order_by)?,
                limit: extract_limit(node.limit.as_ref(), None)?,
            }))
        }
        Statement::Delete(delete) => extract_delete(node, delete),
        _ => Err(SqlGenError::UnsupportedStatement {
            near: node.text.clone(),
        }),
    }
}

fn extract_insert(node: &StatementNode, insert: &Insert) -> Result<Dml> {
    if let Some(source) = &insert.source {
        if !matches!(source.body.as_ref(), SetExpr::Values(_)) {
            return Err(SqlGenError::UnsupportedNestedQuery);
        }
    }

    let table = first_relation(&node.statement).ok_or(SqlGenError::MissingTable)?;
    Ok(Dml::Insert(InsertStmt {
        comment: node.comment.clone(),
        sql: node.text.clone(),
        table: last_name_part(&table.to_string()),
        columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
    }))
}

fn first_relation(statement: &Statement) -> Option<ObjectName> {
    match visit_relations(statement, |name| ControlFlow::Break(name.clone())) {
        ControlFlow::Break(name) => Some(name),
        ControlFlow::Continue(()) => None,
    }
}

fn extract_select(node: &StatementNode, query: &Query) -> Result<Dml> {
    if query.with.is_some() {
        return Err(SqlGenError::UnsupportedNestedQuery);
    }
    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select,
        _ => return Err(SqlGenError::UnsupportedNestedQuery),
    };

    let table = single_table(&select.from)?;
    let order_by = match &query.order_by {
        Some(order_by) => extract_order_by(&order_by.exprs)?,
        None => Vec::new(),
    };

    Ok(Dml::Select(SelectStmt {
        comment: node.comment.clone(),
        sql: node.text.clone(),
        distinct: select.distinct.is_some(),
        columns: extract_projection(&select.projection)?,
        where_clause: where_clause(select.selection.as_ref(), &table)?,
        group_by: extract_group_by(&select.group_by)?,
        having: where_clause(select.having.as_ref(), &table)?,
        order_by,
        limit: extract_limit(query.limit.as_ref(), query.offset.as_ref())?,
        from: table,
    }))
}

fn extract_delete(node: &StatementNode, delete: &Delete) -> Result<Dml> {
    if !delete.tables.is_empty() || delete.using.is_some() {
        return Err(SqlGenError::MultipleTable);
    }
    let from = match &delete.from {
        FromTable::WithFromKeyword(from) | FromTable::WithoutKeyword(from) => from,
    };
    let table = single_table(from)?;

    Ok(Dml::Delete(DeleteStmt {
        comment: node.comment.clone(),
        sql: node.text.clone(),
        where_clause: where_clause(delete.selection.as_ref(), &table)?,
        order_by: extract_order_by(&delete.order_by)?,
        limit: extract_limit(delete.limit.as_ref(), None)?,
        from: table,
    }))
}

fn where_clause(expr: Option<&sqlparser::ast::Expr>, table: &str) -> Result<Clause> {
    match expr {
        Some(expr) => extract_clause(expr, table),
        None => Ok(Clause::Empty),
    }
}

/// Resolve the only table of a FROM list; joins and derived tables are rejected
fn single_table(from: &[TableWithJoins]) -> Result<String> {
    let item = match from {
        [] => return Err(SqlGenError::MissingTable),
        [item] => item,
        _ => return Err(SqlGenError::MultipleTable),
    };
    if !item.joins.is_empty() {
        return Err(SqlGenError::MultipleTable);
    }
    match &item.relation {
        TableFactor::Table { name, .. } => {
            let table = last_name_part(&name.to_string());
            if table.is_empty() {
                Err(SqlGenError::MissingTable)
            } else {
                Ok(table)
            }
        }
        TableFactor::Derived { .. } => Err(SqlGenError::UnsupportedNestedQuery),
        _ => Err(SqlGenError::MissingTable),
    }
}

/// Assemble a transaction from its begin, queries and commit
pub fn extract_transaction(unit: &TransactionUnit) -> Result<Dml> {
    let mut lines = vec![unit.begin.text.clone()];
    let mut statements = Vec::with_capacity(unit.queries.len());
    for node in unit.query_nodes() {
        statements.push(extract_dml(node)?);
        lines.push(node.text.clone());
    }
    let commit = unit
        .commit
        .as_ref()
        .ok_or(SqlGenError::MissingCommit)?;
    lines.push(commit.text.clone());

    Ok(Dml::Transaction(Transaction {
        comment: unit.begin.comment.clone(),
        sql: lines.join("\n"),
        statements,
    }))
}
