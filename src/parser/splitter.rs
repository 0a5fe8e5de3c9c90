//! Grouping of statements into table definitions, queries and transactions

use sqlparser::ast::Statement;

use super::engine::StatementNode;
use crate::error::{Result, SqlGenError};

/// A unit of work for the extractors
#[derive(Debug, Clone)]
pub enum Unit {
    CreateTable(StatementNode),
    Query(StatementNode),
    Transaction(TransactionUnit),
}

/// Statements between BEGIN and COMMIT
#[derive(Debug, Clone)]
pub struct TransactionUnit {
    pub begin: StatementNode,
    /// Queries, plus a placeholder unit for any BEGIN seen while already open
    pub queries: Vec<Unit>,
    pub commit: Option<StatementNode>,
}

impl TransactionUnit {
    fn new(begin: StatementNode) -> Self {
        Self {
            begin,
            queries: Vec::new(),
            commit: None,
        }
    }

    pub fn has_nested_transaction(&self) -> bool {
        self.queries
            .iter()
            .any(|q| matches!(q, Unit::Transaction(_)))
    }

    /// Query statements in order, skipping nested placeholders
    pub fn query_nodes(&self) -> impl Iterator<Item = &StatementNode> {
        self.queries.iter().filter_map(|q| match q {
            Unit::Query(node) => Some(node),
            _ => None,
        })
    }
}

/// Split statements in one pass, tracking whether a transaction is open.
///
/// A BEGIN inside an open transaction is recorded rather than rejected; the
/// nesting is reported when the transaction is assembled.
pub fn split_units(nodes: Vec<StatementNode>) -> Result<Vec<Unit>> {
    let mut units: Vec<Unit> = Vec::with_capacity(nodes.len());
    let mut in_transaction = false;

    for node in nodes {
        match &node.statement {
            Statement::CreateTable(_) => {
                if in_transaction {
                    return Err(SqlGenError::MissingBegin { near: node.text });
                }
                units.push(Unit::CreateTable(node));
            }
            Statement::Insert(_)
            | Statement::Query(_)
            | Statement::Update { .. }
            | Statement::Delete(_) => {
                if in_transaction {
                    current_transaction(&mut units)?
                        .queries
                        .push(Unit::Query(node));
                } else {
                    units.push(Unit::Query(node));
                }
            }
            Statement::StartTransaction { .. } => {
                if in_transaction {
                    current_transaction(&mut units)?
                        .queries
                        .push(Unit::Transaction(TransactionUnit::new(node)));
                } else {
                    in_transaction = true;
                    units.push(Unit::Transaction(TransactionUnit::new(node)));
                }
            }
            Statement::Commit { .. } => {
                if !in_transaction {
                    return Err(SqlGenError::MissingBegin { near: node.text });
                }
                current_transaction(&mut units)?.commit = Some(node);
                in_transaction = false;
            }
            _ => return Err(SqlGenError::UnsupportedStatement { near: node.text }),
        }
    }

    if in_transaction {
        return Err(SqlGenError::MissingCommit);
    }
    Ok(units)
}

fn current_transaction(units: &mut [Unit]) -> Result<&mut TransactionUnit> {
    match units.last_mut() {
        Some(Unit::Transaction(transaction)) => Ok(transaction),
        _ => Err(SqlGenError::MissingTransaction),
    }
}
