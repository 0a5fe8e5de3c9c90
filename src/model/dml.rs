//! Data-manipulation statement model

use super::clause::Clause;
use super::dxl::Dxl;
use super::table::{Column, Table};
use super::types::{ColumnType, Parameter};
use crate::error::{Result, SqlGenError};

/// Kind of data access a statement performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Transaction,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Transaction => "transaction",
        }
    }
}

/// Leading comment of a statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Comment text as written, markers included
    pub origin_text: String,
    /// Comment lines with markers stripped
    pub lines: Vec<String>,
    /// Method name from a `fn: Name` line
    pub func_name: String,
}

impl Comment {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Aggregate functions recognized in projections and HAVING
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateFunc {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunc::Count),
            "SUM" => Some(AggregateFunc::Sum),
            "AVG" => Some(AggregateFunc::Avg),
            "MAX" => Some(AggregateFunc::Max),
            "MIN" => Some(AggregateFunc::Min),
            _ => None,
        }
    }

    pub fn sql_name(self) -> &'static str {
        match self {
            AggregateFunc::Count => "COUNT",
            AggregateFunc::Sum => "SUM",
            AggregateFunc::Avg => "AVG",
            AggregateFunc::Max => "MAX",
            AggregateFunc::Min => "MIN",
        }
    }

    /// Column describing the aggregate's result, typed in aggregate context
    pub fn result_column(self, name: &str, argument: Option<&Column>) -> Column {
        let mut column = match (self, argument) {
            (AggregateFunc::Count, _) | (_, None) => Column::new(name, ColumnType::NullLongLong),
            (AggregateFunc::Sum | AggregateFunc::Avg, Some(arg))
                if arg.tp == ColumnType::NewDecimal =>
            {
                Column::new(name, ColumnType::NullDecimal)
            }
            (_, Some(arg)) => Column {
                name: name.to_string(),
                ..arg.clone()
            },
        };
        column.aggregate_call = true;
        column
    }
}

/// One item of a SELECT projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectField {
    /// `*`
    Wildcard,
    Column {
        name: String,
        alias: Option<String>,
    },
    Aggregate {
        func: AggregateFunc,
        /// Argument column, `None` for `COUNT(*)`
        argument: Option<String>,
        distinct: bool,
        alias: Option<String>,
    },
}

/// One ORDER BY item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByItem {
    pub column: String,
    pub desc: bool,
}

/// A LIMIT or OFFSET value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitValue {
    Count(u64),
    Placeholder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: LimitValue,
    pub offset: Option<LimitValue>,
}

impl Limit {
    /// Parameters for placeholder values, offset first to match `LIMIT ?, ?`
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut out = Vec::new();
        if let Some(LimitValue::Placeholder) = self.offset {
            out.push(Parameter::new("offset", "int", None));
        }
        if self.count == LimitValue::Placeholder {
            out.push(Parameter::new("limit", "int", None));
        }
        out
    }

    /// Whether the limit is the literal `1`
    pub fn is_one(&self) -> bool {
        self.count == LimitValue::Count(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStmt {
    pub comment: Comment,
    pub sql: String,
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt {
    pub comment: Comment,
    pub sql: String,
    pub from: String,
    pub distinct: bool,
    pub columns: Vec<SelectField>,
    pub where_clause: Clause,
    pub group_by: Vec<String>,
    pub having: Clause,
    pub order_by: Vec<ByItem>,
    pub limit: Option<Limit>,
}

impl SelectStmt {
    /// Result columns typed against `table`; aggregates use the nullable forms
    pub fn result_columns(&self, table: &Table) -> Result<Vec<Column>> {
        let mut out = Vec::new();
        for field in &self.columns {
            match field {
                SelectField::Wildcard => out.extend(table.columns.iter().cloned()),
                SelectField::Column { name, alias } => {
                    let column = lookup_column(table, name)?;
                    out.push(Column {
                        name: alias.clone().unwrap_or_else(|| column.name.clone()),
                        ..column.clone()
                    });
                }
                SelectField::Aggregate {
                    func,
                    argument,
                    distinct,
                    alias,
                } => {
                    let arg = match argument {
                        Some(name) => Some(lookup_column(table, name)?),
                        None => None,
                    };
                    let prefix = func.sql_name().to_ascii_lowercase();
                    let name = alias.clone().unwrap_or_else(|| match argument {
                        Some(a) if *distinct => format!("{}_distinct_{}", prefix, a),
                        Some(a) => format!("{}_{}", prefix, a),
                        None => prefix,
                    });
                    out.push(func.result_column(&name, arg));
                }
            }
        }
        Ok(out)
    }
}

fn lookup_column<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table.column(name).ok_or_else(|| SqlGenError::MissingColumn {
        table: table.name.clone(),
        column: name.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStmt {
    pub comment: Comment,
    pub sql: String,
    pub table: String,
    /// Assigned columns in SET order
    pub columns: Vec<String>,
    pub where_clause: Clause,
    pub order_by: Vec<ByItem>,
    pub limit: Option<Limit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStmt {
    pub comment: Comment,
    pub sql: String,
    pub from: String,
    pub where_clause: Clause,
    pub order_by: Vec<ByItem>,
    pub limit: Option<Limit>,
}

/// BEGIN ... COMMIT grouping of statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub comment: Comment,
    /// Begin SQL, each statement's SQL and commit SQL, one per line
    pub sql: String,
    pub statements: Vec<Dml>,
}

/// A data-manipulation statement or a transaction of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dml {
    Insert(InsertStmt),
    Select(SelectStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    Transaction(Transaction),
}

impl Dml {
    pub fn sql_text(&self) -> &str {
        match self {
            Dml::Insert(s) => &s.sql,
            Dml::Select(s) => &s.sql,
            Dml::Update(s) => &s.sql,
            Dml::Delete(s) => &s.sql,
            Dml::Transaction(t) => &t.sql,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Dml::Insert(_) => Action::Create,
            Dml::Select(_) => Action::Read,
            Dml::Update(_) => Action::Update,
            Dml::Delete(_) => Action::Delete,
            Dml::Transaction(_) => Action::Transaction,
        }
    }

    pub fn comment(&self) -> &Comment {
        match self {
            Dml::Insert(s) => &s.comment,
            Dml::Select(s) => &s.comment,
            Dml::Update(s) => &s.comment,
            Dml::Delete(s) => &s.comment,
            Dml::Transaction(t) => &t.comment,
        }
    }

    /// Referenced table; a transaction reports its first statement's table
    pub fn table(&self) -> Option<&str> {
        match self {
            Dml::Insert(s) => Some(&s.table),
            Dml::Select(s) => Some(&s.from),
            Dml::Update(s) => Some(&s.table),
            Dml::Delete(s) => Some(&s.from),
            Dml::Transaction(t) => t.statements.first().and_then(|s| s.table()),
        }
    }

    /// Clause of the WHERE condition, if the statement has one
    pub fn where_clause(&self) -> Option<&Clause> {
        match self {
            Dml::Select(s) => Some(&s.where_clause),
            Dml::Update(s) => Some(&s.where_clause),
            Dml::Delete(s) => Some(&s.where_clause),
            Dml::Insert(_) | Dml::Transaction(_) => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sql_text().is_empty() {
            return Err(SqlGenError::InvalidModel {
                message: format!("empty sql for {} statement", self.action().name()),
            });
        }

        match self {
            Dml::Transaction(t) => {
                if t.statements.is_empty() {
                    return Err(SqlGenError::MissingTransaction);
                }
                for stmt in &t.statements {
                    if matches!(stmt, Dml::Transaction(_)) {
                        return Err(SqlGenError::UnsupportedNestedTransaction);
                    }
                    stmt.validate()?;
                }
                Ok(())
            }
            _ => match self.table() {
                Some(table) if !table.is_empty() => Ok(()),
                _ => Err(SqlGenError::MissingTable.near(self.sql_text())),
            },
        }
    }

    /// Resolve WHERE / HAVING leaves against the tables defined in `dxl`.
    ///
    /// Each statement of a transaction binds to its own table.
    pub fn bind(&self, dxl: &Dxl) -> Result<Dml> {
        if let Dml::Transaction(t) = self {
            let statements = t
                .statements
                .iter()
                .map(|s| {
                    let bound = match s {
                        Dml::Transaction(_) => Err(SqlGenError::UnsupportedNestedTransaction),
                        _ => s.bind(dxl),
                    };
                    bound.map_err(|e| e.near(s.sql_text()))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Dml::Transaction(Transaction {
                statements,
                ..t.clone()
            }));
        }

        let name = self.table().unwrap_or_default();
        let table = dxl
            .table(name)
            .ok_or_else(|| SqlGenError::MissingTableDefinition {
                table: name.to_string(),
            })?;
        self.bind_table(table)
    }

    fn bind_table(&self, table: &Table) -> Result<Dml> {
        let bound = match self {
            Dml::Insert(s) => {
                for column in &s.columns {
                    lookup_column(table, column)?;
                }
                Dml::Insert(s.clone())
            }
            Dml::Select(s) => Dml::Select(SelectStmt {
                where_clause: s.where_clause.bind(table)?,
                having: s.having.bind(table)?,
                ..s.clone()
            }),
            Dml::Update(s) => {
                for column in &s.columns {
                    lookup_column(table, column)?;
                }
                Dml::Update(UpdateStmt {
                    where_clause: s.where_clause.bind(table)?,
                    ..s.clone()
                })
            }
            Dml::Delete(s) => Dml::Delete(DeleteStmt {
                where_clause: s.where_clause.bind(table)?,
                ..s.clone()
            }),
            Dml::Transaction(_) => return Err(SqlGenError::UnsupportedNestedTransaction),
        };
        Ok(bound)
    }
}
