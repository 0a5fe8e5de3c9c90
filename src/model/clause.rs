//! WHERE / HAVING expression trees and bind-parameter derivation
//!
//! A [`Clause`] is marshaled into a SQL fragment and the ordered list of
//! parameters its `?` placeholders bind to. The parameter structure, the
//! third-party imports and the positional argument list are all views over a
//! single [`Marshaled`] value, so they always agree with each other.

use std::collections::HashMap;

use super::dml::AggregateFunc;
use super::table::{Column, Table};
use super::types::{ColumnType, Parameter};
use crate::error::{Result, SqlGenError};
use crate::util::{to_camel_case, to_delimited};

/// AND / OR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn text(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// Operator of a leaf comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ge,
    Gt,
    Le,
    Lt,
    Like,
    Ne,
    /// `NOT (col = ?)`, rendered as `col != ?`
    Not,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
}

impl CompareOp {
    /// SQL text of the operator
    pub fn text(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Lt => "<",
            CompareOp::Like => "LIKE",
            CompareOp::Ne => "<>",
            CompareOp::Not => "!=",
            CompareOp::NotLike => "NOT LIKE",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Between => "BETWEEN",
            CompareOp::NotBetween => "NOT BETWEEN",
        }
    }

    /// Suffix appended to the column name to build the parameter name
    pub fn short_name(self) -> &'static str {
        match self {
            CompareOp::Eq => "EQ",
            CompareOp::Ge => "GE",
            CompareOp::Gt => "GT",
            CompareOp::Le => "LE",
            CompareOp::Lt => "LT",
            CompareOp::Like => "Like",
            CompareOp::Ne => "NE",
            CompareOp::Not => "Not",
            CompareOp::NotLike => "NotLike",
            CompareOp::In => "In",
            CompareOp::NotIn => "NotIn",
            CompareOp::Between => "Between",
            CompareOp::NotBetween => "NotBetween",
        }
    }
}

/// A leaf comparison against a single placeholder (or pair, for BETWEEN)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Left-hand side as written in SQL, e.g. `age` or `COUNT(id)`
    pub column: String,
    /// Base name used for the derived parameters
    pub name: String,
    pub op: CompareOp,
    /// Aggregate applied to the column, HAVING only
    pub aggregate: Option<AggregateFunc>,
    /// Metadata of the referenced column, filled in by [`Clause::bind`]
    pub column_info: Column,
    /// Table the column belongs to
    pub table: String,
}

impl Comparison {
    pub fn new(column: impl Into<String>, op: CompareOp, table: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            column_info: Column::new(column.clone(), ColumnType::Unspecified),
            column,
            op,
            aggregate: None,
            table: table.into(),
        }
    }

    /// Build a comparison on an aggregate call such as `COUNT(id) > ?`.
    ///
    /// `distinct` renders `COUNT(DISTINCT id)` and is ignored without an argument.
    pub fn aggregate(
        func: AggregateFunc,
        argument: Option<String>,
        distinct: bool,
        op: CompareOp,
        table: impl Into<String>,
    ) -> Self {
        let distinct = distinct && argument.is_some();
        let modifier = if distinct { "DISTINCT " } else { "" };
        let arg_text = argument.clone().unwrap_or_else(|| "*".to_string());
        let column = format!("{}({}{})", func.sql_name(), modifier, arg_text);
        let prefix = func.sql_name().to_ascii_lowercase();
        let name = match &argument {
            Some(arg) if distinct => format!("{}Distinct{}", prefix, to_camel_case(arg)),
            Some(arg) => format!("{}{}", prefix, to_camel_case(arg)),
            None => prefix,
        };
        let info_name = argument.unwrap_or_default();
        Self {
            column,
            name,
            op,
            aggregate: Some(func),
            column_info: Column::new(info_name, ColumnType::Unspecified),
            table: table.into(),
        }
    }

    fn marshal(&self) -> Result<(String, Vec<Parameter>)> {
        let p = self.column_info.data_type()?;
        let op = self.op;
        match op {
            CompareOp::In | CompareOp::NotIn => Ok((
                format!("{} {} (?)", self.column, op.text()),
                vec![Parameter::new(
                    format!("{}{}", self.name, op.short_name()),
                    format!("[]{}", p.target),
                    p.dependency,
                )],
            )),
            CompareOp::Between | CompareOp::NotBetween => Ok((
                format!("{} {} ? AND ?", self.column, op.text()),
                vec![
                    Parameter::new(
                        format!("{}{}Start", self.name, op.short_name()),
                        p.target.clone(),
                        p.dependency,
                    ),
                    Parameter::new(
                        format!("{}{}End", self.name, op.short_name()),
                        p.target,
                        p.dependency,
                    ),
                ],
            )),
            _ => Ok((
                format!("{} {} ?", self.column, op.text()),
                vec![Parameter::new(
                    format!("{}{}", self.name, op.short_name()),
                    p.target,
                    p.dependency,
                )],
            )),
        }
    }

    fn bind(&self, table: &Table) -> Result<Comparison> {
        let mut bound = self.clone();
        let found = if self.column_info.name.is_empty() {
            // COUNT(*)
            None
        } else {
            Some(table.column(&self.column_info.name).ok_or_else(|| {
                SqlGenError::MissingColumn {
                    table: table.name.clone(),
                    column: self.column_info.name.clone(),
                }
            })?)
        };

        bound.column_info = match (self.aggregate, found) {
            (Some(func), arg) => func.result_column(&self.name, arg),
            (None, Some(column)) => column.clone(),
            (None, None) => {
                return Err(SqlGenError::MissingColumn {
                    table: table.name.clone(),
                    column: self.column.clone(),
                })
            }
        };
        bound.table = table.name.clone();
        Ok(bound)
    }
}

/// A WHERE / HAVING condition tree
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Clause {
    /// No condition
    #[default]
    Empty,
    Comparison(Comparison),
    Logical {
        op: LogicalOp,
        left: Box<Clause>,
        right: Box<Clause>,
    },
    Parentheses(Box<Clause>),
    /// Constant predicate kept verbatim, e.g. `deleted_at IS NULL`
    Raw(String),
}

impl Clause {
    pub fn and(left: Clause, right: Clause) -> Self {
        Clause::Logical {
            op: LogicalOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Clause, right: Clause) -> Self {
        Clause::Logical {
            op: LogicalOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn parentheses(inner: Clause) -> Self {
        Clause::Parentheses(Box::new(inner))
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Clause::Empty)
    }

    /// Leaf comparisons in left-to-right order
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Clause::Comparison(c) => out.push(c),
            Clause::Logical { left, right, .. } => {
                left.collect_comparisons(out);
                right.collect_comparisons(out);
            }
            Clause::Parentheses(inner) => inner.collect_comparisons(out),
            Clause::Empty | Clause::Raw(_) => {}
        }
    }

    /// Resolve every leaf against the columns of `table`
    pub fn bind(&self, table: &Table) -> Result<Clause> {
        Ok(match self {
            Clause::Empty => Clause::Empty,
            Clause::Raw(text) => Clause::Raw(text.clone()),
            Clause::Comparison(c) => Clause::Comparison(c.bind(table)?),
            Clause::Logical { op, left, right } => Clause::Logical {
                op: *op,
                left: Box::new(left.bind(table)?),
                right: Box::new(right.bind(table)?),
            },
            Clause::Parentheses(inner) => Clause::Parentheses(Box::new(inner.bind(table)?)),
        })
    }

    /// Render the SQL fragment and the parameters in placeholder order.
    ///
    /// Parameter names that repeat (e.g. `id = ? OR id = ?`) get a numeric
    /// suffix so every placeholder keeps its own field.
    pub fn marshal(&self) -> Result<Marshaled> {
        let (sql, mut parameters) = self.marshal_parts()?;

        let mut seen: HashMap<String, usize> = HashMap::new();
        for p in parameters.iter_mut() {
            let count = seen.entry(p.name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                p.name = format!("{}{}", p.name, count);
            }
        }

        Ok(Marshaled { sql, parameters })
    }

    fn marshal_parts(&self) -> Result<(String, Vec<Parameter>)> {
        match self {
            Clause::Empty => Ok((String::new(), Vec::new())),
            Clause::Raw(text) => Ok((text.clone(), Vec::new())),
            Clause::Comparison(c) => c.marshal(),
            Clause::Logical { op, left, right } => {
                let (left_sql, left_params) = left.marshal_parts()?;
                let (right_sql, right_params) = right.marshal_parts()?;

                let mut parts = Vec::with_capacity(2);
                let mut parameters = Vec::with_capacity(left_params.len() + right_params.len());
                if !left_sql.is_empty() {
                    parts.push(left_sql);
                    parameters.extend(left_params);
                }
                if !right_sql.is_empty() {
                    parts.push(right_sql);
                    parameters.extend(right_params);
                }
                let sep = format!(" {} ", op.text());
                Ok((parts.join(&sep), parameters))
            }
            Clause::Parentheses(inner) => {
                let (sql, parameters) = inner.marshal_parts()?;
                if sql.is_empty() {
                    Ok((sql, parameters))
                } else {
                    Ok((format!("({})", sql), parameters))
                }
            }
        }
    }

    /// Backquoted SQL fragment, empty for an empty clause
    pub fn sql(&self) -> Result<String> {
        Ok(self.marshal()?.sql_literal())
    }

    /// Name of the generated parameter structure
    pub fn parameter_structure_name(&self, func_name: &str, identifier: &str) -> String {
        if !self.is_valid() {
            return String::new();
        }
        structure_name(func_name, identifier)
    }

    pub fn parameter_structure(&self, func_name: &str, identifier: &str) -> Result<String> {
        if !self.is_valid() {
            return Ok(String::new());
        }
        Ok(self.marshal()?.parameter_structure(func_name, identifier))
    }

    pub fn parameter_third_imports(&self) -> Result<String> {
        if !self.is_valid() {
            return Ok(String::new());
        }
        Ok(self.marshal()?.third_imports())
    }

    pub fn parameters(&self, pkg: &str) -> Result<String> {
        if !self.is_valid() {
            return Ok(String::new());
        }
        Ok(self.marshal()?.arguments(pkg))
    }
}

fn structure_name(func_name: &str, identifier: &str) -> String {
    to_camel_case(&format!("{}{}Parameter", func_name, identifier))
}

/// Result of one marshal pass over a clause
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marshaled {
    pub sql: String,
    pub parameters: Vec<Parameter>,
}

impl Marshaled {
    /// The fragment as a Go raw string literal
    pub fn sql_literal(&self) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!("`{}`", self.sql)
        }
    }

    /// Go struct declaration holding one field per parameter
    pub fn parameter_structure(&self, func_name: &str, identifier: &str) -> String {
        let name = structure_name(func_name, identifier);
        let mut lines = Vec::with_capacity(self.parameters.len() + 3);
        lines.push(format!(
            "// {} is a {} parameter structure.",
            name,
            to_delimited(identifier, ' ')
        ));
        lines.push(format!("type {} struct {{", name));
        for p in &self.parameters {
            lines.push(format!("{} {}", p.field_name(), p.target));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Third-party import paths, first-seen order, one per line
    pub fn third_imports(&self) -> String {
        let mut imports: Vec<&str> = Vec::new();
        for p in &self.parameters {
            if let Some(dep) = p.dependency {
                let path = dep.import_path();
                if !imports.contains(&path) {
                    imports.push(path);
                }
            }
        }
        imports.join("\n")
    }

    /// Positional arguments referencing fields of `pkg`, e.g. `req.IdEQ, req.AgeGE`
    pub fn arguments(&self, pkg: &str) -> String {
        self.parameters
            .iter()
            .map(|p| format!("{}.{}", pkg, p.field_name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
