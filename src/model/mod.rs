//! Intermediate model: tables, statements, clauses and type mapping

mod clause;
mod dml;
mod dxl;
mod table;
mod types;

pub use clause::{Clause, CompareOp, Comparison, LogicalOp, Marshaled};
pub use dml::{
    Action, AggregateFunc, ByItem, Comment, DeleteStmt, Dml, InsertStmt, Limit, LimitValue,
    SelectField, SelectStmt, Transaction, UpdateStmt,
};
pub use dxl::{Context, Dxl};
pub use table::{Column, Constraint, Ddl, KeyMap, Table};
pub use types::{lookup, ColumnType, Dependency, Parameter, TargetType, TypeKey};
