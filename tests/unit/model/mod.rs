//! Unit tests for the generation model
//!
//! These tests build model values directly, without going through the parser.

use sqlgen::model::{Column, ColumnType, Constraint, Ddl, Table};

mod context_tests;

/// Helper to build a column with the given type and signedness
pub fn column(name: &str, tp: ColumnType, unsigned: bool) -> Column {
    let mut column = Column::new(name, tp);
    column.unsigned = unsigned;
    column.not_null = true;
    column
}

/// `order (id bigint unsigned pk, user_id int, status tinyint, price decimal)`
pub fn order_table() -> Table {
    let mut constraint = Constraint::new();
    constraint.append_primary_key("PRIMARY", &["id".to_string()]);
    constraint.append_index("idx_user", &["user_id".to_string(), "status".to_string()]);
    Table {
        name: "order".to_string(),
        schema: String::new(),
        columns: vec![
            column("id", ColumnType::LongLong, true),
            column("user_id", ColumnType::Long, false),
            column("status", ColumnType::Tiny, false),
            column("price", ColumnType::NewDecimal, false),
        ],
        constraint,
    }
}

pub fn order_ddl() -> Ddl {
    Ddl {
        table: order_table(),
    }
}
