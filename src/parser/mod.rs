//! MySQL parsing: statement splitting, model extraction and schema loading

mod ddl;
mod dml;
mod engine;
mod expr;
mod files;
mod infoschema;
mod splitter;

pub use ddl::{extract_column, extract_constraint, extract_ddl, parse_data_type};
pub use dml::{extract_dml, extract_transaction};
pub use engine::{parse, SqlParser, StatementNode};
pub use expr::extract_clause;
pub use files::{collect_sql_files, parse_sql_file, parse_sql_files, read_sql_file, split_patterns};
pub use infoschema::{
    convert_ddl, from_schema, generate_init_sql, match_patterns, parse_dsn, InfoSchemaColumn,
    InfoSchemaIndex, InfoSchemaTable, SchemaProvider,
};
pub use splitter::{split_units, TransactionUnit, Unit};
