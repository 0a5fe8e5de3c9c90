//! Unit tests for the MySQL parser
//!
//! The tests are organized into the following modules:
//! - splitter_tests: statement splitting and transaction grouping
//! - table_tests: CREATE TABLE extraction
//! - query_tests: INSERT / SELECT / UPDATE / DELETE extraction
//! - file_tests: file discovery and multi-file parsing
//! - infoschema_tests: schema provider path and generated statements

use std::io::Write;

use tempfile::NamedTempFile;

mod file_tests;
mod query_tests;
mod table_tests;

/// Helper to create a temp SQL file with content
pub fn create_sql_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".sql").unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Parse SQL text with a fresh engine, panicking with the error on failure
pub fn parse_ok(sql: &str) -> sqlgen::Dxl {
    let result = sqlgen::SqlParser::new().parse(sql);
    assert!(result.is_ok(), "Failed to parse: {:?}", result.err());
    result.unwrap()
}

/// Parse SQL text expecting failure, returning the error
pub fn parse_err(sql: &str) -> sqlgen::SqlGenError {
    match sqlgen::SqlParser::new().parse(sql) {
        Ok(dxl) => panic!("Expected parse failure, got {:?}", dxl),
        Err(e) => e,
    }
}
