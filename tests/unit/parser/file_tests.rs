//! SQL file reading and multi-file parsing tests

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sqlgen::parser::{parse_sql_file, parse_sql_files};
use sqlgen::{SqlGenError, SqlParser};
use tempfile::TempDir;

use super::create_sql_file;

#[test]
fn test_parse_single_file() {
    let file = create_sql_file(
        "CREATE TABLE user (id BIGINT PRIMARY KEY);\n-- fn: FindOne\nSELECT * FROM user WHERE id = ? LIMIT 1;\n",
    );
    let result = parse_sql_file(&SqlParser::new(), file.path());
    assert!(result.is_ok(), "Failed to parse: {:?}", result.err());

    let dxl = result.unwrap();
    assert_eq!(dxl.ddl.len(), 1);
    assert_eq!(dxl.dml.len(), 1);
    assert_eq!(dxl.dml[0].comment().func_name, "FindOne");
}

#[test]
fn test_parse_error_names_file() {
    let file = create_sql_file("SELECT * FROM a JOIN b ON a.id = b.id;");
    let err = parse_sql_file(&SqlParser::new(), file.path()).unwrap_err();
    assert!(
        format!("{:#}", err).contains("multiple table"),
        "Error chain should carry the cause: {:#}",
        err
    );
    let cause = err.downcast_ref::<SqlGenError>().expect("typed cause");
    assert!(matches!(cause.root(), SqlGenError::MultipleTable));
}

#[test]
fn test_files_concatenate_in_order() {
    let dir = TempDir::new().unwrap();
    let mut files: Vec<PathBuf> = Vec::new();
    // Enough files to take the parallel path
    for i in 0..10 {
        let path = dir.path().join(format!("t{:02}.sql", i));
        std::fs::write(
            &path,
            format!("CREATE TABLE t{i} (id INT);\nDELETE FROM t{i} WHERE id = ?;", i = i),
        )
        .unwrap();
        files.push(path);
    }

    let dxl = parse_sql_files(&SqlParser::new(), &files).unwrap();
    let tables: Vec<_> = dxl.ddl.iter().map(|d| d.table.name.clone()).collect();
    let expected: Vec<_> = (0..10).map(|i| format!("t{}", i)).collect();
    assert_eq!(tables, expected);
    assert_eq!(dxl.dml.len(), 10);
    assert_eq!(dxl.dml[3].table(), Some("t3"));
}

#[test]
fn test_duplicate_table_across_files_rejected() {
    let a = create_sql_file("CREATE TABLE user (id INT);");
    let b = create_sql_file("CREATE TABLE user (id INT);");
    let files = vec![a.path().to_path_buf(), b.path().to_path_buf()];
    let err = parse_sql_files(&SqlParser::new(), &files).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SqlGenError>(),
        Some(SqlGenError::InvalidModel { .. })
    ));
}
