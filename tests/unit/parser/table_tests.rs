//! CREATE TABLE extraction tests

use pretty_assertions::assert_eq;
use sqlgen::model::ColumnType;
use sqlgen::SqlGenError;

use super::{parse_err, parse_ok};

// ============================================================================
// Column Tests
// ============================================================================

#[test]
fn test_parse_columns_and_options() {
    let sql = r#"
CREATE TABLE `user` (
    `id` BIGINT(20) UNSIGNED NOT NULL AUTO_INCREMENT COMMENT 'primary id',
    `name` VARCHAR(64) NOT NULL DEFAULT '',
    `balance` DECIMAL(10, 2) NULL,
    `created_at` DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (`id`)
);
"#;
    let dxl = parse_ok(sql);
    assert_eq!(dxl.ddl.len(), 1);
    let table = &dxl.ddl[0].table;
    assert_eq!(table.name, "user");
    assert_eq!(table.column_list(), vec!["id", "name", "balance", "created_at"]);

    let id = &table.columns[0];
    assert_eq!(id.tp, ColumnType::LongLong);
    assert!(id.unsigned, "BIGINT UNSIGNED should be unsigned");
    assert!(id.not_null);
    assert!(id.auto_increment);
    assert_eq!(id.comment, "primary id");

    let name = &table.columns[1];
    assert!(name.has_default_value);
    assert!(!name.unsigned);

    let balance = &table.columns[2];
    assert_eq!(balance.tp, ColumnType::NewDecimal);
    assert!(!balance.not_null);

    assert_eq!(table.columns[3].tp, ColumnType::Datetime);
    assert!(table.is_primary("id"));
}

#[test]
fn test_unsupported_column_type() {
    let err = parse_err("CREATE TABLE t (id UUID);");
    assert!(
        matches!(err.root(), SqlGenError::UnsupportedType { .. }),
        "Expected UnsupportedType, got {:?}",
        err
    );
    assert!(err.to_string().contains("error near: 'CREATE TABLE t (id UUID);'"));
}

#[test]
fn test_extraction_is_deterministic() {
    let sql = "CREATE TABLE t (a INT NOT NULL, b VARCHAR(10) UNIQUE, c INT, KEY idx_ca (c, a));";
    let first = parse_ok(sql);
    let second = parse_ok(sql);
    assert_eq!(first.ddl[0].table, second.ddl[0].table);
}

// ============================================================================
// Constraint Tests
// ============================================================================

#[test]
fn test_inline_and_table_unique_merge() {
    let sql = r#"
CREATE TABLE account (
    id INT PRIMARY KEY,
    email VARCHAR(128) UNIQUE,
    UNIQUE KEY uk_email (email)
);
"#;
    let table = parse_ok(sql).ddl.remove(0).table;
    assert_eq!(
        table.constraint.unique_key.len(),
        1,
        "Same unique column set should merge into one entry: {:?}",
        table.constraint.unique_key
    );
    assert_eq!(
        table.constraint.unique_key.values().next().unwrap(),
        &vec!["email".to_string()]
    );
}

#[test]
fn test_composite_keys_keep_declaration_order() {
    let sql = r#"
CREATE TABLE member (
    org_id INT,
    user_id INT,
    role VARCHAR(16),
    UNIQUE KEY uk_org_user (org_id, user_id),
    KEY idx_role_org (role, org_id),
    FOREIGN KEY (org_id) REFERENCES org (id)
);
"#;
    let table = parse_ok(sql).ddl.remove(0).table;
    assert_eq!(table.constraint.unique_key["uk_org_user"], vec!["org_id", "user_id"]);
    assert_eq!(table.constraint.index["idx_role_org"], vec!["role", "org_id"]);
    assert!(table.constraint.primary_key.is_empty());
}

#[test]
fn test_duplicate_table_definition_rejected() {
    let err = parse_err("CREATE TABLE t (id INT); CREATE TABLE t (id INT);");
    assert!(matches!(err.root(), SqlGenError::InvalidModel { .. }));
}
