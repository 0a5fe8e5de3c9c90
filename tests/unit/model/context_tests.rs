//! Dxl validation and per-table context tests

use pretty_assertions::assert_eq;
use sqlgen::model::{Comment, Dml, InsertStmt, Transaction};
use sqlgen::{Context, Dxl, SqlGenError};

use super::order_ddl;

fn insert(table: &str, columns: &[&str]) -> Dml {
    Dml::Insert(InsertStmt {
        comment: Comment::default(),
        sql: format!("INSERT INTO {} ...;", table),
        table: table.to_string(),
        columns: columns.iter().map(|c| c.to_string()).collect(),
    })
}

#[test]
fn test_contexts_follow_table_order() {
    let mut user = order_ddl();
    user.table.name = "user".to_string();
    let dxl = Dxl {
        ddl: vec![order_ddl(), user],
        dml: vec![insert("user", &["id"]), insert("order", &["id", "price"])],
    };
    dxl.validate().unwrap();

    let contexts = Context::from_dxl(&dxl).unwrap();
    let tables: Vec<_> = contexts.iter().map(|c| c.table().name.as_str()).collect();
    assert_eq!(tables, vec!["order", "user"]);
    assert_eq!(contexts[0].statements().len(), 1);
    assert_eq!(contexts[1].statements().len(), 1);
    assert!(contexts[0].is_primary("id"));
}

#[test]
fn test_table_without_statements_still_has_context() {
    let dxl = Dxl {
        ddl: vec![order_ddl()],
        dml: vec![],
    };
    let contexts = Context::from_dxl(&dxl).unwrap();
    assert_eq!(contexts.len(), 1);
    assert!(contexts[0].statements().is_empty());
}

#[test]
fn test_transaction_binds_every_statement() {
    let tx = Dml::Transaction(Transaction {
        comment: Comment::default(),
        sql: "BEGIN;\nINSERT INTO order ...;\nCOMMIT;".to_string(),
        statements: vec![insert("order", &["id"]), insert("order", &["missing"])],
    });
    let dxl = Dxl {
        ddl: vec![order_ddl()],
        dml: vec![tx],
    };
    let err = Context::from_dxl(&dxl).unwrap_err();
    assert!(matches!(err.root(), SqlGenError::MissingColumn { .. }));
}

#[test]
fn test_validate_rejects_nested_transaction() {
    let inner = Dml::Transaction(Transaction {
        comment: Comment::default(),
        sql: "BEGIN;\nCOMMIT;".to_string(),
        statements: vec![insert("order", &["id"])],
    });
    let outer = Dml::Transaction(Transaction {
        comment: Comment::default(),
        sql: "BEGIN;\nBEGIN;\nCOMMIT;\nCOMMIT;".to_string(),
        statements: vec![inner],
    });
    let dxl = Dxl {
        ddl: vec![order_ddl()],
        dml: vec![outer],
    };
    assert!(matches!(
        dxl.validate(),
        Err(SqlGenError::UnsupportedNestedTransaction)
    ));
}

#[test]
fn test_transaction_statements_bind_to_their_own_tables() {
    let dxl = sqlgen::SqlParser::new()
        .parse(
            "CREATE TABLE a (id BIGINT);\n\
             CREATE TABLE b (uid VARCHAR(10), n INT);\n\
             BEGIN;\n\
             INSERT INTO a (id) VALUES (?);\n\
             UPDATE b SET n = ? WHERE uid = ?;\n\
             COMMIT;",
        )
        .unwrap();

    let contexts = Context::from_dxl(&dxl).unwrap();
    // Grouped under the first statement's table
    assert_eq!(contexts[0].table().name, "a");
    assert_eq!(contexts[0].statements().len(), 1);
    assert!(contexts[1].statements().is_empty());

    let statements = match &contexts[0].statements()[0] {
        Dml::Transaction(t) => &t.statements,
        other => panic!("Expected transaction, got {:?}", other),
    };
    let marshaled = statements[1].where_clause().unwrap().marshal().unwrap();
    assert_eq!(marshaled.parameters[0].name, "uidEQ");
    assert_eq!(marshaled.parameters[0].target, "string");
}

#[test]
fn test_transaction_statement_without_table_definition() {
    let tx = Dml::Transaction(Transaction {
        comment: Comment::default(),
        sql: "BEGIN;\nINSERT INTO order ...;\nINSERT INTO audit ...;\nCOMMIT;".to_string(),
        statements: vec![insert("order", &["id"]), insert("audit", &["id"])],
    });
    let dxl = Dxl {
        ddl: vec![order_ddl()],
        dml: vec![tx],
    };
    let err = Context::from_dxl(&dxl).unwrap_err();
    match err.root() {
        SqlGenError::MissingTableDefinition { table } => assert_eq!(table, "audit"),
        other => panic!("Expected MissingTableDefinition, got {:?}", other),
    }
    assert!(err.to_string().contains("error near: 'INSERT INTO audit ...;'"));
}
