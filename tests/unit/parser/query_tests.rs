//! INSERT / SELECT / UPDATE / DELETE extraction tests

use pretty_assertions::assert_eq;
use sqlgen::model::{Action, Clause, Dml, LimitValue, SelectField};
use sqlgen::{Context, SqlGenError};

use super::{parse_err, parse_ok};

const SCHEMA: &str = r#"
CREATE TABLE user (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
    name VARCHAR(64) NOT NULL,
    age TINYINT UNSIGNED NOT NULL,
    status INT NOT NULL,
    balance DECIMAL(10, 2) NOT NULL,
    deleted_at DATETIME NULL,
    PRIMARY KEY (id),
    KEY idx_name_age (name, age)
);
"#;

fn bound_dml(sql: &str) -> Dml {
    let dxl = parse_ok(&format!("{}{}", SCHEMA, sql));
    let contexts = Context::from_dxl(&dxl).unwrap();
    contexts[0].statements()[0].clone()
}

// ============================================================================
// DELETE Tests
// ============================================================================

#[test]
fn test_delete_by_id() {
    let dxl = parse_ok("DELETE FROM foo WHERE id = ?");
    assert_eq!(dxl.dml.len(), 1);
    let dml = &dxl.dml[0];
    assert_eq!(dml.action(), Action::Delete);
    assert_eq!(dml.table(), Some("foo"));

    let dxl = parse_ok("CREATE TABLE foo (id BIGINT NOT NULL);\nDELETE FROM foo WHERE id = ?");
    let contexts = Context::from_dxl(&dxl).unwrap();
    let clause = contexts[0].statements()[0].where_clause().unwrap();
    assert_eq!(clause.sql().unwrap(), "`id = ?`");
    let marshaled = clause.marshal().unwrap();
    assert_eq!(marshaled.parameters.len(), 1);
    assert_eq!(marshaled.parameters[0].name, "idEQ");
    assert_eq!(marshaled.parameters[0].target, "int64");
}

#[test]
fn test_delete_order_by_and_limit() {
    match bound_dml("DELETE FROM user WHERE status = ? ORDER BY id DESC LIMIT 100;") {
        Dml::Delete(s) => {
            assert_eq!(s.order_by.len(), 1);
            assert!(s.order_by[0].desc);
            assert_eq!(s.limit.unwrap().count, LimitValue::Count(100));
        }
        other => panic!("Expected delete, got {:?}", other),
    }
}

// ============================================================================
// SELECT Tests
// ============================================================================

#[test]
fn test_between_parameters() {
    let dml = bound_dml("SELECT * FROM user WHERE age BETWEEN ? AND ?;");
    let marshaled = dml.where_clause().unwrap().marshal().unwrap();
    assert_eq!(marshaled.sql, "age BETWEEN ? AND ?");
    let names: Vec<_> = marshaled.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["ageBetweenStart", "ageBetweenEnd"]);
    assert!(marshaled.parameters.iter().all(|p| p.target == "uint8"));
}

#[test]
fn test_in_parameter_is_slice() {
    let dml = bound_dml("SELECT * FROM user WHERE status IN (?);");
    let marshaled = dml.where_clause().unwrap().marshal().unwrap();
    assert_eq!(marshaled.sql, "status IN (?)");
    assert_eq!(marshaled.parameters.len(), 1);
    assert_eq!(marshaled.parameters[0].name, "statusIn");
    assert_eq!(marshaled.parameters[0].target, "[]int32");
}

#[test]
fn test_parameters_follow_leaf_order() {
    let dml = bound_dml(
        "SELECT * FROM user WHERE name = ? AND (age >= ? OR age <= ?) AND status <> ? AND name LIKE ?;",
    );
    let clause = dml.where_clause().unwrap();
    let marshaled = clause.marshal().unwrap();
    assert_eq!(
        marshaled.sql,
        "name = ? AND (age >= ? OR age <= ?) AND status <> ? AND name LIKE ?"
    );
    let names: Vec<_> = marshaled.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["nameEQ", "ageGE", "ageLE", "statusNE", "nameLike"]);
    assert_eq!(marshaled.parameters.len(), clause.comparisons().len());
}

#[test]
fn test_raw_predicates_yield_no_parameters() {
    let dml = bound_dml("SELECT * FROM user WHERE deleted_at IS NULL AND status = 1 AND id = ?;");
    let marshaled = dml.where_clause().unwrap().marshal().unwrap();
    assert_eq!(marshaled.sql, "deleted_at IS NULL AND status = 1 AND id = ?");
    assert_eq!(marshaled.parameters.len(), 1);
    assert_eq!(marshaled.parameters[0].name, "idEQ");
}

#[test]
fn test_decimal_parameter_imports() {
    let dml = bound_dml("SELECT * FROM user WHERE balance >= ? AND balance <= ?;");
    let marshaled = dml.where_clause().unwrap().marshal().unwrap();
    assert_eq!(marshaled.third_imports(), "github.com/shopspring/decimal");
    assert_eq!(
        marshaled.parameter_structure("FindByBalance", "Where"),
        "// FindByBalanceWhereParameter is a where parameter structure.\n\
         type FindByBalanceWhereParameter struct {\n\
         BalanceGE decimal.Decimal\n\
         BalanceLE decimal.Decimal\n\
         }"
    );
    assert_eq!(marshaled.arguments("req"), "req.BalanceGE, req.BalanceLE");
}

#[test]
fn test_aggregate_projection_and_having() {
    let dml = bound_dml(
        "SELECT name, COUNT(*) AS total, MAX(age) FROM user GROUP BY name HAVING COUNT(id) > ? LIMIT ?, ?;",
    );
    let select = match &dml {
        Dml::Select(s) => s,
        other => panic!("Expected select, got {:?}", other),
    };
    assert_eq!(select.group_by, vec!["name"]);
    assert!(matches!(
        select.columns[1],
        SelectField::Aggregate { argument: None, .. }
    ));

    let having = select.having.marshal().unwrap();
    assert_eq!(having.sql, "COUNT(id) > ?");
    assert_eq!(having.parameters[0].name, "countIdGT");
    assert_eq!(having.parameters[0].target, "sql.NullInt64");

    let contexts_table = parse_ok(SCHEMA).ddl.remove(0).table;
    let result: Vec<_> = select
        .result_columns(&contexts_table)
        .unwrap()
        .iter()
        .map(|c| c.go_type().unwrap())
        .collect();
    assert_eq!(result, vec!["string", "sql.NullInt64", "sql.NullInt16"]);

    let limit: Vec<_> = select
        .limit
        .unwrap()
        .parameters()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(limit, vec!["offset", "limit"]);
}

#[test]
fn test_count_distinct_keeps_modifier() {
    let dml = bound_dml(
        "SELECT status, COUNT(DISTINCT name) FROM user GROUP BY status HAVING COUNT(DISTINCT id) > ?;",
    );
    let select = match &dml {
        Dml::Select(s) => s,
        other => panic!("Expected select, got {:?}", other),
    };
    assert!(matches!(
        &select.columns[1],
        SelectField::Aggregate { argument: Some(a), distinct: true, .. } if a == "name"
    ));

    let having = select.having.marshal().unwrap();
    assert_eq!(having.sql, "COUNT(DISTINCT id) > ?");
    assert_eq!(having.parameters[0].name, "countDistinctIdGT");
    assert_eq!(having.parameters[0].target, "sql.NullInt64");

    let table = parse_ok(SCHEMA).ddl.remove(0).table;
    let result = select.result_columns(&table).unwrap();
    assert_eq!(result[1].name, "count_distinct_name");
}

#[test]
fn test_distinct_without_column_rejected() {
    let err = parse_err("SELECT status FROM user GROUP BY status HAVING COUNT(DISTINCT 1) > ?;");
    assert!(matches!(err.root(), SqlGenError::UnsupportedExpression { .. }));
}

#[test]
fn test_not_equal_negation() {
    let dml = bound_dml("SELECT * FROM user WHERE NOT (status = ?);");
    let marshaled = dml.where_clause().unwrap().marshal().unwrap();
    assert_eq!(marshaled.sql, "status != ?");
    assert_eq!(marshaled.parameters[0].name, "statusNot");
}

#[test]
fn test_select_without_where_has_empty_clause() {
    let dml = bound_dml("SELECT id, name FROM user ORDER BY name;");
    let clause = dml.where_clause().unwrap();
    assert_eq!(*clause, Clause::Empty);
    assert_eq!(clause.sql().unwrap(), "");
    assert_eq!(clause.parameter_structure("FindAll", "Where").unwrap(), "");
}

// ============================================================================
// INSERT / UPDATE Tests
// ============================================================================

#[test]
fn test_insert_and_update_columns() {
    match bound_dml("INSERT INTO user (name, age) VALUES (?, ?);") {
        Dml::Insert(s) => assert_eq!(s.columns, vec!["name", "age"]),
        other => panic!("Expected insert, got {:?}", other),
    }
    match bound_dml("UPDATE user SET status = ?, name = ? WHERE id = ?;") {
        Dml::Update(s) => {
            assert_eq!(s.columns, vec!["status", "name"]);
            assert_eq!(s.where_clause.marshal().unwrap().parameters[0].name, "idEQ");
        }
        other => panic!("Expected update, got {:?}", other),
    }
}

#[test]
fn test_update_order_by_and_limit() {
    let sql = "UPDATE user SET status = ? WHERE id = ? ORDER BY id DESC LIMIT ?;";
    match bound_dml(sql) {
        Dml::Update(s) => {
            assert_eq!(s.sql, sql);
            assert_eq!(s.columns, vec!["status"]);
            assert_eq!(s.order_by.len(), 1);
            assert_eq!(s.order_by[0].column, "id");
            assert!(s.order_by[0].desc);
            let limit = s.limit.unwrap();
            assert_eq!(limit.count, LimitValue::Placeholder);
            assert_eq!(limit.parameters()[0].name, "limit");
            let marshaled = s.where_clause.marshal().unwrap();
            assert_eq!(marshaled.sql, "id = ?");
        }
        other => panic!("Expected update, got {:?}", other),
    }
}

#[test]
fn test_update_limit_without_order_by() {
    match bound_dml("UPDATE user SET name = ? WHERE id = ? LIMIT 10;") {
        Dml::Update(s) => {
            assert!(s.order_by.is_empty());
            assert_eq!(s.limit.unwrap().count, LimitValue::Count(10));
            assert_eq!(s.where_clause.marshal().unwrap().parameters[0].name, "idEQ");
        }
        other => panic!("Expected update, got {:?}", other),
    }
}

#[test]
fn test_update_subquery_limit_is_not_a_tail() {
    // LIMIT inside parentheses belongs to the subquery, which is rejected
    let err = parse_err("UPDATE user SET status = ? WHERE id IN (SELECT id FROM user LIMIT 1);");
    assert!(matches!(err.root(), SqlGenError::UnsupportedNestedQuery));
}

#[test]
fn test_update_trailing_garbage_rejected() {
    let err = parse_err("UPDATE user SET status = ? WHERE id = ? LIMIT 1 FOR UPDATE;");
    assert!(matches!(err.root(), SqlGenError::Parse { .. }));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_multiple_table_rejected() {
    let err = parse_err("SELECT * FROM user, account WHERE user.id = ?;");
    assert!(matches!(err.root(), SqlGenError::MultipleTable));

    let err = parse_err("DELETE u FROM user u JOIN account a ON u.id = a.user_id WHERE a.id = ?;");
    assert!(matches!(err.root(), SqlGenError::MultipleTable));
}

#[test]
fn test_unsupported_expression() {
    let err = parse_err("SELECT * FROM user WHERE age + ? > 10;");
    match err.root() {
        SqlGenError::UnsupportedExpression { expr } => assert_eq!(expr, "age + ? > 10"),
        other => panic!("Expected UnsupportedExpression, got {:?}", other),
    }
    assert!(err.to_string().ends_with("error near: 'SELECT * FROM user WHERE age + ? > 10;'"));
}

#[test]
fn test_unknown_column_fails_binding() {
    let dxl = parse_ok(&format!("{}SELECT * FROM user WHERE email = ?;", SCHEMA));
    let err = Context::from_dxl(&dxl).unwrap_err();
    match err.root() {
        SqlGenError::MissingColumn { table, column } => {
            assert_eq!(table, "user");
            assert_eq!(column, "email");
        }
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}
