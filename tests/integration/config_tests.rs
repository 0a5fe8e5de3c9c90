//! Configuration file and run argument tests

use pretty_assertions::assert_eq;
use sqlgen::{load_config, MockType};

use crate::common::{TestContext, USER_SQL};

#[test]
fn test_config_drives_run() {
    let ctx = TestContext::new();
    ctx.write_file("sql/user.sql", USER_SQL);
    let config = ctx.write_file(
        "sqlgen.yaml",
        &format!(
            "filename:\n  - {}\noutput: {}\nrepo_output: gen/repo\nrepo_package: example.com/gen/repo\nmock_types: [sqlite]\n",
            ctx.pattern("sql/*.sql"),
            ctx.pattern("gen/data")
        ),
    );

    let arg = load_config(&config).unwrap();
    assert_eq!(arg.repo_package, "example.com/gen/repo");
    assert_eq!(arg.mock_types, vec![MockType::Sqlite]);
    assert_eq!(arg.table, vec!["*"], "Unset keys keep their defaults");
    assert_eq!(arg.entity_output, ".", "Unset keys keep their defaults");

    let output = ctx.run(&arg).assert_ok().to_string();
    assert!(output.contains("[read] FindOne"));
    assert!(output.contains("packages: adapter=data repo=repo (example.com/gen/repo) entity=-"));
    assert!(output.contains(&format!("file: {}", ctx.pattern("gen/data/user_adapter.go"))));
    assert!(output.contains("file: gen/repo/user_repo.go"));
    assert!(output.contains("file: ./user_entity.go"));
    assert!(output.contains(&format!(
        "file: {}",
        ctx.pattern("gen/data/user_sqlite_mock_adapter.go")
    )));
}

#[test]
fn test_unknown_mock_type_is_rejected() {
    let ctx = TestContext::new();
    let config = ctx.write_file("sqlgen.yaml", "mock_types: [memory]\n");
    let err = load_config(&config).unwrap_err();
    assert!(
        format!("{:#}", err).contains("Failed to parse config file"),
        "{:#}",
        err
    );
}

#[test]
fn test_dsn_without_provider_is_rejected() {
    let ctx = TestContext::new();
    let config = ctx.write_file("sqlgen.yaml", "dsn: root:pw@tcp(127.0.0.1:3306)/shop\n");
    let arg = load_config(&config).unwrap();
    assert!(arg.uses_dsn());

    let err = ctx.run(&arg).assert_err().to_string();
    assert!(err.contains("no schema provider"), "{}", err);
}

#[test]
fn test_empty_filename_list_is_rejected() {
    let ctx = TestContext::new();
    let config = ctx.write_file("sqlgen.yaml", "filename: []\n");
    let arg = load_config(&config).unwrap();
    let err = ctx.run(&arg).assert_err().to_string();
    assert_eq!(err, "missing dsn or filename");
}
