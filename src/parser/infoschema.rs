//! Model construction from `information_schema` metadata
//!
//! A [`SchemaProvider`] supplies raw rows; this module folds them into
//! tables and generates the default CRUD statements for each table from its
//! keys, parsing them with the same engine used for SQL files.

use std::collections::HashSet;

use tracing::{debug, info};

use super::ddl::{parse_data_type, PRIMARY};
use super::engine::SqlParser;
use super::files::split_patterns;
use crate::error::{Result, SqlGenError};
use crate::model::{Column, Constraint, Ddl, Dxl, Table};
use crate::util::to_camel_case;

/// Index membership of one column row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSchemaIndex {
    pub index_name: String,
    /// `NON_UNIQUE` from `information_schema.STATISTICS`
    pub non_unique: i32,
}

/// One row per (column, index) pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSchemaColumn {
    pub name: String,
    /// `COLUMN_TYPE`, e.g. `int(10) unsigned`
    pub data_type: String,
    /// `EXTRA`, e.g. `auto_increment`
    pub extra: String,
    pub comment: String,
    pub column_default: Option<String>,
    /// `IS_NULLABLE`, `YES` or `NO`
    pub is_nullable: String,
    pub index: Option<InfoSchemaIndex>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoSchemaTable {
    pub db: String,
    pub table: String,
    pub columns: Vec<InfoSchemaColumn>,
}

/// Source of live schema metadata
pub trait SchemaProvider {
    /// Table names of `schema`
    fn tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Column rows of one table, ordered by ordinal position
    fn columns(&self, schema: &str, table: &str) -> Result<InfoSchemaTable>;
}

/// Extract the database name from a MySQL DSN such as `user:pass@tcp(host:3306)/db?parseTime=true`
pub fn parse_dsn(dsn: &str) -> Result<String> {
    let base = dsn.split('?').next().unwrap_or_default();
    let slash = base.rfind('/').ok_or_else(|| SqlGenError::InvalidDsn {
        dsn: dsn.to_string(),
    })?;
    let schema = &base[slash + 1..];
    if schema.is_empty() {
        return Err(SqlGenError::MissingSchema);
    }
    Ok(schema.to_string())
}

/// Names matching any of the comma-separated glob patterns; no pattern means `*`
pub fn match_patterns<S: AsRef<str>>(names: &[String], patterns: &[S]) -> Result<Vec<String>> {
    let mut patterns = split_patterns(patterns);
    if patterns.is_empty() {
        patterns.push("*".to_string());
    }
    let matchers = patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| SqlGenError::InvalidPattern {
                pattern: p.clone(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out: Vec<String> = Vec::new();
    for name in names {
        if matchers.iter().any(|m| m.matches(name)) && !out.contains(name) {
            out.push(name.clone());
        }
    }
    Ok(out)
}

/// Build a model for every table of `schema` matching `patterns`
pub fn from_schema<P, S>(
    provider: &P,
    parser: &SqlParser,
    schema: &str,
    patterns: &[S],
) -> Result<Dxl>
where
    P: SchemaProvider + ?Sized,
    S: AsRef<str>,
{
    let tables = provider.tables(schema)?;
    let matched = match_patterns(&tables, patterns)?;
    info!(schema, tables = tables.len(), matched = matched.len(), "loading schema");

    let mut dxl = Dxl::new();
    for name in &matched {
        let raw = provider.columns(schema, name)?;
        let ddl = convert_ddl(&raw)?;
        let sql = generate_init_sql(&ddl.table);
        debug!(table = %name, "generated init sql");

        let generated = parser.parse(&sql)?;
        dxl.ddl.push(ddl);
        dxl.dml.extend(generated.dml);
    }

    dxl.validate()?;
    Ok(dxl)
}

/// Fold info-schema rows into a table definition
pub fn convert_ddl(raw: &InfoSchemaTable) -> Result<Ddl> {
    let mut table = Table {
        name: raw.table.clone(),
        schema: raw.db.clone(),
        ..Default::default()
    };
    // Index rows are grouped first so composite keys are appended whole
    let mut indexes: Vec<(&InfoSchemaIndex, Vec<String>)> = Vec::new();

    for row in &raw.columns {
        if let Some(index) = &row.index {
            match indexes
                .iter_mut()
                .find(|(i, _)| i.index_name == index.index_name)
            {
                Some((_, columns)) => columns.push(row.name.clone()),
                None => indexes.push((index, vec![row.name.clone()])),
            }
        }

        if table.column(&row.name).is_some() {
            continue;
        }

        let (tp, unsigned) = parse_data_type(&row.data_type)?;
        let mut column = Column::new(row.name.clone(), tp);
        column.unsigned = unsigned;
        column.auto_increment = row.extra.to_ascii_lowercase().contains("auto_increment");
        column.has_default_value = row.column_default.is_some();
        column.not_null = !row.is_nullable.eq_ignore_ascii_case("yes");
        column.comment = row.comment.replace(['\r', '\n'], "");
        table.columns.push(column);
    }

    let mut constraint = Constraint::new();
    for (index, columns) in &indexes {
        if index.index_name.eq_ignore_ascii_case(PRIMARY) {
            constraint.append_primary_key(PRIMARY, columns);
        } else if index.non_unique == 0 {
            constraint.append_unique_key(&index.index_name, columns);
        } else {
            constraint.append_index(&index.index_name, columns);
        }
    }

    table.constraint = constraint;
    Ok(Ddl { table })
}

fn quote(name: &str) -> String {
    format!("`{}`", name)
}

fn where_fragment(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("{} = ?", quote(c)))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn name_join(columns: &[String]) -> String {
    to_camel_case(&columns.join("_"))
}

/// Default statements for a table: an insert, lookups, updates and deletes
/// by each primary or unique key, and lookups by every leftmost prefix of
/// each secondary index, longest first.
pub fn generate_init_sql(table: &Table) -> String {
    let columns: Vec<String> = table.column_list().iter().map(|c| quote(c)).collect();
    let select_columns = columns.join(", ");
    let update_set = columns
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect::<Vec<_>>()
        .join(", ");
    let table_name = quote(&table.name);

    let mut out = Vec::new();
    out.push(format!(
        "-- fn: Insert\ninsert into {} ({}) values ({});",
        table_name,
        select_columns,
        vec!["?"; columns.len()].join(", ")
    ));

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let keys = table
        .constraint
        .primary_key
        .values()
        .chain(table.constraint.unique_key.values());
    for key in keys {
        if !seen.insert(key.clone()) {
            continue;
        }
        let join = name_join(key);
        let condition = where_fragment(key);
        out.push(format!(
            "-- fn: FindOneBy{}\nselect {} from {} where {} limit 1;",
            join, select_columns, table_name, condition
        ));
        out.push(format!(
            "-- fn: UpdateBy{}\nupdate {} set {} where {};",
            join, table_name, update_set, condition
        ));
        out.push(format!(
            "-- fn: DeleteBy{}\ndelete from {} where {};",
            join, table_name, condition
        ));
    }

    let mut seen_prefix: HashSet<Vec<String>> = HashSet::new();
    for index in table.constraint.index.values() {
        for len in (1..=index.len()).rev() {
            let prefix = index[..len].to_vec();
            if !seen_prefix.insert(prefix.clone()) {
                continue;
            }
            out.push(format!(
                "-- fn: FindBy{}\nselect {} from {} where {};",
                name_join(&prefix),
                select_columns,
                table_name,
                where_fragment(&prefix)
            ));
        }
    }

    out.join("\n\n")
}
