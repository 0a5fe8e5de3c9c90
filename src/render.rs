//! Renderers consuming the per-table contexts

use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::config::{MockType, RunArg};
use crate::error::Result;
use crate::model::{Clause, Context, Dml, Marshaled, Table};
use crate::util::to_camel_case;

/// Turns bound table contexts into output text
pub trait CodeRenderer {
    fn render(&self, contexts: &[Context]) -> Result<String>;
}

/// Destination files and package names for each table's generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub output: PathBuf,
    pub entity_output: PathBuf,
    pub repo_output: PathBuf,
    /// Import path of the repository package
    pub repo_package: String,
    /// Import path of the entity package
    pub entity_package: String,
    pub auto_audit: bool,
    pub mock_types: Vec<MockType>,
}

impl OutputLayout {
    pub fn from_arg(arg: &RunArg) -> Self {
        Self {
            output: PathBuf::from(&arg.output),
            entity_output: PathBuf::from(&arg.entity_output),
            repo_output: PathBuf::from(&arg.repo_output),
            repo_package: arg.repo_package.clone(),
            entity_package: arg.entity_package.clone(),
            auto_audit: arg.auto_audit,
            mock_types: arg.mock_types.clone(),
        }
    }

    /// Package name of the adapter files: the last component of `output`
    pub fn adapter_package_name(&self) -> String {
        package_name(&self.output)
    }

    pub fn repo_package_name(&self) -> String {
        package_name(&self.repo_output)
    }

    /// Files generated for `table`: adapter, repository, entity, then one per mock type
    pub fn files(&self, table: &str) -> Vec<PathBuf> {
        let mut files = vec![
            self.output.join(format!("{}_adapter.go", table)),
            self.repo_output.join(format!("{}_repo.go", table)),
            self.entity_output.join(format!("{}_entity.go", table)),
        ];
        let mut seen = Vec::new();
        for mock in &self.mock_types {
            if seen.contains(mock) {
                continue;
            }
            seen.push(*mock);
            files.push(
                self.output
                    .join(format!("{}_{}_mock_adapter.go", table, mock.name())),
            );
        }
        files
    }

    fn render(&self, out: &mut String, table: &str) -> Result<()> {
        writeln!(
            out,
            "  packages: adapter={} repo={} ({}) entity={}{}",
            self.adapter_package_name(),
            self.repo_package_name(),
            or_dash(&self.repo_package),
            or_dash(&self.entity_package),
            if self.auto_audit { " audit=on" } else { "" }
        )?;
        for file in self.files(table) {
            writeln!(out, "  file: {}", file.display())?;
        }
        Ok(())
    }
}

fn package_name(dir: &Path) -> String {
    dir.to_string_lossy()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Plain-text overview of every table, statement and derived parameter set
#[derive(Debug, Clone)]
pub struct SummaryRenderer {
    /// Receiver used in the argument list, e.g. `req` in `req.IdEQ`
    pub receiver: String,
    /// Planned output files, listed under each table when set
    pub layout: Option<OutputLayout>,
}

impl Default for SummaryRenderer {
    fn default() -> Self {
        Self {
            receiver: "req".to_string(),
            layout: None,
        }
    }
}

impl SummaryRenderer {
    pub fn new(receiver: impl Into<String>) -> Self {
        Self {
            receiver: receiver.into(),
            layout: None,
        }
    }

    /// Summary that also lists the files `arg` would generate
    pub fn from_arg(arg: &RunArg) -> Self {
        Self {
            layout: Some(OutputLayout::from_arg(arg)),
            ..Self::default()
        }
    }

    fn render_table(&self, out: &mut String, table: &Table) -> Result<()> {
        let primary: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| table.is_primary(&c.name))
            .map(|c| c.name.as_str())
            .collect();
        writeln!(
            out,
            "table {} ({} columns, primary key: {})",
            table.name,
            table.columns.len(),
            if primary.is_empty() {
                "-".to_string()
            } else {
                primary.join(", ")
            }
        )?;
        if let Some(layout) = &self.layout {
            layout.render(out, &table.name)?;
        }
        Ok(())
    }

    fn render_dml(
        &self,
        out: &mut String,
        table: &Table,
        dml: &Dml,
        func_name: &str,
        indent: usize,
    ) -> Result<()> {
        let pad = " ".repeat(indent);
        writeln!(
            out,
            "{}[{}] {}: {}",
            pad,
            dml.action().name(),
            func_name,
            dml.sql_text()
        )?;

        match dml {
            Dml::Select(s) => {
                self.render_clause(out, &s.where_clause, func_name, "Where", indent + 2)?;
                self.render_clause(out, &s.having, func_name, "Having", indent + 2)?;
                let columns = s
                    .result_columns(table)?
                    .iter()
                    .map(|c| Ok(format!("{} {}", to_camel_case(&c.name), c.go_type()?)))
                    .collect::<Result<Vec<_>>>()?;
                writeln!(out, "{}  result: {}", pad, columns.join(", "))?;
                if let Some(limit) = &s.limit {
                    let params: Vec<String> = limit
                        .parameters()
                        .iter()
                        .map(|p| format!("{} {}", p.name, p.target))
                        .collect();
                    if !params.is_empty() {
                        writeln!(out, "{}  limit: {}", pad, params.join(", "))?;
                    }
                }
            }
            Dml::Update(s) => {
                writeln!(out, "{}  set: {}", pad, s.columns.join(", "))?;
                self.render_clause(out, &s.where_clause, func_name, "Where", indent + 2)?;
            }
            Dml::Delete(s) => {
                self.render_clause(out, &s.where_clause, func_name, "Where", indent + 2)?;
            }
            Dml::Insert(s) => {
                writeln!(out, "{}  columns: {}", pad, s.columns.join(", "))?;
            }
            Dml::Transaction(t) => {
                for (i, stmt) in t.statements.iter().enumerate() {
                    let name = statement_name(stmt, &format!("{}{}", func_name, i + 1));
                    self.render_dml(out, table, stmt, &name, indent + 2)?;
                }
            }
        }
        Ok(())
    }

    fn render_clause(
        &self,
        out: &mut String,
        clause: &Clause,
        func_name: &str,
        identifier: &str,
        indent: usize,
    ) -> Result<()> {
        if !clause.is_valid() {
            return Ok(());
        }
        let pad = " ".repeat(indent);
        let marshaled: Marshaled = clause.marshal()?;
        writeln!(
            out,
            "{}{}: {}",
            pad,
            identifier.to_ascii_lowercase(),
            marshaled.sql_literal()
        )?;
        for line in marshaled.parameter_structure(func_name, identifier).lines() {
            writeln!(out, "{}  {}", pad, line)?;
        }
        let imports = marshaled.third_imports();
        if !imports.is_empty() {
            writeln!(out, "{}imports: {}", pad, imports.replace('\n', ", "))?;
        }
        writeln!(out, "{}args: {}", pad, marshaled.arguments(&self.receiver))?;
        Ok(())
    }
}

/// Method name from the `fn:` comment, or a positional fallback
fn statement_name(dml: &Dml, fallback: &str) -> String {
    let name = &dml.comment().func_name;
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.clone()
    }
}

impl CodeRenderer for SummaryRenderer {
    fn render(&self, contexts: &[Context]) -> Result<String> {
        let mut out = String::new();
        for ctx in contexts {
            self.render_table(&mut out, ctx.table())?;
            for (i, dml) in ctx.statements().iter().enumerate() {
                let fallback = format!("{}{}", to_camel_case(dml.action().name()), i + 1);
                let name = statement_name(dml, &fallback);
                self.render_dml(&mut out, ctx.table(), dml, &name, 2)?;
            }
            out.push('\n');
        }
        Ok(out)
    }
}
