//! sqlgen: turns MySQL table definitions and queries into a typed generation model
//!
//! SQL text is split into statements, grouped into table definitions, queries
//! and transactions, and extracted into a [`model::Dxl`]. Each statement's
//! WHERE/HAVING tree then yields the SQL fragment and the typed parameters a
//! generated data-access method binds.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod util;

use anyhow::{bail, Result};
use tracing::info;

pub use config::{load_config, MockType, RunArg};
pub use error::SqlGenError;
pub use model::{Context, Dxl};
pub use parser::{SchemaProvider, SqlParser};
pub use render::{CodeRenderer, OutputLayout, SummaryRenderer};

/// Build the model from the SQL files named by `arg.filename`
pub fn load_from_files(parser: &SqlParser, arg: &RunArg) -> Result<Dxl> {
    // Step 1: Resolve the file patterns
    let files = parser::collect_sql_files(&arg.filename)?;

    // Step 2: Parse all SQL files
    let dxl = parser::parse_sql_files(parser, &files)?;
    info!(ddl = dxl.ddl.len(), dml = dxl.dml.len(), "parsed sql files");
    Ok(dxl)
}

/// Build the model from a live schema described by `arg.dsn`
pub fn load_from_schema<P>(provider: &P, parser: &SqlParser, arg: &RunArg) -> Result<Dxl>
where
    P: SchemaProvider + ?Sized,
{
    let schema = parser::parse_dsn(&arg.dsn)?;
    let dxl = parser::from_schema(provider, parser, &schema, &arg.table)?;
    info!(schema = %schema, ddl = dxl.ddl.len(), dml = dxl.dml.len(), "loaded schema");
    Ok(dxl)
}

/// Bind the model into table contexts and render them
pub fn render(dxl: &Dxl, renderer: &dyn CodeRenderer) -> Result<String> {
    let contexts = Context::from_dxl(dxl)?;
    info!(contexts = contexts.len(), "built table contexts");
    Ok(renderer.render(&contexts)?)
}

/// Run a file-based generation; a DSN needs a provider and goes through [`load_from_schema`]
pub fn run(arg: &RunArg, renderer: &dyn CodeRenderer) -> Result<String> {
    if arg.uses_dsn() {
        bail!("no schema provider is available for dsn '{}'", arg.dsn);
    }
    if arg.filename.is_empty() {
        bail!("missing dsn or filename");
    }

    let parser = SqlParser::new();
    let dxl = load_from_files(&parser, arg)?;
    render(&dxl, renderer)
}
