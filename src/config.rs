//! Run arguments and YAML configuration

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::SqlGenError;

/// Arguments of one generation run, also the shape of the YAML config file.
///
/// Keys missing from the file keep their [`Default`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunArg {
    /// MySQL DSN; when set, tables are loaded from the live schema
    pub dsn: String,
    /// SQL file patterns, comma-separated patterns allowed in the last component
    pub filename: Vec<String>,
    /// Table name patterns
    pub table: Vec<String>,
    /// Adapter output directory
    pub output: String,
    pub entity_output: String,
    pub repo_output: String,
    pub repo_package: String,
    pub entity_package: String,
    pub auto_audit: bool,
    pub mock_types: Vec<MockType>,
}

/// Kind of mock adapter generated next to the real one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockType {
    Sqlite,
    Docker,
}

impl MockType {
    pub fn name(self) -> &'static str {
        match self {
            MockType::Sqlite => "sqlite",
            MockType::Docker => "docker",
        }
    }
}

impl Default for RunArg {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            filename: vec!["*.sql".to_string()],
            table: vec!["*".to_string()],
            output: ".".to_string(),
            entity_output: ".".to_string(),
            repo_output: ".".to_string(),
            repo_package: String::new(),
            entity_package: String::new(),
            auto_audit: false,
            mock_types: Vec::new(),
        }
    }
}

impl RunArg {
    /// Whether tables come from a live schema rather than SQL files
    pub fn uses_dsn(&self) -> bool {
        !self.dsn.is_empty()
    }
}

/// Load run arguments from a YAML file, overlaying the defaults
pub fn load_config(path: &Path) -> Result<RunArg> {
    let content = std::fs::read_to_string(path).map_err(|e| SqlGenError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&content).map_err(|e| {
        SqlGenError::ConfigParseError {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

/// Parse YAML text into run arguments; an empty document yields the defaults
pub fn parse_config(content: &str) -> std::result::Result<RunArg, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(RunArg::default());
    }
    serde_yaml::from_str(content)
}
