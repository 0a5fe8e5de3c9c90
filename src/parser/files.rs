//! SQL file discovery and reading

use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::engine::SqlParser;
use crate::error::SqlGenError;
use crate::model::Dxl;

const SQL_EXTENSION: &str = "sql";

/// Minimum number of files to benefit from parallel processing.
/// Below this threshold, sequential processing is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 8;

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
pub fn read_sql_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| SqlGenError::SqlFileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                return Err(SqlGenError::SqlFileReadError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "File contains invalid characters",
                    ),
                }
                .into());
            }
            decoded.into_owned()
        }
    };

    Ok(content
        .strip_prefix('\u{FEFF}')
        .map(str::to_string)
        .unwrap_or(content))
}

/// Split comma-separated patterns, dropping blanks and duplicates
pub fn split_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for field in patterns.iter().flat_map(|p| p.as_ref().split(',')) {
        let field = field.trim();
        if !field.is_empty() && !out.iter().any(|p| p == field) {
            out.push(field.to_string());
        }
    }
    out
}

/// Resolve filename patterns such as `schema/*.sql` to the `.sql` files they match.
///
/// Only the last path component is a pattern; it is matched against the
/// files directly inside its directory.
pub fn collect_sql_files<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for item in patterns {
        let path = Path::new(item.as_ref());
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "*".to_string());

        let matchers = split_patterns(&[base])
            .into_iter()
            .map(|p| {
                glob::Pattern::new(&p).map_err(|e| SqlGenError::InvalidPattern {
                    pattern: p.clone(),
                    source: e,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut matched: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map_or(false, |ext| ext == SQL_EXTENSION))
            .filter(|p| {
                let name = p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                matchers.iter().any(|m| m.matches(&name))
            })
            .collect();
        matched.sort();
        debug!(pattern = item.as_ref(), matched = matched.len(), "resolved sql pattern");

        for file in matched {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }

    if files.is_empty() {
        return Err(SqlGenError::NoSqlFile.into());
    }
    info!(files = files.len(), "found sql files");
    Ok(files)
}

/// Parse one file into a model
pub fn parse_sql_file(parser: &SqlParser, path: &Path) -> Result<Dxl> {
    let content = read_sql_file(path)?;
    let dxl = parser
        .parse(&content)
        .map_err(|e| anyhow::Error::new(e).context(format!("failed to parse {}", path.display())))?;
    debug!(path = %path.display(), ddl = dxl.ddl.len(), dml = dxl.dml.len(), "parsed sql file");
    Ok(dxl)
}

/// Parse multiple SQL files, concatenating their models in file order
pub fn parse_sql_files(parser: &SqlParser, files: &[PathBuf]) -> Result<Dxl> {
    let mut all = Dxl::new();

    if files.len() >= PARALLEL_THRESHOLD {
        let results: Vec<Result<Dxl>> = files
            .par_iter()
            .map(|file| parse_sql_file(parser, file))
            .collect();

        // Combine results, propagating the first error if any
        for result in results {
            all.extend(result?);
        }
    } else {
        for file in files {
            all.extend(parse_sql_file(parser, file)?);
        }
    }

    all.validate()?;
    Ok(all)
}
