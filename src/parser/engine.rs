//! MySQL statement splitting and the parse pipeline entry point
//!
//! The source text is tokenized once with the sqlparser tokenizer and cut at
//! top-level semicolons. Each piece keeps its leading comment and a
//! normalized, comment-free rendering that is re-parsed into an AST.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::{Expr, OrderByExpr, Statement};
use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};
use tracing::{debug, trace};

use super::ddl::extract_ddl;
use super::dml::{extract_dml, extract_transaction};
use super::splitter::{split_units, Unit};
use crate::error::{Result, SqlGenError};
use crate::model::{Comment, Dxl};

static FN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^fn\s*:\s*([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid fn regex"));

/// One parsed statement with its source information
#[derive(Debug, Clone)]
pub struct StatementNode {
    pub statement: Statement,
    /// Comment-stripped, whitespace-collapsed text terminated by `;`
    pub text: String,
    /// Comment lines preceding the statement
    pub comment: Comment,
    /// Trailing `ORDER BY` items of an UPDATE
    pub order_by: Vec<OrderByExpr>,
    /// Trailing `LIMIT` of an UPDATE
    pub limit: Option<Expr>,
}

/// Reusable parser engine.
///
/// The engine holds no per-call state, so one instance can serve any number
/// of sequential `parse` calls and may be shared across threads.
#[derive(Debug)]
pub struct SqlParser {
    dialect: MySqlDialect,
}

impl Default for SqlParser {
    fn default() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }
}

impl SqlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse SQL text into a validated model
    pub fn parse(&self, sql: &str) -> Result<Dxl> {
        let nodes = self.split_statements(sql)?;
        debug!(statements = nodes.len(), "split statements");

        let units = split_units(nodes)?;
        let mut dxl = Dxl::new();
        for unit in &units {
            match unit {
                Unit::CreateTable(node) => {
                    let ddl = extract_ddl(node).map_err(|e| e.near(&node.text))?;
                    dxl.ddl.push(ddl);
                }
                Unit::Query(node) => dxl.dml.push(extract_dml(node)?),
                Unit::Transaction(transaction) => {
                    if transaction.has_nested_transaction() {
                        return Err(SqlGenError::UnsupportedNestedTransaction
                            .near(&transaction.begin.text));
                    }
                    if transaction.queries.is_empty() {
                        continue;
                    }
                    dxl.dml.push(extract_transaction(transaction)?);
                }
            }
        }

        dxl.validate()?;
        debug!(ddl = dxl.ddl.len(), dml = dxl.dml.len(), "parsed sql");
        Ok(dxl)
    }

    /// Cut SQL text into statements and parse each one
    pub fn split_statements(&self, sql: &str) -> Result<Vec<StatementNode>> {
        let tokens = Tokenizer::new(&self.dialect, sql).tokenize()?;

        let mut nodes = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        for token in tokens {
            if token == Token::SemiColon {
                if let Some(node) = self.build_node(&current)? {
                    nodes.push(node);
                }
                current.clear();
            } else {
                current.push(token);
            }
        }
        if let Some(node) = self.build_node(&current)? {
            nodes.push(node);
        }

        Ok(nodes)
    }

    fn build_node(&self, tokens: &[Token]) -> Result<Option<StatementNode>> {
        let normalized = normalize_tokens(tokens);
        if normalized.is_empty() {
            return Ok(None);
        }

        // The grammar rejects ORDER BY / LIMIT on UPDATE, so they are parsed apart
        let (head, tail) = match update_tail_start(tokens) {
            Some(at) => tokens.split_at(at),
            None => (tokens, &[][..]),
        };

        let head_text = format!("{};", normalize_tokens(head));
        let mut statements = Parser::parse_sql(&self.dialect, &head_text)?;
        if statements.len() != 1 {
            return Err(SqlGenError::Parse {
                message: format!(
                    "expected one statement, found {}: {}",
                    statements.len(),
                    head_text
                ),
            });
        }
        let (order_by, limit) = self.parse_update_tail(tail)?;

        let text = format!("{};", normalized);
        trace!(sql = %text, "parsed statement");

        Ok(Some(StatementNode {
            statement: statements.remove(0),
            text,
            comment: leading_comment(tokens),
            order_by,
            limit,
        }))
    }

    fn parse_update_tail(&self, tail: &[Token]) -> Result<(Vec<OrderByExpr>, Option<Expr>)> {
        let text = normalize_tokens(tail);
        if text.is_empty() {
            return Ok((Vec::new(), None));
        }

        let mut parser = Parser::new(&self.dialect).try_with_sql(&text)?;
        let order_by = if parser.parse_keywords(&[Keyword::ORDER, Keyword::BY]) {
            parser.parse_comma_separated(Parser::parse_order_by_expr)?
        } else {
            Vec::new()
        };
        let limit = if parser.parse_keyword(Keyword::LIMIT) {
            Some(parser.parse_expr()?)
        } else {
            None
        };
        if parser.peek_token().token != Token::EOF {
            return Err(SqlGenError::Parse {
                message: format!("unexpected trailing tokens in update: {}", text),
            });
        }
        Ok((order_by, limit))
    }
}

fn keyword(token: &Token) -> Option<Keyword> {
    match token {
        Token::Word(word) => Some(word.keyword),
        _ => None,
    }
}

/// Index of the top-level `ORDER BY` or `LIMIT` that ends an UPDATE statement
fn update_tail_start(tokens: &[Token]) -> Option<usize> {
    let mut significant = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !matches!(t, Token::Whitespace(_)));
    if keyword(significant.next()?.1) != Some(Keyword::UPDATE) {
        return None;
    }

    let mut depth = 0usize;
    let mut pending_order: Option<usize> = None;
    for (i, token) in significant {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            _ => match keyword(token) {
                Some(Keyword::BY) if pending_order.is_some() => return pending_order,
                Some(Keyword::ORDER) => {
                    pending_order = Some(i);
                    continue;
                }
                Some(Keyword::LIMIT) => return Some(i),
                _ => {}
            },
        }
        pending_order = None;
    }
    None
}

/// Render tokens without comments, collapsing whitespace runs to one space
fn normalize_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for token in tokens {
        if let Token::Whitespace(_) = token {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push_str(&token.to_string());
    }
    out
}

/// Collect the comments that precede the first non-whitespace token
fn leading_comment(tokens: &[Token]) -> Comment {
    let mut comment = Comment::default();
    let mut origin = Vec::new();
    for token in tokens {
        match token {
            Token::Whitespace(Whitespace::SingleLineComment { comment: text, prefix }) => {
                origin.push(format!("{}{}", prefix, text.trim_end()));
                comment.lines.push(text.trim().to_string());
            }
            Token::Whitespace(Whitespace::MultiLineComment(text)) => {
                origin.push(format!("/*{}*/", text));
                for line in text.lines() {
                    let line = line.trim().trim_start_matches('*').trim();
                    if !line.is_empty() {
                        comment.lines.push(line.to_string());
                    }
                }
            }
            Token::Whitespace(_) => {}
            _ => break,
        }
    }

    comment.origin_text = origin.join("\n");
    comment.func_name = comment
        .lines
        .iter()
        .find_map(|line| FN_NAME_RE.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    comment
}

/// Parse SQL text with a fresh engine
pub fn parse(sql: &str) -> Result<Dxl> {
    SqlParser::new().parse(sql)
}
