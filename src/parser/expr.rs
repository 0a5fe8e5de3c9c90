//! Conversion of sqlparser expressions into clauses, projections and sort keys

use std::ops::ControlFlow;

use sqlparser::ast::{
    visit_expressions, BinaryOperator, DuplicateTreatment, Expr, Function, FunctionArg,
    FunctionArgExpr, FunctionArguments, GroupByExpr, Offset, OrderByExpr, SelectItem,
    UnaryOperator,
};

use crate::error::{Result, SqlGenError};
use crate::model::{
    AggregateFunc, ByItem, Clause, CompareOp, Comparison, Limit, LimitValue, SelectField,
};

fn is_placeholder(expr: &Expr) -> bool {
    matches!(expr, Expr::Value(_)) && expr.to_string() == "?"
}

fn has_placeholder(expr: &Expr) -> bool {
    visit_expressions(expr, |e| {
        if is_placeholder(e) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .is_break()
}

fn has_subquery(expr: &Expr) -> bool {
    visit_expressions(expr, |e| match e {
        Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. } => ControlFlow::Break(()),
        _ => ControlFlow::Continue(()),
    })
    .is_break()
}

fn unsupported(expr: &Expr) -> SqlGenError {
    SqlGenError::UnsupportedExpression {
        expr: expr.to_string(),
    }
}

/// Column name of a plain or qualified identifier
pub fn column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => Some(ident.value.clone()),
        Expr::CompoundIdentifier(parts) => parts.last().map(|i| i.value.clone()),
        Expr::Nested(inner) => column_name(inner),
        _ => None,
    }
}

/// Recognize `COUNT(*)`, `SUM(col)`, `COUNT(DISTINCT col)` and friends.
///
/// Returns the function, its argument column and the DISTINCT flag.
fn aggregate_call(func: &Function) -> Option<(AggregateFunc, Option<String>, bool)> {
    let aggregate = AggregateFunc::from_name(&func.name.to_string())?;
    let list = match &func.args {
        FunctionArguments::List(list) => list,
        _ => return None,
    };
    // ORDER BY / LIMIT / SEPARATOR inside the call
    if !list.clauses.is_empty() {
        return None;
    }
    let distinct = matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct));
    match list.args.as_slice() {
        [FunctionArg::Unnamed(FunctionArgExpr::Wildcard)] if !distinct => {
            Some((aggregate, None, false))
        }
        [FunctionArg::Unnamed(FunctionArgExpr::Expr(arg))] => {
            if is_count_literal(aggregate, arg) {
                return (!distinct).then_some((aggregate, None, false));
            }
            column_name(arg).map(|c| (aggregate, Some(c), distinct))
        }
        _ => None,
    }
}

/// `COUNT(1)` counts rows like `COUNT(*)`
fn is_count_literal(aggregate: AggregateFunc, arg: &Expr) -> bool {
    aggregate == AggregateFunc::Count && matches!(arg, Expr::Value(_)) && !is_placeholder(arg)
}

/// Left-hand side of a comparison leaf
fn comparison(lhs: &Expr, op: CompareOp, table: &str, whole: &Expr) -> Result<Clause> {
    if let Expr::Function(func) = lhs {
        let (aggregate, argument, distinct) =
            aggregate_call(func).ok_or_else(|| unsupported(whole))?;
        return Ok(Clause::Comparison(Comparison::aggregate(
            aggregate, argument, distinct, op, table,
        )));
    }
    let column = column_name(lhs).ok_or_else(|| unsupported(whole))?;
    Ok(Clause::Comparison(Comparison::new(column, op, table)))
}

fn compare_op(op: &BinaryOperator) -> Option<CompareOp> {
    Some(match op {
        BinaryOperator::Eq => CompareOp::Eq,
        BinaryOperator::GtEq => CompareOp::Ge,
        BinaryOperator::Gt => CompareOp::Gt,
        BinaryOperator::LtEq => CompareOp::Le,
        BinaryOperator::Lt => CompareOp::Lt,
        BinaryOperator::NotEq => CompareOp::Ne,
        _ => return None,
    })
}

/// Convert a WHERE or HAVING expression into a clause tree.
///
/// Predicates without placeholders are kept as raw text. Every placeholder
/// must sit on the right of a column (or aggregate) comparison.
pub fn extract_clause(expr: &Expr, table: &str) -> Result<Clause> {
    if has_subquery(expr) {
        return Err(SqlGenError::UnsupportedNestedQuery);
    }
    convert(expr, table)
}

fn convert(expr: &Expr, table: &str) -> Result<Clause> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => return Ok(Clause::and(convert(left, table)?, convert(right, table)?)),
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Or,
            right,
        } => return Ok(Clause::or(convert(left, table)?, convert(right, table)?)),
        Expr::Nested(inner) => return Ok(Clause::parentheses(convert(inner, table)?)),
        _ => {}
    }

    if !has_placeholder(expr) {
        return Ok(Clause::Raw(expr.to_string()));
    }

    match expr {
        Expr::BinaryOp { left, op, right } if is_placeholder(right) => {
            let op = compare_op(op).ok_or_else(|| unsupported(expr))?;
            comparison(left, op, table, expr)
        }
        Expr::Like {
            negated,
            expr: lhs,
            pattern,
            ..
        } if is_placeholder(pattern) => {
            let op = if *negated {
                CompareOp::NotLike
            } else {
                CompareOp::Like
            };
            comparison(lhs, op, table, expr)
        }
        Expr::InList {
            expr: lhs,
            list,
            negated,
        } if !list.is_empty() && list.iter().all(is_placeholder) => {
            let op = if *negated {
                CompareOp::NotIn
            } else {
                CompareOp::In
            };
            comparison(lhs, op, table, expr)
        }
        Expr::Between {
            expr: lhs,
            negated,
            low,
            high,
        } if is_placeholder(low) && is_placeholder(high) => {
            let op = if *negated {
                CompareOp::NotBetween
            } else {
                CompareOp::Between
            };
            comparison(lhs, op, table, expr)
        }
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr: inner,
        } => match strip_nested(inner) {
            Expr::BinaryOp {
                left,
                op: BinaryOperator::Eq,
                right,
            } if is_placeholder(right) => comparison(left, CompareOp::Not, table, expr),
            _ => Err(unsupported(expr)),
        },
        _ => Err(unsupported(expr)),
    }
}

fn strip_nested(expr: &Expr) -> &Expr {
    match expr {
        Expr::Nested(inner) => strip_nested(inner),
        other => other,
    }
}

/// Convert a SELECT projection
pub fn extract_projection(items: &[SelectItem]) -> Result<Vec<SelectField>> {
    items
        .iter()
        .map(|item| match item {
            SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..) => Ok(SelectField::Wildcard),
            SelectItem::UnnamedExpr(expr) => select_field(expr, None),
            SelectItem::ExprWithAlias { expr, alias } => {
                select_field(expr, Some(alias.value.clone()))
            }
        })
        .collect()
}

fn select_field(expr: &Expr, alias: Option<String>) -> Result<SelectField> {
    if let Expr::Function(func) = expr {
        let (func, argument, distinct) = aggregate_call(func).ok_or_else(|| unsupported(expr))?;
        return Ok(SelectField::Aggregate {
            func,
            argument,
            distinct,
            alias,
        });
    }
    let name = column_name(expr).ok_or_else(|| unsupported(expr))?;
    Ok(SelectField::Column { name, alias })
}

pub fn extract_order_by(items: &[OrderByExpr]) -> Result<Vec<ByItem>> {
    items
        .iter()
        .map(|item| {
            let column = column_name(&item.expr).ok_or_else(|| unsupported(&item.expr))?;
            Ok(ByItem {
                column,
                desc: item.asc == Some(false),
            })
        })
        .collect()
}

pub fn extract_group_by(group_by: &GroupByExpr) -> Result<Vec<String>> {
    match group_by {
        GroupByExpr::Expressions(exprs, _) => exprs
            .iter()
            .map(|e| column_name(e).ok_or_else(|| unsupported(e)))
            .collect(),
        GroupByExpr::All(_) => Err(SqlGenError::UnsupportedExpression {
            expr: "GROUP BY ALL".to_string(),
        }),
    }
}

fn limit_value(expr: &Expr) -> Result<LimitValue> {
    if is_placeholder(expr) {
        return Ok(LimitValue::Placeholder);
    }
    expr.to_string()
        .parse::<u64>()
        .map(LimitValue::Count)
        .map_err(|_| unsupported(expr))
}

/// Build a limit from LIMIT / OFFSET expressions, `LIMIT a, b` already split by the parser
pub fn extract_limit(limit: Option<&Expr>, offset: Option<&Offset>) -> Result<Option<Limit>> {
    let Some(count) = limit else {
        return Ok(None);
    };
    let offset = offset.map(|o| limit_value(&o.value)).transpose()?;
    Ok(Some(Limit {
        count: limit_value(count)?,
        offset,
    }))
}
