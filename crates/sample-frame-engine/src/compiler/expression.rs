//! 扁平形态编译器
//!
//! 子句链采用两遍合并：
//! 1. 把由 `And` / `AndNot` 连接的相邻子句合并成一段
//! 2. 以 `Or` / `OrNot` 为边界从左到右折叠各段
//!
//! 因此 `A OrNot B And C` 求值为 `A ∨ ¬(B ∧ C)`。

use super::leaf::compile_leaf;
use crate::error::{Result, StructuralError};
use crate::models::{CombinedTerm, PredicateExpression};
use crate::operators::Combinator;
use crate::predicate::{combine, CompiledPredicate};

/// 编译一个谓词表达式
pub fn compile_expr(expr: &PredicateExpression) -> Result<CompiledPredicate> {
    match expr {
        PredicateExpression::Rule(rule) => compile_leaf(rule),
        PredicateExpression::Binary {
            left,
            right,
            combinator,
        } => {
            let left = compile_expr(left)?;
            let right = compile_expr(right)?;
            Ok(combine(left, right, *combinator))
        }
        PredicateExpression::Clauses { clauses } => compile_chain(clauses),
    }
}

/// 一段已合并的 AND 族子句，以及它后面的 OR 族边界
struct Run {
    predicate: CompiledPredicate,
    boundary: Option<Combinator>,
}

fn compile_chain(clauses: &[CombinedTerm<PredicateExpression>]) -> Result<CompiledPredicate> {
    let (first, rest) = clauses
        .split_first()
        .ok_or(StructuralError::EmptyClauseChain)?;

    if first.combinator.is_some() {
        return Err(StructuralError::LeadingCombinator {
            context: "clauses".to_string(),
        }
        .into());
    }

    let head = compile_expr(&first.node)?;
    if rest.is_empty() {
        return Ok(head);
    }

    let mut tail = Vec::with_capacity(rest.len());
    for (offset, term) in rest.iter().enumerate() {
        let combinator = term.combinator.ok_or_else(|| StructuralError::MissingCombinator {
            context: "clauses".to_string(),
            index: offset + 1,
        })?;
        tail.push((combinator, compile_expr(&term.node)?));
    }

    fold_runs(merge_runs(head, tail))
}

/// 第一遍：合并紧结合的 `And` / `AndNot` 段
fn merge_runs(head: CompiledPredicate, tail: Vec<(Combinator, CompiledPredicate)>) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current = head;

    for (combinator, next) in tail {
        if combinator.binds_tight() {
            current = combine(current, next, combinator);
        } else {
            runs.push(Run {
                predicate: current,
                boundary: Some(combinator),
            });
            current = next;
        }
    }

    runs.push(Run {
        predicate: current,
        boundary: None,
    });
    runs
}

/// 第二遍：在 `Or` / `OrNot` 边界上左折叠
fn fold_runs(runs: Vec<Run>) -> Result<CompiledPredicate> {
    let mut runs = runs.into_iter();
    let Some(Run {
        predicate: mut acc,
        boundary: mut pending,
    }) = runs.next()
    else {
        return Err(StructuralError::EmptyClauseChain.into());
    };

    for (index, run) in runs.enumerate() {
        let combinator = pending.ok_or_else(|| StructuralError::MissingCombinator {
            context: "clauses".to_string(),
            index: index + 1,
        })?;
        acc = combine(acc, run.predicate, combinator);
        pending = run.boundary;
    }

    Ok(acc)
}
