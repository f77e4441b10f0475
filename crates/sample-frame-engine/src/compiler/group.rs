//! 组形态编译器
//!
//! 组内的规则与子组构成一个有序项序列（先规则、后子组），
//! 严格从左到右折叠，不区分组合符优先级。

use super::leaf::compile_leaf;
use crate::error::{Result, StructuralError};
use crate::models::{CombinedTerm, ExpressionGroup};
use crate::predicate::{combine, CompiledPredicate};

/// 编译一个表达式组
///
/// 空组编译为恒真谓词。
pub fn compile_group(group: &ExpressionGroup) -> Result<CompiledPredicate> {
    compile_at(group, "root")
}

fn compile_at(group: &ExpressionGroup, path: &str) -> Result<CompiledPredicate> {
    if group.is_empty() {
        return Ok(CompiledPredicate::always());
    }

    let mut fold = Fold::default();

    let rules_path = format!("{}.rules", path);
    for (index, term) in group.rules.iter().enumerate() {
        let predicate = compile_leaf(&term.node)?;
        fold.push(predicate, term, &rules_path, index)?;
    }

    let groups_path = format!("{}.groups", path);
    for (index, term) in group.subgroups.iter().enumerate() {
        let predicate = compile_at(&term.node, &format!("{}[{}]", groups_path, index))?;
        fold.push(predicate, term, &groups_path, index)?;
    }

    Ok(fold.finish())
}

/// 左折叠累加器
#[derive(Default)]
struct Fold {
    acc: Option<CompiledPredicate>,
}

impl Fold {
    fn push<T>(
        &mut self,
        next: CompiledPredicate,
        term: &CombinedTerm<T>,
        context: &str,
        index: usize,
    ) -> Result<()> {
        let combined = match (self.acc.take(), term.combinator) {
            (None, None) => next,
            (Some(acc), Some(c)) => combine(acc, next, c),
            (None, Some(_)) => {
                return Err(StructuralError::LeadingCombinator {
                    context: context.to_string(),
                }
                .into());
            }
            (Some(_), None) => {
                return Err(StructuralError::MissingCombinator {
                    context: context.to_string(),
                    index,
                }
                .into());
            }
        };
        self.acc = Some(combined);
        Ok(())
    }

    fn finish(self) -> CompiledPredicate {
        self.acc.unwrap_or_else(CompiledPredicate::always)
    }
}
