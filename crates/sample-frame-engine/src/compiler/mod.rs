//! 规则树编译器
//!
//! 把持久化的规则树一次性编译成可重复求值的谓词闭包。
//! 任何叶子校验、解析或结构错误都会使整棵树编译失败，不产生部分结果。

mod expression;
mod group;
mod leaf;

pub use expression::compile_expr;
pub use group::compile_group;
pub use leaf::compile_leaf;

use crate::catalog::Field;
use crate::error::{Result, StructuralError};
use crate::models::SampleFrame;
use crate::predicate::CompiledPredicate;
use std::collections::BTreeSet;
use tracing::debug;

/// 编译后的抽样框
#[derive(Debug, Clone)]
pub struct CompiledFrame {
    /// 原始抽样框定义
    pub frame: SampleFrame,
    /// 过滤谓词
    pub predicate: CompiledPredicate,
    /// 规则树中引用的字段（用于记录源按需加载）
    pub required_fields: BTreeSet<Field>,
    /// 编译版本号
    pub compile_version: u64,
}

impl CompiledFrame {
    pub fn id(&self) -> &str {
        &self.frame.id
    }

    pub fn name(&self) -> &str {
        &self.frame.name
    }

    /// 有序输出字段
    pub fn fields(&self) -> &[Field] {
        &self.frame.fields
    }
}

/// 抽样框编译器
pub struct FrameCompiler {
    compile_version: u64,
}

impl FrameCompiler {
    pub fn new() -> Self {
        Self { compile_version: 0 }
    }

    /// 编译抽样框
    pub fn compile(&mut self, frame: SampleFrame) -> Result<CompiledFrame> {
        if frame.fields.is_empty() {
            return Err(StructuralError::NoOutputFields.into());
        }

        let predicate = compile_group(&frame.predicate)?;
        let required_fields = frame.predicate.referenced_fields();

        self.compile_version += 1;
        debug!(
            frame_id = %frame.id,
            rules = frame.predicate.rule_count(),
            required_fields = required_fields.len(),
            version = self.compile_version,
            "抽样框编译完成"
        );

        Ok(CompiledFrame {
            frame,
            predicate,
            required_fields,
            compile_version: self.compile_version,
        })
    }

    /// 单独编译过滤谓词
    pub fn compile_predicate(&self, frame: &SampleFrame) -> Result<CompiledPredicate> {
        compile_group(&frame.predicate)
    }
}

impl Default for FrameCompiler {
    fn default() -> Self {
        Self::new()
    }
}
