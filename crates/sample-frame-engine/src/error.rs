//! 抽样框编译错误类型
//!
//! 编译是全有或全无的：任一叶子规则或结构出错，整棵树都不会产出谓词。

use crate::catalog::Field;
use crate::operators::Operator;
use thiserror::Error;

/// 操作符不在字段的合法操作符集合内
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("字段 {field} 不支持操作符 {operator}")]
pub struct ValidationError {
    pub field: Field,
    pub operator: Operator,
}

/// 原始值无法转换为字段的比较类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("字段 {field} 的 {operator} 值 '{raw}' 无效: {reason}")]
pub struct ParseError {
    pub field: Field,
    pub operator: Operator,
    pub raw: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(
        field: Field,
        operator: Operator,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field,
            operator,
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// 项序列或载荷结构错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("{context} 的第一项不能带组合符")]
    LeadingCombinator { context: String },

    #[error("{context} 的第 {index} 项缺少组合符")]
    MissingCombinator { context: String, index: usize },

    #[error("字段 {field} 的 {operator} 需要非空载荷")]
    EmptyPayload { field: Field, operator: Operator },

    #[error("子句链不能为空")]
    EmptyClauseChain,

    #[error("抽样框必须至少选择一个输出字段")]
    NoOutputFields,
}

/// 编译错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("规则校验失败: {0}")]
    Validation(#[from] ValidationError),

    #[error("规则值解析失败: {0}")]
    Parse(#[from] ParseError),

    #[error("规则结构错误: {0}")]
    Structural(#[from] StructuralError),
}

impl CompileError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
