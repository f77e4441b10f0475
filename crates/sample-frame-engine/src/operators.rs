//! 规则操作符与组合符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operator {
    // 相等比较
    Equal,
    NotEqual,

    // 有序比较
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,

    // 列表成员
    InList,
    NotInList,

    // 闭区间
    InRange,
    NotInRange,

    // 子串（仅字符串字段）
    Contains,
    DoesNotContain,
}

impl Operator {
    pub const ALL: [Operator; 12] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::InList,
        Self::NotInList,
        Self::InRange,
        Self::NotInRange,
        Self::Contains,
        Self::DoesNotContain,
    ];

    /// 操作符要求的值形态
    pub fn shape(self) -> ValueShape {
        match self {
            Self::InList | Self::NotInList => ValueShape::List,
            Self::InRange | Self::NotInRange => ValueShape::Range,
            _ => ValueShape::Scalar,
        }
    }

    /// 否定型操作符：字段缺失时求值为 true
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            Self::NotEqual | Self::NotInList | Self::NotInRange | Self::DoesNotContain
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::InList => "InList",
            Self::NotInList => "NotInList",
            Self::InRange => "InRange",
            Self::NotInRange => "NotInRange",
            Self::Contains => "Contains",
            Self::DoesNotContain => "DoesNotContain",
        };
        write!(f, "{}", s)
    }
}

/// 值形态：标量、列表或 (low, high) 区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Scalar,
    List,
    Range,
}

/// 两个谓词之间的布尔组合符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    And,
    Or,
    AndNot,
    OrNot,
}

impl Combinator {
    pub const ALL: [Combinator; 4] = [Self::And, Self::Or, Self::AndNot, Self::OrNot];

    /// AND 族比 OR 族绑定更紧
    pub fn binds_tight(self) -> bool {
        matches!(self, Self::And | Self::AndNot)
    }

    /// 直接对两个布尔值求值
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
            Self::AndNot => left && !right,
            Self::OrNot => left || !right,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::AndNot => write!(f, "AND NOT"),
            Self::OrNot => write!(f, "OR NOT"),
        }
    }
}
