//! 抽样框领域模型
//!
//! 规则树有两种持久化形态：
//! - `ExpressionGroup`：规则列表 + 子组列表的递归组形态
//! - `PredicateExpression`：二元节点或扁平子句链形态

use crate::catalog::Field;
use crate::operators::{Combinator, Operator};
use crate::value::RawValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// 叶子规则：一个字段、一个操作符、一个值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub field: Field,
    #[serde(alias = "operation")]
    pub operator: Operator,
    pub value: RawValue,
}

impl Rule {
    pub fn new(field: Field, operator: Operator, value: impl Into<RawValue>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }
}

/// 带组合符的项
///
/// 序列中第一项的组合符必须为 `None`，其后每一项都必须为 `Some`，
/// 表示与前面已累积结果的组合方式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedTerm<T> {
    #[serde(rename = "predicate", alias = "node")]
    pub node: T,
    #[serde(
        rename = "comparison",
        alias = "combinator",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub combinator: Option<Combinator>,
}

impl<T> CombinedTerm<T> {
    /// 序列首项
    pub fn first(node: T) -> Self {
        Self {
            node,
            combinator: None,
        }
    }

    /// 后续项
    pub fn then(combinator: Combinator, node: T) -> Self {
        Self {
            node,
            combinator: Some(combinator),
        }
    }
}

/// 组形态规则树
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionGroup {
    #[serde(default)]
    pub rules: Vec<CombinedTerm<Rule>>,
    #[serde(rename = "groups", alias = "subgroups", default)]
    pub subgroups: Vec<CombinedTerm<ExpressionGroup>>,
}

impl ExpressionGroup {
    pub fn new(
        rules: Vec<CombinedTerm<Rule>>,
        subgroups: Vec<CombinedTerm<ExpressionGroup>>,
    ) -> Self {
        Self { rules, subgroups }
    }

    pub fn of_rules(rules: Vec<CombinedTerm<Rule>>) -> Self {
        Self::new(rules, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.subgroups.is_empty()
    }

    /// 规则树中引用的全部字段
    pub fn referenced_fields(&self) -> BTreeSet<Field> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, fields: &mut BTreeSet<Field>) {
        fields.extend(self.rules.iter().map(|t| t.node.field));
        for group in &self.subgroups {
            group.node.collect_fields(fields);
        }
    }

    /// 叶子规则总数（含子组）
    pub fn rule_count(&self) -> usize {
        self.rules.len()
            + self
                .subgroups
                .iter()
                .map(|g| g.node.rule_count())
                .sum::<usize>()
    }
}

/// 扁平形态规则树
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateExpression {
    /// 子句链，AND 族优先于 OR 族
    Clauses {
        clauses: Vec<CombinedTerm<PredicateExpression>>,
    },
    /// 二元节点
    Binary {
        left: Box<PredicateExpression>,
        right: Box<PredicateExpression>,
        #[serde(rename = "comparison", alias = "combinator")]
        combinator: Combinator,
    },
    /// 叶子规则
    Rule(Rule),
}

impl PredicateExpression {
    pub fn rule(rule: Rule) -> Self {
        Self::Rule(rule)
    }

    pub fn binary(left: PredicateExpression, combinator: Combinator, right: PredicateExpression) -> Self {
        Self::Binary {
            left: Box::new(left),
            right: Box::new(right),
            combinator,
        }
    }

    pub fn chain(clauses: Vec<CombinedTerm<PredicateExpression>>) -> Self {
        Self::Clauses { clauses }
    }

    pub fn referenced_fields(&self) -> BTreeSet<Field> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, fields: &mut BTreeSet<Field>) {
        match self {
            Self::Rule(rule) => {
                fields.insert(rule.field);
            }
            Self::Binary { left, right, .. } => {
                left.collect_fields(fields);
                right.collect_fields(fields);
            }
            Self::Clauses { clauses } => {
                for clause in clauses {
                    clause.node.collect_fields(fields);
                }
            }
        }
    }
}

/// 抽样框定义：过滤规则树 + 有序输出字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleFrame {
    pub id: String,
    pub name: String,
    pub predicate: ExpressionGroup,
    pub fields: Vec<Field>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl SampleFrame {
    pub fn new(name: impl Into<String>, predicate: ExpressionGroup, fields: Vec<Field>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            predicate,
            fields,
            created_at: Utc::now(),
        }
    }
}
