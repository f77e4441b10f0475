//! 抽样框规则引擎
//!
//! 把用户定义的统计单位过滤规则树编译为可重复求值的谓词：
//! - 字段/操作符目录与合法性校验
//! - 规则值解析（列表、区间、日期、数值）
//! - 组形态与扁平子句链形态的规则树编译
//! - 抽样框预览执行

pub mod catalog;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod models;
pub mod operators;
pub mod predicate;
pub mod record;
pub mod value;

pub use catalog::{ComparisonType, Field, CATALOG_VERSION};
pub use compiler::{compile_expr, compile_group, compile_leaf, CompiledFrame, FrameCompiler};
pub use error::{CompileError, ParseError, Result, StructuralError, ValidationError};
pub use executor::{PreviewResult, Row, SampleFrameExecutor, ScanStats};
pub use models::{CombinedTerm, ExpressionGroup, PredicateExpression, Rule, SampleFrame};
pub use operators::{Combinator, Operator, ValueShape};
pub use predicate::{combine, CompiledPredicate};
pub use record::{FieldRef, Record, StatUnit};
pub use value::{RawValue, Scalar, Value};
