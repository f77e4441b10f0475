//! 编译后的谓词与组合器
//!
//! `CompiledPredicate` 只捕获不可变数据（解析后的值和嵌套闭包），
//! 可以跨线程共享，对不同记录并发调用。

use crate::operators::Combinator;
use crate::record::Record;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&dyn Record) -> bool + Send + Sync;

/// 编译器的唯一输出：`Record -> bool`
#[derive(Clone)]
pub struct CompiledPredicate {
    inner: Arc<PredicateFn>,
}

impl CompiledPredicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Record) -> bool + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// 恒真谓词：空组不排除任何记录
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// 对一条记录求值
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        (self.inner)(record)
    }

    pub(crate) fn eval(&self, record: &dyn Record) -> bool {
        (self.inner)(record)
    }
}

impl fmt::Debug for CompiledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompiledPredicate")
    }
}

/// 用组合符组合两个谓词，从左到右短路求值
pub fn combine(a: CompiledPredicate, b: CompiledPredicate, c: Combinator) -> CompiledPredicate {
    match c {
        Combinator::And => CompiledPredicate::new(move |r| a.eval(r) && b.eval(r)),
        Combinator::Or => CompiledPredicate::new(move |r| a.eval(r) || b.eval(r)),
        Combinator::AndNot => CompiledPredicate::new(move |r| a.eval(r) && !b.eval(r)),
        Combinator::OrNot => CompiledPredicate::new(move |r| a.eval(r) || !b.eval(r)),
    }
}
