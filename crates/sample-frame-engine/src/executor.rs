//! 抽样框执行器
//!
//! 对记录流惰性求值编译后的谓词，把匹配记录投影到输出字段。

use crate::catalog::Field;
use crate::compiler::{CompiledFrame, FrameCompiler};
use crate::error::Result;
use crate::models::SampleFrame;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// 投影后的一行输出
pub type Row = BTreeMap<Field, String>;

/// 扫描统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// 已读取的记录数
    pub scanned: usize,
    /// 匹配并输出的记录数
    pub matched: usize,
    /// 是否因达到扫描上限而提前停止
    pub scan_limit_reached: bool,
    pub elapsed_ms: i64,
}

/// 预览结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResult {
    pub frame_id: String,
    pub frame_name: String,
    pub rows: Vec<Row>,
    pub stats: ScanStats,
}

/// 抽样框执行器
pub struct SampleFrameExecutor {
    /// 单次预览最多读取的记录数
    scan_limit: usize,
}

impl SampleFrameExecutor {
    pub fn new() -> Self {
        Self {
            scan_limit: usize::MAX,
        }
    }

    /// 设置扫描上限，0 表示不限制
    pub fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = if scan_limit == 0 { usize::MAX } else { scan_limit };
        self
    }

    /// 编译抽样框并预览前 `limit` 条匹配记录
    #[instrument(skip(self, frame, records), fields(frame_id = %frame.id, frame_name = %frame.name))]
    pub fn preview<I>(&self, frame: &SampleFrame, records: I, limit: usize) -> Result<PreviewResult>
    where
        I: IntoIterator,
        I::Item: Record,
    {
        let compiled = FrameCompiler::new().compile(frame.clone())?;
        Ok(self.execute(&compiled, records, limit))
    }

    /// 在已编译的抽样框上执行扫描
    pub fn execute<I>(&self, compiled: &CompiledFrame, records: I, limit: usize) -> PreviewResult
    where
        I: IntoIterator,
        I::Item: Record,
    {
        let start = Instant::now();
        let mut rows = Vec::new();
        let mut stats = ScanStats::default();

        if limit > 0 {
            for record in records {
                if stats.scanned >= self.scan_limit {
                    stats.scan_limit_reached = true;
                    break;
                }
                stats.scanned += 1;

                if compiled.predicate.matches(&record) {
                    rows.push(project(compiled.fields(), &record));
                    if rows.len() >= limit {
                        break;
                    }
                }
            }
        }

        stats.matched = rows.len();
        stats.elapsed_ms = start.elapsed().as_millis() as i64;

        if stats.scan_limit_reached {
            warn!(
                "扫描达到上限 {}，仅返回 {} 条匹配记录",
                self.scan_limit, stats.matched
            );
        }
        info!(
            scanned = stats.scanned,
            matched = stats.matched,
            elapsed_ms = stats.elapsed_ms,
            "抽样框预览完成: {}",
            compiled.id()
        );

        PreviewResult {
            frame_id: compiled.id().to_string(),
            frame_name: compiled.name().to_string(),
            rows,
            stats,
        }
    }
}

impl Default for SampleFrameExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// 按输出字段投影一条记录
fn project<R: Record>(fields: &[Field], record: &R) -> Row {
    let row: Row = fields.iter().map(|f| (*f, record.display(*f))).collect();
    debug!(columns = row.len(), "记录已投影");
    row
}
