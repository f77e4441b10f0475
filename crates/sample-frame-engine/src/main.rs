//! 抽样框预览工具
//!
//! 读取抽样框定义和统计单位记录，输出匹配记录的投影行（每行一个 JSON 对象）。

use anyhow::{Context, Result};
use clap::Parser;
use registry_shared::config::AppConfig;
use registry_shared::observability;
use sample_frame::{SampleFrame, SampleFrameExecutor, StatUnit};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const SERVICE_NAME: &str = "sample-frame";

#[derive(Parser)]
#[command(name = "sample-frame", version, about = "Preview the units selected by a sample frame")]
struct Cli {
    /// 抽样框定义（JSON）
    #[arg(long)]
    frame: PathBuf,

    /// 统计单位记录（JSON 数组）
    #[arg(long)]
    records: PathBuf,

    /// 最多输出的匹配行数，默认取配置中的 preview_limit
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    observability::init(&config.service_name, &config.observability)?;

    let frame: SampleFrame = read_json(&cli.frame).context("无法解析抽样框定义")?;
    let records: Vec<StatUnit> = read_json(&cli.records).context("无法解析统计单位记录")?;
    info!(
        frame = %frame.name,
        records = records.len(),
        "已加载抽样框与记录"
    );

    let limit = cli.limit.unwrap_or(config.sample_frame.preview_limit);
    let executor = SampleFrameExecutor::new().with_scan_limit(config.sample_frame.scan_limit);
    let result = executor
        .preview(&frame, records.iter(), limit)
        .with_context(|| format!("抽样框 {} 编译失败", frame.id))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &result.rows {
        serde_json::to_writer(&mut out, row)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        scanned = result.stats.scanned,
        matched = result.stats.matched,
        scan_limit_reached = result.stats.scan_limit_reached,
        "预览完成"
    );

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("无法读取文件 {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}
