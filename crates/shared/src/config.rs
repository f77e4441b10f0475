//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "STATREG";

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 抽样框预览配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SampleFrameConfig {
    /// 未显式指定时返回的匹配行数
    pub preview_limit: usize,
    /// 单次预览最多扫描的记录数，0 表示不限制
    pub scan_limit: usize,
}

impl Default for SampleFrameConfig {
    fn default() -> Self {
        Self {
            preview_limit: 100,
            scan_limit: 1_000_000,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
    pub sample_frame: SampleFrameConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "sample-frame".to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            sample_frame: SampleFrameConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（STATREG_ 前缀，段之间用双下划线，
    ///    如 STATREG_SAMPLE_FRAME__PREVIEW_LIMIT -> sample_frame.preview_limit）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var(format!("{}_ENV", ENV_PREFIX))
            .unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(service_name, &env, Path::new(&config_dir))
    }

    /// 从指定目录加载配置
    pub fn load_from(service_name: &str, env: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
