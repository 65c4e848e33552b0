//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "STORYVOICE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `STORYVOICE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值（见 types.rs）
///
/// # 环境变量示例
/// - `STORYVOICE_SERVER__PORT=8080`
/// - `STORYVOICE_PREMIUM__API_KEY=...`
/// - `STORYVOICE_FAST__CHUNK_SIZE=2000`
/// - `STORYVOICE_SYNTHESIS__USE_FAKE_ENGINES=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 添加配置文件（缺省值由 serde default 提供）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 2. 添加环境变量（最高优先级）
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
///
/// 缺少 API Key 不算错误，对应引擎只是不可用
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    for (name, pacing) in [
        ("premium", config.premium.pacing()),
        ("fast", config.fast.pacing()),
    ] {
        if pacing.chunk_size == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.chunk_size must be greater than 0",
                name
            )));
        }
        if pacing.max_attempts == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{}.max_attempts must be at least 1",
                name
            )));
        }
    }

    if config.synthesis.job_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "synthesis.job_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if config.synthesis.max_concurrent_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "synthesis.max_concurrent_jobs must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!(
        "Premium engine: model={}, api_key={}, chunk_size={}, max_attempts={}",
        config.premium.model,
        if config.premium.api_key().is_some() { "set" } else { "missing" },
        config.premium.chunk_size,
        config.premium.max_attempts
    );
    tracing::info!(
        "Fast engine: api_key={}, chunk_size={}, max_attempts={}",
        if config.fast.api_key().is_some() { "set" } else { "missing" },
        config.fast.chunk_size,
        config.fast.max_attempts
    );
    tracing::info!("Fake engines: {}", config.synthesis.use_fake_engines);
    tracing::info!("Max text chars: {}", config.synthesis.max_text_chars);
    tracing::info!("Job timeout: {}s", config.synthesis.job_timeout_secs);
    tracing::info!("Max concurrent jobs: {}", config.synthesis.max_concurrent_jobs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
