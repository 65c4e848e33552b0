//! StoryVoice - 长篇故事语音合成服务
//!
//! 启动时显式构造所有客户端与配置对象，通过 Arc 传递

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use storyvoice::application::{EngineRegistry, LongAudioPipeline};
use storyvoice::config::{load_config, print_config, AppConfig};
use storyvoice::domain::synthesis::EngineKind;
use storyvoice::infrastructure::adapters::{
    CloudTtsClient, CloudTtsClientConfig, FakeTtsClient, FakeTtsClientConfig, GeminiTtsClient,
    GeminiTtsClientConfig, WavEncoder,
};
use storyvoice::infrastructure::events::EventPublisher;
use storyvoice::infrastructure::http::{AppState, HttpServer};
use storyvoice::infrastructure::memory::InMemoryJobManager;
use storyvoice::infrastructure::worker::{run_job_janitor, SynthesisWorker, SynthesisWorkerConfig};

/// 任务队列容量
const JOB_QUEUE_CAPACITY: usize = 256;

/// 过期任务清理周期
const JANITOR_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("StoryVoice - 长篇故事语音合成服务");
    print_config(&config);

    // 注册引擎
    let engines = Arc::new(build_engine_registry(&config)?);
    if engines.available().is_empty() {
        tracing::warn!("No TTS engine configured; synthesis requests will fail until an API key is set");
    }

    let pipeline = Arc::new(LongAudioPipeline::new(
        engines.clone(),
        config.synthesis.job_timeout(),
    ));
    let encoder = Arc::new(WavEncoder::new());

    // 创建事件发布器
    let event_publisher = Arc::new(EventPublisher::new());

    // 创建任务队列与任务管理器
    let (job_tx, job_rx) = mpsc::channel(JOB_QUEUE_CAPACITY);
    let job_manager = Arc::new(InMemoryJobManager::new(job_tx));

    // 启动 Worker
    let worker = SynthesisWorker::new(
        SynthesisWorkerConfig {
            max_concurrent: config.synthesis.max_concurrent_jobs,
        },
        job_rx,
        job_manager.clone(),
        pipeline.clone(),
        encoder.clone(),
        event_publisher.clone(),
    );
    tokio::spawn(worker.run());

    // 启动过期任务清理
    let shutdown = CancellationToken::new();
    tokio::spawn(run_job_janitor(
        job_manager.clone(),
        event_publisher.clone(),
        config.synthesis.job_retention(),
        std::time::Duration::from_secs(JANITOR_INTERVAL_SECS),
        shutdown.clone(),
    ));

    // 创建 HTTP 服务器
    let state = AppState::new(
        pipeline,
        encoder,
        job_manager,
        event_publisher,
        config.synthesis.max_text_chars,
    );
    let server = HttpServer::bind(&config.server, Arc::new(state)).await?;

    // 启动服务器（带优雅关闭）
    let signal_token = shutdown.clone();
    server
        .run_with_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
            signal_token.cancel();
        })
        .await?;

    shutdown.cancel();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},storyvoice={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

/// 按配置注册引擎
///
/// 没有 API Key 的引擎不注册，只保留能力配置供估算使用
fn build_engine_registry(config: &AppConfig) -> anyhow::Result<EngineRegistry> {
    let premium_profile = config.premium.engine_profile();
    let fast_profile = config.fast.engine_profile();

    if config.synthesis.use_fake_engines {
        tracing::warn!("Using fake TTS engines for both premium and fast");
        return Ok(EngineRegistry::new()
            .with_engine(
                Arc::new(FakeTtsClient::new(FakeTtsClientConfig::new(EngineKind::Premium))),
                premium_profile,
            )
            .with_engine(
                Arc::new(FakeTtsClient::new(FakeTtsClientConfig::new(EngineKind::Fast))),
                fast_profile,
            ));
    }

    let mut registry = EngineRegistry::new();

    match config.premium.api_key() {
        Some(api_key) => {
            let client_config = GeminiTtsClientConfig {
                api_key: api_key.to_string(),
                base_url: config.premium.base_url.clone(),
                model: config.premium.model.clone(),
                timeout_secs: config.premium.request_timeout_secs,
            };
            let client = GeminiTtsClient::new(client_config)
                .map_err(|e| anyhow::anyhow!("Failed to create premium engine client: {}", e))?;
            registry = registry.with_engine(Arc::new(client), premium_profile);
        }
        None => {
            tracing::warn!(engine = %EngineKind::Premium, "API key missing, engine disabled");
            registry = registry.with_profile(premium_profile);
        }
    }

    match config.fast.api_key() {
        Some(api_key) => {
            let client_config = CloudTtsClientConfig {
                api_key: api_key.to_string(),
                base_url: config.fast.base_url.clone(),
                default_language_code: config.fast.default_language_code.clone(),
                timeout_secs: config.fast.request_timeout_secs,
            };
            let client = CloudTtsClient::new(client_config)
                .map_err(|e| anyhow::anyhow!("Failed to create fast engine client: {}", e))?;
            registry = registry.with_engine(Arc::new(client), fast_profile);
        }
        None => {
            tracing::warn!(engine = %EngineKind::Fast, "API key missing, engine disabled");
            registry = registry.with_profile(fast_profile);
        }
    }

    Ok(registry)
}
