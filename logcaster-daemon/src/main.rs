mod cli;

use anyhow::Result;
use clap::Parser;

use logcaster_core::config::LogcasterConfig;
use logcaster_daemon::logging;
use logcaster_daemon::orchestrator::Orchestrator;

use crate::cli::DaemonCli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = DaemonCli::parse();

    // 설정 로드 (파일 + 환경 변수 오버라이드)
    let mut config = LogcasterConfig::load(&args.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", args.config.display(), e))?;

    // CLI 플래그가 설정 파일과 환경 변수보다 우선
    if let Some(level) = args.log_level {
        config.general.log_level = level;
    }
    if let Some(format) = args.log_format {
        config.general.log_format = format;
    }
    if let Some(pid_file) = args.pid_file {
        config.general.pid_file = pid_file;
    }

    if args.validate {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        println!("configuration OK: {}", args.config.display());
        return Ok(());
    }

    logging::init_tracing(&config.general)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "logcaster-daemon starting"
    );

    let mut orchestrator = Orchestrator::build_from_config(config).await?;
    orchestrator.run().await?;

    tracing::info!("logcaster-daemon shut down");
    Ok(())
}
