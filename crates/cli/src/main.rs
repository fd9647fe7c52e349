//! # Channel Writer CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 通过 channel writer 发布消息
//! - 文档拉取
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod shutdown;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use contracts::ObservabilitySettings;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_fetch, run_publish, run_validate};
use observability::{LogFormat, ObservabilityConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logging follows the config file's [observability] section; CLI flags win
    let settings = load_observability_settings(cli.command.config_path());
    observability::init_with_config(observability_config(&cli, settings.as_ref()))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Channel Writer CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Publish(args) => run_publish(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Fetch(args) => run_fetch(args).await,
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Observability section of the config file, if it loads
///
/// Load errors are left for the command itself to report.
fn load_observability_settings(path: &Path) -> Option<ObservabilitySettings> {
    config_loader::ConfigLoader::load_from_path(path)
        .ok()
        .map(|config| config.observability)
}

/// Merge config file settings with CLI options
///
/// Metrics stay off here; `publish` starts the exporter itself.
fn observability_config(cli: &Cli, settings: Option<&ObservabilitySettings>) -> ObservabilityConfig {
    let mut config = settings.map(ObservabilityConfig::from).unwrap_or_default();
    config.metrics_port = None;

    if cli.quiet {
        config.default_log_level = "warn".to_string();
    } else if cli.verbose > 0 {
        config.default_log_level = if cli.verbose == 1 { "debug" } else { "trace" }.to_string();
    }

    if let Some(format) = &cli.log_format {
        config.log_format = match format {
            cli::LogFormat::Json => LogFormat::Json,
            cli::LogFormat::Pretty => LogFormat::Pretty,
            cli::LogFormat::Compact => LogFormat::Compact,
        };
    }

    config
}
