use anyhow::Context;
use carta_connector::core::ConfigProvider;
use carta_connector::utils::error::ErrorSeverity;
use carta_connector::utils::{logger, validation::Validate};
use carta_connector::{CliConfig, LocalStorage, SyncEngine, SyncPipeline, TomlConfig};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = CliConfig::parse();

    match cli.config.clone() {
        Some(path) => {
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load config file '{}'", path))?;
            init_logging(cli.verbose || config.verbose(), cli.json_logs || config.json_logs());
            tracing::info!("📁 Loaded configuration from: {}", path);
            Ok(run_sync(config).await)
        }
        None => {
            init_logging(cli.verbose, cli.json_logs);
            tracing::debug!("CLI config: {:?}", cli);
            Ok(run_sync(cli).await)
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    if json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }
}

async fn run_sync<C: ConfigProvider + Validate>(config: C) -> ExitCode {
    tracing::info!("Starting carta-connector against {}", config.base_url());

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        return ExitCode::from(1);
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = match SyncPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("❌ Failed to build connector: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            return ExitCode::from(1);
        }
    };

    let engine = SyncEngine::new(pipeline);
    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Sync completed successfully!");
            println!("✅ Sync completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            ExitCode::from(exit_code)
        }
    }
}
