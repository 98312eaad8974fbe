//! # kinetrace CLI
//!
//! 命令行入口：解析参数，初始化日志，分派子命令。
//!
//! - `capture`  实时录制一段动作并处理
//! - `process`  离线生成并处理动作
//! - `export`   存档导出 (TRC / 序列日志 / 肢体报告)
//! - `validate` / `info`  配置检查与模型信息

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::{error, info};

use cli::{Cli, Commands};
use commands::{run_capture, run_export, run_info, run_process, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let logging =
        ObservabilityConfig::from_verbosity(cli.verbose, cli.quiet).with_format(cli.log_format.into());
    observability::init_with_config(logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "kinetrace starting");

    let result = match &cli.command {
        Commands::Capture(args) => run_capture(args).await,
        Commands::Process(args) => run_process(args),
        Commands::Export(args) => run_export(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}
