//! sbomkit CLI -- dependency inventory for pnpm projects
//!
//! 설정 로드 -> 로깅 초기화 -> 서브커맨드 실행 -> 종료 코드 매핑 순서로 동작합니다.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use sbomkit_core::config::SbomkitConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            // exit_code()는 항상 0..=255 범위
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(&cli.config).await?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
        config.validate()?;
    }

    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;
    sbomkit_core::metrics::describe_metrics();

    tracing::debug!(config = %cli.config.display(), "sbomkit starting");

    let writer = OutputWriter::new(cli.output);
    match cli.command {
        Commands::Check(args) => commands::check::execute(args, &config, &writer).await,
        Commands::Root(args) => commands::root::execute(args, &writer).await,
        Commands::List(args) => commands::list::execute(args, &config, &writer).await,
    }
}

/// 설정 파일이 있으면 로드하고, 없으면 기본값에 환경변수 오버라이드를 적용합니다.
async fn load_config(path: &Path) -> Result<SbomkitConfig, CliError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(SbomkitConfig::load(path).await?);
    }

    let mut config = SbomkitConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
