//! Command handlers -- one module per subcommand

pub mod check;
pub mod list;
pub mod root;

use sbomkit_core::config::SbomkitConfig;
use sbomkit_pnpm::{PnpmHandler, PnpmHandlerConfig};

use crate::error::CliError;

/// `[pnpm]` 설정 섹션으로 handler를 생성합니다.
fn build_handler(config: &SbomkitConfig) -> Result<PnpmHandler, CliError> {
    Ok(PnpmHandler::with_config(PnpmHandlerConfig::from_core(
        &config.pnpm,
    ))?)
}
