//! CLI 로깅 초기화
//!
//! stdout은 명령 출력(text/json) 전용이므로 로그는 모두 stderr로 보냅니다.
//! 필터는 `RUST_LOG`가 있으면 그것을, 없으면 `[general] log_level`을 씁니다.

use anyhow::{Result, anyhow, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sbomkit_core::config::GeneralConfig;

/// 전역 tracing subscriber를 설치합니다. 프로세스당 한 번만 호출합니다.
///
/// `log_format`은 `"json"` 또는 `"pretty"`입니다.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };

    installed.map_err(|e| {
        anyhow!(
            "failed to initialize {} log subscriber: {e}",
            config.log_format
        )
    })
}
