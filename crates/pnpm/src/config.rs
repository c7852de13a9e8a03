//! pnpm handler 설정
//!
//! [`PnpmHandlerConfig`]는 core의 [`PnpmConfig`](sbomkit_core::config::PnpmConfig)를
//! 타입이 있는 값으로 변환한 handler 설정입니다.
//!
//! # 사용 예시
//!
//! ```
//! use sbomkit_pnpm::{ChecksumMode, PnpmHandlerConfig, PnpmHandlerConfigBuilder};
//!
//! // 기본값으로 생성
//! let config = PnpmHandlerConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! let config = PnpmHandlerConfigBuilder::new()
//!     .checksum_mode(ChecksumMode::Integrity)
//!     .include_dev(true)
//!     .build()
//!     .unwrap();
//! assert!(config.include_dev);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use sbomkit_core::config::DEFAULT_REGISTRY;

use crate::error::PnpmError;
use crate::types::ChecksumMode;

/// lockfile 최대 크기 상한 (1 GB)
const MAX_LOCKFILE_SIZE_LIMIT: usize = 1024 * 1024 * 1024;

/// pnpm handler 설정
///
/// # 필드
///
/// - **store_dir**: virtual store 경로 (없으면 `.modules.yaml` → `node_modules/.pnpm`)
/// - **registry**: 다운로드 URL 생성용 레지스트리 주소
/// - **checksum_mode**: 체크섬 입력 선택
/// - **include_dev**: devDependencies 포함 여부
/// - **include_optional**: optionalDependencies 포함 여부
/// - **max_lockfile_size**: lockfile 최대 크기 (바이트)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnpmHandlerConfig {
    /// virtual store 경로 (상대 경로는 프로젝트 기준)
    pub store_dir: Option<PathBuf>,
    /// 레지스트리 주소 (끝의 `/` 없음)
    pub registry: String,
    /// 체크섬 입력 선택
    pub checksum_mode: ChecksumMode,
    /// devDependencies 포함 여부
    pub include_dev: bool,
    /// optionalDependencies 포함 여부
    pub include_optional: bool,
    /// lockfile 최대 허용 크기 (바이트)
    pub max_lockfile_size: usize,
}

impl Default for PnpmHandlerConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            registry: DEFAULT_REGISTRY.to_owned(),
            checksum_mode: ChecksumMode::PackageName,
            include_dev: false,
            include_optional: true,
            max_lockfile_size: 50 * 1024 * 1024, // 50 MB
        }
    }
}

impl PnpmHandlerConfig {
    /// core의 `PnpmConfig`에서 handler 설정을 생성합니다.
    ///
    /// 알 수 없는 checksum 값은 기본값(`name`)으로 대체합니다.
    pub fn from_core(core: &sbomkit_core::config::PnpmConfig) -> Self {
        let checksum_mode = ChecksumMode::from_str_loose(&core.checksum).unwrap_or_else(|| {
            warn!(value = %core.checksum, "unknown checksum mode, falling back to name");
            ChecksumMode::PackageName
        });
        let store_dir = (!core.store_dir.trim().is_empty()).then(|| PathBuf::from(&core.store_dir));

        Self {
            store_dir,
            registry: core.registry.trim_end_matches('/').to_owned(),
            checksum_mode,
            include_dev: core.include_dev,
            include_optional: core.include_optional,
            max_lockfile_size: core.max_lockfile_size,
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `registry`: 비어 있지 않은 http(s) URL
    /// - `max_lockfile_size`: 1-1073741824 (1GB)
    /// - `store_dir`: 빈 경로 불가
    pub fn validate(&self) -> Result<(), PnpmError> {
        if self.registry.is_empty() {
            return Err(PnpmError::Config {
                field: "registry".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if !self.registry.starts_with("http://") && !self.registry.starts_with("https://") {
            return Err(PnpmError::Config {
                field: "registry".to_owned(),
                reason: format!("'{}' is not an http(s) URL", self.registry),
            });
        }

        if self.max_lockfile_size == 0 || self.max_lockfile_size > MAX_LOCKFILE_SIZE_LIMIT {
            return Err(PnpmError::Config {
                field: "max_lockfile_size".to_owned(),
                reason: format!("must be 1-{MAX_LOCKFILE_SIZE_LIMIT}"),
            });
        }

        if self
            .store_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            return Err(PnpmError::Config {
                field: "store_dir".to_owned(),
                reason: "store directory path must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// [`PnpmHandlerConfig`] 빌더
///
/// 빌드 시 유효성 검증을 수행합니다.
#[derive(Default)]
pub struct PnpmHandlerConfigBuilder {
    config: PnpmHandlerConfig,
}

impl PnpmHandlerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// virtual store 경로를 설정합니다.
    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.store_dir = Some(dir.into());
        self
    }

    /// 레지스트리 주소를 설정합니다.
    pub fn registry(mut self, registry: impl Into<String>) -> Self {
        self.config.registry = registry.into().trim_end_matches('/').to_owned();
        self
    }

    /// 체크섬 모드를 설정합니다.
    pub fn checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.config.checksum_mode = mode;
        self
    }

    /// devDependencies 포함 여부를 설정합니다.
    pub fn include_dev(mut self, include: bool) -> Self {
        self.config.include_dev = include;
        self
    }

    /// optionalDependencies 포함 여부를 설정합니다.
    pub fn include_optional(mut self, include: bool) -> Self {
        self.config.include_optional = include;
        self
    }

    /// lockfile 최대 크기(바이트)를 설정합니다.
    pub fn max_lockfile_size(mut self, size: usize) -> Self {
        self.config.max_lockfile_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `PnpmError::Config` 반환
    pub fn build(self) -> Result<PnpmHandlerConfig, PnpmError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
