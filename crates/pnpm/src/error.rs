//! pnpm handler 에러 타입
//!
//! [`PnpmError`]는 pnpm handler 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<PnpmError> for SbomkitError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **프로젝트 검증**: `InvalidProject`, `ModulesNotInstalled` (치명적)
//! - **lockfile**: `LockfileParse`, `FileTooBig` (치명적)
//! - **모듈 단위**: `ModuleResolution`, `ManifestRead` (비치명적, 진단으로 흡수)
//! - **설정**: `Config`
//! - **파일 I/O**: `Io`

use sbomkit_core::error::{ConfigError, ModuleError, SbomkitError};

/// pnpm handler 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PnpmError {
    /// 프로젝트 매니페스트(package.json)가 없음
    #[error("invalid project: {path}: package.json not found")]
    InvalidProject {
        /// 프로젝트 경로
        path: String,
    },

    /// node_modules가 없거나 비어 있음
    #[error("modules not installed: {path}")]
    ModulesNotInstalled {
        /// 확인한 node_modules 경로
        path: String,
    },

    /// lockfile 파싱 실패
    #[error("lockfile parse error: {path}: {reason}")]
    LockfileParse {
        /// 파싱 대상 파일 경로
        path: String,
        /// 파싱 실패 사유
        reason: String,
    },

    /// 의존성을 lockfile 그래프나 설치 트리에 대응시키지 못함
    #[error("module resolution gap: {name}: {reason}")]
    ModuleResolution {
        /// 의존성 이름
        name: String,
        /// 실패 사유
        reason: String,
    },

    /// 패키지 매니페스트 읽기 실패
    #[error("manifest read error: {path}: {reason}")]
    ManifestRead {
        /// 매니페스트 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: usize,
        /// 최대 허용 크기 (바이트)
        max: usize,
    },
}

impl PnpmError {
    /// 해석 전체를 중단해야 하는 에러인지 반환합니다.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::ModuleResolution { .. } | Self::ManifestRead { .. }
        )
    }
}

impl From<PnpmError> for SbomkitError {
    fn from(err: PnpmError) -> Self {
        match err {
            PnpmError::InvalidProject { path } => {
                SbomkitError::Module(ModuleError::InvalidProject(path))
            }
            PnpmError::ModulesNotInstalled { path } => {
                SbomkitError::Module(ModuleError::ModulesNotInstalled(path))
            }
            PnpmError::LockfileParse { path, reason } => SbomkitError::Module(
                ModuleError::LockfileParse(format!("{path}: {reason}")),
            ),
            PnpmError::ModuleResolution { name, reason } => {
                SbomkitError::Module(ModuleError::Resolution(format!("{name}: {reason}")))
            }
            PnpmError::ManifestRead { path, reason } => {
                SbomkitError::Module(ModuleError::ManifestRead(format!("{path}: {reason}")))
            }
            PnpmError::Config { field, reason } => {
                SbomkitError::Config(ConfigError::InvalidValue { field, reason })
            }
            PnpmError::Io { source, .. } => SbomkitError::Io(source),
            PnpmError::FileTooBig { path, size, max } => {
                SbomkitError::Module(ModuleError::LockfileParse(format!(
                    "file too large: {path}: {size} bytes (max: {max})"
                )))
            }
        }
    }
}
