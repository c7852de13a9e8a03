//! 에러 타입 -- 도메인별 에러 정의

/// sbomkit 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SbomkitError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 모듈 해석 에러
    #[error("module error: {0}")]
    Module(#[from] ModuleError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SbomkitError {
    /// 호출자가 중단해야 하는 치명적 에러인지 반환합니다.
    ///
    /// 개별 모듈의 해석 공백이나 매니페스트 읽기 실패는 치명적이지 않습니다.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Module(ModuleError::Resolution(_) | ModuleError::ManifestRead(_))
        )
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 모듈 해석 에러
///
/// 패키지 관리자 구현의 도메인 에러가 이 분류로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// 프로젝트 매니페스트가 없음
    #[error("invalid project: {0}")]
    InvalidProject(String),

    /// 의존성이 설치되지 않음
    #[error("modules not installed: {0}")]
    ModulesNotInstalled(String),

    /// lockfile을 읽거나 파싱할 수 없음
    #[error("lockfile parse failed: {0}")]
    LockfileParse(String),

    /// 선언된 의존성을 설치된 모듈에 대응시키지 못함
    #[error("module resolution gap: {0}")]
    Resolution(String),

    /// 개별 모듈 매니페스트 읽기 실패
    #[error("manifest read failed: {0}")]
    ManifestRead(String),
}
