//! 설정 관리 -- sbomkit.toml 파싱 및 런타임 설정
//!
//! [`SbomkitConfig`]는 모든 handler의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SBOMKIT_PNPM_STORE_DIR=/opt/store` 형식)
//! 3. 설정 파일 (`sbomkit.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sbomkit_core::error::SbomkitError> {
//! use sbomkit_core::config::SbomkitConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SbomkitConfig::load("sbomkit.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SbomkitConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SbomkitError};

/// 기본 npm 레지스트리 주소
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// sbomkit 통합 설정
///
/// `sbomkit.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 handler는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SbomkitConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// pnpm handler 설정
    #[serde(default)]
    pub pnpm: PnpmConfig,
}

impl SbomkitConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SbomkitError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SbomkitError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SbomkitError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SbomkitError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SbomkitError> {
        toml::from_str(toml_str).map_err(|e| {
            SbomkitError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SBOMKIT_{SECTION}_{FIELD}`
    /// 예: `SBOMKIT_PNPM_CHECKSUM=integrity`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SBOMKIT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SBOMKIT_GENERAL_LOG_FORMAT");

        // pnpm
        override_string(&mut self.pnpm.store_dir, "SBOMKIT_PNPM_STORE_DIR");
        override_string(&mut self.pnpm.registry, "SBOMKIT_PNPM_REGISTRY");
        override_string(&mut self.pnpm.checksum, "SBOMKIT_PNPM_CHECKSUM");
        override_bool(&mut self.pnpm.include_dev, "SBOMKIT_PNPM_INCLUDE_DEV");
        override_bool(
            &mut self.pnpm.include_optional,
            "SBOMKIT_PNPM_INCLUDE_OPTIONAL",
        );
        override_usize(
            &mut self.pnpm.max_lockfile_size,
            "SBOMKIT_PNPM_MAX_LOCKFILE_SIZE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SbomkitError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // checksum 모드 검증
        let valid_checksums = ["name", "integrity"];
        if !valid_checksums.contains(&self.pnpm.checksum.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "pnpm.checksum".to_owned(),
                reason: format!("must be one of: {}", valid_checksums.join(", ")),
            }
            .into());
        }

        if !self.pnpm.registry.starts_with("http://") && !self.pnpm.registry.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "pnpm.registry".to_owned(),
                reason: "must be an http(s) URL".to_owned(),
            }
            .into());
        }

        if self.pnpm.max_lockfile_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pnpm.max_lockfile_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// pnpm handler 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PnpmConfig {
    /// virtual store 경로. 비어 있으면 `.modules.yaml` 또는 `node_modules/.pnpm`
    pub store_dir: String,
    /// 다운로드 URL을 만들 레지스트리 주소
    pub registry: String,
    /// 체크섬 입력 (name, integrity)
    pub checksum: String,
    /// devDependencies 포함 여부
    pub include_dev: bool,
    /// optionalDependencies 포함 여부
    pub include_optional: bool,
    /// lockfile 최대 허용 크기 (바이트)
    pub max_lockfile_size: usize,
}

impl Default for PnpmConfig {
    fn default() -> Self {
        Self {
            store_dir: String::new(),
            registry: DEFAULT_REGISTRY.to_owned(),
            checksum: "name".to_owned(),
            include_dev: false,
            include_optional: true,
            max_lockfile_size: 50 * 1024 * 1024, // 50 MB
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = SbomkitConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.pnpm.store_dir.is_empty());
        assert_eq!(config.pnpm.registry, DEFAULT_REGISTRY);
        assert_eq!(config.pnpm.checksum, "name");
        assert!(!config.pnpm.include_dev);
        assert!(config.pnpm.include_optional);
    }

    #[test]
    fn default_config_passes_validation() {
        SbomkitConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = SbomkitConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.pnpm.checksum, "name");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[pnpm]
checksum = "integrity"
include_dev = true
"#;
        let config = SbomkitConfig::parse(toml).unwrap();
        assert_eq!(config.pnpm.checksum, "integrity");
        assert!(config.pnpm.include_dev);
        // 나머지는 기본값 유지
        assert_eq!(config.pnpm.registry, DEFAULT_REGISTRY);
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn from_str_invalid_toml_returns_parse_error() {
        let err = SbomkitConfig::parse("[pnpm\nchecksum = ").unwrap_err();
        assert!(matches!(
            err,
            SbomkitError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_unknown_checksum_mode() {
        let mut config = SbomkitConfig::default();
        config.pnpm.checksum = "md5".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pnpm.checksum"));
    }

    #[test]
    fn validate_rejects_non_http_registry() {
        let mut config = SbomkitConfig::default();
        config.pnpm.registry = "ftp://mirror.local".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = SbomkitConfig::default();
        config.general.log_format = "xml".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_lockfile_size() {
        let mut config = SbomkitConfig::default();
        config.pnpm.max_lockfile_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_overrides_apply_to_pnpm_section() {
        // SAFETY: serial 테스트에서만 환경변수를 변경합니다.
        unsafe {
            std::env::set_var("SBOMKIT_PNPM_STORE_DIR", "/opt/pnpm-virtual");
            std::env::set_var("SBOMKIT_PNPM_INCLUDE_DEV", "true");
        }
        let mut config = SbomkitConfig::default();
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SBOMKIT_PNPM_STORE_DIR");
            std::env::remove_var("SBOMKIT_PNPM_INCLUDE_DEV");
        }
        assert_eq!(config.pnpm.store_dir, "/opt/pnpm-virtual");
        assert!(config.pnpm.include_dev);
    }

    #[test]
    #[serial]
    fn env_override_with_bad_bool_is_ignored() {
        unsafe {
            std::env::set_var("SBOMKIT_PNPM_INCLUDE_OPTIONAL", "sometimes");
        }
        let mut config = SbomkitConfig::default();
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SBOMKIT_PNPM_INCLUDE_OPTIONAL");
        }
        assert!(config.pnpm.include_optional);
    }

    #[tokio::test]
    async fn from_file_missing_returns_file_not_found() {
        let err = SbomkitConfig::from_file("/nonexistent/sbomkit.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SbomkitError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sbomkit.toml");
        std::fs::write(&path, "[pnpm]\nregistry = \"https://npm.internal.example\"\n").unwrap();
        let config = SbomkitConfig::from_file(&path).await.unwrap();
        assert_eq!(config.pnpm.registry, "https://npm.internal.example");
    }
}
