//! sbomkit.toml 통합 설정 테스트
//!
//! - sbomkit.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use sbomkit_core::config::{DEFAULT_REGISTRY, SbomkitConfig};
use sbomkit_core::error::{ConfigError, SbomkitError};
use serial_test::serial;

// =============================================================================
// sbomkit.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../sbomkit.toml.example");
    let config = SbomkitConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../sbomkit.toml.example");
    let config = SbomkitConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_has_correct_pnpm_defaults() {
    let content = include_str!("../../../sbomkit.toml.example");
    let config = SbomkitConfig::parse(content).expect("should parse");

    assert!(config.pnpm.store_dir.is_empty());
    assert_eq!(config.pnpm.registry, DEFAULT_REGISTRY);
    assert_eq!(config.pnpm.checksum, "name");
    assert!(!config.pnpm.include_dev);
    assert!(config.pnpm.include_optional);
    assert_eq!(config.pnpm.max_lockfile_size, 52_428_800);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn empty_config_uses_defaults() {
    let config = SbomkitConfig::parse("").expect("empty config should parse");
    config.validate().expect("defaults should be valid");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.pnpm.checksum, "name");
}

#[test]
fn partial_pnpm_section_keeps_other_defaults() {
    let config = SbomkitConfig::parse(
        r#"
[pnpm]
checksum = "integrity"
"#,
    )
    .expect("should parse");

    assert_eq!(config.pnpm.checksum, "integrity");
    assert_eq!(config.pnpm.registry, DEFAULT_REGISTRY);
    assert!(config.pnpm.include_optional);
    assert_eq!(config.general.log_format, "pretty");
}

// =============================================================================
// 에러 테스트
// =============================================================================

#[test]
fn invalid_toml_returns_parse_error() {
    let err = SbomkitConfig::parse("[pnpm\nchecksum = ").unwrap_err();
    assert!(matches!(
        err,
        SbomkitError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_returns_parse_error() {
    let err = SbomkitConfig::parse("[pnpm]\ninclude_dev = \"yes\"\n").unwrap_err();
    assert!(matches!(
        err,
        SbomkitError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn unknown_checksum_fails_validation() {
    let config = SbomkitConfig::parse("[pnpm]\nchecksum = \"md5\"\n").expect("should parse");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("pnpm.checksum"));
}

#[tokio::test]
async fn missing_file_returns_file_not_found() {
    let err = SbomkitConfig::load("/nonexistent/sbomkit.toml")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SbomkitError::Config(ConfigError::FileNotFound { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[tokio::test]
#[serial]
async fn env_overrides_take_precedence_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sbomkit.toml");
    std::fs::write(
        &path,
        r#"
[general]
log_level = "warn"

[pnpm]
include_dev = false
"#,
    )
    .unwrap();

    unsafe {
        std::env::set_var("SBOMKIT_GENERAL_LOG_LEVEL", "debug");
        std::env::set_var("SBOMKIT_PNPM_INCLUDE_DEV", "true");
    }

    let config = SbomkitConfig::load(&path).await;

    unsafe {
        std::env::remove_var("SBOMKIT_GENERAL_LOG_LEVEL");
        std::env::remove_var("SBOMKIT_PNPM_INCLUDE_DEV");
    }

    let config = config.expect("should load");
    assert_eq!(config.general.log_level, "debug");
    assert!(config.pnpm.include_dev);
}

#[tokio::test]
#[serial]
async fn invalid_env_override_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sbomkit.toml");
    std::fs::write(&path, "").unwrap();

    unsafe {
        std::env::set_var("SBOMKIT_PNPM_REGISTRY", "ftp://mirror.example.com");
    }

    let result = SbomkitConfig::load(&path).await;

    unsafe {
        std::env::remove_var("SBOMKIT_PNPM_REGISTRY");
    }

    let err = result.unwrap_err();
    assert!(err.to_string().contains("pnpm.registry"));
}
