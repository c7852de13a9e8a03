//! pnpm-lock.yaml 원시 구조 (파싱용)
//!
//! 버전별로 다른 필드를 모두 선택 필드로 받아두고, 그래프 구성은 상위 모듈이 담당합니다.
//! 값이 YAML 숫자로 읽힐 수 있는 필드(`lockfileVersion`, 버전 참조)는
//! [`serde_yaml::Value`]로 받아 [`scalar_to_string`]으로 변환합니다.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

/// pnpm-lock.yaml 최상위 구조
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLockfile {
    #[serde(default)]
    pub lockfile_version: Option<Value>,

    // v5/v6 단일 프로젝트: 루트 importer 필드가 최상위에 위치
    #[serde(default)]
    pub specifiers: BTreeMap<String, Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, Value>,

    #[serde(default)]
    pub importers: BTreeMap<String, RawImporter>,
    #[serde(default)]
    pub packages: BTreeMap<String, RawPackage>,
    /// v9: 패키지 간 의존 관계
    #[serde(default)]
    pub snapshots: BTreeMap<String, RawSnapshot>,
}

impl RawLockfile {
    /// 루트 프로젝트(`.`) importer를 꺼냅니다.
    ///
    /// `importers`가 없으면 최상위 필드를 루트 importer로 사용합니다.
    pub fn take_root_importer(&mut self) -> RawImporter {
        if let Some(root) = self.importers.remove(".") {
            return root;
        }
        RawImporter {
            specifiers: std::mem::take(&mut self.specifiers),
            dependencies: std::mem::take(&mut self.dependencies),
            dev_dependencies: std::mem::take(&mut self.dev_dependencies),
            optional_dependencies: std::mem::take(&mut self.optional_dependencies),
        }
    }
}

/// 프로젝트(importer) 항목
///
/// v5는 `specifiers` 맵 + 버전 문자열, v6 이상은 `{specifier, version}` 매핑을 사용합니다.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawImporter {
    #[serde(default)]
    pub specifiers: BTreeMap<String, Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, Value>,
}

/// 패키지 항목 (`packages:` 아래)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPackage {
    #[serde(default)]
    pub resolution: Option<RawResolution>,
    /// tarball/git 의존성에만 기록됨
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub dev: Option<bool>,
    #[serde(default)]
    pub optional: Option<bool>,
}

/// 패키지 resolution
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawResolution {
    #[serde(default)]
    pub integrity: Option<String>,
    #[serde(default)]
    pub tarball: Option<String>,
}

/// v9 snapshot 항목 (`snapshots:` 아래)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSnapshot {
    #[serde(default)]
    pub dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, Value>,
    #[serde(default)]
    pub optional: Option<bool>,
}

/// importer 의존성 값에서 `(specifier, reference)`를 꺼냅니다.
///
/// - v6+: `{ specifier: ^0.19.0, version: 0.19.2 }`
/// - v5: `0.19.2` (specifier는 별도 `specifiers` 맵)
pub(crate) fn importer_entry(value: &Value) -> Option<(Option<String>, String)> {
    match value {
        Value::Mapping(map) => {
            let specifier = map.get("specifier").and_then(scalar_to_string);
            let version = map.get("version").and_then(scalar_to_string)?;
            Some((specifier, version))
        }
        other => scalar_to_string(other).map(|v| (None, v)),
    }
}

/// 스칼라 YAML 값을 문자열로 변환합니다.
///
/// 숫자로 읽힌 버전(`5.4`)도 원래 표기대로 돌려줍니다.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_to_string_handles_numbers() {
        let v: Value = serde_yaml::from_str("5.4").unwrap();
        assert_eq!(scalar_to_string(&v).as_deref(), Some("5.4"));
        let v: Value = serde_yaml::from_str("'6.0'").unwrap();
        assert_eq!(scalar_to_string(&v).as_deref(), Some("6.0"));
    }

    #[test]
    fn importer_entry_detailed_and_plain() {
        let detailed: Value = serde_yaml::from_str("{specifier: ^0.19.0, version: 0.19.2}").unwrap();
        assert_eq!(
            importer_entry(&detailed),
            Some((Some("^0.19.0".to_owned()), "0.19.2".to_owned()))
        );

        let plain: Value = serde_yaml::from_str("0.19.2").unwrap();
        assert_eq!(importer_entry(&plain), Some((None, "0.19.2".to_owned())));
    }

    #[test]
    fn importer_entry_without_version_is_none() {
        let broken: Value = serde_yaml::from_str("{specifier: ^1.0.0}").unwrap();
        assert!(importer_entry(&broken).is_none());
    }

    #[test]
    fn root_importer_prefers_importers_map() {
        let mut raw: RawLockfile = serde_yaml::from_str(
            r#"
lockfileVersion: '9.0'
importers:
  .:
    dependencies:
      axios:
        specifier: ^0.19.0
        version: 0.19.2
"#,
        )
        .unwrap();
        let root = raw.take_root_importer();
        assert!(root.dependencies.contains_key("axios"));
        assert!(raw.importers.is_empty());
    }

    #[test]
    fn root_importer_falls_back_to_top_level() {
        let mut raw: RawLockfile = serde_yaml::from_str(
            r#"
lockfileVersion: 5.4
specifiers:
  axios: ^0.19.0
dependencies:
  axios: 0.19.2
"#,
        )
        .unwrap();
        let root = raw.take_root_importer();
        assert!(root.dependencies.contains_key("axios"));
        assert!(root.specifiers.contains_key("axios"));
    }
}
