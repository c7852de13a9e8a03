//! package.json 매니페스트
//!
//! 프로젝트와 설치된 패키지의 `package.json`에서 SBOM에 필요한 필드만 읽습니다.
//! `license`, `licenses`, `author`, `repository`는 역사적으로 여러 형태가 있어
//! [`serde_json::Value`]로 받아 정규화합니다.
//!
//! 필드 하나의 타입이 어긋나도 매니페스트 전체를 버리지 않습니다.
//! 해당 필드만 비어 있는 값으로 읽힙니다.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use sbomkit_core::types::{Supplier, SupplierKind};

use crate::error::PnpmError;
use crate::types::DependencyKind;

/// 매니페스트 파일명
pub const MANIFEST_NAME: &str = "package.json";

/// package.json 구조 (필요한 필드만)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(default)]
    license: Option<Value>,
    /// 구식 `licenses: [{type, url}]` 또는 `licenses: {type, url}`
    #[serde(default)]
    licenses: Option<Value>,
    #[serde(default)]
    author: Option<Value>,
    #[serde(default)]
    repository: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string_map")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_string_map")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient_string_map")]
    pub optional_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// 디렉토리의 `package.json`을 읽습니다.
    ///
    /// # Errors
    ///
    /// 파일이 없거나 JSON이 아니면 `ManifestRead`
    pub fn read(dir: &Path) -> Result<Self, PnpmError> {
        let path = dir.join(MANIFEST_NAME);
        let content = std::fs::read_to_string(&path).map_err(|e| PnpmError::ManifestRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// 매니페스트 내용을 파싱합니다.
    pub fn parse(content: &str, source_path: &str) -> Result<Self, PnpmError> {
        serde_json::from_str(content).map_err(|e| PnpmError::ManifestRead {
            path: source_path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// 선언된 라이선스를 반환합니다. 없으면 빈 문자열입니다.
    ///
    /// - `"MIT"`
    /// - `{ "type": "MIT" }`
    /// - `"licenses": [{ "type": "MIT" }, { "type": "Apache-2.0" }]` -> `MIT OR Apache-2.0`
    pub fn license(&self) -> String {
        if let Some(license) = self.license.as_ref().and_then(license_value) {
            return license;
        }

        match self.licenses.as_ref() {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(license_value)
                .collect::<Vec<_>>()
                .join(" OR "),
            Some(other) => license_value(other).unwrap_or_default(),
            None => String::new(),
        }
    }

    /// 작성자를 공급자로 반환합니다.
    ///
    /// 문자열 `"Name <email> (url)"`과 객체 `{ name, email }` 형태를 모두 받습니다.
    pub fn author(&self) -> Option<Supplier> {
        let (name, email) = match self.author.as_ref()? {
            Value::String(s) => parse_person(s),
            Value::Object(map) => (
                map.get("name").and_then(Value::as_str).unwrap_or_default().trim().to_owned(),
                map.get("email")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_owned),
            ),
            _ => return None,
        };

        if name.is_empty() {
            return None;
        }

        Some(Supplier {
            kind: SupplierKind::Person,
            name,
            email,
        })
    }

    /// 저장소 URL을 반환합니다 (`git+` 접두사 제거).
    pub fn repository_url(&self) -> Option<String> {
        let url = match self.repository.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get("url").and_then(Value::as_str)?,
            _ => return None,
        };
        let url = url.trim();
        let url = url.strip_prefix("git+").unwrap_or(url);
        (!url.is_empty()).then(|| url.to_owned())
    }

    /// 선언된 의존성을 `(name, specifier, kind)` 목록으로 반환합니다.
    pub fn declared_dependencies(
        &self,
        include_dev: bool,
        include_optional: bool,
    ) -> Vec<(&str, &str, DependencyKind)> {
        let mut declared: Vec<_> = self
            .dependencies
            .iter()
            .map(|(n, s)| (n.as_str(), s.as_str(), DependencyKind::Prod))
            .collect();

        if include_optional {
            declared.extend(
                self.optional_dependencies
                    .iter()
                    .map(|(n, s)| (n.as_str(), s.as_str(), DependencyKind::Optional)),
            );
        }
        if include_dev {
            declared.extend(
                self.dev_dependencies
                    .iter()
                    .map(|(n, s)| (n.as_str(), s.as_str(), DependencyKind::Dev)),
            );
        }

        declared
    }
}

/// 선언을 실제 설치되는 패키지 이름과 버전 범위로 풀어냅니다.
///
/// npm alias `"sw": "npm:string-width@^4.2.0"`는 `("string-width", "^4.2.0")`이고,
/// 그 밖의 선언은 `(name, specifier)` 그대로입니다.
pub fn alias_target<'a>(name: &'a str, specifier: &'a str) -> (&'a str, &'a str) {
    let spec = specifier.trim();
    let Some(alias) = spec.strip_prefix("npm:") else {
        return (name, spec);
    };

    let skip = usize::from(alias.starts_with('@'));
    match alias[skip..].find('@') {
        Some(at) => (&alias[..skip + at], &alias[skip + at + 1..]),
        // "npm:string-width" (범위 없음)
        None => (alias, ""),
    }
}

/// 워크스페이스 안의 로컬 패키지를 가리키는 선언인지 반환합니다.
///
/// `link:`와 `workspace:` 선언은 lockfile 패키지가 아니므로 모듈 목록에 들어가지 않습니다.
pub fn is_local_specifier(specifier: &str) -> bool {
    let spec = specifier.trim();
    spec.starts_with("link:") || spec.starts_with("workspace:")
}

/// 선언된 버전 범위에서 기준 버전을 추출합니다.
///
/// `^0.19.0` -> `0.19.0`, `npm:foo@~1.2.3` -> `1.2.3`, `>=1.0.0 <2` -> `1.0.0`.
/// `latest`, `*`, git/URL 같이 구체적인 버전이 없으면 `None`입니다.
pub fn base_version(specifier: &str) -> Option<String> {
    let (_, spec) = alias_target("", specifier);

    let first_alternative = spec.split("||").next()?.trim();
    let first_bound = first_alternative.split_whitespace().next()?;
    let candidate = first_bound.trim_start_matches(['^', '~', '>', '<', '=', 'v', ' ']);

    semver::Version::parse(candidate)
        .ok()
        .map(|v| v.to_string())
}

/// 문자열이 아니면 `None`으로 읽습니다.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// 객체가 아니면 빈 맵, 문자열이 아닌 항목은 건너뜁니다.
fn lenient_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(name, spec)| match spec {
            Value::String(spec) => Some((name, spec)),
            _ => None,
        })
        .collect())
}

fn license_value(value: &Value) -> Option<String> {
    let license = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("type").and_then(Value::as_str)?,
        _ => return None,
    };
    let license = license.trim();
    (!license.is_empty()).then(|| license.to_owned())
}

/// `"Name <email> (url)"`를 `(name, email)`로 분해합니다.
fn parse_person(s: &str) -> (String, Option<String>) {
    let name_end = s.find(['<', '(']).unwrap_or(s.len());
    let name = s[..name_end].trim().to_owned();

    let email = s.find('<').and_then(|start| {
        let rest = &s[start + 1..];
        let end = rest.find('>')?;
        let email = rest[..end].trim();
        (!email.is_empty()).then(|| email.to_owned())
    });

    (name, email)
}
