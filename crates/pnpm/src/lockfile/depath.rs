//! pnpm dependency path 파싱
//!
//! lockfile의 패키지 키와 의존성 참조를 `(name, version)`으로 분해합니다.
//!
//! | lockfile | 패키지 키 | peer 접미사 |
//! |---|---|---|
//! | v5 | `/name/1.0.0`, `/@scope/name/1.0.0` | `_react@16.14.0` |
//! | v6 | `/name@1.0.0`, `/@scope/name@1.0.0` | `(react@16.14.0)` |
//! | v9 | `name@1.0.0`, `@scope/name@1.0.0` | `(react@16.14.0)` |

use crate::types::PackageKey;

/// 패키지 키 표기 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// v5: 이름과 버전을 `/`로 구분
    Slash,
    /// v6 이상: 이름과 버전을 `@`로 구분
    At,
}

impl KeyStyle {
    /// lockfile 주 버전에 맞는 표기 방식을 반환합니다.
    pub fn for_major(major: u32) -> Self {
        if major < 6 { Self::Slash } else { Self::At }
    }
}

/// 의존성 참조 분류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepRef {
    /// 선언된 이름 그대로의 버전 (peer 접미사 제거됨)
    Version(String),
    /// 다른 패키지 키를 가리킴 (alias, tarball, `file:`)
    Path(String),
    /// 워크스페이스 링크 (`link:../pkg`)
    Link(String),
}

/// 버전 문자열에서 peer 접미사를 제거합니다.
///
/// `16.14.0_react@16.14.0` -> `16.14.0`, `16.14.0(react@16.14.0)` -> `16.14.0`
pub fn strip_peer_suffix(version: &str) -> &str {
    let end = version.find(['(', '_']).unwrap_or(version.len());
    &version[..end]
}

/// 패키지 키를 `(name, version)`으로 분해합니다.
///
/// 레지스트리 밖의 키(tarball, git)처럼 형식이 맞지 않으면 `None`을 반환합니다.
/// 그런 항목은 lockfile에 기록된 `name`/`version` 필드로 보완합니다.
pub fn parse_dep_path(key: &str, style: KeyStyle) -> Option<PackageKey> {
    let (name, version) = match style {
        KeyStyle::Slash => {
            // v5 레지스트리 키는 항상 '/'로 시작
            let trimmed = key.strip_prefix('/')?;
            split_slash(trimmed)?
        }
        KeyStyle::At => {
            let trimmed = key.strip_prefix('/').unwrap_or(key);
            split_at(trimmed)?
        }
    };

    let version = strip_peer_suffix(version);
    if !is_valid_name(name) || version.is_empty() {
        return None;
    }

    Some(PackageKey::new(name, version))
}

/// 의존성 참조 값을 분류합니다.
pub fn classify_reference(reference: &str) -> DepRef {
    let reference = reference.trim();
    if let Some(target) = reference.strip_prefix("link:") {
        return DepRef::Link(target.to_owned());
    }
    if reference.starts_with(|c: char| c.is_ascii_digit()) {
        return DepRef::Version(strip_peer_suffix(reference).to_owned());
    }
    DepRef::Path(reference.to_owned())
}

/// scope를 포함한 패키지 이름에서 scope를 뺀 기본 이름을 반환합니다.
///
/// `@babel/core` -> `core`, `axios` -> `axios`
pub fn basename(name: &str) -> &str {
    match name.rsplit_once('/') {
        Some((_, base)) => base,
        None => name,
    }
}

/// "@scope/name/version" 또는 "name/version"
fn split_slash(s: &str) -> Option<(&str, &str)> {
    let name_end = if s.starts_with('@') {
        let scope_end = s.find('/')?;
        scope_end + 1 + s[scope_end + 1..].find('/')?
    } else {
        s.find('/')?
    };
    Some((&s[..name_end], &s[name_end + 1..]))
}

/// "@scope/name@version" 또는 "name@version"
fn split_at(s: &str) -> Option<(&str, &str)> {
    let skip = usize::from(s.starts_with('@'));
    let at = skip + s[skip..].find('@')?;
    Some((&s[..at], &s[at + 1..]))
}

fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.contains(':') || name.contains('(') {
        return false;
    }
    match name.strip_prefix('@') {
        // scope 이름은 "@scope/name" 한 번의 '/'만 허용
        Some(scoped) => scoped
            .split_once('/')
            .is_some_and(|(scope, base)| !scope.is_empty() && !base.is_empty() && !base.contains('/')),
        None => !name.contains('/'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_peer_suffix_v5_and_v6() {
        assert_eq!(strip_peer_suffix("16.14.0_react@16.14.0"), "16.14.0");
        assert_eq!(strip_peer_suffix("16.14.0(react@16.14.0)"), "16.14.0");
        assert_eq!(strip_peer_suffix("1.0.0-beta.1"), "1.0.0-beta.1");
        assert_eq!(strip_peer_suffix("0.19.2"), "0.19.2");
    }

    #[test]
    fn parse_v5_plain_key() {
        let key = parse_dep_path("/axios/0.19.2", KeyStyle::Slash).unwrap();
        assert_eq!(key, PackageKey::new("axios", "0.19.2"));
    }

    #[test]
    fn parse_v5_scoped_key_with_peers() {
        let key = parse_dep_path("/@emotion/react/11.0.0_@types+react@17.0.0", KeyStyle::Slash)
            .unwrap();
        assert_eq!(key, PackageKey::new("@emotion/react", "11.0.0"));
    }

    #[test]
    fn parse_v5_peer_suffixed_key() {
        let key = parse_dep_path("/react-dom/16.14.0_react@16.14.0", KeyStyle::Slash).unwrap();
        assert_eq!(key, PackageKey::new("react-dom", "16.14.0"));
    }

    #[test]
    fn parse_v5_tarball_key_is_none() {
        assert!(parse_dep_path("registry.example.com/foo/1.0.0", KeyStyle::Slash).is_none());
        assert!(parse_dep_path("github.com/user/repo/abc123", KeyStyle::Slash).is_none());
    }

    #[test]
    fn parse_v6_keys() {
        assert_eq!(
            parse_dep_path("/axios@0.19.2", KeyStyle::At).unwrap(),
            PackageKey::new("axios", "0.19.2")
        );
        assert_eq!(
            parse_dep_path("/@babel/core@7.0.0(supports-color@5.5.0)", KeyStyle::At).unwrap(),
            PackageKey::new("@babel/core", "7.0.0")
        );
    }

    #[test]
    fn parse_v9_keys() {
        assert_eq!(
            parse_dep_path("react-dom@16.14.0(react@16.14.0)", KeyStyle::At).unwrap(),
            PackageKey::new("react-dom", "16.14.0")
        );
        assert_eq!(
            parse_dep_path("@types/node@20.1.0", KeyStyle::At).unwrap(),
            PackageKey::new("@types/node", "20.1.0")
        );
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        assert!(parse_dep_path("", KeyStyle::At).is_none());
        assert!(parse_dep_path("/", KeyStyle::Slash).is_none());
        assert!(parse_dep_path("noversion", KeyStyle::At).is_none());
        assert!(parse_dep_path("@scope-only@1.0.0", KeyStyle::At).is_none());
        assert!(parse_dep_path("name@", KeyStyle::At).is_none());
    }

    #[test]
    fn classify_plain_version_references() {
        assert_eq!(
            classify_reference("0.19.2"),
            DepRef::Version("0.19.2".to_owned())
        );
        assert_eq!(
            classify_reference("16.14.0(react@16.14.0)"),
            DepRef::Version("16.14.0".to_owned())
        );
    }

    #[test]
    fn classify_alias_and_link_references() {
        assert_eq!(
            classify_reference("/string-width/4.2.3"),
            DepRef::Path("/string-width/4.2.3".to_owned())
        );
        assert_eq!(
            classify_reference("string-width@4.2.3"),
            DepRef::Path("string-width@4.2.3".to_owned())
        );
        assert_eq!(
            classify_reference("link:../shared"),
            DepRef::Link("../shared".to_owned())
        );
    }

    #[test]
    fn basename_strips_scope() {
        assert_eq!(basename("@babel/core"), "core");
        assert_eq!(basename("axios"), "axios");
    }
}
