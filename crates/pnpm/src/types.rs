//! 도메인 타입 -- pnpm handler 전용 데이터 구조
//!
//! 그래프 노드 식별자, 의존성 종류, 체크섬 모드, 해석 진단 등을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use sbomkit_core::types::Module;

use crate::error::PnpmError;

/// 그래프 노드 식별자 `(name, version)`
///
/// 같은 이름이라도 버전이 다르면 다른 노드입니다.
/// peer 접미사는 버전에 포함되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageKey {
    /// 패키지 이름 (scope 포함)
    pub name: String,
    /// 해석된 버전
    pub version: String,
}

impl PackageKey {
    /// 새 식별자를 생성합니다.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// 직접 의존성 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// `dependencies`
    Prod,
    /// `devDependencies`
    Dev,
    /// `optionalDependencies`
    Optional,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prod => write!(f, "dependencies"),
            Self::Dev => write!(f, "devDependencies"),
            Self::Optional => write!(f, "optionalDependencies"),
        }
    }
}

/// 체크섬 입력 선택
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChecksumMode {
    /// 패키지 이름 바이트의 SHA-256
    #[default]
    PackageName,
    /// lockfile integrity(레지스트리 아카이브 다이제스트), 없으면 이름 해시
    Integrity,
}

impl ChecksumMode {
    /// 문자열에서 체크섬 모드를 파싱합니다 (대소문자 구분 없음).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" | "package-name" | "package_name" => Some(Self::PackageName),
            "integrity" | "archive" => Some(Self::Integrity),
            _ => None,
        }
    }
}

impl fmt::Display for ChecksumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PackageName => write!(f, "name"),
            Self::Integrity => write!(f, "integrity"),
        }
    }
}

/// 비치명적 진단 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// 의존성을 그래프/설치 트리에 대응시키지 못함
    ResolutionGap,
    /// 설치된 매니페스트를 읽지 못해 선택 필드가 비어 있음
    ManifestRead,
}

/// 해석 중 흡수된 비치명적 문제
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 대상 (`name` 또는 `name@version`)
    pub subject: String,
    /// 진단 종류
    pub kind: DiagnosticKind,
    /// 사람이 읽을 수 있는 설명
    pub message: String,
}

impl Diagnostic {
    /// 비치명적 에러에서 진단을 만듭니다. 치명적 에러는 `None`입니다.
    pub fn from_error(subject: impl Into<String>, err: &PnpmError) -> Option<Self> {
        let kind = match err {
            PnpmError::ModuleResolution { .. } => DiagnosticKind::ResolutionGap,
            PnpmError::ManifestRead { .. } => DiagnosticKind::ManifestRead,
            _ => return None,
        };
        Some(Self {
            subject: subject.into(),
            kind,
            message: err.to_string(),
        })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// 메타데이터 해석 결과
///
/// 최선의 모듈 값과, 필드가 비게 된 이유를 함께 담습니다.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    /// 보강된 모듈
    pub module: Module,
    /// 비치명적 진단
    pub diagnostic: Option<Diagnostic>,
}

/// 전체 의존성 트리 해석 결과
#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyTree {
    /// 직접 + 전이 모듈, `(name, version)` 순 정렬
    pub modules: Vec<Module>,
    /// 흡수된 진단
    pub diagnostics: Vec<Diagnostic>,
    /// 원본 lockfile 버전
    pub lockfile_version: String,
}

impl DependencyTree {
    /// 모듈 수를 반환합니다.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// 이름으로 모듈을 모두 찾습니다 (버전이 여러 개일 수 있음).
    pub fn find_all(&self, name: &str) -> Vec<&Module> {
        self.modules.iter().filter(|m| m.name == name).collect()
    }

    /// 직접 의존성만 반환합니다.
    pub fn direct_modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.is_direct())
    }
}

impl fmt::Display for DependencyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DependencyTree({} modules, {} diagnostics, lockfile={})",
            self.modules.len(),
            self.diagnostics.len(),
            self.lockfile_version,
        )
    }
}
