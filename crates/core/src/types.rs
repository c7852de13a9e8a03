//! 도메인 타입 -- 모든 handler가 공유하는 모듈 레코드
//!
//! 패키지 관리자별 handler는 이 타입들로 해석 결과를 반환하고,
//! 하위의 SBOM 포매터는 이 타입들만 보고 문서를 생성합니다.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 해시 알고리즘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "SHA1")]
    Sha1,
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA384")]
    Sha384,
    #[serde(rename = "SHA512")]
    Sha512,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha384 => write!(f, "SHA384"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}

impl HashAlgorithm {
    /// SRI(Subresource Integrity) 접두사에서 알고리즘을 파싱합니다.
    ///
    /// 예: "sha512" -> Sha512
    pub fn from_sri_prefix(prefix: &str) -> Option<Self> {
        match prefix.to_lowercase().as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha384" => Some(Self::Sha384),
            "sha512" => Some(Self::Sha512),
            _ => None,
        }
    }
}

/// 모듈 체크섬
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum {
    /// 해시 알고리즘
    pub algorithm: HashAlgorithm,
    /// 16진수 인코딩된 다이제스트
    pub value: String,
}

impl Checksum {
    /// 입력 바이트의 SHA-256 체크섬을 계산합니다.
    pub fn sha256(input: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(input.as_ref());
        Self {
            algorithm: HashAlgorithm::Sha256,
            value: hex::encode(digest),
        }
    }

    /// 이미 계산된 다이제스트 바이트로 체크섬을 만듭니다.
    pub fn from_digest(algorithm: HashAlgorithm, digest: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex::encode(digest),
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.algorithm, self.value)
    }
}

/// 공급자 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierKind {
    /// 개인 작성자
    #[default]
    Person,
    /// 조직 (루트 모듈은 항상 조직)
    Organization,
}

/// 모듈 공급자 (배포 주체)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Supplier {
    /// 공급자 종류
    pub kind: SupplierKind,
    /// 공급자 이름, 알 수 없으면 빈 문자열
    pub name: String,
    /// 연락처 이메일
    pub email: Option<String>,
}

impl Supplier {
    /// 조직 공급자를 생성합니다.
    pub fn organization(name: impl Into<String>) -> Self {
        Self {
            kind: SupplierKind::Organization,
            name: name.into(),
            email: None,
        }
    }

    /// 공급자 정보가 비어 있는지 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// 프로젝트와 모듈 사이의 관계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    /// 프로젝트 자신
    Root,
    /// 프로젝트 매니페스트에 직접 선언됨
    Direct,
    /// 다른 의존성을 통해서만 도달함
    #[default]
    Transitive,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Direct => write!(f, "direct"),
            Self::Transitive => write!(f, "transitive"),
        }
    }
}

/// 해석된 소프트웨어 모듈
///
/// 한 번의 해석 호출마다 새로 생성되는 불변 값 레코드입니다.
/// 동일성은 `(name, version)` 쌍으로 판단합니다.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Module {
    /// 패키지 이름 (scope 포함)
    pub name: String,
    /// 해석된 버전 (범위가 아님)
    pub version: String,
    /// 공급자
    pub supplier: Supplier,
    /// 체크섬
    pub checksum: Option<Checksum>,
    /// 레지스트리 아카이브 다운로드 URL
    pub package_download_location: String,
    /// Package URL (예: `pkg:npm/axios@0.19.2`)
    pub package_url: String,
    /// 매니페스트에 선언된 라이선스, 없으면 빈 문자열
    pub license_declared: String,
    /// 저작권 문구, 알 수 없으면 빈 문자열
    pub copyright: String,
    /// 프로젝트와의 관계
    pub relationship: Relationship,
    /// 해석된 하위 의존성 (`name@version`)
    pub dependencies: Vec<String>,
    /// 설치된 패키지 디렉토리
    pub local_path: Option<PathBuf>,
}

impl Module {
    /// 이름과 버전만 가진 모듈을 생성합니다.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// 직접 의존성인지 반환합니다.
    pub fn is_direct(&self) -> bool {
        self.relationship == Relationship::Direct
    }

    /// 루트 모듈인지 반환합니다.
    pub fn is_root(&self) -> bool {
        self.relationship == Relationship::Root
    }

    /// `name@version` 형식의 식별자를 반환합니다.
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.name, self.version, self.relationship)
    }
}

/// 전역 설정 오버라이드
///
/// 호출자가 패키지 관리자의 기본 조회 위치 대신 다른 위치를 지정할 때 사용합니다.
/// 기본값은 "표준 해석"을 의미합니다.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// 대체 저장소 경로
    pub alternate_store_path: Option<PathBuf>,
}

impl GlobalSettings {
    /// 경로 문자열에서 설정을 만듭니다. 빈 문자열은 표준 해석입니다.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim();
        Self {
            alternate_store_path: (!trimmed.is_empty()).then(|| PathBuf::from(trimmed)),
        }
    }

    /// 오버라이드가 없는지 반환합니다.
    pub fn is_default(&self) -> bool {
        self.alternate_store_path.is_none()
    }
}
