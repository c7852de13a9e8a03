//! handler trait -- 패키지 관리자별 확장 포인트 정의

use std::path::Path;

use crate::error::SbomkitError;
use crate::types::{GlobalSettings, Module};

/// 패키지 관리자 하나의 설치 상태에서 모듈 목록을 추출하는 trait
///
/// 새로운 패키지 관리자를 지원하려면 이 trait을 구현합니다.
/// 모든 메서드는 호출마다 새로 해석하며, 호출 사이에 상태를 유지하지 않습니다.
pub trait ModuleHandler: Send + Sync {
    /// handler 이름 (예: "pnpm")
    fn name(&self) -> &str;

    /// 프로젝트 매니페스트 파일명 (예: "package.json")
    fn manifest_file(&self) -> &str;

    /// 디렉토리가 이 패키지 관리자의 프로젝트인지 확인
    fn is_valid(&self, path: &Path) -> bool;

    /// 의존성이 디스크에 설치되어 있는지 확인
    fn has_modules_installed(&self, path: &Path) -> Result<(), SbomkitError>;

    /// 프로젝트 자신을 나타내는 루트 모듈
    fn get_root_module(&self, path: &Path) -> Result<Module, SbomkitError>;

    /// 매니페스트에 선언된 직접 의존성 목록
    fn list_used_modules(&self, path: &Path) -> Result<Vec<Module>, SbomkitError>;

    /// 직접 의존성과 전이 의존성 전체 목록 (메타데이터 포함)
    fn list_modules_with_deps(
        &self,
        path: &Path,
        settings: &GlobalSettings,
    ) -> Result<Vec<Module>, SbomkitError>;
}
