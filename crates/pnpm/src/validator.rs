//! 프로젝트 검증 -- 매니페스트 존재와 설치 상태 확인

use std::path::Path;

use tracing::debug;

use crate::error::PnpmError;
use crate::manifest::MANIFEST_NAME;

/// 설치된 모듈 디렉토리 이름
pub const NODE_MODULES: &str = "node_modules";

/// 디렉토리에 `package.json` 파일이 있는지 확인합니다.
pub fn is_valid(project_dir: &Path) -> bool {
    project_dir.join(MANIFEST_NAME).is_file()
}

/// 매니페스트가 없으면 `InvalidProject`를 반환합니다.
pub fn ensure_valid(project_dir: &Path) -> Result<(), PnpmError> {
    if is_valid(project_dir) {
        Ok(())
    } else {
        Err(PnpmError::InvalidProject {
            path: project_dir.display().to_string(),
        })
    }
}

/// `node_modules`가 존재하고 비어 있지 않은지 확인합니다.
///
/// # Errors
///
/// 디렉토리가 없거나, 디렉토리가 아니거나, 항목이 없으면 `ModulesNotInstalled`
pub fn has_modules_installed(project_dir: &Path) -> Result<(), PnpmError> {
    let modules_dir = project_dir.join(NODE_MODULES);
    let not_installed = || PnpmError::ModulesNotInstalled {
        path: modules_dir.display().to_string(),
    };

    if !modules_dir.is_dir() {
        return Err(not_installed());
    }

    let mut entries = std::fs::read_dir(&modules_dir).map_err(|e| PnpmError::Io {
        path: modules_dir.display().to_string(),
        source: e,
    })?;

    if entries.next().is_none() {
        return Err(not_installed());
    }

    debug!(path = %modules_dir.display(), "node_modules present");
    Ok(())
}
