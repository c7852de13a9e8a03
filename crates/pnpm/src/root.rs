//! 루트 모듈 추출 -- 프로젝트 자신을 나타내는 모듈

use std::path::Path;

use tracing::debug;

use sbomkit_core::types::{Checksum, Module, Relationship, Supplier};

use crate::error::PnpmError;
use crate::manifest::{MANIFEST_NAME, PackageManifest};
use crate::metadata::{apply_manifest, package_url};
use crate::validator;

/// 프로젝트 매니페스트에서 루트 모듈을 만듭니다.
///
/// 공급자는 프로젝트 이름의 조직이며, 다운로드 위치는 `repository` URL입니다.
/// 비공개 프로젝트는 버전이 비어 있을 수 있습니다.
///
/// # Errors
///
/// - 매니페스트가 없으면 `InvalidProject`
/// - 매니페스트를 파싱할 수 없거나 `name`이 없으면 `ManifestRead`
pub fn get_root_module(project_dir: &Path) -> Result<Module, PnpmError> {
    validator::ensure_valid(project_dir)?;
    let manifest = PackageManifest::read(project_dir)?;

    let name = manifest
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| PnpmError::ManifestRead {
            path: project_dir.join(MANIFEST_NAME).display().to_string(),
            reason: "manifest has no name".to_owned(),
        })?
        .to_owned();
    let version = manifest.version.clone().unwrap_or_default();

    let mut module = Module::new(&name, &version);
    apply_manifest(&mut module, &manifest, project_dir);
    module.supplier = Supplier::organization(&name);
    module.checksum = Some(Checksum::sha256(&name));
    module.package_download_location = manifest.repository_url().unwrap_or_default();
    if !version.is_empty() {
        module.package_url = package_url(&name, &version);
    }
    module.relationship = Relationship::Root;
    module.local_path = Some(project_dir.to_path_buf());

    debug!(module = %module, "extracted root module");
    Ok(module)
}
