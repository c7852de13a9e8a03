//! 모듈 메타데이터 보강
//!
//! [`MetadataResolver`]는 해석된 `(name, version)`에 대해 설치된 패키지 디렉토리를 찾고
//! 라이선스, 공급자, 저작권, 체크섬, 다운로드 위치, purl을 채웁니다.
//!
//! 설치된 매니페스트를 찾지 못하거나 읽지 못해도 모듈은 반환되며,
//! 선택 필드가 빈 이유는 [`Diagnostic`]으로 함께 전달됩니다.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use sbomkit_core::types::{Checksum, HashAlgorithm, Module};

use crate::config::PnpmHandlerConfig;
use crate::error::PnpmError;
use crate::lockfile::LockNode;
use crate::lockfile::depath::basename;
use crate::manifest::{MANIFEST_NAME, PackageManifest};
use crate::store::VirtualStore;
use crate::types::{ChecksumMode, Diagnostic, PackageKey, ResolvedModule};

/// 라이선스 파일 이름 접두사 (대소문자 무시)
const LICENSE_FILE_PREFIXES: [&str; 2] = ["license", "licence"];

/// 모듈 메타데이터 해석기
///
/// 한 번의 해석 동안 설정과 virtual store 색인을 빌려 사용합니다.
pub struct MetadataResolver<'a> {
    config: &'a PnpmHandlerConfig,
    store: &'a VirtualStore,
}

impl<'a> MetadataResolver<'a> {
    /// 새 해석기를 생성합니다.
    pub fn new(config: &'a PnpmHandlerConfig, store: &'a VirtualStore) -> Self {
        Self { config, store }
    }

    /// lockfile 노드를 보강된 모듈로 변환합니다.
    pub fn resolve(&self, node: &LockNode) -> ResolvedModule {
        let key = &node.key;
        let mut module = Module::new(&key.name, &key.version);

        module.checksum = Some(checksum(
            self.config.checksum_mode,
            &key.name,
            node.integrity.as_deref(),
        ));
        module.package_download_location = node
            .tarball
            .clone()
            .unwrap_or_else(|| download_location(&self.config.registry, &key.name, &key.version));
        module.package_url = package_url(&key.name, &key.version);

        let diagnostic = match self.read_installed(key) {
            Ok((dir, manifest)) => {
                apply_manifest(&mut module, &manifest, &dir);
                module.local_path = Some(dir);
                None
            }
            Err(err) => {
                warn!(module = %key, error = %err, "installed manifest unavailable, optional fields left empty");
                Diagnostic::from_error(key.to_string(), &err)
            }
        };

        ResolvedModule { module, diagnostic }
    }

    fn read_installed(
        &self,
        key: &PackageKey,
    ) -> Result<(std::path::PathBuf, PackageManifest), PnpmError> {
        let dir = self.store.locate(key).ok_or_else(|| PnpmError::ManifestRead {
            path: self
                .store
                .root()
                .join(format!("{}@{}", key.name.replace('/', "+"), key.version))
                .join(MANIFEST_NAME)
                .display()
                .to_string(),
            reason: "package not installed".to_owned(),
        })?;
        let manifest = PackageManifest::read(&dir)?;
        debug!(module = %key, path = %dir.display(), "read installed manifest");
        Ok((dir, manifest))
    }
}

/// 매니페스트와 패키지 디렉토리에서 라이선스, 공급자, 저작권을 채웁니다.
pub fn apply_manifest(module: &mut Module, manifest: &PackageManifest, dir: &Path) {
    module.license_declared = manifest.license();

    let author = manifest.author();
    module.copyright = find_copyright(dir)
        .or_else(|| {
            author
                .as_ref()
                .map(|supplier| format!("Copyright (c) {}", supplier.name))
        })
        .unwrap_or_default();

    if let Some(author) = author {
        module.supplier = author;
    }
}

/// 체크섬을 계산합니다.
///
/// `Integrity` 모드에서 쓸 수 있는 SRI가 없으면 이름 해시로 대체합니다.
pub fn checksum(mode: ChecksumMode, name: &str, integrity: Option<&str>) -> Checksum {
    match mode {
        ChecksumMode::PackageName => Checksum::sha256(name),
        ChecksumMode::Integrity => integrity
            .and_then(integrity_checksum)
            .unwrap_or_else(|| Checksum::sha256(name)),
    }
}

/// SRI 문자열(`sha512-<base64>`)을 16진수 체크섬으로 변환합니다.
///
/// 공백으로 구분된 여러 해시 중 첫 번째로 해석되는 것을 사용합니다.
pub fn integrity_checksum(sri: &str) -> Option<Checksum> {
    sri.split_whitespace().find_map(|entry| {
        let (prefix, encoded) = entry.split_once('-')?;
        let algorithm = HashAlgorithm::from_sri_prefix(prefix)?;
        // "?opt" 확장 옵션 제거
        let encoded = encoded.split('?').next().unwrap_or(encoded);
        let digest = STANDARD.decode(encoded).ok()?;
        Some(Checksum::from_digest(algorithm, &digest))
    })
}

/// 레지스트리 아카이브 다운로드 URL
///
/// `https://registry.npmjs.org/@babel/core/-/core-7.0.0.tgz`
pub fn download_location(registry: &str, name: &str, version: &str) -> String {
    format!(
        "{}/{}/-/{}-{}.tgz",
        registry.trim_end_matches('/'),
        name,
        basename(name),
        version
    )
}

/// npm Package URL (`pkg:npm/%40babel/core@7.0.0`)
pub fn package_url(name: &str, version: &str) -> String {
    let encoded = match name.strip_prefix('@') {
        Some(scoped) => format!("%40{scoped}"),
        None => name.to_owned(),
    };
    format!("pkg:npm/{encoded}@{version}")
}

/// 라이선스 파일에서 첫 번째 저작권 문구를 찾습니다.
pub fn find_copyright(dir: &Path) -> Option<String> {
    let mut license_files: Vec<_> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(str::to_ascii_lowercase)
                .is_some_and(|name| LICENSE_FILE_PREFIXES.iter().any(|p| name.starts_with(p)))
        })
        .collect();
    license_files.sort();

    license_files.iter().find_map(|path| {
        let content = std::fs::read_to_string(path).ok()?;
        content
            .lines()
            .map(str::trim)
            .find(|line| {
                line.get(..9)
                    .is_some_and(|head| head.eq_ignore_ascii_case("copyright"))
            })
            .map(str::to_owned)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbomkit_core::types::GlobalSettings;
    use sha2::{Digest, Sha512};

    const AXIOS_LICENSE: &str = "Copyright (c) 2014-present Matt Zabriskie\n\n\
        Permission is hereby granted, free of charge, to any person obtaining a copy\n";

    fn node(name: &str, version: &str, integrity: Option<&str>) -> LockNode {
        LockNode {
            key: PackageKey::new(name, version),
            integrity: integrity.map(str::to_owned),
            tarball: None,
            dev: None,
            optional: false,
            dependencies: Vec::new(),
        }
    }

    fn install(project: &Path, name: &str, manifest: &str, license: Option<&str>) {
        let dir = project
            .join("node_modules/.pnpm")
            .join(format!("{}@1.0.0", name.replace('/', "+")))
            .join("node_modules")
            .join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("package.json"), manifest).unwrap();
        if let Some(text) = license {
            std::fs::write(dir.join("LICENSE"), text).unwrap();
        }
    }

    #[test]
    fn download_location_plain_and_scoped() {
        assert_eq!(
            download_location("https://registry.npmjs.org", "axios", "0.19.2"),
            "https://registry.npmjs.org/axios/-/axios-0.19.2.tgz"
        );
        assert_eq!(
            download_location("https://registry.npmjs.org/", "@babel/core", "7.0.0"),
            "https://registry.npmjs.org/@babel/core/-/core-7.0.0.tgz"
        );
    }

    #[test]
    fn package_url_encodes_scope() {
        assert_eq!(package_url("axios", "0.19.2"), "pkg:npm/axios@0.19.2");
        assert_eq!(package_url("@babel/core", "7.0.0"), "pkg:npm/%40babel/core@7.0.0");
    }

    #[test]
    fn name_checksum_is_sha256_of_name() {
        let sum = checksum(ChecksumMode::PackageName, "axios", Some("sha512-AAAA"));
        assert_eq!(sum, Checksum::sha256("axios"));
    }

    #[test]
    fn integrity_checksum_decodes_sri() {
        let digest = Sha512::digest(b"tarball bytes");
        let sri = format!("sha512-{}", STANDARD.encode(digest));
        let sum = checksum(ChecksumMode::Integrity, "axios", Some(&sri));
        assert_eq!(sum.algorithm, HashAlgorithm::Sha512);
        assert_eq!(sum.value, hex::encode(digest));
    }

    #[test]
    fn integrity_mode_falls_back_to_name_hash() {
        assert_eq!(
            checksum(ChecksumMode::Integrity, "ms", None),
            Checksum::sha256("ms")
        );
        assert_eq!(
            checksum(ChecksumMode::Integrity, "ms", Some("md5-abc")),
            Checksum::sha256("ms")
        );
        assert_eq!(
            checksum(ChecksumMode::Integrity, "ms", Some("sha512-!!!not base64")),
            Checksum::sha256("ms")
        );
    }

    #[test]
    fn find_copyright_reads_first_copyright_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("LICENSE.md"), format!("MIT License\n\n{AXIOS_LICENSE}")).unwrap();
        assert_eq!(
            find_copyright(dir.path()).as_deref(),
            Some("Copyright (c) 2014-present Matt Zabriskie")
        );
    }

    #[test]
    fn find_copyright_accepts_licence_spelling_and_lowercase() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("licence"), "COPYRIGHT 2020 Someone\n").unwrap();
        assert_eq!(find_copyright(dir.path()).as_deref(), Some("COPYRIGHT 2020 Someone"));
    }

    #[test]
    fn find_copyright_without_license_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "Copyright (c) nobody\n").unwrap();
        assert!(find_copyright(dir.path()).is_none());
    }

    #[test]
    fn resolve_installed_module() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "axios",
            r#"{"name":"axios","version":"1.0.0","license":"MIT","author":"Matt Zabriskie"}"#,
            Some(AXIOS_LICENSE),
        );

        let config = PnpmHandlerConfig::default();
        let store = VirtualStore::open(dir.path(), None, &GlobalSettings::default());
        let resolved = MetadataResolver::new(&config, &store).resolve(&node("axios", "1.0.0", None));

        assert!(resolved.diagnostic.is_none());
        let module = resolved.module;
        assert_eq!(module.license_declared, "MIT");
        assert_eq!(module.copyright, "Copyright (c) 2014-present Matt Zabriskie");
        assert_eq!(module.supplier.name, "Matt Zabriskie");
        assert_eq!(module.checksum, Some(Checksum::sha256("axios")));
        assert_eq!(module.package_url, "pkg:npm/axios@1.0.0");
        assert!(module.local_path.is_some());
    }

    #[test]
    fn resolve_uses_author_when_no_license_file() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "@scope/lib",
            r#"{"name":"@scope/lib","version":"1.0.0","author":{"name":"Jane Roe"}}"#,
            None,
        );

        let config = PnpmHandlerConfig::default();
        let store = VirtualStore::open(dir.path(), None, &GlobalSettings::default());
        let module = MetadataResolver::new(&config, &store)
            .resolve(&node("@scope/lib", "1.0.0", None))
            .module;

        assert_eq!(module.copyright, "Copyright (c) Jane Roe");
        assert_eq!(module.license_declared, "");
    }

    #[test]
    fn resolve_missing_install_keeps_identity_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config = PnpmHandlerConfig::default();
        let store = VirtualStore::open(dir.path(), None, &GlobalSettings::default());
        let resolved = MetadataResolver::new(&config, &store).resolve(&node("ms", "2.0.0", None));

        let diagnostic = resolved.diagnostic.unwrap();
        assert_eq!(diagnostic.kind, crate::types::DiagnosticKind::ManifestRead);
        assert_eq!(diagnostic.subject, "ms@2.0.0");

        let module = resolved.module;
        assert_eq!(module.name, "ms");
        assert_eq!(module.version, "2.0.0");
        assert_eq!(
            module.package_download_location,
            "https://registry.npmjs.org/ms/-/ms-2.0.0.tgz"
        );
        assert!(module.checksum.is_some());
        assert!(module.copyright.is_empty());
        assert!(module.local_path.is_none());
    }

    #[test]
    fn resolve_prefers_recorded_tarball() {
        let dir = tempfile::tempdir().unwrap();
        let config = PnpmHandlerConfig::default();
        let store = VirtualStore::open(dir.path(), None, &GlobalSettings::default());
        let mut tarball_node = node("private-lib", "1.2.0", None);
        tarball_node.tarball = Some("https://git.example.com/private-lib-1.2.0.tgz".to_owned());

        let module = MetadataResolver::new(&config, &store).resolve(&tarball_node).module;
        assert_eq!(
            module.package_download_location,
            "https://git.example.com/private-lib-1.2.0.tgz"
        );
    }
}
