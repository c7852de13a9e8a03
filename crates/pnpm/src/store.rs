//! pnpm virtual store 색인
//!
//! pnpm은 설치된 패키지를 `node_modules/.pnpm/<name>@<version>/node_modules/<name>`에 둡니다.
//! scope의 `/`는 `+`로 바뀌고, peer 변형은 `_peers` (v5) 또는 `(peers)` (v6 이상)
//! 접미사가 붙습니다.
//!
//! ```text
//! node_modules/.pnpm/
//!   axios@0.19.2/node_modules/axios/
//!   @babel+runtime@7.20.13/node_modules/@babel/runtime/
//!   react-dom@16.14.0_react@16.14.0/node_modules/react-dom/
//! ```
//!
//! 저장소 위치 우선순위:
//! 1. [`GlobalSettings::alternate_store_path`]
//! 2. 설정의 `store_dir`
//! 3. `node_modules/.modules.yaml`의 `virtualStoreDir`
//! 4. `node_modules/.pnpm`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use sbomkit_core::types::GlobalSettings;

use crate::lockfile::depath::strip_peer_suffix;
use crate::manifest::PackageManifest;
use crate::types::PackageKey;
use crate::validator::NODE_MODULES;

/// pnpm 설치 메타데이터 파일
const MODULES_YAML: &str = ".modules.yaml";

/// 기본 virtual store 디렉토리 이름
const DEFAULT_VIRTUAL_STORE: &str = ".pnpm";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModulesYaml {
    #[serde(default)]
    virtual_store_dir: Option<String>,
}

/// 한 번의 해석 동안 사용하는 virtual store 색인
#[derive(Debug, Default)]
pub struct VirtualStore {
    project_dir: PathBuf,
    root: PathBuf,
    entries: HashMap<PackageKey, PathBuf>,
}

impl VirtualStore {
    /// 우선순위에 따라 저장소를 결정하고 색인합니다.
    pub fn open(project_dir: &Path, store_dir: Option<&Path>, settings: &GlobalSettings) -> Self {
        let root = resolve_store_root(project_dir, store_dir, settings);
        let entries = index_store(&root);
        debug!(
            store = %root.display(),
            entries = entries.len(),
            "indexed pnpm virtual store"
        );
        Self {
            project_dir: project_dir.to_path_buf(),
            root,
            entries,
        }
    }

    /// 저장소 경로를 반환합니다.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 색인된 패키지 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 색인이 비어 있는지 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 설치된 패키지 디렉토리를 찾습니다.
    ///
    /// virtual store에 없으면 `node_modules/<name>`의 버전이 일치할 때 그 경로를 씁니다.
    pub fn locate(&self, key: &PackageKey) -> Option<PathBuf> {
        if let Some(dir) = self.entries.get(key) {
            return Some(dir.clone());
        }

        let hoisted = self.project_dir.join(NODE_MODULES).join(&key.name);
        let manifest = PackageManifest::read(&hoisted).ok()?;
        (manifest.version.as_deref() == Some(key.version.as_str())).then_some(hoisted)
    }
}

/// 저장소 경로를 우선순위대로 결정합니다.
pub fn resolve_store_root(
    project_dir: &Path,
    store_dir: Option<&Path>,
    settings: &GlobalSettings,
) -> PathBuf {
    if let Some(ref alternate) = settings.alternate_store_path {
        return project_dir.join(alternate);
    }
    if let Some(dir) = store_dir {
        return project_dir.join(dir);
    }

    let modules_dir = project_dir.join(NODE_MODULES);
    if let Some(recorded) = read_recorded_store(&modules_dir) {
        return modules_dir.join(recorded);
    }

    modules_dir.join(DEFAULT_VIRTUAL_STORE)
}

/// `.modules.yaml`에 기록된 `virtualStoreDir`을 읽습니다.
///
/// 상대 경로는 `node_modules` 기준입니다.
fn read_recorded_store(modules_dir: &Path) -> Option<PathBuf> {
    let path = modules_dir.join(MODULES_YAML);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_yaml::from_str::<ModulesYaml>(&content) {
        Ok(modules) => modules
            .virtual_store_dir
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable .modules.yaml, using default store");
            None
        }
    }
}

fn index_store(root: &Path) -> HashMap<PackageKey, PathBuf> {
    let mut entries = HashMap::new();

    let dir = match std::fs::read_dir(root) {
        Ok(dir) => dir,
        Err(e) => {
            debug!(store = %root.display(), error = %e, "virtual store not readable");
            return entries;
        }
    };

    for entry in dir.flatten() {
        let file_name = entry.file_name();
        let Some(dir_name) = file_name.to_str() else {
            continue;
        };
        let Some(key) = parse_store_entry(dir_name) else {
            continue;
        };

        let package_dir = entry.path().join(NODE_MODULES).join(&key.name);
        if !package_dir.is_dir() {
            continue;
        }
        // peer 변형이 여러 개면 먼저 본 것을 사용
        entries.entry(key).or_insert(package_dir);
    }

    entries
}

/// 저장소 디렉토리 이름을 `(name, version)`으로 분해합니다.
///
/// `@babel+runtime@7.20.13` -> `@babel/runtime`, `7.20.13`
pub fn parse_store_entry(dir_name: &str) -> Option<PackageKey> {
    if dir_name.starts_with('.') || dir_name == NODE_MODULES {
        return None;
    }

    let skip = usize::from(dir_name.starts_with('@'));
    let at = skip + dir_name[skip..].find('@')?;
    let name = dir_name[..at].replace('+', "/");
    let version = strip_peer_suffix(&dir_name[at + 1..]);

    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some(PackageKey::new(name, version))
}
