//! pnpm-lock.yaml 파서
//!
//! [`PnpmLockParser`]는 pnpm lockfile(v5.x, v6.x, v9.x)을 파싱하여
//! `(name, version)` 노드와 depends-on 간선으로 이루어진 [`LockfileGraph`]를 생성합니다.
//!
//! # pnpm-lock.yaml v9 형식 예시
//!
//! ```yaml
//! lockfileVersion: '9.0'
//! importers:
//!   .:
//!     dependencies:
//!       axios:
//!         specifier: ^0.19.0
//!         version: 0.19.2
//! packages:
//!   axios@0.19.2:
//!     resolution: {integrity: sha512-...}
//! snapshots:
//!   axios@0.19.2:
//!     dependencies:
//!       follow-redirects: 1.5.10
//! ```
//!
//! 같은 `(name, version)`의 peer 변형들은 하나의 노드로 합쳐집니다.

pub mod depath;
mod raw;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::PnpmError;
use crate::types::{DependencyKind, PackageKey};

use self::depath::{DepRef, KeyStyle, classify_reference, parse_dep_path};
use self::raw::{RawImporter, RawLockfile, importer_entry, scalar_to_string};

/// pnpm lockfile 파일명
pub const LOCKFILE_NAME: &str = "pnpm-lock.yaml";

/// 지원하는 lockfile 주 버전 범위
const SUPPORTED_MAJORS: std::ops::RangeInclusive<u32> = 5..=9;

/// 노드 간 depends-on 간선
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// 의존하는 쪽에서 선언한 이름 (alias일 수 있음)
    pub name: String,
    /// lockfile에 기록된 원본 참조
    pub reference: String,
    /// 해석된 대상 노드, 링크나 누락이면 `None`
    pub target: Option<PackageKey>,
    /// optionalDependencies 간선 여부
    pub optional: bool,
}

/// 그래프 노드 (설치된 패키지 하나)
#[derive(Debug, Clone)]
pub struct LockNode {
    /// 노드 식별자
    pub key: PackageKey,
    /// SRI integrity (예: `sha512-...`)
    pub integrity: Option<String>,
    /// 레지스트리 밖 tarball 주소
    pub tarball: Option<String>,
    /// dev 전용 여부 (v5/v6)
    pub dev: Option<bool>,
    /// optional 여부
    pub optional: bool,
    /// 하위 의존성 간선
    pub dependencies: Vec<DependencyEdge>,
}

impl LockNode {
    fn new(key: PackageKey) -> Self {
        Self {
            key,
            integrity: None,
            tarball: None,
            dev: None,
            optional: false,
            dependencies: Vec::new(),
        }
    }

    /// 해석된 하위 노드 식별자를 반환합니다.
    pub fn children(&self, include_optional: bool) -> impl Iterator<Item = &PackageKey> {
        self.dependencies
            .iter()
            .filter(move |edge| include_optional || !edge.optional)
            .filter_map(|edge| edge.target.as_ref())
    }
}

/// 루트 프로젝트의 직접 의존성
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectDependency {
    /// 매니페스트에 선언된 이름
    pub name: String,
    /// 선언된 버전 범위 (예: `^0.19.0`)
    pub specifier: Option<String>,
    /// lockfile 참조 원본
    pub reference: String,
    /// 해석된 대상 노드
    pub target: Option<PackageKey>,
    /// 의존성 종류
    pub kind: DependencyKind,
}

/// lockfile 의존성 그래프
///
/// 노드는 평면 슬롯 목록에 저장되고 `(name, version)` 색인으로 조회합니다.
#[derive(Debug, Clone)]
pub struct LockfileGraph {
    /// 원본 lockfile 경로
    pub source_file: String,
    /// lockfile 버전 표기 (예: "5.4", "9.0")
    pub lockfile_version: String,
    /// 루트 프로젝트의 직접 의존성
    pub direct: Vec<DirectDependency>,
    nodes: Vec<LockNode>,
    index: HashMap<PackageKey, usize>,
}

impl LockfileGraph {
    /// 노드 수를 반환합니다.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 전체 노드를 반환합니다.
    pub fn nodes(&self) -> &[LockNode] {
        &self.nodes
    }

    /// 식별자로 노드를 조회합니다.
    pub fn node(&self, key: &PackageKey) -> Option<&LockNode> {
        self.index.get(key).map(|&slot| &self.nodes[slot])
    }

    /// 노드 존재 여부를 반환합니다.
    pub fn contains(&self, key: &PackageKey) -> bool {
        self.index.contains_key(key)
    }

    /// 선언된 이름으로 직접 의존성을 조회합니다.
    pub fn direct_dependency(&self, name: &str) -> Option<&DirectDependency> {
        self.direct.iter().find(|d| d.name == name)
    }

    /// lockfile 주 버전을 반환합니다.
    pub fn major_version(&self) -> u32 {
        lockfile_major(&self.lockfile_version).unwrap_or(0)
    }
}

/// pnpm-lock.yaml 파서
pub struct PnpmLockParser;

impl PnpmLockParser {
    /// 프로젝트 디렉토리의 lockfile을 읽어 파싱합니다.
    ///
    /// # Errors
    ///
    /// - lockfile이 없거나 파싱할 수 없으면 `LockfileParse`
    /// - 크기가 `max_size`를 넘으면 `FileTooBig`
    pub fn load(&self, project_dir: &Path, max_size: usize) -> Result<LockfileGraph, PnpmError> {
        let path = project_dir.join(LOCKFILE_NAME);
        let path_str = path.display().to_string();

        let metadata = std::fs::metadata(&path).map_err(|e| PnpmError::LockfileParse {
            path: path_str.clone(),
            reason: if e.kind() == std::io::ErrorKind::NotFound {
                "lockfile not found".to_owned()
            } else {
                e.to_string()
            },
        })?;

        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > max_size {
            return Err(PnpmError::FileTooBig {
                path: path_str,
                size,
                max: max_size,
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| PnpmError::Io {
            path: path_str.clone(),
            source: e,
        })?;

        self.parse(&content, &path_str)
    }

    /// lockfile 내용을 파싱하여 의존성 그래프를 반환합니다.
    ///
    /// # Arguments
    ///
    /// - `content`: lockfile 내용 (UTF-8 YAML)
    /// - `source_path`: 원본 파일 경로 (에러 메시지용)
    pub fn parse(&self, content: &str, source_path: &str) -> Result<LockfileGraph, PnpmError> {
        let parse_error = |reason: String| PnpmError::LockfileParse {
            path: source_path.to_owned(),
            reason,
        };

        let mut raw: RawLockfile =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        let lockfile_version = raw
            .lockfile_version
            .as_ref()
            .and_then(scalar_to_string)
            .ok_or_else(|| parse_error("missing lockfileVersion".to_owned()))?;

        let major = lockfile_major(&lockfile_version)
            .ok_or_else(|| parse_error(format!("invalid lockfileVersion '{lockfile_version}'")))?;
        if !SUPPORTED_MAJORS.contains(&major) {
            return Err(parse_error(format!(
                "unsupported lockfileVersion '{lockfile_version}'"
            )));
        }

        let mut builder = GraphBuilder::new(KeyStyle::for_major(major));

        for (key, package) in &raw.packages {
            let Some(node_key) = builder.package_key(key, package.name.as_deref(), package.version.as_ref())
            else {
                warn!(key = %key, path = %source_path, "unrecognized package key, skipping");
                continue;
            };

            let slot = builder.upsert(key, node_key);
            let node = &mut builder.nodes[slot];
            if let Some(ref resolution) = package.resolution {
                if node.integrity.is_none() {
                    node.integrity.clone_from(&resolution.integrity);
                }
                if node.tarball.is_none() {
                    node.tarball.clone_from(&resolution.tarball);
                }
            }
            if package.dev.is_some() {
                node.dev = package.dev;
            }
            node.optional |= package.optional.unwrap_or(false);

            // v9 이전에는 packages 항목이 간선을 가짐
            builder.queue_edges(slot, &package.dependencies, false);
            builder.queue_edges(slot, &package.optional_dependencies, true);
        }

        for (key, snapshot) in &raw.snapshots {
            let Some(node_key) = builder.package_key(key, None, None) else {
                warn!(key = %key, path = %source_path, "unrecognized snapshot key, skipping");
                continue;
            };
            let slot = builder.upsert(key, node_key);
            builder.nodes[slot].optional |= snapshot.optional.unwrap_or(false);
            builder.queue_edges(slot, &snapshot.dependencies, false);
            builder.queue_edges(slot, &snapshot.optional_dependencies, true);
        }

        let importer = raw.take_root_importer();
        let graph = builder.finish(source_path, lockfile_version, &importer);

        debug!(
            path = %source_path,
            version = %graph.lockfile_version,
            nodes = graph.node_count(),
            direct = graph.direct.len(),
            "parsed pnpm lockfile"
        );

        Ok(graph)
    }
}

/// lockfile 버전 표기에서 주 버전을 추출합니다 ("5.4" -> 5, "9.0" -> 9).
pub fn lockfile_major(version: &str) -> Option<u32> {
    version.trim().split('.').next()?.parse().ok()
}

/// 그래프 조립 상태
///
/// 모든 노드가 등록된 뒤에 간선을 해석해야 alias 참조를 찾을 수 있으므로
/// 간선은 대기열에 모아두었다가 [`GraphBuilder::finish`]에서 해석합니다.
struct GraphBuilder {
    style: KeyStyle,
    nodes: Vec<LockNode>,
    index: HashMap<PackageKey, usize>,
    raw_keys: HashMap<String, PackageKey>,
    pending: Vec<(usize, String, String, bool)>,
}

impl GraphBuilder {
    fn new(style: KeyStyle) -> Self {
        Self {
            style,
            nodes: Vec::new(),
            index: HashMap::new(),
            raw_keys: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// 원본 키와 기록된 name/version 필드로 노드 식별자를 결정합니다.
    fn package_key(
        &self,
        raw_key: &str,
        name: Option<&str>,
        version: Option<&Value>,
    ) -> Option<PackageKey> {
        let parsed = parse_dep_path(raw_key, self.style);
        let version = version.and_then(scalar_to_string);

        match (parsed, name, version) {
            (_, Some(name), Some(version)) => Some(PackageKey::new(name, version)),
            (Some(parsed), Some(name), None) => Some(PackageKey::new(name, parsed.version)),
            (Some(parsed), None, Some(version)) => Some(PackageKey::new(parsed.name, version)),
            (Some(parsed), None, None) => Some(parsed),
            (None, _, _) => self.raw_keys.get(raw_key).cloned(),
        }
    }

    fn upsert(&mut self, raw_key: &str, key: PackageKey) -> usize {
        self.raw_keys.insert(raw_key.to_owned(), key.clone());
        if let Some(&slot) = self.index.get(&key) {
            return slot;
        }
        let slot = self.nodes.len();
        self.index.insert(key.clone(), slot);
        self.nodes.push(LockNode::new(key));
        slot
    }

    fn queue_edges(&mut self, slot: usize, deps: &BTreeMap<String, Value>, optional: bool) {
        for (name, value) in deps {
            match scalar_to_string(value) {
                Some(reference) => self.pending.push((slot, name.clone(), reference, optional)),
                None => warn!(dependency = %name, "non-scalar dependency reference, skipping"),
            }
        }
    }

    /// 의존성 참조를 대상 노드 식별자로 해석합니다.
    fn resolve(&self, name: &str, reference: &str) -> Option<PackageKey> {
        match classify_reference(reference) {
            DepRef::Version(version) => Some(PackageKey::new(name, version)),
            DepRef::Path(path) => self
                .raw_keys
                .get(&path)
                .cloned()
                .or_else(|| parse_dep_path(&path, self.style)),
            DepRef::Link(target) => {
                debug!(dependency = %name, target = %target, "workspace link, not a package node");
                None
            }
        }
    }

    fn finish(
        mut self,
        source_path: &str,
        lockfile_version: String,
        importer: &RawImporter,
    ) -> LockfileGraph {
        let pending = std::mem::take(&mut self.pending);
        for (slot, name, reference, optional) in pending {
            let target = self.resolve(&name, &reference);
            let edges = &mut self.nodes[slot].dependencies;
            // peer 변형을 합치면서 생긴 중복 간선 제거
            if edges
                .iter()
                .any(|e| e.name == name && e.target == target && e.optional == optional)
            {
                continue;
            }
            edges.push(DependencyEdge {
                name,
                reference,
                target,
                optional,
            });
        }

        let mut direct = Vec::new();
        let sections = [
            (&importer.dependencies, DependencyKind::Prod),
            (&importer.dev_dependencies, DependencyKind::Dev),
            (&importer.optional_dependencies, DependencyKind::Optional),
        ];
        for (deps, kind) in sections {
            for (name, value) in deps {
                let Some((specifier, reference)) = importer_entry(value) else {
                    warn!(dependency = %name, "malformed importer entry, skipping");
                    continue;
                };
                let specifier =
                    specifier.or_else(|| importer.specifiers.get(name).and_then(scalar_to_string));
                let target = self.resolve(name, &reference);
                direct.push(DirectDependency {
                    name: name.clone(),
                    specifier,
                    reference,
                    target,
                    kind,
                });
            }
        }

        LockfileGraph {
            source_file: source_path.to_owned(),
            lockfile_version,
            direct,
            nodes: self.nodes,
            index: self.index,
        }
    }
}
