//! 모듈 트리 구성
//!
//! [`ModuleTreeBuilder`]는 두 가지 목록을 만듭니다.
//!
//! - **선언 목록** ([`list_used_modules`](ModuleTreeBuilder::list_used_modules)):
//!   프로젝트 매니페스트에 선언된 직접 의존성, 선언된 기준 버전, 보강 없음
//! - **전체 트리** ([`resolve_tree`](ModuleTreeBuilder::resolve_tree)):
//!   lockfile 그래프를 직접 의존성부터 BFS로 탐색한 직접 + 전이 의존성, 메타데이터 보강
//!
//! 전체 트리 탐색은 방문 집합으로 중복과 순환을 처리하며,
//! 개별 모듈의 실패는 [`Diagnostic`]으로 흡수합니다.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use sbomkit_core::metrics as m;
use sbomkit_core::types::{GlobalSettings, Module, Relationship};

use crate::config::PnpmHandlerConfig;
use crate::error::PnpmError;
use crate::lockfile::depath::{DepRef, classify_reference};
use crate::lockfile::{LockfileGraph, PnpmLockParser};
use crate::manifest::{PackageManifest, alias_target, base_version, is_local_specifier};
use crate::metadata::MetadataResolver;
use crate::store::VirtualStore;
use crate::types::{DependencyKind, DependencyTree, Diagnostic, DiagnosticKind, PackageKey};
use crate::validator::{self, NODE_MODULES};

/// 의존성 트리 구성기
pub struct ModuleTreeBuilder<'a> {
    config: &'a PnpmHandlerConfig,
    parser: PnpmLockParser,
}

impl<'a> ModuleTreeBuilder<'a> {
    /// 새 구성기를 생성합니다.
    pub fn new(config: &'a PnpmHandlerConfig) -> Self {
        Self {
            config,
            parser: PnpmLockParser,
        }
    }

    /// 매니페스트에 선언된 직접 의존성 목록을 반환합니다.
    ///
    /// 버전은 선언된 범위의 기준 버전입니다 (`^0.19.0` -> `0.19.0`).
    /// 기준 버전이 없으면 lockfile importer의 해석 버전, 그다음 설치된 패키지 버전을 씁니다.
    /// npm alias는 실제 패키지 이름으로 보고하며, `link:`/`workspace:` 선언은 제외합니다.
    ///
    /// # Errors
    ///
    /// - 매니페스트가 없으면 `InvalidProject`
    /// - 선언된 의존성이 있지만 하나도 해석하지 못하면 `ModuleResolution`
    pub fn list_used_modules(&self, project_dir: &Path) -> Result<Vec<Module>, PnpmError> {
        validator::ensure_valid(project_dir)?;
        let manifest = PackageManifest::read(project_dir)?;

        let declared: Vec<_> = manifest
            .declared_dependencies(self.config.include_dev, self.config.include_optional)
            .into_iter()
            .filter(|(name, specifier, _)| {
                let local = is_local_specifier(specifier);
                if local {
                    debug!(dependency = %name, specifier = %specifier, "skipping workspace package");
                }
                !local
            })
            .collect();
        if declared.is_empty() {
            debug!(path = %project_dir.display(), "no dependencies declared");
            return Ok(Vec::new());
        }

        // lockfile은 기준 버전이 없는 선언에만 필요
        let graph = match self.parser.load(project_dir, self.config.max_lockfile_size) {
            Ok(graph) => Some(graph),
            Err(e) => {
                debug!(path = %project_dir.display(), error = %e, "lockfile unavailable for declared view");
                None
            }
        };

        let mut modules = Vec::with_capacity(declared.len());
        for (name, specifier, _kind) in &declared {
            match declared_module(project_dir, graph.as_ref(), name, specifier) {
                Some(key) => {
                    let mut module = Module::new(key.name, key.version);
                    module.relationship = Relationship::Direct;
                    modules.push(module);
                }
                None => {
                    warn!(dependency = %name, specifier = %specifier, "cannot determine version, omitting");
                    metrics::counter!(m::PNPM_RESOLUTION_GAPS_TOTAL).increment(1);
                }
            }
        }

        if modules.is_empty() {
            return Err(PnpmError::ModuleResolution {
                name: manifest
                    .name
                    .clone()
                    .unwrap_or_else(|| project_dir.display().to_string()),
                reason: format!(
                    "none of {} declared dependencies could be resolved",
                    declared.len()
                ),
            });
        }

        sort_modules(&mut modules);
        modules.dedup_by(|a, b| a.name == b.name && a.version == b.version);

        debug!(
            path = %project_dir.display(),
            count = modules.len(),
            "listed declared modules"
        );
        Ok(modules)
    }

    /// 직접 + 전이 의존성 전체 목록을 반환합니다.
    pub fn list_modules_with_deps(
        &self,
        project_dir: &Path,
        settings: &GlobalSettings,
    ) -> Result<Vec<Module>, PnpmError> {
        self.resolve_tree(project_dir, settings).map(|tree| tree.modules)
    }

    /// 전체 의존성 트리와 흡수된 진단을 함께 반환합니다.
    ///
    /// # Errors
    ///
    /// - 매니페스트가 없으면 `InvalidProject`
    /// - `node_modules`가 없거나 비어 있으면 `ModulesNotInstalled`
    /// - lockfile이 없거나 파싱할 수 없으면 `LockfileParse`
    pub fn resolve_tree(
        &self,
        project_dir: &Path,
        settings: &GlobalSettings,
    ) -> Result<DependencyTree, PnpmError> {
        let start = Instant::now();

        validator::ensure_valid(project_dir)?;
        validator::has_modules_installed(project_dir)?;
        let manifest = PackageManifest::read(project_dir)?;
        let graph = self.parser.load(project_dir, self.config.max_lockfile_size)?;

        metrics::counter!(
            m::PNPM_LOCKFILES_PARSED_TOTAL,
            m::LABEL_LOCKFILE_VERSION => graph.major_version().to_string()
        )
        .increment(1);

        let mut diagnostics = Vec::new();
        let roots = self.collect_roots(&graph, &manifest, &mut diagnostics);
        let order = self.walk(&graph, &roots, &mut diagnostics);

        let store = VirtualStore::open(project_dir, self.config.store_dir.as_deref(), settings);
        let resolver = MetadataResolver::new(self.config, &store);

        let direct: HashSet<&PackageKey> = roots.iter().collect();
        let mut modules = Vec::with_capacity(order.len());
        for key in &order {
            let Some(node) = graph.node(key) else {
                continue;
            };
            let resolved = resolver.resolve(node);
            let mut module = resolved.module;
            if let Some(diagnostic) = resolved.diagnostic {
                diagnostics.push(diagnostic);
            }

            module.relationship = if direct.contains(key) {
                Relationship::Direct
            } else {
                Relationship::Transitive
            };
            let mut children: Vec<String> = node
                .children(self.config.include_optional)
                .filter(|child| graph.contains(child))
                .map(PackageKey::to_string)
                .collect();
            children.sort_unstable();
            children.dedup();
            module.dependencies = children;

            metrics::counter!(
                m::PNPM_MODULES_RESOLVED_TOTAL,
                m::LABEL_RELATIONSHIP => module.relationship.to_string()
            )
            .increment(1);
            modules.push(module);
        }

        sort_modules(&mut modules);
        record_diagnostics(&diagnostics);
        metrics::histogram!(m::PNPM_RESOLVE_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        info!(
            path = %project_dir.display(),
            lockfile = %graph.source_file,
            lockfile_version = %graph.lockfile_version,
            modules = modules.len(),
            direct = roots.len(),
            diagnostics = diagnostics.len(),
            store = %store.root().display(),
            "resolved pnpm dependency tree"
        );

        Ok(DependencyTree {
            modules,
            diagnostics,
            lockfile_version: graph.lockfile_version.clone(),
        })
    }

    /// 루트 importer의 직접 의존성을 그래프 노드로 대응시킵니다.
    fn collect_roots(
        &self,
        graph: &LockfileGraph,
        manifest: &PackageManifest,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<PackageKey> {
        let mut roots = Vec::new();

        for dep in &graph.direct {
            if !self.includes_kind(dep.kind) {
                continue;
            }
            match &dep.target {
                Some(target) if graph.contains(target) => roots.push(target.clone()),
                Some(target) => diagnostics.push(gap(
                    &dep.name,
                    format!("'{target}' is not a package in the lockfile"),
                )),
                None if is_link(&dep.reference) => {
                    debug!(dependency = %dep.name, reference = %dep.reference, "skipping workspace link");
                }
                None => diagnostics.push(gap(
                    &dep.name,
                    format!("unresolvable reference '{}'", dep.reference),
                )),
            }
        }

        for (name, _specifier, _kind) in
            manifest.declared_dependencies(self.config.include_dev, self.config.include_optional)
        {
            if graph.direct_dependency(name).is_none() {
                diagnostics.push(gap(name, "declared in package.json but missing from lockfile importer".to_owned()));
            }
        }

        roots.sort();
        roots.dedup();
        roots
    }

    /// 직접 의존성에서 시작하는 BFS 방문 순서를 반환합니다.
    fn walk(
        &self,
        graph: &LockfileGraph,
        roots: &[PackageKey],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<PackageKey> {
        let mut visited: HashSet<PackageKey> = HashSet::with_capacity(graph.node_count());
        let mut queue: VecDeque<PackageKey> = VecDeque::new();
        let mut order = Vec::new();

        for root in roots {
            if visited.insert(root.clone()) {
                queue.push_back(root.clone());
            }
        }

        while let Some(key) = queue.pop_front() {
            let Some(node) = graph.node(&key) else {
                continue;
            };

            for edge in &node.dependencies {
                if edge.optional && !self.config.include_optional {
                    continue;
                }
                match &edge.target {
                    Some(child) if graph.contains(child) => {
                        if visited.insert(child.clone()) {
                            queue.push_back(child.clone());
                        }
                    }
                    Some(child) => diagnostics.push(gap(
                        &edge.name,
                        format!("'{child}' required by '{key}' is not in the lockfile"),
                    )),
                    None if is_link(&edge.reference) => {}
                    None => diagnostics.push(gap(
                        &edge.name,
                        format!("unresolvable reference '{}' from '{key}'", edge.reference),
                    )),
                }
            }

            order.push(key);
        }

        order
    }

    fn includes_kind(&self, kind: DependencyKind) -> bool {
        match kind {
            DependencyKind::Prod => true,
            DependencyKind::Dev => self.config.include_dev,
            DependencyKind::Optional => self.config.include_optional,
        }
    }
}

/// 선언 목록용 `(name, version)`을 결정합니다.
///
/// 이름은 전체 트리와 같게 실제 설치되는 패키지 이름입니다.
fn declared_module(
    project_dir: &Path,
    graph: Option<&LockfileGraph>,
    name: &str,
    specifier: &str,
) -> Option<PackageKey> {
    let (package, range) = alias_target(name, specifier);
    if let Some(version) = base_version(range) {
        return Some(PackageKey::new(package, version));
    }

    let locked = graph
        .and_then(|g| g.direct_dependency(name))
        .and_then(|dep| dep.target.clone());
    if locked.is_some() {
        return locked;
    }

    // node_modules/<name>은 alias 이름으로 설치됨
    let installed = PackageManifest::read(&project_dir.join(NODE_MODULES).join(name)).ok()?;
    let version = installed.version.filter(|v| !v.is_empty())?;
    let package = installed
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| package.to_owned());
    Some(PackageKey::new(package, version))
}

fn gap(name: &str, reason: String) -> Diagnostic {
    let err = PnpmError::ModuleResolution {
        name: name.to_owned(),
        reason,
    };
    warn!(error = %err, "dependency resolution gap");
    Diagnostic {
        subject: name.to_owned(),
        kind: DiagnosticKind::ResolutionGap,
        message: err.to_string(),
    }
}

fn is_link(reference: &str) -> bool {
    matches!(classify_reference(reference), DepRef::Link(_))
}

fn record_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.kind {
            DiagnosticKind::ResolutionGap => {
                metrics::counter!(m::PNPM_RESOLUTION_GAPS_TOTAL).increment(1);
            }
            DiagnosticKind::ManifestRead => {
                metrics::counter!(m::PNPM_MANIFEST_READ_FAILURES_TOTAL).increment(1);
            }
        }
    }
}

/// `(name, version)` 순으로 정렬합니다.
fn sort_modules(modules: &mut [Module]) {
    modules.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
}
