//! pnpm handler -- [`ModuleHandler`] 구현
//!
//! [`PnpmHandler`]는 검증, lockfile 파싱, 트리 구성, 메타데이터 보강을 묶어
//! core의 [`ModuleHandler`] trait으로 노출합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! project_dir --> validator --> PnpmLockParser --> LockfileGraph
//!                                                      |
//!                                             ModuleTreeBuilder (BFS)
//!                                                      |
//!                          VirtualStore --> MetadataResolver
//!                                                      |
//!                                       DependencyTree { modules, diagnostics }
//! ```
//!
//! 각 호출은 디스크에서 새로 해석하며 호출 사이에 상태를 공유하지 않습니다.

use std::path::Path;

use sbomkit_core::error::SbomkitError;
use sbomkit_core::handler::ModuleHandler;
use sbomkit_core::types::{GlobalSettings, Module};

use crate::config::PnpmHandlerConfig;
use crate::error::PnpmError;
use crate::manifest::MANIFEST_NAME;
use crate::tree::ModuleTreeBuilder;
use crate::types::DependencyTree;
use crate::{root, validator};

/// pnpm 패키지 관리자 handler
#[derive(Debug, Clone, Default)]
pub struct PnpmHandler {
    config: PnpmHandlerConfig,
}

impl PnpmHandler {
    /// 기본 설정으로 handler를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 주어진 설정으로 handler를 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `PnpmError::Config`
    pub fn with_config(config: PnpmHandlerConfig) -> Result<Self, PnpmError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// handler 설정을 반환합니다.
    pub fn config(&self) -> &PnpmHandlerConfig {
        &self.config
    }

    /// 프로젝트 매니페스트가 있는지 확인합니다.
    pub fn is_valid(&self, project_dir: &Path) -> bool {
        validator::is_valid(project_dir)
    }

    /// 의존성이 설치되어 있는지 확인합니다.
    pub fn has_modules_installed(&self, project_dir: &Path) -> Result<(), PnpmError> {
        validator::has_modules_installed(project_dir)
    }

    /// 루트 모듈을 반환합니다.
    pub fn get_root_module(&self, project_dir: &Path) -> Result<Module, PnpmError> {
        root::get_root_module(project_dir)
    }

    /// 선언된 직접 의존성 목록을 반환합니다.
    pub fn list_used_modules(&self, project_dir: &Path) -> Result<Vec<Module>, PnpmError> {
        ModuleTreeBuilder::new(&self.config).list_used_modules(project_dir)
    }

    /// 직접 + 전이 의존성 전체 목록을 반환합니다.
    pub fn list_modules_with_deps(
        &self,
        project_dir: &Path,
        settings: &GlobalSettings,
    ) -> Result<Vec<Module>, PnpmError> {
        ModuleTreeBuilder::new(&self.config).list_modules_with_deps(project_dir, settings)
    }

    /// 전체 의존성 트리와 진단을 반환합니다.
    pub fn resolve_tree(
        &self,
        project_dir: &Path,
        settings: &GlobalSettings,
    ) -> Result<DependencyTree, PnpmError> {
        ModuleTreeBuilder::new(&self.config).resolve_tree(project_dir, settings)
    }
}

impl ModuleHandler for PnpmHandler {
    fn name(&self) -> &str {
        "pnpm"
    }

    fn manifest_file(&self) -> &str {
        MANIFEST_NAME
    }

    fn is_valid(&self, path: &Path) -> bool {
        PnpmHandler::is_valid(self, path)
    }

    fn has_modules_installed(&self, path: &Path) -> Result<(), SbomkitError> {
        Ok(PnpmHandler::has_modules_installed(self, path)?)
    }

    fn get_root_module(&self, path: &Path) -> Result<Module, SbomkitError> {
        Ok(PnpmHandler::get_root_module(self, path)?)
    }

    fn list_used_modules(&self, path: &Path) -> Result<Vec<Module>, SbomkitError> {
        Ok(PnpmHandler::list_used_modules(self, path)?)
    }

    fn list_modules_with_deps(
        &self,
        path: &Path,
        settings: &GlobalSettings,
    ) -> Result<Vec<Module>, SbomkitError> {
        Ok(PnpmHandler::list_modules_with_deps(self, path, settings)?)
    }
}
