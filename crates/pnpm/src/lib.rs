#![doc = include_str!("../README.md")]
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`PnpmError`)
//! - [`config`]: Handler configuration (`PnpmHandlerConfig`, builder)
//! - [`types`]: Domain types (`PackageKey`, `ChecksumMode`, `Diagnostic`, `DependencyTree`)
//! - [`lockfile`]: pnpm-lock.yaml parser (`PnpmLockParser`, `LockfileGraph`)
//! - [`manifest`]: package.json reader (`PackageManifest`)
//! - [`validator`]: Project and install checks
//! - [`store`]: Virtual store index (`VirtualStore`)
//! - [`metadata`]: Module enrichment (`MetadataResolver`)
//! - [`tree`]: Dependency tree walk (`ModuleTreeBuilder`)
//! - [`root`]: Root module extraction
//! - [`handler`]: `ModuleHandler` implementation (`PnpmHandler`)

pub mod config;
pub mod error;
pub mod handler;
pub mod lockfile;
pub mod manifest;
pub mod metadata;
pub mod root;
pub mod store;
pub mod tree;
pub mod types;
pub mod validator;

// --- Public API Re-exports ---

// Handler
pub use handler::PnpmHandler;

// Configuration
pub use config::{PnpmHandlerConfig, PnpmHandlerConfigBuilder};

// Error
pub use error::PnpmError;

// Types
pub use types::{
    ChecksumMode, DependencyKind, DependencyTree, Diagnostic, DiagnosticKind, PackageKey,
    ResolvedModule,
};

// Parser
pub use lockfile::{LOCKFILE_NAME, LockfileGraph, PnpmLockParser};

// Resolution
pub use metadata::MetadataResolver;
pub use store::VirtualStore;
pub use tree::ModuleTreeBuilder;
