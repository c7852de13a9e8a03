//! `sbomkit list` command handler

use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use tracing::{info, warn};

use sbomkit_core::config::SbomkitConfig;
use sbomkit_core::types::{GlobalSettings, Module};
use sbomkit_pnpm::Diagnostic;

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `list` command.
///
/// Without `--all` only declared direct dependencies are listed.
/// With `--all` the full tree is resolved and non-fatal diagnostics are reported too.
pub async fn execute(
    args: ListArgs,
    config: &SbomkitConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let handler = super::build_handler(config)?;
    let settings = store_settings(args.store_dir);

    info!(path = %args.path.display(), all = args.all, "listing modules");

    let path = args.path;
    let report = if args.all {
        let tree = tokio::task::spawn_blocking({
            let path = path.clone();
            move || handler.resolve_tree(&path, &settings)
        })
        .await??;

        for diagnostic in &tree.diagnostics {
            warn!(subject = %diagnostic.subject, "{}", diagnostic.message);
        }

        ListReport {
            path,
            lockfile_version: Some(tree.lockfile_version),
            modules: tree.modules,
            diagnostics: tree.diagnostics,
        }
    } else {
        let modules = tokio::task::spawn_blocking({
            let path = path.clone();
            move || handler.list_used_modules(&path)
        })
        .await??;

        ListReport {
            path,
            lockfile_version: None,
            modules,
            diagnostics: Vec::new(),
        }
    };

    writer.render(&report)
}

/// `--store-dir` 경로를 그대로 전역 설정으로 옮깁니다.
fn store_settings(store_dir: Option<PathBuf>) -> GlobalSettings {
    GlobalSettings {
        alternate_store_path: store_dir.filter(|dir| !dir.as_os_str().is_empty()),
    }
}

/// Modules resolved for a project.
#[derive(Serialize)]
pub struct ListReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lockfile_version: Option<String>,
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Render for ListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Modules".bold())?;
        writeln!(w, "  Path: {}", self.path.display())?;
        if let Some(version) = &self.lockfile_version {
            writeln!(w, "  Lockfile version: {}", version)?;
        }
        writeln!(w)?;

        if self.modules.is_empty() {
            writeln!(w, "  No modules found.")?;
        } else {
            writeln!(
                w,
                "  {:<40} {:<16} {:<12} {:<16}",
                "NAME", "VERSION", "RELATION", "LICENSE"
            )?;
            writeln!(w, "  {}", "-".repeat(86))?;
            for m in &self.modules {
                let license = if m.license_declared.is_empty() {
                    "-"
                } else {
                    m.license_declared.as_str()
                };
                writeln!(
                    w,
                    "  {:<40} {:<16} {:<12} {:<16}",
                    m.name,
                    m.version,
                    m.relationship.to_string(),
                    license
                )?;
            }
        }

        writeln!(w)?;
        writeln!(w, "  Total: {} module(s)", self.modules.len())?;

        if !self.diagnostics.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "{} ({})",
                "Diagnostics".yellow().bold(),
                self.diagnostics.len()
            )?;
            for d in &self.diagnostics {
                writeln!(w, "  {} {}", "!".yellow(), d)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbomkit_core::types::Relationship;
    use sbomkit_pnpm::DiagnosticKind;

    fn module(name: &str, version: &str, relationship: Relationship) -> Module {
        let mut m = Module::new(name, version);
        m.relationship = relationship;
        m.license_declared = "MIT".to_owned();
        m
    }

    #[test]
    fn test_store_settings_default_without_store_dir() {
        assert!(store_settings(None).is_default());
        assert!(store_settings(Some(PathBuf::new())).is_default());
    }

    #[cfg(unix)]
    #[test]
    fn test_store_settings_keeps_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = PathBuf::from(OsStr::from_bytes(b"/opt/st\xffore"));
        let settings = store_settings(Some(dir.clone()));
        assert_eq!(settings.alternate_store_path, Some(dir));
    }

    #[test]
    fn test_list_report_text_rendering() {
        let report = ListReport {
            path: PathBuf::from("/srv/app"),
            lockfile_version: Some("5.4".to_owned()),
            modules: vec![
                module("axios", "0.19.2", Relationship::Direct),
                module("ms", "2.0.0", Relationship::Transitive),
            ],
            diagnostics: vec![Diagnostic {
                subject: "ms@2.0.0".to_owned(),
                kind: DiagnosticKind::ManifestRead,
                message: "manifest read error".to_owned(),
            }],
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("axios"));
        assert!(output.contains("0.19.2"));
        assert!(output.contains("transitive"));
        assert!(output.contains("Lockfile version: 5.4"));
        assert!(output.contains("Total: 2 module(s)"));
        assert!(output.contains("ms@2.0.0: manifest read error"));
    }

    #[test]
    fn test_list_report_empty_modules() {
        let report = ListReport {
            path: PathBuf::from("."),
            lockfile_version: None,
            modules: Vec::new(),
            diagnostics: Vec::new(),
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("No modules found."));
        assert!(!output.contains("Diagnostics"));
    }

    #[test]
    fn test_list_report_json_omits_empty_sections() {
        let report = ListReport {
            path: PathBuf::from("."),
            lockfile_version: None,
            modules: vec![module("react", "16.14.0", Relationship::Direct)],
            diagnostics: Vec::new(),
        };

        let value = serde_json::to_value(&report).expect("serialize");
        assert!(value.get("lockfile_version").is_none());
        assert!(value.get("diagnostics").is_none());
        assert_eq!(value["modules"][0]["name"], "react");
    }
}
