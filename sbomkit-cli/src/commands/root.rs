//! `sbomkit root` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use sbomkit_core::types::Module;
use sbomkit_pnpm::PnpmHandler;

use crate::cli::ProjectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `root` command.
///
/// 루트 모듈은 설정과 무관하게 프로젝트 매니페스트에서만 만들어집니다.
pub async fn execute(args: ProjectArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let handler = PnpmHandler::new();
    let module =
        tokio::task::spawn_blocking(move || handler.get_root_module(&args.path)).await??;

    writer.render(&RootReport { module })
}

/// Root module of a project.
#[derive(Serialize)]
#[serde(transparent)]
pub struct RootReport {
    pub module: Module,
}

impl Render for RootReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        let m = &self.module;
        writeln!(w, "{}", "Root Module".bold())?;
        writeln!(w, "  Name:     {}", m.name.as_str().cyan())?;
        writeln!(w, "  Version:  {}", or_dash(&m.version))?;
        writeln!(w, "  Supplier: {}", or_dash(&m.supplier.name))?;
        writeln!(w, "  License:  {}", or_dash(&m.license_declared))?;
        writeln!(w, "  Download: {}", or_dash(&m.package_download_location))?;
        writeln!(w, "  Purl:     {}", or_dash(&m.package_url))?;
        Ok(())
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbomkit_core::types::{Relationship, Supplier};

    fn sample() -> RootReport {
        let mut module = Module::new("my-app", "1.2.0");
        module.supplier = Supplier::organization("my-app");
        module.package_url = "pkg:npm/my-app@1.2.0".to_owned();
        module.relationship = Relationship::Root;
        RootReport { module }
    }

    #[test]
    fn test_root_report_text_rendering() {
        let mut buffer = Vec::new();
        sample().render_text(&mut buffer).expect("render should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("my-app"));
        assert!(output.contains("1.2.0"));
        assert!(output.contains("pkg:npm/my-app@1.2.0"));
        assert!(output.contains("Download: -"), "empty fields render as dash");
    }

    #[test]
    fn test_root_report_serializes_as_module() {
        let value = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(value["name"], "my-app");
        assert_eq!(value["version"], "1.2.0");
        assert_eq!(value["relationship"], "root");
    }
}
