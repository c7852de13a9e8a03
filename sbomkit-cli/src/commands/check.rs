//! `sbomkit check` command handler

use std::io::Write;
use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use sbomkit_core::config::SbomkitConfig;

use crate::cli::ProjectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `check` command.
///
/// The report is always rendered. A failed check then surfaces as an error
/// so the exit code reflects it.
pub async fn execute(
    args: ProjectArgs,
    config: &SbomkitConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let handler = super::build_handler(config)?;
    let path = args.path;

    let task_path = path.clone();
    let (valid, installed) = tokio::task::spawn_blocking(move || {
        let valid = handler.is_valid(&task_path);
        let installed = valid.then(|| handler.has_modules_installed(&task_path));
        (valid, installed)
    })
    .await?;

    let (modules_installed, failure) = match installed {
        None => (false, None),
        Some(Ok(())) => (true, None),
        Some(Err(e)) => (false, Some(e)),
    };

    info!(
        path = %path.display(),
        valid,
        modules_installed,
        "project check finished"
    );

    let report = CheckReport {
        path,
        valid,
        modules_installed,
    };
    writer.render(&report)?;

    if !valid {
        return Err(sbomkit_pnpm::PnpmError::InvalidProject {
            path: report.path.display().to_string(),
        }
        .into());
    }
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Result of a project check.
#[derive(Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub valid: bool,
    pub modules_installed: bool,
}

impl Render for CheckReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", "Project Check".bold())?;
        writeln!(w, "  Path:              {}", self.path.display())?;
        writeln!(w, "  pnpm project:      {}", yes_no(self.valid))?;
        writeln!(w, "  Modules installed: {}", yes_no(self.modules_installed))?;
        Ok(())
    }
}

fn yes_no(flag: bool) -> colored::ColoredString {
    if flag { "yes".green() } else { "no".red() }
}
