//! `quire build` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quire_build::BuildError;
use quire_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Publish documents marked as drafts.
    #[arg(long)]
    include_drafts: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the build reports any
    /// diagnostic.
    pub(crate) fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            include_drafts: self.include_drafts.then_some(true),
            ..CliSettings::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;
        tracing::debug!(config_path = ?config.config_path, "Loaded configuration");

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.docs_resolved.output_dir.display()
        ));

        let report = match quire_build::build(&config) {
            Ok(report) => report,
            Err(err) => {
                report_diagnostics(&output, &err);
                return Err(err.into());
            }
        };

        if report.document_count == 0 {
            output.warning("No documents found");
        }
        output.success(&format!(
            "Built {} document(s) in {} version(s), {} route(s)",
            report.document_count, report.version_count, report.route_count
        ));
        Ok(())
    }
}

fn report_diagnostics(output: &Output, err: &BuildError) {
    if let Some(diagnostics) = err.diagnostics() {
        output.diagnostics(diagnostics);
    }
}
