//! `quire serve` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_server::{ServeConfig, run_server};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Built site directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the site was never built or
    /// the server fails to start.
    pub(crate) async fn execute(self, config_path: Option<&Path>) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            output_dir: self.output_dir,
            ..CliSettings::default()
        };
        let config = Config::load(config_path, Some(&cli_settings))?;
        let serve_config = ServeConfig::from_config(&config);

        output.info(&format!(
            "Serving {} on http://{}:{}{}",
            serve_config.output_dir.display(),
            serve_config.host,
            serve_config.port,
            config.site.base_url
        ));

        run_server(serve_config).await?;
        Ok(())
    }
}
