//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{Builder, clean_output};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Environment name; `production` enables drafts filtering and the asset manifest.
    #[arg(short, long, env = "FOLIO_ENV", default_value = "local")]
    env: String,

    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Base URL for absolute links (overrides config).
    #[arg(long)]
    url: Option<String>,

    /// Remove previous output before building (dotfiles are kept).
    #[arg(long)]
    clean: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            environment: Some(self.env),
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            url: self.url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if config.is_production() {
            output.stage("Building production version...");
        } else {
            output.stage(&format!("Building {} version...", config.environment));
        }
        output.detail("Source", &config.build_resolved.source_dir.display().to_string());
        output.detail("Output", &config.build_resolved.output_dir.display().to_string());

        if self.clean {
            let removed = clean_output(&config.build_resolved.output_dir)?;
            output.info(&format!("Cleaned {removed} entries"));
        }

        let report = Builder::new(config).build()?;

        output.info(&format!(
            "Pages: {} written from {} entities",
            report.pages_written, report.entities
        ));
        if report.drafts_skipped > 0 {
            output.info(&format!("Drafts skipped: {}", report.drafts_skipped));
        }
        output.info(&format!("Static files: {}", report.static_copied));
        output.success("Build complete!");

        Ok(())
    }
}
