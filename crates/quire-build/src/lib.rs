//! Batch build pipeline for quire.
//!
//! [`build`] compiles the configured corpus and writes the site in one
//! all-or-nothing step:
//!
//! ```no_run
//! use quire_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let report = quire_build::build(&config)?;
//! println!("{} documents", report.document_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod artifacts;
mod error;
mod pipeline;
mod scanner;
mod template;

pub use artifacts::{BuildReport, write_site};
pub use error::BuildError;
pub use pipeline::{CompiledPage, SiteBuild, compile_site};

use quire_config::Config;

/// Compile the corpus and write all artifacts.
///
/// On any error the output directory is left untouched.
pub fn build(config: &Config) -> Result<BuildReport, BuildError> {
    let site = compile_site(config)?;
    write_site(&site, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(SiteBuild: Send, Sync);
    static_assertions::assert_impl_all!(BuildError: Send, Sync);
}
