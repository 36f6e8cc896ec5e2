//! ellibre CLI
//!
//! Builds the distributable bundles of the library.
//!
//! ```text
//! ellibre build [--root DIR]
//! ```

mod bundle;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::bundle::Project;

/// Bundle builder for the ellibre library
#[derive(Parser, Debug)]
#[command(name = "ellibre")]
#[command(about = "Bundle the ellibre sources and polyfills")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write polyfills.js and ellibre.js into the output directory
    Build {
        /// Project root containing src/, polyfills/, LICENSE and package.json
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { root } => {
            let project = Project::load(&root)?;
            let failed = project.build_all(&mut io::stdout())?;
            info!(root = %root.display(), failed, "build finished");
        }
    }

    Ok(())
}
