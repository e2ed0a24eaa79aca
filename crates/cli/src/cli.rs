//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::warn;
use receptar_icons_core::{
    BuildConfig, FontFormat, GLYPHS, build, check,
    config::{FONT_NAME, FONTS_DIR, ICONS_DIR},
};

use crate::timestamp;

#[derive(Parser)]
#[command(name = "receptar-icons")]
#[command(about = "Build the Receptar icon font from SVG sources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SourceArgs {
    /// Project root the other directories are relative to
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    #[arg(long, default_value = ICONS_DIR)]
    pub icons_dir: PathBuf,
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    #[arg(long, default_value = FONTS_DIR)]
    pub fonts_dir: PathBuf,
    /// Base name of the output files
    #[arg(long, default_value = FONT_NAME)]
    pub name: String,
    /// Formats to write (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "woff2,woff,ttf,otf")]
    pub format: Vec<FontFormat>,
}

impl SourceArgs {
    pub fn config(&self) -> BuildConfig {
        BuildConfig::new(&self.root).with_icons_dir(&self.icons_dir)
    }
}

impl BuildArgs {
    pub fn config(&self, timestamp: i64) -> BuildConfig {
        self.source
            .config()
            .with_fonts_dir(&self.fonts_dir)
            .with_name(&self.name)
            .with_formats(self.format.clone())
            .with_timestamp(timestamp)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every font format
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Check the glyph table and its source files without building
    Check {
        #[command(flatten)]
        args: SourceArgs,
    },
    /// Print the glyph table
    List,
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Build { args } => {
                let config = args.config(timestamp::from_env()?);
                build(&config).context("Icon font build failed")?;
            }
            Commands::Check { args } => {
                let config = args.config();
                let report = check(&config);
                for warning in &report.warnings {
                    warn!("{warning}");
                }
                for problem in &report.problems {
                    println!("✗ {problem}");
                }
                if !report.is_ok() {
                    bail!("{} problem(s) found", report.problems.len());
                }
                println!(
                    "✓ {} glyphs OK in {}",
                    config.glyphs.len(),
                    config.icons_path().display()
                );
            }
            Commands::List => {
                for glyph in GLYPHS {
                    println!("{:<10} U+{:04X}  {}", glyph.name, glyph.code_point, glyph.source);
                }
            }
        }
        Ok(())
    }
}
