//! Build pipeline for the Receptar icon font.

mod stages;

pub use stages::{BuildPlan, PlannedGlyph, build_glyphs, export, load_plan, normalize_font};

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use chrono::Utc;
use receptar_font_builder::FontInfo;

use crate::{backend::IconFontEditor, config::BuildConfig, editor::FontEditor, error::Result};

const TOTAL_STAGES: usize = 4;
const RULE: &str =
    "═══════════════════════════════════════════════════════════════════════════════";

#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub outputs: Vec<PathBuf>,
    pub glyph_count: usize,
    pub elapsed: Duration,
}

pub fn run_stage<T>(name: &str, stage_num: usize, f: impl FnOnce() -> Result<T>) -> Result<T> {
    println!("\n[{stage_num}/{TOTAL_STAGES}] {name}");
    let start = Instant::now();
    let value = f()?;
    println!("  ✓ {name} ({:.2}s)", start.elapsed().as_secs_f64());
    Ok(value)
}

/// Font metadata for `config`, stamped with its timestamp or the current time.
pub fn font_info(config: &BuildConfig) -> FontInfo {
    let timestamp = config.timestamp.unwrap_or_else(|| Utc::now().timestamp());
    FontInfo::new(config.family_name()).with_timestamp(timestamp)
}

/// Run all four stages against `editor`.
pub fn build_with(config: &BuildConfig, editor: &mut impl FontEditor) -> Result<BuildSummary> {
    let start = Instant::now();

    let plan = run_stage("Load glyph table", 1, || load_plan(config))?;
    run_stage("Build glyphs", 2, || build_glyphs(&plan, editor))?;
    run_stage("Remove overlaps", 3, || normalize_font(editor))?;
    let outputs = run_stage("Export", 4, || export(editor, config))?;

    Ok(BuildSummary { outputs, glyph_count: plan.glyphs.len(), elapsed: start.elapsed() })
}

/// Build the icon font with the default backend.
pub fn build(config: &BuildConfig) -> Result<BuildSummary> {
    println!("{RULE}");
    println!("Receptar Icons Build Pipeline");
    println!("{RULE}");

    let mut editor = IconFontEditor::new(font_info(config));
    let summary = build_with(config, &mut editor)?;

    println!("\n{RULE}");
    println!("✨ Build complete in {:.2}s", summary.elapsed.as_secs_f64());
    println!("   Output: {}", config.fonts_path().display());
    println!("   Glyphs: {}", summary.glyph_count);
    println!("{RULE}");

    Ok(summary)
}
