//! The four build stages.

use std::path::PathBuf;

use log::{debug, info};

use crate::{
    config::{BuildConfig, GlyphDef, is_file},
    editor::FontEditor,
    error::{Error, Result},
    io::FontFile,
    validate::validate_table,
};

/// A glyph table entry with its source resolved to a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedGlyph {
    pub def: GlyphDef,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    pub glyphs: Vec<PlannedGlyph>,
    pub advance_width: u16,
}

/// Validate the glyph table and resolve every source path.
///
/// Sources are not required to exist yet.
pub fn load_plan(config: &BuildConfig) -> Result<BuildPlan> {
    validate_table(&config.glyphs)?;
    let glyphs = config
        .glyphs
        .iter()
        .map(|&def| PlannedGlyph { def, path: config.source_path(&def) })
        .collect();
    Ok(BuildPlan { glyphs, advance_width: config.advance_width })
}

/// Create every glyph in table order from its source outline.
///
/// All sources are checked up front, so a missing file fails the stage
/// before any glyph is created.
pub fn build_glyphs(plan: &BuildPlan, editor: &mut impl FontEditor) -> Result<()> {
    if let Some(missing) = plan.glyphs.iter().find(|g| !is_file(&g.path)) {
        return Err(Error::MissingAsset {
            name: missing.def.name.to_string(),
            path: missing.path.clone(),
        });
    }

    for glyph in &plan.glyphs {
        let code_point = glyph.def.code_point;
        println!("  {}", glyph.def.name);
        editor.create_glyph(code_point)?;
        editor.import_outline(code_point, glyph.def.name, &glyph.path)?;
        editor.remove_glyph_overlap(code_point)?;
        match editor.bounding_box(code_point)? {
            Some(bbox) => debug!(
                "{} bbox: ({:.1}, {:.1}) - ({:.1}, {:.1})",
                glyph.def.name, bbox.x0, bbox.y0, bbox.x1, bbox.y1
            ),
            None => debug!("{} is empty", glyph.def.name),
        }
        editor.set_advance_width(code_point, plan.advance_width)?;
    }
    Ok(())
}

pub fn normalize_font(editor: &mut impl FontEditor) -> Result<()> {
    editor.remove_overlap()
}

/// Encode every configured format, then write them all.
///
/// Nothing is written unless every format encodes.
pub fn export(editor: &impl FontEditor, config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let encoded = config
        .formats
        .iter()
        .map(|&format| Ok((format, editor.encode(format)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(encoded.len());
    for (format, data) in encoded {
        let file = FontFile::new(config.output_path(format));
        file.ensure_parent_dir()?;
        file.write(&data)?;
        info!("wrote {} ({} bytes)", file.path().display(), data.len());
        println!("  {format}: {}", file.path().display());
        written.push(file.path().to_path_buf());
    }
    Ok(written)
}
