//! Writing rendered units to disk.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fpp_translate::naming::underscore;
use fpp_translate::render::collapse_blank_lines;
use fpp_translate::{
    compute_import_preamble, render_import_preamble, ExternalModule, RenderedUnit, Translation,
};
use tracing::debug;

/// `snake_case(name).py`
pub fn unit_file_name(unit: &RenderedUnit) -> String {
    format!("{}.py", underscore(&unit.name))
}

/// Contents of the standalone file for one unit: location headers, import
/// preamble, then the text.
pub fn render_unit_file(unit: &RenderedUnit, modules: &[ExternalModule]) -> String {
    let mut out = String::new();
    let location = unit.location.clone().unwrap_or_default();
    out.push_str(&format!("# Location: {}\n", location));
    if let Some(file) = &location.file {
        out.push_str(&format!("# Filename: {}\n", file));
    }
    let imports = render_import_preamble(&compute_import_preamble(unit, modules));
    if !imports.is_empty() {
        out.push_str(&imports);
        out.push('\n');
    }
    out.push_str(&collapse_blank_lines(&unit.text));
    out.push('\n');
    out
}

/// Contents of a single file holding every unit. Imports are aggregated
/// across units and emitted once at the top.
pub fn render_combined(translation: &Translation, modules: &[ExternalModule]) -> String {
    let combined = RenderedUnit {
        text: translation
            .units
            .values()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        observed: translation
            .units
            .values()
            .flat_map(|u| u.observed.iter().cloned())
            .collect::<BTreeSet<_>>(),
        ..RenderedUnit::default()
    };

    let mut out = String::new();
    let imports = render_import_preamble(&compute_import_preamble(&combined, modules));
    if !imports.is_empty() {
        out.push_str(&imports);
        out.push('\n');
    }
    for unit in translation.units.values() {
        out.push_str(&collapse_blank_lines(&unit.text));
        out.push('\n');
    }
    out
}

/// Write one file per unit into `dir`, creating it if needed.
pub fn write_units(translation: &Translation, modules: &[ExternalModule], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let mut written = Vec::with_capacity(translation.units.len());
    for unit in translation.units.values() {
        let path = dir.join(unit_file_name(unit));
        fs::write(&path, render_unit_file(unit, modules))
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(unit = %unit.name, path = %path.display(), "wrote unit");
        written.push(path);
    }
    Ok(written)
}

pub fn write_combined(translation: &Translation, modules: &[ExternalModule], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, render_combined(translation, modules))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// One line per unit: `name  methods: N  fields: N  imports: N`.
pub fn summary_line(unit: &RenderedUnit) -> String {
    format!(
        "{:30} methods: {}\tfields: {}\timports: {}",
        unit.name,
        unit.method_count,
        unit.field_count,
        unit.observed.len()
    )
}
