//! Import preambles for rendered units.

use std::collections::BTreeSet;

use crate::config::ExternalModule;
use crate::RenderedUnit;

/// Identifier-like words of every non-comment line.
fn words(text: &str) -> BTreeSet<&str> {
    text.lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .flat_map(|l| l.split(|c: char| !c.is_alphanumeric() && c != '_'))
        .filter(|w| !w.is_empty())
        .collect()
}

/// Group the external symbols a unit uses by module.
///
/// Modules are visited in priority order; a symbol exported by several
/// modules is imported from the first one only. Symbols are sorted within
/// each module and modules without a match are left out.
pub fn compute_import_preamble(
    unit: &RenderedUnit,
    modules: &[ExternalModule],
) -> Vec<(String, Vec<String>)> {
    let mut wanted: BTreeSet<&str> = words(&unit.text);
    wanted.extend(unit.observed.iter().map(String::as_str));

    let mut taken: BTreeSet<&str> = BTreeSet::new();
    let mut preamble = Vec::new();
    for module in modules {
        let symbols: Vec<String> = module
            .symbols
            .iter()
            .map(String::as_str)
            .filter(|s| wanted.contains(s) && !taken.contains(s))
            .map(str::to_string)
            .collect();
        if symbols.is_empty() {
            continue;
        }
        taken.extend(module.symbols.iter().map(String::as_str).filter(|s| wanted.contains(s)));
        preamble.push((module.name.clone(), symbols));
    }
    preamble
}

/// `from module import a, b` lines; long lists are parenthesized.
pub fn render_import_preamble(preamble: &[(String, Vec<String>)]) -> String {
    preamble
        .iter()
        .map(|(module, symbols)| {
            let names = symbols.join(", ");
            if symbols.len() > 6 {
                format!("from {} import ({})", module, names)
            } else {
                format!("from {} import {}", module, names)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
