//! C++ to Python skeleton translation.
//!
//! [`translate`] takes parsed translation units (see `fpp_ast`) and returns
//! one rendered text per class, plus one for the container of free
//! functions. The output is a starting point for a manual port: structure,
//! names and signatures are carried over, and statement bodies are
//! rewritten token by token on a best-effort basis, with anything that
//! does not map cleanly tagged `# TODO`.

use std::collections::BTreeSet;

use fpp_ast::{Ast, SourceLocation};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod imports;
pub mod model;
pub mod naming;
pub mod render;
pub mod scope;
pub mod transpile;
pub mod types;

pub use config::{ExternalModule, TranslateConfig};
pub use error::{Diagnostic, IssueKind, TranslateError};
pub use imports::{compute_import_preamble, render_import_preamble};
pub use model::DeclarationModel;

/// One top-level declaration rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedUnit {
    /// Resolved name of the declaration.
    pub name: String,
    pub text: String,
    /// External symbols referenced anywhere in the declaration.
    pub observed: BTreeSet<String>,
    pub location: Option<SourceLocation>,
    pub method_count: usize,
    pub field_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Rendered declarations keyed and sorted by resolved name.
    pub units: IndexMap<String, RenderedUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate every declaration found in `asts`.
pub fn translate(asts: &[Ast], config: &TranslateConfig) -> Result<Translation, TranslateError> {
    if asts.is_empty() {
        return Err(TranslateError::NoInput);
    }
    for (unit, ast) in asts.iter().enumerate() {
        ast.validate()
            .map_err(|source| TranslateError::InvalidAst { unit, source })?;
    }

    let model = DeclarationModel::build(asts, config);
    if model.is_empty() {
        if asts.iter().all(|ast| ast.tokens.is_empty()) {
            return Err(TranslateError::NoDeclarations { units: asts.len() });
        }
        warn!(units = asts.len(), "no declarations to translate");
    }

    let mut translation = Translation::default();
    for (name, decl) in model.declarations() {
        let rendered = render::render_declaration(&model, decl);
        for diagnostic in &rendered.diagnostics {
            match diagnostic.kind {
                IssueKind::UnresolvedDefinition => debug!(%diagnostic),
                IssueKind::UnmappableConstruct => warn!(%diagnostic),
            }
        }
        translation.diagnostics.extend(rendered.diagnostics);
        translation.units.insert(
            name.clone(),
            RenderedUnit {
                name: name.clone(),
                text: rendered.text,
                observed: rendered.observed,
                location: decl.location.clone(),
                method_count: decl.methods.len(),
                field_count: decl.fields.len(),
            },
        );
    }

    info!(
        units = translation.units.len(),
        diagnostics = translation.diagnostics.len(),
        "translation finished"
    );
    Ok(translation)
}
