//! Renderer: declarations to target-language text.

use std::collections::BTreeSet;

use crate::error::{Diagnostic, IssueKind};
use crate::model::{Declaration, DeclarationKind, DeclarationModel, Method, Parameter};

const INDENT: &str = "    ";

/// Text of one declaration plus what was learned while producing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub observed: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Remove the whitespace prefix shared by every non-blank line.
///
/// The prefix is compared character by character, so lines indented with
/// different whitespace only share what actually matches.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let leading = &line[..line.len() - line.trim_start().len()];
        margin = Some(match margin {
            None => leading,
            Some(current) => common_prefix(current, leading),
        });
    }
    let margin = margin.unwrap_or("");
    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.strip_prefix(margin).unwrap_or(l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'t>(a: &'t str, b: &str) -> &'t str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

/// Prefix every non-blank line of `text`.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                l.to_string()
            } else {
                format!("{}{}", prefix, l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of blank lines into one.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("\n\n\n") {
        out = out.replace("\n\n\n", "\n\n");
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// numpy-style docstring, or an empty string when there is nothing to say.
pub fn doc_block(method: &Method) -> String {
    let has_args = method.arguments().next().is_some();
    if method.brief.is_none() && !has_args && !method.has_return_value {
        return String::new();
    }
    let summary = match &method.brief {
        Some(brief) => brief.trim().to_string(),
        None => capitalize(method.name.replace('_', " ").trim()),
    };

    let mut lines = vec!["'''".to_string(), summary];
    if has_args {
        lines.push(String::new());
        lines.push("Parameters".to_string());
        lines.push("----------".to_string());
        for arg in method.arguments() {
            lines.push(format!("{} : {}", arg.name, arg.ty.name));
        }
    }
    if method.has_return_value {
        lines.push(String::new());
        lines.push("Returns".to_string());
        lines.push("-------".to_string());
        lines.push(format!("value : {}", method.result.name));
    }
    lines.push("'''".to_string());
    lines.join("\n")
}

fn signature(method: &Method) -> String {
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| match p {
            Parameter::Receiver => p.name().to_string(),
            Parameter::Named(arg) if arg.ty.name.is_empty() => arg.name.clone(),
            Parameter::Named(arg) => format!("{}: {}", arg.name, arg.ty.name),
        })
        .collect();
    let returns = if method.has_return_value && !method.result.name.is_empty() {
        format!(" -> {}", method.result.name)
    } else {
        String::new()
    };
    format!("def {}({}){}:", method.name, params.join(", "), returns)
}

fn render_method(model: &DeclarationModel<'_>, owner: &str, method: &Method, out: &mut Rendered) -> String {
    let body = model.body(method);
    out.observed.extend(body.observed.iter().cloned());
    let config = model.config();
    for ty in method.arguments().map(|a| &a.ty).chain([&method.result]) {
        if config.is_external_symbol(&ty.name) {
            out.observed.insert(ty.name.clone());
        }
    }
    let declaration = if owner.is_empty() {
        method.name.clone()
    } else {
        format!("{}.{}", owner, method.name)
    };

    let source = match body.text.as_deref() {
        None => {
            out.diagnostics.push(Diagnostic {
                kind: IssueKind::UnresolvedDefinition,
                declaration,
                message: "no definition available".to_string(),
            });
            "...".to_string()
        }
        Some(text) => {
            if body.approximations > 0 {
                out.diagnostics.push(Diagnostic {
                    kind: IssueKind::UnmappableConstruct,
                    declaration,
                    message: format!("{} approximated construct(s)", body.approximations),
                });
            }
            let text = if text.is_empty() { "..." } else { text };
            match &body.reference {
                Some(reference) if reference != text => {
                    format!("{}\n{}", indent(reference, "# "), text)
                }
                _ => text.to_string(),
            }
        }
    };

    let mut parts = vec![String::new(), signature(method)];
    let doc = doc_block(method);
    if !doc.is_empty() {
        parts.push(indent(&doc, INDENT));
    }
    parts.push(indent(&source, INDENT));
    parts.join("\n")
}

/// Whether a method is written out. Configured skip names only apply to
/// methods without a body.
fn is_rendered(model: &DeclarationModel<'_>, method: &Method) -> bool {
    let skip = &model.config().skip_methods;
    if !skip.contains(&method.name) && !skip.contains(&method.native_name) {
        return true;
    }
    model
        .body(method)
        .text
        .as_deref()
        .is_some_and(|t| !t.is_empty())
}

pub fn render_declaration(model: &DeclarationModel<'_>, decl: &Declaration) -> Rendered {
    let mut out = Rendered {
        observed: decl.observed.clone(),
        ..Rendered::default()
    };

    let text = match decl.kind {
        DeclarationKind::Container => {
            let functions: Vec<String> = decl
                .methods
                .iter()
                .map(|f| render_method(model, "", f, &mut out))
                .collect();
            functions.join("\n")
        }
        DeclarationKind::Class => {
            let methods: Vec<String> = decl
                .methods
                .iter()
                .filter(|m| is_rendered(model, m))
                .map(|m| render_method(model, &decl.name, m, &mut out))
                .collect();
            let body = if methods.is_empty() {
                "...".to_string()
            } else {
                methods.join("\n")
            };
            let bases = if decl.bases.is_empty() {
                String::new()
            } else {
                format!("({})", decl.bases.join(", "))
            };
            format!("class {}{}:\n{}", decl.name, bases, indent(&body, INDENT))
        }
    };

    out.text = collapse_blank_lines(text.trim_start_matches('\n'));
    out
}
