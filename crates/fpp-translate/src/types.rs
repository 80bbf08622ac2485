//! Type resolver: native type expressions to target-friendly names.

use fpp_ast::TypeRef;

use crate::config::TranslateConfig;

/// A native type and the name it resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NativeType {
    pub native: String,
    pub name: String,
}

impl NativeType {
    /// Last dotted segment of the resolved name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_void(&self) -> bool {
        self.native.trim() == "void" || self.native.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'c> {
    config: &'c TranslateConfig,
}

impl<'c> TypeResolver<'c> {
    pub fn new(config: &'c TranslateConfig) -> Self {
        Self { config }
    }

    /// Unwrap indirection and member-pointer decomposition, then clean up
    /// the spelling of whatever is left.
    pub fn resolve(&self, ty: &TypeRef) -> NativeType {
        let mut current = ty;
        loop {
            if let Some(inner) = current.pointee() {
                current = inner;
            } else if let Some(class) = current.class_type() {
                current = class;
            } else {
                break;
            }
        }
        NativeType {
            native: ty.spelling.clone(),
            name: self.resolve_spelling(&current.spelling),
        }
    }

    /// Resolve a bare spelling. Repeats until stable, so resolving an
    /// already-resolved name returns it unchanged.
    pub fn resolve_spelling(&self, spelling: &str) -> String {
        let mut current = spelling.to_string();
        loop {
            let next = self.resolve_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn resolve_once(&self, spelling: &str) -> String {
        let mut name = spelling.to_string();
        for qualifier in &self.config.qualifiers {
            name = name.replace(qualifier.as_str(), "");
        }
        let name = self.strip_namespaces(name.trim());
        let name = name.replace("::", ".");
        strip_decoration(&name)
    }

    /// Remove every configured namespace prefix, in either `ns::` or `ns.` form.
    pub fn strip_namespaces(&self, name: &str) -> String {
        let mut name = name;
        'outer: loop {
            for namespace in &self.config.known_namespaces {
                let dotted = namespace.replace("::", ".");
                for form in [namespace.as_str(), dotted.as_str()] {
                    if form.is_empty() {
                        continue;
                    }
                    if let Some(rest) = name.strip_prefix(form) {
                        name = rest;
                        continue 'outer;
                    }
                }
            }
            return name.to_string();
        }
    }
}

/// Trim whitespace, pointer/reference marks and unbalanced angle brackets
/// left at either end.
fn strip_decoration(name: &str) -> String {
    let mut s = name.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '&');
    loop {
        let opens = s.matches('<').count();
        let closes = s.matches('>').count();
        if let Some(rest) = s.strip_prefix('<') {
            s = rest;
        } else if closes > opens && s.ends_with('>') {
            s = &s[..s.len() - 1];
        } else {
            break;
        }
        s = s.trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '&');
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TranslateConfig {
        TranslateConfig {
            known_namespaces: vec!["std::".into(), "ads::".into()],
            ..TranslateConfig::default()
        }
    }

    #[test]
    fn unwraps_pointers_and_references() {
        let config = config();
        let types = config.types();
        let ty = TypeRef::pointer_to(TypeRef::named("const ads::CDockWidget"));
        let resolved = types.resolve(&ty);
        assert_eq!(resolved.native, "const ads::CDockWidget *");
        assert_eq!(resolved.name, "CDockWidget");

        let nested = TypeRef::reference_to(TypeRef::pointer_to(TypeRef::named("QWidget")));
        assert_eq!(types.resolve(&nested).name, "QWidget");
    }

    #[test]
    fn unwraps_member_pointer_class() {
        let config = config();
        let ty = TypeRef {
            spelling: "int Foo::*".into(),
            pointee: None,
            class_type: Some(Box::new(TypeRef::named("Foo"))),
        };
        assert_eq!(config.types().resolve(&ty).name, "Foo");
    }

    #[test]
    fn strips_smart_pointer_and_namespaces() {
        let config = config();
        let types = config.types();
        assert_eq!(
            types.resolve_spelling("std::shared_ptr<ads::DockAreaWidget>"),
            "DockAreaWidget"
        );
        assert_eq!(types.resolve_spelling("Qt::Orientation"), "Qt.Orientation");
        assert_eq!(types.resolve_spelling("QList<QWidget *>"), "QList<QWidget *>");
    }

    #[test]
    fn resolution_is_idempotent() {
        let config = config();
        let types = config.types();
        for spelling in [
            "const std::string &",
            "std::shared_ptr<ads::CDockWidget>",
            "ads::internal::Helper",
            "QMap<QString, int>",
            "Qt::AlignmentFlag",
        ] {
            let once = types.resolve_spelling(spelling);
            assert_eq!(types.resolve_spelling(&once), once, "not stable for {spelling}");
        }
    }

    #[test]
    fn dotted_namespace_form_is_stripped_too() {
        let config = config();
        assert_eq!(config.types().strip_namespaces("ads.std.Thing"), "Thing");
    }

    #[test]
    fn void_detection() {
        let config = config();
        assert!(config.types().resolve(&TypeRef::named("void")).is_void());
        assert!(!config.types().resolve(&TypeRef::named("void *")).is_void());
    }
}
