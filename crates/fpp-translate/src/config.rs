//! Translation configuration.
//!
//! Everything project-specific the core consults lives here: namespace
//! prefixes, rename tables, the names of the target ecosystem, and the
//! known base classes. The value is built once (usually deserialized from
//! the `[translate]` table of `fpp.toml`) and only read afterwards.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::naming::Namer;
use crate::types::TypeResolver;

/// A target-language module and the symbols it exports, used both to mark
/// references as external and to compute import preambles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalModule {
    /// Import path, e.g. `PyQt5.QtWidgets`.
    pub name: String,
    #[serde(default)]
    pub symbols: BTreeSet<String>,
}

impl ExternalModule {
    pub fn new<I, S>(name: &str, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Namespace prefixes removed from type and class names (`ads::`, `std::`).
    pub known_namespaces: Vec<String>,
    /// Spellings stripped from type names before anything else.
    pub qualifiers: Vec<String>,
    /// Declared names that map to a fixed target name.
    pub name_overrides: IndexMap<String, String>,
    /// Operator overloads and their special-method names.
    pub special_operators: IndexMap<String, String>,
    /// Renames applied to each segment of a free-floating identifier chain.
    pub simple_renames: IndexMap<String, String>,
    /// Names that already mean something in the target ecosystem and are
    /// never case-converted.
    pub known_names: BTreeSet<String>,
    /// Leading marker on member-variable names (`m_`).
    pub member_prefix: String,
    /// Known base classes and the attributes they provide.
    pub base_classes: IndexMap<String, BTreeSet<String>>,
    /// Target modules, in import priority order.
    pub external_modules: Vec<ExternalModule>,
    /// Path fragments identifying the preferred copy of a declaration.
    pub canonical_sources: Vec<String>,
    /// Drop declarations whose source file is known and not canonical.
    pub canonical_only: bool,
    /// Classes whose names start with one of these are not translated.
    pub skip_class_prefixes: Vec<String>,
    /// Free functions whose names start with one of these are not collected.
    pub skip_function_prefixes: Vec<String>,
    /// Methods left out of the output unless they have a body.
    pub skip_methods: BTreeSet<String>,
    /// Key of the synthetic free-function container.
    pub function_container: String,
}

fn table<const N: usize>(pairs: [(&str, &str); N]) -> IndexMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            known_namespaces: vec!["std::".to_string()],
            qualifiers: vec!["std::shared_ptr".to_string(), "const ".to_string()],
            name_overrides: IndexMap::new(),
            special_operators: table([
                ("operator=", "__operator_equal__"),
                ("operator==", "__eq__"),
                ("operator!=", "__ne__"),
                ("operator>", "__gt__"),
                ("operator>=", "__ge__"),
                ("operator<", "__lt__"),
                ("operator<=", "__le__"),
            ]),
            simple_renames: table([("nullptr", "None"), ("true", "True"), ("false", "False")]),
            known_names: BTreeSet::new(),
            member_prefix: "m_".to_string(),
            base_classes: IndexMap::new(),
            external_modules: Vec::new(),
            canonical_sources: Vec::new(),
            canonical_only: false,
            skip_class_prefixes: Vec::new(),
            skip_function_prefixes: vec!["qt_".into(), "q_".into(), "operator".into()],
            skip_methods: BTreeSet::new(),
            function_container: "__init__".to_string(),
        }
    }
}

impl TranslateConfig {
    pub fn namer(&self) -> Namer<'_> {
        Namer::new(self)
    }

    pub fn types(&self) -> TypeResolver<'_> {
        TypeResolver::new(self)
    }

    /// Whether a native spelling names something provided by the target
    /// ecosystem (a known base class or a symbol of an external module).
    pub fn is_external_symbol(&self, name: &str) -> bool {
        self.base_classes.contains_key(name)
            || self
                .external_modules
                .iter()
                .any(|m| m.symbols.contains(name))
    }

    /// Union of the attribute sets of the given base classes.
    pub fn base_attributes<'a, I>(&self, bases: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        bases
            .into_iter()
            .filter_map(|b| self.base_classes.get(b))
            .flat_map(|attrs| attrs.iter().cloned())
            .collect()
    }

    /// Whether `file` matches one of the canonical-source fragments.
    pub fn is_canonical(&self, file: &str) -> bool {
        self.canonical_sources
            .iter()
            .any(|fragment| file.starts_with(fragment.as_str()) || file.ends_with(fragment.as_str()))
    }

    /// Whether `canonical_only` rules out a declaration from `file`.
    /// Declarations with no known file are always kept.
    pub fn is_excluded_source(&self, file: Option<&str>) -> bool {
        self.canonical_only
            && !self.canonical_sources.is_empty()
            && file.is_some_and(|f| !self.is_canonical(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_config_keeps_defaults() {
        let toml = r#"
known_namespaces = ["ads::", "std::"]
member_prefix = "d_"

[name_overrides]
emit = "emit_signal"

[base_classes]
QWidget = ["show", "hide", "resize"]

[[external_modules]]
name = "PyQt5.QtWidgets"
symbols = ["QWidget", "QFrame"]
"#;
        let config: TranslateConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.known_namespaces, vec!["ads::", "std::"]);
        assert_eq!(config.member_prefix, "d_");
        assert_eq!(config.name_overrides["emit"], "emit_signal");
        assert_eq!(config.special_operators["operator=="], "__eq__");
        assert_eq!(config.function_container, "__init__");
        assert!(config.base_classes["QWidget"].contains("resize"));
        assert!(config.is_external_symbol("QFrame"));
        assert!(config.is_external_symbol("QWidget"));
        assert!(!config.is_external_symbol("Widget"));
    }

    #[test]
    fn empty_config_is_default() {
        let config: TranslateConfig = toml::from_str("").unwrap();
        assert_eq!(config, TranslateConfig::default());
    }

    #[test]
    fn base_attributes_union_known_bases_only() {
        let mut config = TranslateConfig::default();
        config
            .base_classes
            .insert("QObject".into(), ["parent".to_string()].into_iter().collect());
        config.base_classes.insert(
            "QWidget".into(),
            ["show".to_string(), "parent".to_string()].into_iter().collect(),
        );
        let attrs = config.base_attributes(["QWidget", "QObject", "Unknown"]);
        assert_eq!(attrs.into_iter().collect::<Vec<_>>(), vec!["parent", "show"]);
    }

    #[test]
    fn canonical_matches_prefix_or_suffix() {
        let config = TranslateConfig {
            canonical_sources: vec!["/src/ads".into(), "combined_source.cpp".into()],
            ..TranslateConfig::default()
        };
        assert!(config.is_canonical("/src/ads/DockWidget.cpp"));
        assert!(config.is_canonical("/tmp/combined_source.cpp"));
        assert!(!config.is_canonical("/usr/include/qt/QWidget"));
    }
}
