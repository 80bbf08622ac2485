//! Naming heuristic: native names to target-convention names.

use std::collections::BTreeSet;

use crate::config::TranslateConfig;

/// Convert mixed/camel case to lowercase with underscores.
///
/// Examples:
/// - "setWindowTitle" -> "set_window_title"
/// - "HTTPServer" -> "http_server"
/// - "m_Count" -> "m_count"
/// - "__eq__" -> "__eq__"
pub fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            let acronym_end =
                prev.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase());
            if after_lower || acronym_end {
                out.push('_');
            }
        }
        if c == '-' {
            out.push('_');
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// Applies the configured rename tables and case conversion.
#[derive(Debug, Clone, Copy)]
pub struct Namer<'c> {
    config: &'c TranslateConfig,
}

impl<'c> Namer<'c> {
    pub fn new(config: &'c TranslateConfig) -> Self {
        Self { config }
    }

    fn is_guarded(&self, name: &str, guard: &BTreeSet<String>) -> bool {
        self.config.known_names.contains(name)
            || self.config.is_external_symbol(name)
            || guard.contains(name)
    }

    fn strip_member_prefix<'n>(&self, name: &'n str) -> &'n str {
        let prefix = self.config.member_prefix.as_str();
        match name.strip_prefix(prefix) {
            Some(rest) if !prefix.is_empty() && !rest.is_empty() => rest,
            _ => name,
        }
    }

    /// Name for a declared class member or function.
    ///
    /// `guard` holds extra names that must not be renamed, typically the
    /// attributes inherited from a known base class.
    pub fn declared(&self, native: &str, guard: &BTreeSet<String>) -> String {
        if let Some(name) = self.config.name_overrides.get(native) {
            return name.clone();
        }
        if let Some(name) = self.config.special_operators.get(native) {
            return name.clone();
        }
        let stripped = self.strip_member_prefix(native);
        if self.is_guarded(stripped, guard) {
            return stripped.to_string();
        }
        underscore(stripped)
    }

    /// Name for one segment of an identifier chain met inside a body.
    pub fn segment(&self, part: &str) -> String {
        if let Some(name) = self.config.simple_renames.get(part) {
            return name.clone();
        }
        let stripped = self.strip_member_prefix(part);
        if self.config.known_names.contains(stripped) || self.config.is_external_symbol(stripped) {
            return stripped.to_string();
        }
        underscore(stripped)
    }

    /// Name for a dotted chain nobody in scope claims, segment by segment.
    pub fn chain(&self, chain: &str) -> String {
        chain
            .split('.')
            .map(|part| self.segment(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_handles_camel_and_acronyms() {
        assert_eq!(underscore("setWindowTitle"), "set_window_title");
        assert_eq!(underscore("HTTPServer"), "http_server");
        assert_eq!(underscore("DockWidget"), "dock_widget");
        assert_eq!(underscore("toV2Format"), "to_v2_format");
        assert_eq!(underscore("m_Count"), "m_count");
        assert_eq!(underscore("__eq__"), "__eq__");
        assert_eq!(underscore("dock-area"), "dock_area");
        assert_eq!(underscore(""), "");
    }

    #[test]
    fn declared_strips_member_prefix() {
        let config = TranslateConfig::default();
        let namer = config.namer();
        assert_eq!(namer.declared("m_Count", &BTreeSet::new()), "count");
        assert_eq!(namer.declared("m_dockArea", &BTreeSet::new()), "dock_area");
        assert_eq!(namer.declared("m_", &BTreeSet::new()), "m_");
    }

    #[test]
    fn declared_uses_special_operator_names() {
        let config = TranslateConfig::default();
        let namer = config.namer();
        assert_eq!(namer.declared("operator==", &BTreeSet::new()), "__eq__");
        assert_eq!(namer.declared("operator<", &BTreeSet::new()), "__lt__");
    }

    #[test]
    fn overrides_win_over_everything() {
        let mut config = TranslateConfig::default();
        config
            .name_overrides
            .insert("operator==".into(), "equals".into());
        let namer = config.namer();
        assert_eq!(namer.declared("operator==", &BTreeSet::new()), "equals");
    }

    #[test]
    fn guard_keeps_inherited_and_known_names() {
        let mut config = TranslateConfig::default();
        config.known_names.insert("objectName".into());
        let namer = config.namer();
        let guard: BTreeSet<String> = ["mousePressEvent".to_string()].into_iter().collect();
        assert_eq!(namer.declared("mousePressEvent", &guard), "mousePressEvent");
        assert_eq!(namer.declared("objectName", &BTreeSet::new()), "objectName");
        assert_eq!(namer.declared("mouseMoveEvent", &guard), "mouse_move_event");
    }

    #[test]
    fn guard_applies_after_the_member_prefix_is_stripped() {
        let mut config = TranslateConfig::default();
        config.known_names.insert("m_Parent".into());
        config.known_names.insert("Layout".into());
        let namer = config.namer();
        assert_eq!(namer.declared("m_Parent", &BTreeSet::new()), "parent");
        assert_eq!(namer.declared("m_Layout", &BTreeSet::new()), "Layout");
        let guard: BTreeSet<String> = ["Title".to_string()].into_iter().collect();
        assert_eq!(namer.declared("m_Title", &guard), "Title");
    }

    #[test]
    fn chain_mode_applies_simple_renames_per_segment() {
        let mut config = TranslateConfig::default();
        config.simple_renames.insert("next".into(), "next_".into());
        config.known_names.insert("QApplication".into());
        let namer = config.namer();
        assert_eq!(namer.chain("nullptr"), "None");
        assert_eq!(namer.chain("item.next.isValid"), "item.next_.is_valid");
        assert_eq!(namer.chain("QApplication.focusWidget"), "QApplication.focus_widget");
        assert_eq!(namer.chain("other.m_Size"), "other.size");
    }
}
