//! Theme profiles
//!
//! A theme maps categories and UI slots to colours. There is one active
//! theme per manager; it changes by merging a record over it or by
//! resetting to the default palette, never by partial teardown.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use super::category::Category;
use super::style::{Color, Style};
use crate::error::{HighlightError, Result};

/// Non-category colour slots used by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiSlot {
    EditorBackground,
    EditorForeground,
    GutterBackground,
    GutterForeground,
    Accent,
    Caret,
    ScrollbarTrough,
    ScrollbarSlider,
    SearchBackground,
    SearchForeground,
    ActiveLineBackground,
}

impl UiSlot {
    pub const ALL: [UiSlot; 11] = [
        UiSlot::EditorBackground,
        UiSlot::EditorForeground,
        UiSlot::GutterBackground,
        UiSlot::GutterForeground,
        UiSlot::Accent,
        UiSlot::Caret,
        UiSlot::ScrollbarTrough,
        UiSlot::ScrollbarSlider,
        UiSlot::SearchBackground,
        UiSlot::SearchForeground,
        UiSlot::ActiveLineBackground,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UiSlot::EditorBackground => "editor_bg",
            UiSlot::EditorForeground => "editor_fg",
            UiSlot::GutterBackground => "ln_bg",
            UiSlot::GutterForeground => "ln_fg",
            UiSlot::Accent => "accent",
            UiSlot::Caret => "cursor",
            UiSlot::ScrollbarTrough => "scrollbar_trough",
            UiSlot::ScrollbarSlider => "scrollbar_slider",
            UiSlot::SearchBackground => "search_bg",
            UiSlot::SearchForeground => "search_fg",
            UiSlot::ActiveLineBackground => "active_line_bg",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        UiSlot::ALL.into_iter().find(|slot| slot.name() == name)
    }
}

/// A key in a theme record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThemeKey {
    Category(Category),
    Ui(UiSlot),
}

impl ThemeKey {
    /// Parse a record key; UI slot names take precedence over category tags
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(slot) = UiSlot::from_name(name.trim()) {
            return Some(ThemeKey::Ui(slot));
        }
        Category::from_tag(name).map(ThemeKey::Category)
    }
}

impl From<Category> for ThemeKey {
    fn from(category: Category) -> Self {
        ThemeKey::Category(category)
    }
}

impl From<UiSlot> for ThemeKey {
    fn from(slot: UiSlot) -> Self {
        ThemeKey::Ui(slot)
    }
}

/// The default palette as `(key, colour)` pairs
const DEFAULT_PALETTE: [(&str, &str); 30] = [
    ("control", "#569CD6"),
    ("definition", "#4EC9B0"),
    ("import", "#4EC9B0"),
    ("exception", "#FF6E6E"),
    ("logic", "#569CD6"),
    ("constants", "#B5CEA8"),
    ("builtin", "#C586C0"),
    ("digits", "#B5CEA8"),
    ("symbols", "#D4D4D4"),
    ("paran", "#D4D4D4"),
    ("class_name", "#B8D7A3"),
    ("func_name", "#DCDCAA"),
    ("var_name", "#9CDCFE"),
    ("string", "#F29E74"),
    ("comment", "#6A9955"),
    ("module", "#A0C4FF"),
    ("self", "#E7C547"),
    ("self_attr", "#9CDCFE"),
    ("fstring_prefix", "#E7C547"),
    ("editor_bg", "#1C1B21"),
    ("editor_fg", "#D8D8D8"),
    ("ln_bg", "#1F1E27"),
    ("ln_fg", "#5E5A65"),
    ("accent", "#8AB4F8"),
    ("cursor", "#FFFFFF"),
    ("scrollbar_trough", "#2C2C34"),
    ("scrollbar_slider", "#5E5A65"),
    ("search_bg", "#44475A"),
    ("search_fg", "#F8F8F2"),
    ("active_line_bg", "#272728"),
];

fn default_color(key: &ThemeKey) -> Option<Color> {
    let name = match key {
        ThemeKey::Category(category) => category.name(),
        ThemeKey::Ui(slot) => slot.name(),
    };
    DEFAULT_PALETTE
        .iter()
        .find(|(k, _)| *k == name)
        .and_then(|(_, hex)| Color::from_hex(hex))
}

/// Category and UI colours
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeProfile {
    colors: HashMap<ThemeKey, Color>,
}

impl ThemeProfile {
    /// Create the default theme
    pub fn new() -> Self {
        let colors = DEFAULT_PALETTE
            .iter()
            .filter_map(|(key, hex)| Some((ThemeKey::parse(key)?, Color::from_hex(hex)?)))
            .collect();
        Self { colors }
    }

    /// Apply every valid key of `record` over this theme
    ///
    /// Fails without touching the theme if `record` is not a mapping.
    /// Returns the number of keys applied.
    pub fn merge(&mut self, record: &Value) -> Result<usize> {
        let map = record
            .as_object()
            .ok_or_else(|| HighlightError::config("theme must be a mapping"))?;

        let mut applied = 0;
        for (name, value) in map {
            let Some(key) = ThemeKey::parse(name) else {
                warn!(key = %name, "ignoring blank theme key");
                continue;
            };
            match value.as_str().and_then(Color::from_hex) {
                Some(color) => {
                    self.colors.insert(key, color);
                    applied += 1;
                }
                None => warn!(key = %name, value = %value, "ignoring invalid theme colour"),
            }
        }
        debug!(applied, "merged theme record");
        Ok(applied)
    }

    /// Reset to the default palette, then apply `record`
    pub fn reset(&mut self, record: &Value) -> Result<usize> {
        let mut fresh = Self::new();
        let applied = fresh.merge(record)?;
        *self = fresh;
        Ok(applied)
    }

    /// Set one colour
    pub fn set(&mut self, key: impl Into<ThemeKey>, color: Color) {
        self.colors.insert(key.into(), color);
    }

    /// Look up a key without any fallback
    pub fn get(&self, key: &ThemeKey) -> Option<Color> {
        self.colors.get(key).copied()
    }

    /// Colour for a category, falling back to the default palette, then white
    pub fn color(&self, category: &Category) -> Color {
        let key = ThemeKey::Category(category.clone());
        self.get(&key)
            .or_else(|| default_color(&key))
            .unwrap_or(Color::WHITE)
    }

    /// Colour for a UI slot
    pub fn ui(&self, slot: UiSlot) -> Color {
        let key = ThemeKey::Ui(slot);
        self.get(&key)
            .or_else(|| default_color(&key))
            .unwrap_or(Color::WHITE)
    }

    /// Style a host paints a category with
    pub fn style_for(&self, category: &Category) -> Style {
        match category {
            Category::SearchMatch => Style::bg(self.ui(UiSlot::SearchBackground))
                .with_fg(self.ui(UiSlot::SearchForeground)),
            Category::ActiveLine => Style::bg(self.ui(UiSlot::ActiveLineBackground)),
            other => Style::fg(self.color(other)),
        }
    }

    /// Default style for unclassified text
    pub fn base_style(&self) -> Style {
        Style::fg(self.ui(UiSlot::EditorForeground)).with_bg(self.ui(UiSlot::EditorBackground))
    }

    /// Number of keys set
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ThemeProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_theme_is_complete() {
        let theme = ThemeProfile::new();
        assert_eq!(theme.len(), DEFAULT_PALETTE.len());
        for category in Category::BASE {
            assert!(theme.get(&ThemeKey::Category(category)).is_some());
        }
        for slot in UiSlot::ALL {
            assert!(theme.get(&ThemeKey::Ui(slot)).is_some());
        }
    }

    #[test]
    fn test_merge_changes_only_given_keys() {
        let mut theme = ThemeProfile::new();
        let before = theme.clone();
        theme.merge(&json!({"string": "#FF0000"})).unwrap();

        assert_eq!(theme.color(&Category::String), Color::rgb(0xFF, 0, 0));
        for category in Category::BASE.into_iter().filter(|c| *c != Category::String) {
            assert_eq!(theme.color(&category), before.color(&category));
        }
        for slot in UiSlot::ALL {
            assert_eq!(theme.ui(slot), before.ui(slot));
        }
    }

    #[test]
    fn test_merge_rejects_non_mapping() {
        let mut theme = ThemeProfile::new();
        theme.merge(&json!({"comment": "#000000"})).unwrap();
        let err = theme.merge(&json!(["#FFFFFF"])).unwrap_err();
        assert!(err.is_config());
        assert_eq!(theme.color(&Category::Comment), Color::rgb(0, 0, 0));
    }

    #[test]
    fn test_invalid_colours_are_skipped() {
        let mut theme = ThemeProfile::new();
        let applied = theme
            .merge(&json!({"string": "red", "comment": 12, "module": "#abc"}))
            .unwrap();
        assert_eq!(applied, 1);
        assert_eq!(theme.color(&Category::Module), Color::rgb(0xAA, 0xBB, 0xCC));
        assert_eq!(theme.color(&Category::String), ThemeProfile::new().color(&Category::String));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut theme = ThemeProfile::new();
        theme.merge(&json!({"string": "#FF0000", "editor_bg": "#000000"})).unwrap();
        theme.reset(&json!({})).unwrap();
        assert_eq!(theme, ThemeProfile::new());
    }

    #[test]
    fn test_custom_category_fallback() {
        let mut theme = ThemeProfile::new();
        let custom = Category::from_tag("preprocessor").unwrap();
        assert_eq!(theme.color(&custom), Color::WHITE);
        theme.merge(&json!({"preprocessor": "#123456"})).unwrap();
        assert_eq!(theme.color(&custom), Color::rgb(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_ui_slots_and_decorations() {
        let theme = ThemeProfile::new();
        assert_eq!(theme.ui(UiSlot::EditorBackground), Color::rgb(0x1C, 0x1B, 0x21));
        let search = theme.style_for(&Category::SearchMatch);
        assert_eq!(search.bg, Some(Color::rgb(0x44, 0x47, 0x5A)));
        assert_eq!(theme.style_for(&Category::ActiveLine).fg, None);
    }
}
