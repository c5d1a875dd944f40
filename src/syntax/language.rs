//! Language profiles
//!
//! A `LanguageProfile` is the parsed, validated form of a language record:
//! which engine classifies it, its file extensions, its compiled pattern
//! rules, and its keyword sets. Profiles are immutable once built; the
//! manager swaps in a new one on every language switch.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::category::Category;
use super::rules::{KeywordRule, PatternRule};
use crate::error::{HighlightError, Result};

/// Which classifier handles a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    /// Token-driven classification for the built-in grammar
    Structural,
    /// Regex and keyword driven classification for any grammar
    #[default]
    Pattern,
}

impl EngineKind {
    /// Parse the `type` field of a language record
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "structural" | "python" => Some(EngineKind::Structural),
            "pattern" | "regex" => Some(EngineKind::Pattern),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Structural => "structural",
            EngineKind::Pattern => "pattern",
        }
    }
}

/// Words that share one category
#[derive(Debug, Clone)]
pub struct KeywordSet {
    pub category: Category,
    pub words: HashSet<String>,
    /// Alternation used by the pattern engine
    pub rule: Option<KeywordRule>,
}

impl KeywordSet {
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// A complete language profile for classification
#[derive(Debug)]
pub struct LanguageProfile {
    /// Display name (e.g., "Python (builtin)")
    pub name: String,
    /// Engine that classifies buffers under this profile
    pub engine: EngineKind,
    /// Normalized file extensions (lowercase, leading dot)
    pub extensions: Vec<String>,
    /// Pattern rules in declaration order
    pub patterns: Vec<PatternRule>,
    /// Keyword sets in declaration order
    pub keywords: Vec<KeywordSet>,
    /// Theme record merged into the active theme when this profile loads
    pub theme: Option<Value>,
    /// Use the built-in tokenizer for strings and comments under the pattern engine
    pub builtin_lexer: bool,
    /// Problems that were skipped while loading
    pub diagnostics: Vec<HighlightError>,
}

impl LanguageProfile {
    /// Create a new empty language profile
    pub fn new(name: &str, engine: EngineKind) -> Self {
        Self {
            name: name.to_string(),
            engine,
            extensions: Vec::new(),
            patterns: Vec::new(),
            keywords: Vec::new(),
            theme: None,
            builtin_lexer: false,
            diagnostics: Vec::new(),
        }
    }

    /// Add a file extension, normalized
    pub fn add_extension(&mut self, ext: &str) {
        if let Some(ext) = normalize_extension(ext) {
            if !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }
    }

    /// Add a pattern rule after the existing ones
    pub fn add_pattern(&mut self, rule: PatternRule) {
        self.patterns.push(rule);
    }

    /// Add a keyword set after the existing ones
    ///
    /// A set with an existing category is merged into it.
    pub fn add_keywords<'w>(&mut self, category: Category, words: impl IntoIterator<Item = &'w str>) {
        let mut words: HashSet<String> = words.into_iter().map(str::to_string).collect();
        if let Some(pos) = self.keywords.iter().position(|set| set.category == category) {
            let existing = self.keywords.remove(pos);
            words.extend(existing.words);
            self.insert_keywords(pos, category, words);
        } else {
            let pos = self.keywords.len();
            self.insert_keywords(pos, category, words);
        }
    }

    fn insert_keywords(&mut self, pos: usize, category: Category, words: HashSet<String>) {
        let rule = match KeywordRule::new(category.clone(), words.iter().map(String::as_str)) {
            Ok(rule) => rule,
            Err(e) => {
                warn!(category = %category, error = %e, "keyword set did not compile");
                self.diagnostics.push(e);
                None
            }
        };
        self.keywords.insert(pos, KeywordSet { category, words, rule });
    }

    /// Category of the first keyword set containing `word`
    pub fn keyword_category(&self, word: &str) -> Option<&Category> {
        self.keywords
            .iter()
            .find(|set| set.contains(word))
            .map(|set| &set.category)
    }

    /// Whether `ext` (any case, with or without dot) belongs to this profile
    pub fn handles_extension(&self, ext: &str) -> bool {
        normalize_extension(ext).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Extension to suggest when saving a new file
    pub fn default_extension(&self) -> Option<&str> {
        self.extensions.first().map(String::as_str)
    }

    /// Build a profile from an untyped language record
    ///
    /// Fails if the record is not a mapping, has no extension list, or names
    /// an unknown engine. Bad regexes and malformed keyword entries are
    /// skipped and logged; compile failures are kept in `diagnostics`.
    pub fn from_record(record: &Value) -> Result<Self> {
        let map = record
            .as_object()
            .ok_or_else(|| HighlightError::config("language profile must be a mapping"))?;

        let engine = match map.get("type") {
            None | Some(Value::Null) => EngineKind::Pattern,
            Some(Value::String(name)) => EngineKind::from_name(name)
                .ok_or_else(|| HighlightError::config(format!("unknown engine type {name:?}")))?,
            Some(other) => {
                return Err(HighlightError::config(format!(
                    "engine type must be a string, got {other}"
                )))
            }
        };

        let name = map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>");
        let mut profile = LanguageProfile::new(name, engine);

        for ext in parse_extensions(map)? {
            profile.add_extension(&ext);
        }

        if engine == EngineKind::Pattern {
            profile.load_patterns(map.get("patterns"));
        }
        profile.load_keywords(map.get("keywords"));

        profile.theme = map
            .get("theme")
            .filter(|v| v.is_object())
            .or_else(|| map.get("colors").filter(|v| v.is_object()))
            .cloned();

        profile.builtin_lexer = map
            .get("lexer")
            .and_then(Value::as_str)
            .is_some_and(|lexer| matches!(lexer, "python" | "builtin" | "structural"));

        debug!(
            name = %profile.name,
            engine = profile.engine.name(),
            patterns = profile.patterns.len(),
            keyword_sets = profile.keywords.len(),
            skipped = profile.diagnostics.len(),
            "built language profile"
        );
        Ok(profile)
    }

    fn load_patterns(&mut self, patterns: Option<&Value>) {
        let entries = match patterns {
            None | Some(Value::Null) => return,
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                warn!(profile = %self.name, "ignoring patterns: not a list");
                return;
            }
        };

        for entry in entries {
            let regex = entry.get("regex").and_then(Value::as_str);
            let category = entry
                .get("tag")
                .and_then(Value::as_str)
                .and_then(Category::from_tag);
            let (Some(regex), Some(category)) = (regex, category) else {
                warn!(profile = %self.name, entry = %entry, "ignoring pattern without regex and tag");
                continue;
            };
            let group = entry.get("group").map(parse_group).unwrap_or(0);
            let flags = entry.get("flags").and_then(Value::as_str).unwrap_or("");

            match PatternRule::new(category, regex, group, flags) {
                Ok(rule) => self.add_pattern(rule),
                Err(e) => {
                    warn!(profile = %self.name, error = %e, "skipping bad regex");
                    self.diagnostics.push(e);
                }
            }
        }
    }

    fn load_keywords(&mut self, keywords: Option<&Value>) {
        let Some(map) = keywords.and_then(Value::as_object) else {
            if keywords.is_some_and(|v| !v.is_null()) {
                warn!(profile = %self.name, "ignoring keywords: not a mapping");
            }
            return;
        };

        for (tag, words) in map {
            let Some(category) = Category::from_tag(tag) else {
                continue;
            };
            let Some(words) = words.as_array() else {
                debug!(profile = %self.name, tag = %tag, "ignoring keyword entry that is not a list");
                continue;
            };
            self.add_keywords(category, words.iter().filter_map(Value::as_str));
        }
    }
}

/// Lowercase an extension and give it a leading dot
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().to_lowercase();
    match ext.as_str() {
        "" | "." => None,
        _ if ext.starts_with('.') => Some(ext),
        _ => Some(format!(".{ext}")),
    }
}

fn parse_extensions(map: &Map<String, Value>) -> Result<Vec<String>> {
    let value = map
        .get("extensions")
        .or_else(|| map.get("ext"))
        .ok_or_else(|| HighlightError::config("language profile has no extensions"))?;
    let list = value
        .as_array()
        .ok_or_else(|| HighlightError::config("extensions must be a list"))?;
    Ok(list
        .iter()
        .filter_map(Value::as_str)
        .filter_map(normalize_extension)
        .collect())
}

/// Capture group from an integer or integer string; anything else is 0
fn parse_group(value: &Value) -> usize {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extensions_are_normalized() {
        let profile = LanguageProfile::from_record(&json!({
            "name": "Lua",
            "extensions": ["LUA", ".Luau", 3, ""],
        }))
        .unwrap();
        assert_eq!(profile.extensions, vec![".lua", ".luau"]);
        assert!(profile.handles_extension("lua"));
        assert_eq!(profile.default_extension(), Some(".lua"));
    }

    #[test]
    fn test_engine_defaults_to_pattern() {
        let profile = LanguageProfile::from_record(&json!({"extensions": []})).unwrap();
        assert_eq!(profile.engine, EngineKind::Pattern);
        assert_eq!(profile.name, "<unnamed>");

        let profile =
            LanguageProfile::from_record(&json!({"type": "python", "extensions": [".py"]})).unwrap();
        assert_eq!(profile.engine, EngineKind::Structural);
    }

    #[test]
    fn test_rejects_malformed_records() {
        assert!(LanguageProfile::from_record(&json!(["not", "a", "map"])).unwrap_err().is_config());
        assert!(LanguageProfile::from_record(&json!({"name": "x"})).unwrap_err().is_config());
        assert!(LanguageProfile::from_record(&json!({"extensions": "not-a-list"}))
            .unwrap_err()
            .is_config());
        assert!(LanguageProfile::from_record(&json!({"type": "lisp", "extensions": []}))
            .unwrap_err()
            .is_config());
    }

    #[test]
    fn test_ext_alias() {
        let profile = LanguageProfile::from_record(&json!({"ext": ["sql"]})).unwrap();
        assert_eq!(profile.extensions, vec![".sql"]);
    }

    #[test]
    fn test_bad_regex_is_skipped() {
        let profile = LanguageProfile::from_record(&json!({
            "extensions": [".x"],
            "patterns": [
                {"regex": "(oops", "tag": "string"},
                {"regex": "\\d+", "tag": "digits", "group": "0", "flags": "i"},
                {"tag": "comment"},
            ],
        }))
        .unwrap();
        assert_eq!(profile.patterns.len(), 1);
        assert_eq!(profile.patterns[0].category, Category::Digit);
        assert_eq!(profile.diagnostics.len(), 1);
        assert!(matches!(profile.diagnostics[0], HighlightError::PatternCompile { .. }));
    }

    #[test]
    fn test_keyword_sets_keep_order_and_skip_non_lists() {
        let profile = LanguageProfile::from_record(&json!({
            "extensions": [".x"],
            "keywords": {
                "control": ["if", "else"],
                "builtin": "print",
                "constants": ["if", "nil", 5],
            },
        }))
        .unwrap();
        let categories: Vec<_> = profile.keywords.iter().map(|s| s.category.clone()).collect();
        assert_eq!(categories, vec![Category::Control, Category::Constant]);
        assert_eq!(profile.keyword_category("if"), Some(&Category::Control));
        assert_eq!(profile.keyword_category("nil"), Some(&Category::Constant));
        assert_eq!(profile.keyword_category("print"), None);
    }

    #[test]
    fn test_structural_ignores_patterns() {
        let profile = LanguageProfile::from_record(&json!({
            "type": "structural",
            "extensions": [".py"],
            "patterns": [{"regex": "x", "tag": "string"}],
            "keywords": {"builtin": ["len"]},
        }))
        .unwrap();
        assert!(profile.patterns.is_empty());
        assert_eq!(profile.keyword_category("len"), Some(&Category::Builtin));
    }

    #[test]
    fn test_embedded_theme_and_lexer() {
        let profile = LanguageProfile::from_record(&json!({
            "extensions": [".x"],
            "colors": {"string": "#FF0000"},
            "lexer": "python",
        }))
        .unwrap();
        assert_eq!(profile.theme, Some(json!({"string": "#FF0000"})));
        assert!(profile.builtin_lexer);
    }

    #[test]
    fn test_profile_does_not_alias_source_record() {
        let mut record = json!({"name": "A", "extensions": [".a"], "theme": {"string": "#FF0000"}});
        let profile = LanguageProfile::from_record(&record).unwrap();
        record["name"] = json!("B");
        record["theme"]["string"] = json!("#00FF00");
        assert_eq!(profile.name, "A");
        assert_eq!(profile.theme, Some(json!({"string": "#FF0000"})));
    }

    #[test]
    fn test_add_keywords_merges_category() {
        let mut profile = LanguageProfile::new("t", EngineKind::Pattern);
        profile.add_keywords(Category::Control, ["if"]);
        profile.add_keywords(Category::Logic, ["and"]);
        profile.add_keywords(Category::Control, ["while"]);
        assert_eq!(profile.keywords.len(), 2);
        assert_eq!(profile.keywords[0].category, Category::Control);
        assert!(profile.keywords[0].contains("while"));
        assert!(profile.keywords[0].rule.is_some());
    }
}
