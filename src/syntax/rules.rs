//! Pattern and keyword rules for the pattern engine
//!
//! This module defines the compiled rule types a language profile
//! carries: regex pattern rules with an optional capture group, and
//! per-category keyword alternations.

use regex::{Captures, Regex, RegexBuilder};

use super::category::Category;
use crate::error::{HighlightError, Result};

/// Build a regex with flags from a short flag string
///
/// `i` = case-insensitive, `m` = multi-line anchors, `s` = dot matches
/// newline. Unknown flag characters are ignored.
pub fn compile(pattern: &str, flags: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|e| HighlightError::PatternCompile {
            regex: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// A declared regex rule
///
/// Matches a regex pattern and assigns a category to the match, or to one
/// capture group of it.
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Category to assign to matches
    pub category: Category,
    /// Compiled regex pattern
    pub pattern: Regex,
    /// Capture group to highlight (0 = whole match)
    pub group: usize,
}

impl PatternRule {
    /// Create a new pattern rule
    pub fn new(category: Category, pattern: &str, group: usize, flags: &str) -> Result<Self> {
        Ok(Self {
            category,
            pattern: compile(pattern, flags)?,
            group,
        })
    }

    /// The highlighted byte range of one match
    fn target(&self, caps: &Captures<'_>) -> Option<(usize, usize)> {
        let m = match self.group {
            0 => caps.get(0),
            group => caps.get(group).or_else(|| caps.get(0)),
        }?;
        Some((m.start(), m.end()))
    }

    /// Highlighted byte ranges of every non-overlapping match
    pub fn ranges<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.pattern
            .captures_iter(text)
            .filter_map(move |caps| self.target(&caps))
    }

    /// First match at or after byte `start`
    ///
    /// Returns the whole-match end alongside the highlighted range so a
    /// scanner can resume after it.
    pub fn next_match(&self, text: &str, start: usize) -> Option<RuleMatch> {
        if start > text.len() {
            return None;
        }
        let caps = self.pattern.captures_at(text, start)?;
        let whole = caps.get(0)?;
        let (span_start, span_end) = self.target(&caps)?;
        Some(RuleMatch {
            start: whole.start(),
            end: whole.end(),
            span_start,
            span_end,
        })
    }
}

/// One match found by `PatternRule::next_match`, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub start: usize,
    pub end: usize,
    pub span_start: usize,
    pub span_end: usize,
}

/// A keyword set compiled to a single word-boundary alternation
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub category: Category,
    pub pattern: Regex,
}

impl KeywordRule {
    /// Compile `words` into `\b(?:w1|w2|...)\b`, longest first
    ///
    /// Returns Ok(None) for an empty word list.
    pub fn new<'w>(category: Category, words: impl IntoIterator<Item = &'w str>) -> Result<Option<Self>> {
        let mut words: Vec<&str> = words.into_iter().filter(|w| !w.is_empty()).collect();
        if words.is_empty() {
            return Ok(None);
        }
        // a short keyword must not win over a longer one sharing its prefix
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();

        let alternation: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
        let pattern = format!(r"\b(?:{})\b", alternation.join("|"));
        Ok(Some(Self {
            category,
            pattern: compile(&pattern, "")?,
        }))
    }

    /// Byte ranges of every keyword occurrence
    pub fn ranges<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
        self.pattern.find_iter(text).map(|m| (m.start(), m.end()))
    }
}
