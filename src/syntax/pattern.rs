//! Regex and keyword driven classification
//!
//! Claims are made in priority order through one `SpanSet`: strings and
//! comments, then declared patterns, then keyword sets, then the built-in
//! fallbacks for definitions, call-sites and assignments.

use tracing::{debug, warn};

use super::category::Category;
use super::classifier::{Classifier, SpanSet};
use super::language::LanguageProfile;
use super::rules::{PatternRule, RuleMatch};
use super::structural::StructuralEngine;
use super::style::Span;
use super::text_index::TextIndex;

/// Extra check a fallback match must pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    None,
    /// Reject names that directly follow `def ` or `class `
    NotDefined,
    /// Reject when the match is followed by another `=`
    NotComparison,
}

const FALLBACKS: [(&str, Category, Guard); 4] = [
    (r"\bclass\s+([A-Za-z_]\w*)", Category::ClassName, Guard::None),
    (r"\bdef\s+([A-Za-z_]\w*)", Category::FunctionName, Guard::None),
    (r"\b([A-Za-z_]\w*)\s*\(", Category::FunctionName, Guard::NotDefined),
    (r"\b([A-Za-z_]\w*)\s*=", Category::VariableName, Guard::NotComparison),
];

#[derive(Debug, Clone)]
struct Fallback {
    rule: PatternRule,
    guard: Guard,
}

impl Fallback {
    fn accepts(&self, text: &str, m: &RuleMatch) -> bool {
        match self.guard {
            Guard::None => true,
            Guard::NotDefined => !follows_definition(text, m.start),
            Guard::NotComparison => !text[m.end..].starts_with('='),
        }
    }
}

/// Classifier for profiles of the pattern engine kind
#[derive(Debug, Clone)]
pub struct PatternEngine {
    fallbacks: Vec<Fallback>,
}

impl PatternEngine {
    pub fn new() -> Self {
        let fallbacks = FALLBACKS
            .into_iter()
            .filter_map(|(regex, category, guard)| {
                match PatternRule::new(category, regex, 1, "") {
                    Ok(rule) => Some(Fallback { rule, guard }),
                    Err(e) => {
                        warn!(error = %e, "fallback rule did not compile");
                        None
                    }
                }
            })
            .collect();
        Self { fallbacks }
    }

    /// Strings and comments from the profile's own string/comment rules
    ///
    /// Rules are scanned together, leftmost match first, so a comment
    /// marker inside a string (or a quote inside a comment) is not a match.
    fn claim_lexical_rules(
        &self,
        text: &str,
        index: &TextIndex,
        rules: &[&PatternRule],
        spans: &mut SpanSet,
    ) {
        let mut pending: Vec<Option<RuleMatch>> =
            rules.iter().map(|rule| rule.next_match(text, 0)).collect();
        let mut pos = 0;

        while pos <= text.len() {
            for (rule, slot) in rules.iter().zip(pending.iter_mut()) {
                if slot.is_some_and(|m| m.start < pos) {
                    *slot = rule.next_match(text, pos);
                }
            }

            // ties go to the rule declared first
            let Some((which, m)) = pending
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.map(|m| (i, m)))
                .min_by_key(|(_, m)| m.start)
            else {
                break;
            };

            claim_bytes(spans, index, m.span_start, m.span_end, rules[which].category.clone());
            pos = if m.end > m.start {
                m.end
            } else {
                next_boundary(text, m.start)
            };
        }
    }
}

impl Default for PatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for PatternEngine {
    fn classify(&self, text: &str, profile: &LanguageProfile) -> Vec<Span> {
        let index = TextIndex::new(text);
        let mut spans = SpanSet::new();

        if profile.builtin_lexer {
            for span in StructuralEngine::lexical_spans(text, &index) {
                spans.claim(span.start, span.end, span.category);
            }
        } else {
            let lexical: Vec<&PatternRule> = profile
                .patterns
                .iter()
                .filter(|rule| rule.category.is_lexical())
                .collect();
            if !lexical.is_empty() {
                self.claim_lexical_rules(text, &index, &lexical, &mut spans);
            }
        }

        for rule in &profile.patterns {
            if rule.category.is_lexical() && !profile.builtin_lexer {
                continue;
            }
            for (start, end) in rule.ranges(text) {
                claim_bytes(&mut spans, &index, start, end, rule.category.clone());
            }
        }

        for set in &profile.keywords {
            let Some(rule) = &set.rule else { continue };
            for (start, end) in rule.ranges(text) {
                claim_bytes(&mut spans, &index, start, end, set.category.clone());
            }
        }

        for fallback in &self.fallbacks {
            for m in matches(&fallback.rule, text) {
                if fallback.accepts(text, &m) {
                    claim_bytes(&mut spans, &index, m.span_start, m.span_end, fallback.rule.category.clone());
                }
            }
        }

        debug!(profile = %profile.name, spans = spans.len(), "pattern pass");
        spans.into_spans()
    }
}

/// Every non-overlapping match of `rule`, keeping whole-match bounds
fn matches<'a>(rule: &'a PatternRule, text: &'a str) -> impl Iterator<Item = RuleMatch> + 'a {
    let mut pos = 0;
    std::iter::from_fn(move || {
        let m = rule.next_match(text, pos)?;
        pos = if m.end > m.start {
            m.end
        } else {
            next_boundary(text, m.start)
        };
        Some(m)
    })
}

fn claim_bytes(spans: &mut SpanSet, index: &TextIndex, start: usize, end: usize, category: Category) {
    spans.claim(index.char_offset(start), index.char_offset(end), category);
}

/// Byte offset just past the character at `at`, or past the end
fn next_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| at + c.len_utf8())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether byte `at` directly follows `def` or `class` and one whitespace character
fn follows_definition(text: &str, at: usize) -> bool {
    let mut before = text[..at].chars();
    if !before.next_back().is_some_and(char::is_whitespace) {
        return false;
    }
    let head = before.as_str();
    ["def", "class"].iter().any(|keyword| {
        head.strip_suffix(keyword)
            .is_some_and(|rest| !rest.chars().next_back().is_some_and(is_word_char))
    })
}
