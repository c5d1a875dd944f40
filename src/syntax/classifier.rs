//! Span classification contract and overlap resolution
//!
//! Both engines implement `Classifier`. Whichever one runs, its candidate
//! spans go through a `SpanSet`, where the first claim on a character
//! wins and later overlapping candidates are dropped.

use std::collections::BTreeMap;

use super::category::Category;
use super::language::{EngineKind, LanguageProfile};
use super::pattern::PatternEngine;
use super::structural::StructuralEngine;
use super::style::Span;

/// Turns a buffer snapshot into ordered, non-overlapping spans
///
/// Implementations are stateless between calls: the result depends only
/// on `text` and `profile`.
pub trait Classifier {
    fn classify(&self, text: &str, profile: &LanguageProfile) -> Vec<Span>;
}

/// Accepted spans of one pass, keyed by start offset
#[derive(Debug, Default)]
pub struct SpanSet {
    spans: BTreeMap<usize, Span>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any accepted span shares a character with `start..end`
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        // spans are disjoint, so only the last one starting before `end` can reach back
        self.spans
            .range(..end)
            .next_back()
            .is_some_and(|(_, span)| span.end > start)
    }

    /// The accepted span covering `pos`, if any
    pub fn at(&self, pos: usize) -> Option<&Span> {
        self.spans
            .range(..=pos)
            .next_back()
            .map(|(_, span)| span)
            .filter(|span| span.contains(pos))
    }

    /// Claim `start..end` unless empty or already (partly) claimed
    pub fn claim(&mut self, start: usize, end: usize, category: Category) -> bool {
        if start >= end || self.overlaps(start, end) {
            return false;
        }
        self.spans.insert(start, Span::new(start, end, category));
        true
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.spans.values()
    }

    /// Spans in ascending offset order
    pub fn into_spans(self) -> Vec<Span> {
        self.spans.into_values().collect()
    }
}

/// The two classification strategies, selected by a profile's engine kind
pub struct Engines {
    structural: StructuralEngine,
    pattern: PatternEngine,
}

impl Engines {
    pub fn new() -> Self {
        Self {
            structural: StructuralEngine::new(),
            pattern: PatternEngine::new(),
        }
    }

    /// The classifier for an engine kind
    pub fn for_kind(&self, kind: EngineKind) -> &dyn Classifier {
        match kind {
            EngineKind::Structural => &self.structural,
            EngineKind::Pattern => &self.pattern,
        }
    }

    /// Classify `text` with the engine `profile` asks for
    pub fn classify(&self, text: &str, profile: &LanguageProfile) -> Vec<Span> {
        self.for_kind(profile.engine).classify(text, profile)
    }
}

impl Default for Engines {
    fn default() -> Self {
        Self::new()
    }
}
