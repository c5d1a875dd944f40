//! Syntax and styling module
//!
//! This module provides the highlighting engine:
//! - Language and theme profiles loaded from untyped records
//! - A structural engine for the built-in grammar
//! - A pattern engine for user-declared grammars
//! - Debounced scheduling of classification passes
//! - Search and active-line ranges for host decoration

mod builtin;
mod category;
mod classifier;
mod decoration;
mod language;
mod lexer;
mod manager;
mod pattern;
mod registry;
mod rules;
mod scheduler;
mod search;
mod structural;
mod style;
mod text_index;
mod theme;

pub use builtin::{default_profile, python_profile, PYTHON_PROFILE_NAME};
pub use category::Category;
pub use classifier::{Classifier, Engines, SpanSet};
pub use decoration::DecorationSink;
pub use language::{normalize_extension, EngineKind, KeywordSet, LanguageProfile};
pub use lexer::{tokenize, Token, TokenKind, TokenStream};
pub use manager::SyntaxManager;
pub use pattern::PatternEngine;
pub use registry::{read_record, ProfileRegistry};
pub use rules::{KeywordRule, PatternRule};
pub use scheduler::{HighlightScheduler, SchedulerState, DEFAULT_WINDOW};
pub use search::{active_line, find_next, find_prev};
pub use structural::StructuralEngine;
pub use style::{Color, Span, Style};
pub use text_index::TextIndex;
pub use theme::{ThemeKey, ThemeProfile, UiSlot};
