//! damedit - syntax highlighting engine for a small code editor
//!
//! The library classifies buffer text into coloured spans. Language
//! profiles and themes are untyped records loaded from JSON or TOML; the
//! built-in grammar gets a structural tokenizer, everything else a
//! regex and keyword engine.

pub mod config;
pub mod error;
pub mod syntax;
pub mod terminal;

pub use error::{HighlightError, Result};
