//! Token-driven classification for the built-in grammar
//!
//! Strings and comments are claimed first. A second walk over the token
//! stream then tags definitions, imports, `self` references, call-sites
//! and assignment targets, and finally colours the remaining names from
//! the profile's keyword sets.

use tracing::debug;

use super::category::Category;
use super::classifier::{Classifier, SpanSet};
use super::language::LanguageProfile;
use super::lexer::{tokenize, Token, TokenKind};
use super::style::Span;
use super::text_index::TextIndex;

/// Reserved words of the built-in grammar; never call-sites or assignment targets
const RESERVED: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// Classifier for profiles of the structural engine kind
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralEngine;

impl StructuralEngine {
    pub fn new() -> Self {
        Self
    }

    /// String and comment spans only, for pattern profiles that borrow the tokenizer
    pub fn lexical_spans(text: &str, index: &TextIndex) -> Vec<Span> {
        let stream = tokenize(text);
        if let Some(e) = &stream.error {
            debug!(error = %e, "lexical scan stopped early");
        }
        let mut spans = SpanSet::new();
        claim_lexical(&stream.tokens, index, &mut spans);
        spans.into_spans()
    }
}

impl Classifier for StructuralEngine {
    fn classify(&self, text: &str, profile: &LanguageProfile) -> Vec<Span> {
        let index = TextIndex::new(text);
        let stream = tokenize(text);
        if let Some(e) = &stream.error {
            debug!(error = %e, tokens = stream.tokens.len(), "tokenizer stopped, keeping partial tokens");
        }

        let mut pass = Pass {
            tokens: &stream.tokens,
            index: &index,
            profile,
            spans: SpanSet::new(),
        };
        claim_lexical(pass.tokens, pass.index, &mut pass.spans);
        pass.run();

        debug!(profile = %profile.name, spans = pass.spans.len(), "structural pass");
        pass.spans.into_spans()
    }
}

fn token_range(index: &TextIndex, token: &Token) -> (usize, usize) {
    (
        index.offset(token.start.0, token.start.1),
        index.offset(token.end.0, token.end.1),
    )
}

/// Claim every string and comment token, splitting off an `f` prefix
fn claim_lexical(tokens: &[Token], index: &TextIndex, spans: &mut SpanSet) {
    for token in tokens {
        let (start, end) = token_range(index, token);
        match token.kind {
            TokenKind::String if has_format_prefix(&token.text) => {
                spans.claim(start, start + 1, Category::StringPrefix);
                spans.claim(start + 1, end, Category::String);
            }
            TokenKind::String => {
                spans.claim(start, end, Category::String);
            }
            TokenKind::Comment => {
                spans.claim(start, end, Category::Comment);
            }
            _ => {}
        }
    }
}

fn has_format_prefix(raw: &str) -> bool {
    let mut chars = raw.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('f' | 'F'), Some('"' | '\''))
    )
}

/// One walk over a token stream
struct Pass<'a> {
    tokens: &'a [Token],
    index: &'a TextIndex,
    profile: &'a LanguageProfile,
    spans: SpanSet,
}

impl<'a> Pass<'a> {
    fn run(&mut self) {
        for i in 0..self.tokens.len() {
            let token = &self.tokens[i];
            match token.kind {
                TokenKind::Number => self.claim(i, Category::Digit),
                TokenKind::Name => self.name(i),
                _ => {}
            }
        }
    }

    fn name(&mut self, i: usize) {
        match self.tokens[i].text.as_str() {
            "def" => self.definition(i),
            "class" => self.class(i),
            "import" => self.import(i),
            "from" => self.from_import(i),
            "self" => self.self_reference(i),
            word if is_reserved(word) => self.keyword(i),
            _ => {
                let next = self.next_sig(i).map(|j| &self.tokens[j]);
                if next.is_some_and(|t| t.is_op("(")) {
                    self.claim(i, Category::FunctionName);
                } else if next.is_some_and(|t| t.is_op("=")) {
                    self.claim(i, Category::VariableName);
                } else {
                    self.keyword(i);
                }
            }
        }
    }

    /// `def NAME(params)`: function name, then every name inside the parameter list
    fn definition(&mut self, i: usize) {
        self.keyword(i);
        let Some(j) = self.next_sig(i).filter(|&j| self.tokens[j].is_name()) else {
            return;
        };
        self.claim(j, Category::FunctionName);

        let Some(open) = self.next_sig(j).filter(|&k| self.tokens[k].is_op("(")) else {
            return;
        };
        let mut depth = 0usize;
        for m in open..self.tokens.len() {
            let token = &self.tokens[m];
            if token.is_op("(") {
                depth += 1;
            } else if token.is_op(")") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            } else if token.is_name() {
                self.claim(m, Category::VariableName);
            }
        }
    }

    fn class(&mut self, i: usize) {
        self.keyword(i);
        if let Some(j) = self.next_sig(i).filter(|&j| self.tokens[j].is_name()) {
            self.claim(j, Category::ClassName);
        }
    }

    /// `import a.b, c as d`: each dotted chain is one module span
    fn import(&mut self, i: usize) {
        self.keyword(i);
        let mut j = i + 1;
        while j < self.tokens.len() && !self.is_terminator(j) {
            let token = &self.tokens[j];
            if token.is_name() && token.text == "as" {
                self.keyword(j);
                j += 1;
            } else if token.is_name() {
                j = self.module_chain(j, j);
            } else {
                j += 1;
            }
        }
    }

    /// `from .pkg.mod import a, b`: the module path, then each imported name
    ///
    /// A `from` with no `import` before the statement ends (`raise e from err`,
    /// `yield from g`) is only a keyword.
    fn from_import(&mut self, i: usize) {
        self.keyword(i);
        let Some(import_at) = (i + 1..self.tokens.len())
            .take_while(|&m| !self.is_terminator(m))
            .find(|&m| self.tokens[m].is_name() && self.tokens[m].text == "import")
        else {
            return;
        };
        let Some(first) = self.next_sig(i).filter(|&first| first < import_at) else {
            return;
        };

        let mut j = first;
        while j < import_at && (self.tokens[j].is_op(".") || self.tokens[j].is_op("...")) {
            j += 1;
        }
        if j < import_at && self.tokens[j].is_name() {
            self.module_chain(first, j);
        } else if j > first {
            self.claim_between(first, j - 1, Category::Module);
        } else {
            return;
        }

        self.keyword(import_at);
        let mut m = import_at + 1;
        while m < self.tokens.len() && !self.is_terminator(m) {
            let token = &self.tokens[m];
            if token.is_name() && token.text == "as" {
                self.keyword(m);
            } else if token.is_name() {
                self.claim(m, Category::Module);
            }
            m += 1;
        }
    }

    /// `self.attr` pairs, or a bare `self`
    fn self_reference(&mut self, i: usize) {
        self.claim(i, Category::SelfRef);
        let dot = self.tokens.get(i + 1).is_some_and(|t| t.is_op("."));
        if dot && self.tokens.get(i + 2).is_some_and(Token::is_name) {
            self.claim(i + 2, Category::SelfAttr);
        }
    }

    /// Colour a name from the first keyword set that contains it
    fn keyword(&mut self, i: usize) {
        if let Some(category) = self.profile.keyword_category(&self.tokens[i].text) {
            let category = category.clone();
            self.claim(i, category);
        }
    }

    /// Claim `start..` plus every `.name` pair after `name_at`; returns the token after the chain
    fn module_chain(&mut self, start: usize, name_at: usize) -> usize {
        let mut last = name_at;
        let mut k = name_at + 1;
        while k + 1 < self.tokens.len() && self.tokens[k].is_op(".") && self.tokens[k + 1].is_name() {
            last = k + 1;
            k += 2;
        }
        self.claim_between(start, last, Category::Module);
        k
    }

    fn next_sig(&self, i: usize) -> Option<usize> {
        (i + 1..self.tokens.len()).find(|&j| !self.tokens[j].is_layout())
    }

    fn is_terminator(&self, j: usize) -> bool {
        let token = &self.tokens[j];
        matches!(token.kind, TokenKind::Newline | TokenKind::EndMarker) || token.is_op(";")
    }

    fn claim(&mut self, i: usize, category: Category) {
        self.claim_between(i, i, category);
    }

    /// Claim from the start of token `first` to the end of token `last`
    fn claim_between(&mut self, first: usize, last: usize, category: Category) {
        let (start, _) = token_range(self.index, &self.tokens[first]);
        let (_, end) = token_range(self.index, &self.tokens[last]);
        self.spans.claim(start, end, category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::language::EngineKind;

    fn profile() -> LanguageProfile {
        LanguageProfile::new("test", EngineKind::Structural)
    }

    fn classify(text: &str) -> Vec<(usize, usize, Category)> {
        classify_with(text, &profile())
    }

    fn classify_with(text: &str, profile: &LanguageProfile) -> Vec<(usize, usize, Category)> {
        StructuralEngine::new()
            .classify(text, profile)
            .into_iter()
            .map(|s| (s.start, s.end, s.category))
            .collect()
    }

    #[test]
    fn test_format_string_prefix_split() {
        assert_eq!(
            classify("f\"abc\""),
            vec![(0, 1, Category::StringPrefix), (1, 6, Category::String)]
        );
        assert_eq!(classify("'abc'"), vec![(0, 5, Category::String)]);
        assert_eq!(classify("rb'x'"), vec![(0, 5, Category::String)]);
    }

    #[test]
    fn test_self_attribute_pair() {
        assert_eq!(
            classify("self.value"),
            vec![(0, 4, Category::SelfRef), (5, 10, Category::SelfAttr)]
        );
        assert_eq!(classify("self\n"), vec![(0, 4, Category::SelfRef)]);
    }

    #[test]
    fn test_dotted_import_is_one_span() {
        assert_eq!(classify("import a.b.c"), vec![(7, 12, Category::Module)]);
        assert_eq!(
            classify("import os, a.b as c\nx = 1"),
            vec![
                (7, 9, Category::Module),
                (11, 14, Category::Module),
                (18, 19, Category::Module),
                (20, 21, Category::VariableName),
                (24, 25, Category::Digit),
            ]
        );
    }

    #[test]
    fn test_import_stops_at_semicolon() {
        assert_eq!(
            classify("import a; b = 2"),
            vec![
                (7, 8, Category::Module),
                (10, 11, Category::VariableName),
                (14, 15, Category::Digit),
            ]
        );
    }

    #[test]
    fn test_from_import() {
        assert_eq!(
            classify("from pkg.sub import x, y"),
            vec![
                (5, 12, Category::Module),
                (20, 21, Category::Module),
                (23, 24, Category::Module),
            ]
        );
    }

    #[test]
    fn test_relative_from_import() {
        assert_eq!(
            classify("from ..pkg import y"),
            vec![(5, 10, Category::Module), (18, 19, Category::Module)]
        );
        assert_eq!(
            classify("from . import x"),
            vec![(5, 6, Category::Module), (14, 15, Category::Module)]
        );
    }

    #[test]
    fn test_from_without_import_is_only_a_keyword() {
        assert_eq!(
            classify("raise E from err\ntotal = compute()\n"),
            vec![(17, 22, Category::VariableName), (25, 32, Category::FunctionName)]
        );
        assert_eq!(
            classify("yield from g\nx = 1\n"),
            vec![(13, 14, Category::VariableName), (17, 18, Category::Digit)]
        );
    }

    #[test]
    fn test_from_keyword_coloured_outside_imports() {
        let mut profile = profile();
        profile.add_keywords(Category::Import, ["from", "import"]);
        assert_eq!(
            classify_with("raise E from err; import os", &profile),
            vec![
                (8, 12, Category::Import),
                (18, 24, Category::Import),
                (25, 27, Category::Module),
            ]
        );
    }

    #[test]
    fn test_def_name_and_parameters() {
        assert_eq!(
            classify("def area(w, h=2):\n    return w\n"),
            vec![
                (4, 8, Category::FunctionName),
                (9, 10, Category::VariableName),
                (12, 13, Category::VariableName),
                (14, 15, Category::Digit),
            ]
        );
    }

    #[test]
    fn test_def_without_parens_scans_no_parameters() {
        // incomplete definition while typing
        let spans = classify("def f\nx(y)\n");
        assert_eq!(spans[0], (4, 5, Category::FunctionName));
        assert_eq!(spans[1], (6, 7, Category::FunctionName));
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_class_name() {
        assert_eq!(
            classify("class Shape(Base):\n    pass\n"),
            vec![(6, 11, Category::ClassName)]
        );
    }

    #[test]
    fn test_call_and_assignment() {
        assert_eq!(
            classify("total = compute(x) == y"),
            vec![(0, 5, Category::VariableName), (8, 15, Category::FunctionName)]
        );
        assert_eq!(classify("a == b"), vec![]);
    }

    #[test]
    fn test_keyword_supplement_first_set_wins() {
        let mut profile = profile();
        profile.add_keywords(Category::Control, ["if", "return"]);
        profile.add_keywords(Category::Builtin, ["len", "if"]);
        assert_eq!(
            classify_with("if (len):\n    return ok\n", &profile),
            vec![
                (0, 2, Category::Control),
                (4, 7, Category::Builtin),
                (14, 20, Category::Control),
            ]
        );
    }

    #[test]
    fn test_leading_keyword_coloured_from_supplement() {
        let mut profile = profile();
        profile.add_keywords(Category::Definition, ["def", "class"]);
        profile.add_keywords(Category::Import, ["import", "from"]);
        let spans = classify_with("from a import b\ndef f(): pass\n", &profile);
        assert_eq!(spans[0], (0, 4, Category::Import));
        assert_eq!(spans[2], (7, 13, Category::Import));
        assert_eq!(spans[4], (16, 19, Category::Definition));
    }

    #[test]
    fn test_strings_and_comments_shield_contents() {
        assert_eq!(
            classify("x = 'def f(y)'  # call(z)\n"),
            vec![
                (0, 1, Category::VariableName),
                (4, 14, Category::String),
                (16, 25, Category::Comment),
            ]
        );
    }

    #[test]
    fn test_partial_result_on_unterminated_string() {
        let spans = classify("x = 1\ns = \"\"\"never closed\ny = 2\n");
        assert_eq!(
            spans,
            vec![
                (0, 1, Category::VariableName),
                (4, 5, Category::Digit),
                (6, 7, Category::VariableName),
            ]
        );
    }

    #[test]
    fn test_offsets_are_characters() {
        assert_eq!(
            classify("s = \"é\"\nf(x)\n"),
            vec![
                (0, 1, Category::VariableName),
                (4, 7, Category::String),
                (8, 9, Category::FunctionName),
            ]
        );
    }

    #[test]
    fn test_lexical_spans_only() {
        let text = "x = 'a' # b\n";
        let spans = StructuralEngine::lexical_spans(text, &TextIndex::new(text));
        let categories: Vec<_> = spans.iter().map(|s| s.category.clone()).collect();
        assert_eq!(categories, vec![Category::String, Category::Comment]);
    }

    #[test]
    fn test_empty_text() {
        assert!(classify("").is_empty());
    }
}
