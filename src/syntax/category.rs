//! Category tags for syntax highlighting
//!
//! This module defines the semantic categories a classified span can
//! carry. Each category name doubles as its theme key.

use std::fmt;
use std::sync::Arc;

/// Semantic categories for classified spans
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Control flow keywords (if, for, return)
    Control,
    /// Definition keywords (def, class, lambda)
    Definition,
    /// Import keywords (import, from, as)
    Import,
    /// Exception handling keywords (try, except, raise)
    Exception,
    /// Logical operators spelled as words (and, or, not)
    Logic,
    /// Literal constants (True, None)
    Constant,
    /// Builtin functions and types
    Builtin,
    /// Numeric literals
    Digit,
    /// Operators and punctuation
    Symbol,
    /// Brackets and parentheses
    Bracket,
    /// Name introduced by a class statement
    ClassName,
    /// Function definitions and call-sites
    FunctionName,
    /// Assignment targets and parameters
    VariableName,
    /// String literals
    String,
    /// Comments
    Comment,
    /// Module names in import statements
    Module,
    /// The self-reference keyword
    SelfRef,
    /// Attribute accessed through the self-reference
    SelfAttr,
    /// One-character prefix of a formatted string
    StringPrefix,
    /// Host decoration for search matches, never classified
    SearchMatch,
    /// Host decoration for the caret line, never classified
    ActiveLine,
    /// Category introduced by a language profile
    Custom(Arc<str>),
}

impl Category {
    /// Every builtin category the classifier may emit
    pub const BASE: [Category; 19] = [
        Category::Control,
        Category::Definition,
        Category::Import,
        Category::Exception,
        Category::Logic,
        Category::Constant,
        Category::Builtin,
        Category::Digit,
        Category::Symbol,
        Category::Bracket,
        Category::ClassName,
        Category::FunctionName,
        Category::VariableName,
        Category::String,
        Category::Comment,
        Category::Module,
        Category::SelfRef,
        Category::SelfAttr,
        Category::StringPrefix,
    ];

    /// Get the canonical name (also the theme key) for this category
    pub fn name(&self) -> &str {
        match self {
            Category::Control => "control",
            Category::Definition => "definition",
            Category::Import => "import",
            Category::Exception => "exception",
            Category::Logic => "logic",
            Category::Constant => "constants",
            Category::Builtin => "builtin",
            Category::Digit => "digits",
            Category::Symbol => "symbols",
            Category::Bracket => "paran",
            Category::ClassName => "class_name",
            Category::FunctionName => "func_name",
            Category::VariableName => "var_name",
            Category::String => "string",
            Category::Comment => "comment",
            Category::Module => "module",
            Category::SelfRef => "self",
            Category::SelfAttr => "self_attr",
            Category::StringPrefix => "fstring_prefix",
            Category::SearchMatch => "search",
            Category::ActiveLine => "active_line",
            Category::Custom(name) => name,
        }
    }

    /// Parse a builtin category from a canonical name or descriptive alias
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "control" => Some(Category::Control),
            "definition" => Some(Category::Definition),
            "import" => Some(Category::Import),
            "exception" => Some(Category::Exception),
            "logic" => Some(Category::Logic),
            "constants" | "constant" => Some(Category::Constant),
            "builtin" => Some(Category::Builtin),
            "digits" | "digit" => Some(Category::Digit),
            "symbols" | "symbol" => Some(Category::Symbol),
            "paran" | "bracket" => Some(Category::Bracket),
            "class_name" | "class-name" => Some(Category::ClassName),
            "func_name" | "function-name" => Some(Category::FunctionName),
            "var_name" | "variable-name" => Some(Category::VariableName),
            "string" => Some(Category::String),
            "comment" => Some(Category::Comment),
            "module" => Some(Category::Module),
            "self" | "self-reference" => Some(Category::SelfRef),
            "self_attr" | "self-attribute" => Some(Category::SelfAttr),
            "fstring_prefix" | "string-prefix" => Some(Category::StringPrefix),
            "search" | "search-match" => Some(Category::SearchMatch),
            "active_line" | "active-line" => Some(Category::ActiveLine),
            _ => None,
        }
    }

    /// Parse any tag declared by a profile, falling back to a custom category
    ///
    /// Returns `None` only for an empty or blank tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        Some(Self::from_name(tag).unwrap_or_else(|| Category::Custom(Arc::from(tag))))
    }

    /// Whether spans of this category take precedence over pattern rules
    pub fn is_lexical(&self) -> bool {
        matches!(self, Category::String | Category::Comment)
    }

    /// Whether this category is reserved for host-side decoration
    pub fn is_decoration(&self) -> bool {
        matches!(self, Category::SearchMatch | Category::ActiveLine)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_roundtrip() {
        for category in Category::BASE {
            let name = category.name().to_string();
            assert_eq!(Category::from_name(&name), Some(category));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Category::from_name("function-name"), Some(Category::FunctionName));
        assert_eq!(Category::from_name("self-attribute"), Some(Category::SelfAttr));
        assert_eq!(Category::from_name("bracket"), Some(Category::Bracket));
        assert_eq!(Category::from_name("FuncName"), None);
    }

    #[test]
    fn test_custom_tags() {
        let tag = Category::from_tag("preprocessor").unwrap();
        assert_eq!(tag, Category::Custom(Arc::from("preprocessor")));
        assert_eq!(tag.name(), "preprocessor");
        assert_eq!(Category::from_tag("  string "), Some(Category::String));
        assert_eq!(Category::from_tag("   "), None);
    }

    #[test]
    fn test_decoration_categories_are_not_base() {
        assert!(Category::BASE.iter().all(|c| !c.is_decoration()));
        assert!(Category::SearchMatch.is_decoration());
    }
}
