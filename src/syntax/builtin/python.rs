//! Python language profile

use crate::syntax::category::Category;
use crate::syntax::language::{EngineKind, LanguageProfile};

pub const PYTHON_PROFILE_NAME: &str = "Python (builtin)";

/// Create the built-in Python profile
///
/// Classified by the structural engine; the keyword sets here are the
/// supplement it colours remaining names with.
pub fn python_profile() -> LanguageProfile {
    let mut lang = LanguageProfile::new(PYTHON_PROFILE_NAME, EngineKind::Structural);
    lang.add_extension("py");
    lang.add_extension("pyw");
    lang.add_extension("pyi");

    lang.add_keywords(
        Category::Control,
        [
            "if", "elif", "else", "for", "while", "break", "continue", "return", "pass", "with",
            "yield", "await", "async", "match", "case",
        ],
    );
    lang.add_keywords(Category::Definition, ["def", "class", "lambda", "global", "nonlocal", "del"]);
    lang.add_keywords(Category::Import, ["import", "from", "as"]);
    lang.add_keywords(
        Category::Exception,
        ["try", "except", "finally", "raise", "assert"],
    );
    lang.add_keywords(Category::Logic, ["and", "or", "not", "in", "is"]);
    lang.add_keywords(Category::Constant, ["True", "False", "None"]);
    lang.add_keywords(
        Category::Builtin,
        [
            "abs", "all", "any", "bool", "bytes", "callable", "chr", "dict", "dir", "divmod",
            "enumerate", "filter", "float", "format", "getattr", "hasattr", "hash", "id", "input",
            "int", "isinstance", "issubclass", "iter", "len", "list", "map", "max", "min", "next",
            "object", "open", "ord", "pow", "print", "range", "repr", "reversed", "round", "set",
            "setattr", "sorted", "str", "sum", "super", "tuple", "type", "zip",
        ],
    );

    lang
}
