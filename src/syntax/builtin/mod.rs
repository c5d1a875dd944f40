//! Built-in language profiles
//!
//! The editor ships a single built-in profile, for its default scripting
//! language. Everything else comes from profile files.

mod python;

pub use python::{python_profile, PYTHON_PROFILE_NAME};

use super::language::LanguageProfile;

/// The profile active before any profile file is loaded
pub fn default_profile() -> LanguageProfile {
    python_profile()
}
