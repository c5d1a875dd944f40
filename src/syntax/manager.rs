//! Syntax highlighting manager
//!
//! This module provides the SyntaxManager that owns the active language
//! profile, the theme, the profile registry, and both classification
//! engines. Profiles are swapped whole: a pass always sees one immutable
//! profile from start to finish.

use std::path::Path;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::builtin;
use super::category::Category;
use super::classifier::Engines;
use super::decoration::DecorationSink;
use super::language::{normalize_extension, LanguageProfile};
use super::registry::{read_record, ProfileRegistry};
use super::style::Span;
use super::theme::ThemeProfile;
use crate::error::Result;

/// Main syntax highlighting manager
pub struct SyntaxManager {
    /// Active language profile
    profile: Rc<LanguageProfile>,
    /// Active theme
    theme: ThemeProfile,
    /// Profiles found on disk
    registry: ProfileRegistry,
    engines: Engines,
    /// Whether syntax highlighting is enabled
    pub enabled: bool,
}

impl SyntaxManager {
    /// Create a manager with the built-in profile and default theme
    pub fn new() -> Self {
        Self {
            profile: Rc::new(builtin::default_profile()),
            theme: ThemeProfile::new(),
            registry: ProfileRegistry::new(),
            engines: Engines::new(),
            enabled: true,
        }
    }

    pub fn profile(&self) -> &Rc<LanguageProfile> {
        &self.profile
    }

    pub fn theme(&self) -> &ThemeProfile {
        &self.theme
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Make `profile` active, merging its embedded theme
    pub fn activate(&mut self, profile: Rc<LanguageProfile>) {
        if let Some(theme) = &profile.theme {
            if let Err(e) = self.theme.merge(theme) {
                warn!(profile = %profile.name, error = %e, "ignoring embedded theme");
            }
        }
        info!(
            name = %profile.name,
            engine = profile.engine.name(),
            skipped = profile.diagnostics.len(),
            "language profile active"
        );
        self.profile = profile;
    }

    /// Build a profile from `record` and make it active
    ///
    /// On error the previous profile stays active.
    pub fn load_language(&mut self, record: &Value) -> Result<Rc<LanguageProfile>> {
        let profile = LanguageProfile::from_record(record).map_err(|e| {
            warn!(error = %e, "rejected language profile");
            e
        })?;
        let profile = Rc::new(profile);
        self.activate(Rc::clone(&profile));
        Ok(profile)
    }

    /// Load a JSON or TOML language profile file
    pub fn load_language_file(&mut self, path: &Path) -> Result<Rc<LanguageProfile>> {
        let record = read_record(path)?;
        self.load_language(&record)
    }

    /// Merge `record` over the theme, or reset to the default first
    ///
    /// A record that is not a mapping leaves the theme unchanged.
    pub fn apply_theme(&mut self, record: &Value, merge: bool) -> Result<usize> {
        let result = if merge {
            self.theme.merge(record)
        } else {
            self.theme.reset(record)
        };
        if let Err(e) = &result {
            warn!(error = %e, "rejected theme");
        }
        result
    }

    /// Merge a JSON or TOML theme file over the theme
    pub fn apply_theme_file(&mut self, path: &Path) -> Result<usize> {
        let record = read_record(path)?;
        self.apply_theme(&record, true)
    }

    /// Back to the default palette
    pub fn reset_theme(&mut self) {
        self.theme = ThemeProfile::new();
    }

    /// Replace the registry with the profiles found in `dir`
    pub fn scan_profiles(&mut self, dir: &Path) -> Result<usize> {
        self.registry = ProfileRegistry::scan(dir)?;
        Ok(self.registry.len())
    }

    /// Pick the profile for a file being opened
    ///
    /// Uses the registry first; a `.py` file with no registered profile gets
    /// the built-in profile. Otherwise the current profile stays and `None`
    /// is returned.
    pub fn open_path(&mut self, path: &Path) -> Option<Rc<LanguageProfile>> {
        let profile = self.registry.detect_for_path(path).or_else(|| {
            let ext = normalize_extension(path.extension()?.to_str()?)?;
            (ext == ".py").then(|| Rc::new(builtin::default_profile()))
        });
        match &profile {
            Some(profile) => self.activate(Rc::clone(profile)),
            None => debug!(path = %path.display(), "no profile for file, keeping current"),
        }
        profile
    }

    /// Categories the active profile can emit
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = Category::BASE.to_vec();
        let declared = self
            .profile
            .patterns
            .iter()
            .map(|rule| &rule.category)
            .chain(self.profile.keywords.iter().map(|set| &set.category));
        for category in declared {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    /// Classify `text` under the active profile
    pub fn classify(&self, text: &str) -> Vec<Span> {
        if !self.enabled {
            return Vec::new();
        }
        self.engines.classify(text, &self.profile)
    }

    /// Clear the sink's category decorations and paint a fresh pass
    ///
    /// Returns the number of spans applied.
    pub fn repaint(&self, text: &str, sink: &mut dyn DecorationSink) -> usize {
        let spans = self.classify(text);
        sink.clear_categories();
        for span in &spans {
            sink.apply(&span.category, span.start, span.end);
        }
        spans.len()
    }

    /// Toggle syntax highlighting
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

impl Default for SyntaxManager {
    fn default() -> Self {
        Self::new()
    }
}
