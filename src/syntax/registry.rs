//! Profile files on disk
//!
//! A configs directory holds one language profile per file, in JSON or
//! TOML. Scanning builds every readable profile and maps each extension to
//! the first profile (in file name order) that claims it.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::language::{normalize_extension, LanguageProfile};
use crate::error::Result;

/// Read an untyped record from a `.json` or `.toml` file
pub fn read_record(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        Ok(toml::from_str::<Value>(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

fn is_profile_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("toml"))
}

/// Language profiles found in a configs directory
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    /// Directory last scanned
    dir: Option<PathBuf>,
    profiles: Vec<Rc<LanguageProfile>>,
    /// Extension to index into `profiles`
    by_extension: HashMap<String, usize>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every profile file in `dir`
    ///
    /// A missing directory gives an empty registry. Unreadable or malformed
    /// files are skipped with a warning.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut registry = Self {
            dir: Some(dir.to_path_buf()),
            ..Self::default()
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "no configs directory");
                return Ok(registry);
            }
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_profile_file(path))
            .collect();
        paths.sort();

        for path in paths {
            let profile = read_record(&path).and_then(|record| LanguageProfile::from_record(&record));
            match profile {
                Ok(profile) => {
                    registry.register(profile);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping profile file"),
            }
        }

        info!(
            dir = %dir.display(),
            profiles = registry.len(),
            extensions = registry.by_extension.len(),
            "scanned language profiles"
        );
        Ok(registry)
    }

    /// Rescan the directory this registry was built from
    pub fn rescan(&mut self) -> Result<()> {
        if let Some(dir) = self.dir.clone() {
            *self = Self::scan(&dir)?;
        }
        Ok(())
    }

    /// Add a profile; extensions already claimed keep their first owner
    pub fn register(&mut self, profile: LanguageProfile) -> Rc<LanguageProfile> {
        let idx = self.profiles.len();
        for ext in &profile.extensions {
            self.by_extension.entry(ext.clone()).or_insert(idx);
        }
        let profile = Rc::new(profile);
        self.profiles.push(Rc::clone(&profile));
        profile
    }

    /// Profile registered for the extension of `path`
    pub fn detect_for_path(&self, path: &Path) -> Option<Rc<LanguageProfile>> {
        let ext = path.extension()?.to_str()?;
        self.detect_for_extension(ext)
    }

    pub fn detect_for_extension(&self, ext: &str) -> Option<Rc<LanguageProfile>> {
        let ext = normalize_extension(ext)?;
        self.by_extension
            .get(&ext)
            .and_then(|&idx| self.profiles.get(idx))
            .cloned()
    }

    pub fn profiles(&self) -> &[Rc<LanguageProfile>] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[test]
    fn test_scan_first_profile_wins() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b_lua.json", r#"{"name": "Lua B", "extensions": ["lua"]}"#);
        write(&dir, "a_lua.json", r#"{"name": "Lua A", "extensions": [".LUA", ".luau"]}"#);
        write(&dir, "notes.txt", r#"{"name": "Ignored", "extensions": [".txt"]}"#);

        let registry = ProfileRegistry::scan(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        let lua = registry.detect_for_path(Path::new("init.Lua")).unwrap();
        assert_eq!(lua.name, "Lua A");
        assert_eq!(registry.detect_for_extension("luau").unwrap().name, "Lua A");
        assert!(registry.detect_for_path(Path::new("notes.txt")).is_none());
        assert!(registry.detect_for_path(Path::new("Makefile")).is_none());
    }

    #[test]
    fn test_scan_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "broken.json", "{ not json");
        write(&dir, "list.json", "[1, 2]");
        write(&dir, "noext.json", r#"{"name": "x"}"#);
        write(&dir, "good.json", r#"{"name": "Good", "ext": ["g"]}"#);

        let registry = ProfileRegistry::scan(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.profiles()[0].name, "Good");
    }

    #[test]
    fn test_scan_reads_toml() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "sql.toml",
            r#"
name = "SQL"
extensions = [".sql"]

[[patterns]]
regex = "--.*"
tag = "comment"

[keywords]
control = ["SELECT", "FROM"]
"#,
        );

        let registry = ProfileRegistry::scan(dir.path()).unwrap();
        let sql = registry.detect_for_path(Path::new("q.sql")).unwrap();
        assert_eq!(sql.patterns.len(), 1);
        assert_eq!(sql.keyword_category("FROM").map(|c| c.name()), Some("control"));
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = ProfileRegistry::scan(&dir.path().join("absent")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rescan_picks_up_new_files() {
        let dir = TempDir::new().unwrap();
        let mut registry = ProfileRegistry::scan(dir.path()).unwrap();
        assert!(registry.is_empty());
        write(&dir, "ini.json", r#"{"extensions": [".ini"]}"#);
        registry.rescan().unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.profiles()[0].name, "<unnamed>");
    }
}
