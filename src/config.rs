//! Organizer configuration.
//!
//! Settings are read from a TOML file and fall back to the built-in reference
//! behavior for anything left out. Lookup order:
//! 1. An explicit path (an error if it does not exist)
//! 2. `.deskcleanrc.toml` in the current directory
//! 3. `deskclean/config.toml` under the platform config directory
//! 4. Built-in defaults
//!
//! # Configuration File Format
//!
//! ```toml
//! destination = "Organized Desktop"
//! fallback = "Miscellaneous"
//!
//! [exclude]
//! paths = ["Desktop Cleaner/runDesktopCleaner.bat", "Clean Desktop.lnk"]
//! patterns = ["desktop.ini", ".*"]
//!
//! [[category]]
//! name = "Documents"
//! extensions = ["pdf", "docx", "txt", "rtf"]
//! ```
//!
//! A `[[category]]` list replaces the whole built-in table.

use crate::exclusion::DEFAULT_EXCLUSIONS;
use crate::file_category::{
    Category, CategoryError, CategoryTable, DEFAULT_FALLBACK, is_plain_dir_name,
};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory created inside the source directory.
pub const DEFAULT_DESTINATION: &str = "Organized Desktop";

/// File looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".deskcleanrc.toml";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    #[error("Destination name '{0}' is not a valid directory name")]
    InvalidDestination(String),
    #[error(transparent)]
    Category(#[from] CategoryError),
}

/// One `[[category]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySpec {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Rules for entries that must stay where they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcludeRules {
    /// Exact paths, relative to the source directory unless absolute.
    pub paths: Vec<PathBuf>,
    /// Glob patterns matched against bare file names.
    pub patterns: Vec<String>,
}

impl Default for ExcludeRules {
    fn default() -> Self {
        Self {
            paths: DEFAULT_EXCLUSIONS.iter().map(PathBuf::from).collect(),
            patterns: Vec::new(),
        }
    }
}

/// Complete organizer settings as stored in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Destination directory name inside the source directory.
    pub destination: String,
    /// Name of the catch-all category.
    pub fallback: String,
    pub exclude: ExcludeRules,
    /// Declared categories in lookup order.
    #[serde(rename = "category")]
    pub categories: Vec<CategorySpec>,
}

impl Default for Settings {
    fn default() -> Self {
        let table = CategoryTable::default();
        Self {
            destination: DEFAULT_DESTINATION.to_string(),
            fallback: DEFAULT_FALLBACK.to_string(),
            exclude: ExcludeRules::default(),
            categories: table
                .declared()
                .iter()
                .map(|category| CategorySpec {
                    name: category.name().to_string(),
                    extensions: category
                        .sorted_extensions()
                        .into_iter()
                        .map(String::from)
                        .collect(),
                })
                .collect(),
        }
    }
}

impl Settings {
    /// Loads settings, searching the standard locations when no path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if any file found
    /// cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Some(user_config) = Self::user_config_path()
            && user_config.is_file()
        {
            return Self::load_from_file(&user_config);
        }

        tracing::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// `<config dir>/deskclean/config.toml`, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deskclean").join("config.toml"))
    }

    /// Loads settings from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(settings)
    }

    /// Parses and validates settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Renders the settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Checks every rule without building anything long-lived.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.destination_name()?;
        self.category_table()?;
        self.ignore_patterns()?;
        Ok(())
    }

    /// The validated destination directory name.
    pub fn destination_name(&self) -> Result<&str, ConfigError> {
        if is_plain_dir_name(&self.destination) {
            Ok(&self.destination)
        } else {
            Err(ConfigError::InvalidDestination(self.destination.clone()))
        }
    }

    /// Builds the category table described by these settings.
    pub fn category_table(&self) -> Result<CategoryTable, ConfigError> {
        let categories = self
            .categories
            .iter()
            .map(|spec| Category::new(spec.name.clone(), &spec.extensions))
            .collect();

        Ok(CategoryTable::new(categories, self.fallback.clone())?)
    }

    /// Compiles the ignore patterns.
    pub fn ignore_patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_match_reference_table() {
        let settings = Settings::default();
        assert_eq!(settings.destination, "Organized Desktop");
        assert_eq!(settings.fallback, "Miscellaneous");
        assert_eq!(settings.categories.len(), 9);
        assert_eq!(settings.categories[0].name, "Documents");
        assert_eq!(settings.exclude.paths.len(), 2);
        assert!(settings.exclude.patterns.is_empty());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let settings = Settings::from_toml("").expect("empty config should parse");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            destination = "Sorted"

            [exclude]
            patterns = ["desktop.ini"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.destination, "Sorted");
        assert_eq!(settings.fallback, "Miscellaneous");
        assert_eq!(settings.exclude.paths, ExcludeRules::default().paths);
        assert_eq!(settings.exclude.patterns, vec!["desktop.ini".to_string()]);
        assert_eq!(settings.categories, Settings::default().categories);
    }

    #[test]
    fn test_categories_replace_reference_table() {
        let settings = Settings::from_toml(
            r#"
            fallback = "Other"

            [[category]]
            name = "Pictures"
            extensions = ["PNG", ".jpg"]

            [[category]]
            name = "Text"
            extensions = ["txt"]
            "#,
        )
        .unwrap();

        let table = settings.category_table().unwrap();
        let names: Vec<&str> = table.dir_names().collect();
        assert_eq!(names, vec!["Pictures", "Text", "Other"]);
        assert_eq!(table.category_for("jpg").name(), "Pictures");
        assert_eq!(table.category_for("pdf").name(), "Other");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = Settings::from_toml("destinaton = \"typo\"");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let result = Settings::from_toml("destination = ");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_destination_is_rejected() {
        let result = Settings::from_toml("destination = \"../escape\"");
        assert!(matches!(result, Err(ConfigError::InvalidDestination(_))));
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let result = Settings::from_toml("[exclude]\npatterns = [\"[unclosed\"]");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidGlobPattern { .. })
        ));
    }

    #[test]
    fn test_duplicate_category_is_rejected() {
        let result = Settings::from_toml(
            r#"
            [[category]]
            name = "A"
            extensions = ["a"]

            [[category]]
            name = "A"
            extensions = ["b"]
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Category(CategoryError::DuplicateName(_)))
        ));
    }

    #[test]
    fn test_to_toml_round_trips_defaults() {
        let settings = Settings::default();
        let rendered = settings.to_toml().expect("render failed");
        let parsed = Settings::from_toml(&rendered).expect("reparse failed");
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let result = Settings::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "fallback = \"Rest\"").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.fallback, "Rest");
    }
}
