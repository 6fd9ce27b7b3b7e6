//! Paths and name patterns that are never relocated.
//!
//! [`ExclusionSet`] answers two questions for an entry in the source directory:
//! is its exact path on the exclusion list, and does its bare name match one of
//! the configured ignore patterns (checked for regular files only). Path
//! membership is exact equality of absolute, lexically normalized paths;
//! prefixes and globs never match there.

use crate::config::LOCAL_CONFIG_FILE;
use glob::Pattern;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Launcher artifacts shipped next to the tool, relative to the source directory.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "Desktop Cleaner/runDesktopCleaner.bat",
    "Clean Desktop.lnk",
];

/// Files the tool itself reads from the source directory. These are excluded
/// on top of whatever the configuration lists.
pub const TOOL_FILES: &[&str] = &[LOCAL_CONFIG_FILE];

/// Why an entry was left in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry's path is on the exclusion list.
    Excluded,
    /// The entry's name matched an ignore pattern.
    Ignored { pattern: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excluded => write!(f, "excluded path"),
            Self::Ignored { pattern } => write!(f, "matches ignore pattern '{}'", pattern),
        }
    }
}

/// Fixed set of excluded paths plus compiled name patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    paths: HashSet<PathBuf>,
    patterns: Vec<Pattern>,
}

impl ExclusionSet {
    /// Builds the set, resolving relative paths against `source_dir`.
    ///
    /// A relative `source_dir` is first made absolute against the current
    /// directory. Absolute entries are kept as given (after normalization).
    pub fn new<I, P>(source_dir: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let base = absolutize(source_dir);
        let paths = paths
            .into_iter()
            .map(|path| normalize(&base.join(path)))
            .collect();

        Self {
            paths,
            patterns: Vec::new(),
        }
    }

    /// The reference exclusion list plus the tool's own files.
    pub fn with_defaults(source_dir: &Path) -> Self {
        Self::new(source_dir, DEFAULT_EXCLUSIONS.iter().chain(TOOL_FILES))
    }

    /// Adds compiled name patterns.
    pub fn with_patterns(mut self, patterns: Vec<Pattern>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Returns true if this exact path is excluded.
    ///
    /// Relative paths are resolved against the current directory first.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.paths.contains(&normalize(&absolutize(path)))
    }

    /// Returns the first ignore pattern matching the file name, if any.
    pub fn matching_pattern(&self, file_name: &str) -> Option<&Pattern> {
        self.patterns
            .iter()
            .find(|pattern| pattern.matches(file_name))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem. Falls back to the path as given when there is no usable
/// current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically normalizes a path: drops `.` components and folds `..` into the
/// preceding normal component. The filesystem is never consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions_resolve_against_source() {
        let source = Path::new("/home/user/Desktop");
        let set = ExclusionSet::with_defaults(source);

        assert_eq!(set.len(), 3);
        assert!(set.is_excluded(&source.join("Clean Desktop.lnk")));
        assert!(set.is_excluded(&source.join(".deskcleanrc.toml")));
        assert!(set.is_excluded(
            &source
                .join("Desktop Cleaner")
                .join("runDesktopCleaner.bat")
        ));
    }

    #[test]
    fn test_membership_is_exact_not_prefix() {
        let source = Path::new("/desk");
        let set = ExclusionSet::new(source, ["keep.txt"]);

        assert!(set.is_excluded(Path::new("/desk/keep.txt")));
        assert!(!set.is_excluded(Path::new("/desk/keep.txt.bak")));
        assert!(!set.is_excluded(Path::new("/desk/keep")));
        assert!(!set.is_excluded(Path::new("/desk")));
    }

    #[test]
    fn test_membership_after_normalization() {
        let source = Path::new("/desk");
        let set = ExclusionSet::new(source, ["./sub/../keep.txt"]);

        assert!(set.is_excluded(Path::new("/desk/keep.txt")));
        assert!(set.is_excluded(Path::new("/desk/./keep.txt")));
        assert!(set.is_excluded(Path::new("/desk/other/../keep.txt")));
    }

    #[test]
    fn test_absolute_entries_are_kept() {
        let set = ExclusionSet::new(Path::new("/desk"), ["/elsewhere/file.txt"]);
        assert!(set.is_excluded(Path::new("/elsewhere/file.txt")));
        assert!(!set.is_excluded(Path::new("/desk/file.txt")));
    }

    #[test]
    fn test_relative_source_matches_absolute_entries() {
        let cwd = std::env::current_dir().expect("Failed to read current directory");
        let absolute_entry = cwd.join("desk").join("keep.pdf");
        let relative_entry = PathBuf::from("other.pdf");
        let set = ExclusionSet::new(Path::new("desk"), [&absolute_entry, &relative_entry]);

        assert!(set.is_excluded(&absolute_entry));
        assert!(set.is_excluded(Path::new("desk/keep.pdf")));
        assert!(set.is_excluded(Path::new("./desk/other.pdf")));
        assert!(set.is_excluded(&cwd.join("desk").join("other.pdf")));
        assert!(!set.is_excluded(Path::new("desk/move.pdf")));
    }

    #[test]
    fn test_absolutize_leaves_absolute_paths_alone() {
        let cwd = std::env::current_dir().expect("Failed to read current directory");
        assert_eq!(absolutize(&cwd), cwd);
        assert_eq!(absolutize(Path::new("x.txt")), cwd.join("x.txt"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dirs() {
        assert_eq!(normalize(Path::new("../a/./b/../c")), PathBuf::from("../a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_patterns_match_file_names() {
        let set = ExclusionSet::default().with_patterns(vec![
            Pattern::new("desktop.ini").unwrap(),
            Pattern::new(".*").unwrap(),
        ]);

        assert_eq!(
            set.matching_pattern("desktop.ini").map(Pattern::as_str),
            Some("desktop.ini")
        );
        assert_eq!(set.matching_pattern(".DS_Store").map(Pattern::as_str), Some(".*"));
        assert!(set.matching_pattern("photo.jpg").is_none());
    }

    #[test]
    fn test_patterns_do_not_affect_path_membership() {
        let source = Path::new("/d");
        let set = ExclusionSet::new(source, ["a.lnk"])
            .with_patterns(vec![Pattern::new("*.lnk").unwrap()]);

        assert!(set.is_excluded(Path::new("/d/a.lnk")));
        assert!(!set.is_excluded(Path::new("/d/b.lnk")));
        assert!(set.matching_pattern("b.lnk").is_some());
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Excluded.to_string(), "excluded path");
        assert_eq!(
            SkipReason::Ignored {
                pattern: "*.tmp".to_string()
            }
            .to_string(),
            "matches ignore pattern '*.tmp'"
        );
    }
}
