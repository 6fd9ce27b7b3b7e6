//! Extension-based file categories for desktop organization.
//!
//! A [`CategoryTable`] holds the declared categories in a fixed order plus one
//! fallback category that catches everything the others do not recognize.
//!
//! # Examples
//!
//! ```
//! use deskclean::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.category_for("pdf").name(), "Documents");
//! assert_eq!(table.category_for(".PNG").name(), "Images");
//! assert_eq!(table.category_for("").name(), "Miscellaneous");
//! ```

use std::collections::HashSet;
use thiserror::Error;

/// Name of the catch-all category in the reference table.
pub const DEFAULT_FALLBACK: &str = "Miscellaneous";

/// The reference table, in declaration order.
const REFERENCE_TABLE: &[(&str, &[&str])] = &[
    ("Documents", &["pdf", "docx", "txt", "rtf"]),
    ("Images", &["jpg", "jpeg", "png", "gif", "webp"]),
    ("Videos", &["mp4", "mov", "avi", "mkv"]),
    ("Apps", &["exe", "msi", "lnk"]),
    ("Sheets", &["xls", "xlsx", "csv", "xml"]),
    ("Sounds", &["mp3", "wav", "ogg", "flac"]),
    ("Scripts", &["py", "js", "sh", "bat"]),
    ("Models", &["fbx", "obj", "blend", "stl"]),
    ("Archives", &["zip", "rar", "7z", "tar", "gz"]),
];

/// Errors raised while building a category table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("category name '{0}' is not a valid directory name")]
    InvalidName(String),
    #[error("category '{0}' is declared more than once")]
    DuplicateName(String),
    #[error("category '{0}' clashes with the fallback category name")]
    FallbackClash(String),
    #[error("category '{0}' declares no extensions and could never match")]
    NoExtensions(String),
    #[error("category '{0}' declares an empty extension")]
    EmptyExtension(String),
}

/// A named bucket of extensions sharing one destination subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Creates a category; extensions are stored lowercase without a leading dot.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the directory name for this category.
    ///
    /// Directory names are identical to category names.
    pub fn dir_name(&self) -> &str {
        &self.name
    }

    /// Returns true if the (already normalized) extension belongs to this category.
    pub fn recognizes(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Returns the extensions sorted, for display and serialization.
    pub fn sorted_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Ordered mapping from extensions to categories with a fallback bucket.
///
/// Lookups scan the declared categories in order and return the first one
/// recognizing the extension, so an extension listed twice resolves to the
/// earlier declaration.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    fallback: Category,
}

impl CategoryTable {
    /// Builds a table from declared categories and the fallback name.
    ///
    /// # Errors
    ///
    /// Fails if a name is not a plain directory name, a name repeats, a
    /// declared category collides with the fallback, or a declared category
    /// has no (or an empty) extension.
    pub fn new(
        categories: Vec<Category>,
        fallback: impl Into<String>,
    ) -> Result<Self, CategoryError> {
        let fallback = fallback.into();
        if !is_plain_dir_name(&fallback) {
            return Err(CategoryError::InvalidName(fallback));
        }

        let mut seen = HashSet::new();
        for category in &categories {
            if !is_plain_dir_name(&category.name) {
                return Err(CategoryError::InvalidName(category.name.clone()));
            }
            if category.name == fallback {
                return Err(CategoryError::FallbackClash(category.name.clone()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(CategoryError::DuplicateName(category.name.clone()));
            }
            if category.is_empty() {
                return Err(CategoryError::NoExtensions(category.name.clone()));
            }
            if category.extensions.contains("") {
                return Err(CategoryError::EmptyExtension(category.name.clone()));
            }
        }

        Ok(Self {
            categories,
            fallback: Category::new(fallback, Vec::<String>::new()),
        })
    }

    /// Returns the category for an extension, or the fallback.
    ///
    /// The extension is lowercased and a single leading dot is dropped before
    /// lookup. An empty extension always resolves to the fallback.
    pub fn category_for(&self, extension: &str) -> &Category {
        let extension = normalize_extension(extension);
        if extension.is_empty() {
            return &self.fallback;
        }

        self.categories
            .iter()
            .find(|category| category.recognizes(&extension))
            .unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &Category {
        &self.fallback
    }

    /// Iterates every category in declaration order, fallback last.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().chain(std::iter::once(&self.fallback))
    }

    /// Directory names of every category in declaration order, fallback last.
    pub fn dir_names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(Category::dir_name)
    }

    /// The declared (non-fallback) categories.
    pub fn declared(&self) -> &[Category] {
        &self.categories
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            categories: REFERENCE_TABLE
                .iter()
                .map(|(name, exts)| Category::new(*name, exts.iter()))
                .collect(),
            fallback: Category::new(DEFAULT_FALLBACK, Vec::<String>::new()),
        }
    }
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.strip_prefix('.').unwrap_or(extension);
    trimmed.to_lowercase()
}

/// Returns true if `name` can be used as a single directory component.
pub fn is_plain_dir_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
