//! File name classification.
//!
//! The classifier only looks at names: the extension is whatever follows the
//! last `.` that is not the leading dot of a hidden file, and it is matched
//! case-insensitively against a [`CategoryTable`].

use crate::file_category::{Category, CategoryTable};

/// Returns the extension of a file name: the text after the last `.`, or an
/// empty string when the name has no dot. A single leading dot marks a hidden
/// file and never starts an extension, so `.py` has none.
///
/// # Examples
///
/// ```
/// use deskclean::classifier::extension_of;
///
/// assert_eq!(extension_of("report.PDF"), "PDF");
/// assert_eq!(extension_of("backup.tar.gz"), "gz");
/// assert_eq!(extension_of("noext"), "");
/// assert_eq!(extension_of(".bashrc"), "");
/// ```
pub fn extension_of(file_name: &str) -> &str {
    let name = file_name.strip_prefix('.').unwrap_or(file_name);
    name.rsplit_once('.').map(|(_, extension)| extension).unwrap_or("")
}

/// Maps file names to categories.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: CategoryTable,
}

impl Classifier {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    /// Returns the category a file with this name belongs to.
    ///
    /// Names without an extension, or with an unrecognized one, resolve to
    /// the table's fallback category.
    pub fn classify(&self, file_name: &str) -> &Category {
        let category = self.table.category_for(extension_of(file_name));
        tracing::debug!(file = file_name, category = category.name(), "classified");
        category
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }
}
