//! Destination directory provisioning.
//!
//! Creates the destination root and one subdirectory per category before any
//! file is moved. Directories that already exist are left exactly as they are.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort provisioning.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateFailed { path: PathBuf, source: io::Error },
    /// Something other than a directory occupies a destination path.
    #[error("{} exists but is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

/// Ensures the destination layout exists.
pub struct DirectoryProvisioner;

impl DirectoryProvisioner {
    /// Creates `root` and `root/<name>` for every category name, as needed.
    ///
    /// Idempotent: running it on an already provisioned layout does nothing.
    /// The parent of `root` must already exist.
    ///
    /// # Errors
    ///
    /// Returns the first failure; directories created before it remain.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use deskclean::layout::DirectoryProvisioner;
    /// use std::path::Path;
    ///
    /// DirectoryProvisioner::ensure_layout(
    ///     Path::new("/home/user/Desktop/Organized Desktop"),
    ///     ["Documents", "Images", "Miscellaneous"],
    /// )
    /// .expect("layout");
    /// ```
    pub fn ensure_layout<'a, I>(root: &Path, category_dirs: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::ensure_dir(root)?;
        for name in category_dirs {
            Self::ensure_dir(&root.join(name))?;
        }
        Ok(())
    }

    /// Creates a single directory unless a directory already sits there.
    fn ensure_dir(path: &Path) -> Result<(), LayoutError> {
        match fs::create_dir(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "created directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if path.is_dir() {
                    Ok(())
                } else {
                    Err(LayoutError::NotADirectory {
                        path: path.to_path_buf(),
                    })
                }
            }
            Err(e) => Err(LayoutError::CreateFailed {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}
