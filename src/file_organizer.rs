//! Moving single files into category directories.
//!
//! The mover never overwrites: when the destination name is taken it picks
//! the first free `name (n).ext`. The file is hard-linked into place and the
//! original link removed, which fails instead of replacing anything that
//! appeared at the destination in the meantime. Where a link is impossible
//! (another filesystem, or one without hard links) the file is copied into a
//! freshly created target and the source removed afterwards.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on counter suffixes tried when resolving a name collision.
pub const MAX_COLLISION_SUFFIX: u32 = 9999;

/// How often a destination name is re-resolved after losing it to a
/// concurrent writer.
const PLACEMENT_ATTEMPTS: usize = 3;

/// Why a single file could not be moved.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("{} has no file name", path.display())]
    NoFileName { path: PathBuf },
    #[error("could not inspect entry: {source}")]
    Inspect { source: io::Error },
    #[error("no free destination name for {name} in {}", dir.display())]
    NoFreeName { name: String, dir: PathBuf },
    #[error("linking to {} failed: {source}", destination.display())]
    Link {
        destination: PathBuf,
        source: io::Error,
    },
    #[error("copy to {} failed: {source}", destination.display())]
    Copy {
        destination: PathBuf,
        source: io::Error,
    },
    #[error("copied, but the original could not be removed: {source}")]
    RemoveSource { source: io::Error },
}

/// Result of relocating one file: the final destination on success.
pub type MoveOutcome = Result<PathBuf, MoveError>;

/// Relocates files into destination directories.
pub struct FileMover;

impl FileMover {
    /// Moves `source` into `destination_dir`, keeping its base name unless
    /// that name is already taken.
    ///
    /// Returns the path the file ended up at.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use deskclean::file_organizer::FileMover;
    /// use std::path::Path;
    ///
    /// match FileMover::move_into(
    ///     Path::new("/home/user/Desktop/photo.jpg"),
    ///     Path::new("/home/user/Desktop/Organized Desktop/Images"),
    /// ) {
    ///     Ok(dest) => println!("Moved to {}", dest.display()),
    ///     Err(e) => eprintln!("Could not move: {}", e),
    /// }
    /// ```
    pub fn move_into(source: &Path, destination_dir: &Path) -> MoveOutcome {
        let file_name = source.file_name().ok_or_else(|| MoveError::NoFileName {
            path: source.to_path_buf(),
        })?;

        for _ in 0..PLACEMENT_ATTEMPTS {
            let destination = Self::free_destination(destination_dir, file_name)?;

            match fs::hard_link(source, &destination) {
                Ok(()) => {
                    release_source(source, &destination)?;
                    return Ok(destination);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(
                        dest = %destination.display(),
                        "destination appeared concurrently, picking another name"
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Err(MoveError::Link {
                        destination,
                        source: e,
                    });
                }
                Err(e) => {
                    tracing::info!(
                        src = %source.display(),
                        dest = %destination.display(),
                        error = %e,
                        "cannot link, falling back to copy"
                    );
                    copy_then_remove(source, &destination)?;
                    return Ok(destination);
                }
            }
        }

        Err(MoveError::NoFreeName {
            name: file_name.to_string_lossy().into_owned(),
            dir: destination_dir.to_path_buf(),
        })
    }

    /// Returns `destination_dir/file_name`, or the first free counter-suffixed
    /// variant when something already occupies that path.
    pub fn free_destination(
        destination_dir: &Path,
        file_name: &OsStr,
    ) -> Result<PathBuf, MoveError> {
        let candidate = destination_dir.join(file_name);
        if !is_occupied(&candidate) {
            return Ok(candidate);
        }

        for counter in 1..=MAX_COLLISION_SUFFIX {
            let candidate = destination_dir.join(suffixed_name(file_name, counter));
            if !is_occupied(&candidate) {
                tracing::debug!(
                    name = %file_name.to_string_lossy(),
                    renamed = %candidate.display(),
                    "destination taken, using suffixed name"
                );
                return Ok(candidate);
            }
        }

        Err(MoveError::NoFreeName {
            name: file_name.to_string_lossy().into_owned(),
            dir: destination_dir.to_path_buf(),
        })
    }
}

/// Builds `stem (n).ext`, or `name (n)` when there is no extension.
fn suffixed_name(file_name: &OsStr, counter: u32) -> OsString {
    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().unwrap_or(file_name);

    let mut name = stem.to_os_string();
    name.push(format!(" ({})", counter));
    if let Some(extension) = as_path.extension() {
        name.push(".");
        name.push(extension);
    }
    name
}

/// Dangling symlinks count as occupied.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copies `source` into a newly created `destination`, then deletes `source`.
///
/// The target is opened with create-new semantics so an existing file is
/// never clobbered. On any failure after the target was created, the partial
/// copy is removed and the source is left in place.
fn copy_then_remove(source: &Path, destination: &Path) -> Result<(), MoveError> {
    let copy_error = |e: io::Error| MoveError::Copy {
        destination: destination.to_path_buf(),
        source: e,
    };

    let mut reader = File::open(source).map_err(copy_error)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(copy_error)?;

    let copied = io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.sync_all())
        .and_then(|_| reader.metadata())
        .and_then(|meta| fs::set_permissions(destination, meta.permissions()));
    drop(writer);

    if let Err(e) = copied {
        let _ = fs::remove_file(destination);
        return Err(copy_error(e));
    }

    drop(reader);
    release_source(source, destination)
}

/// Deletes `source` once `destination` holds the file. If that fails,
/// `destination` is deleted instead so the file exists exactly once.
fn release_source(source: &Path, destination: &Path) -> Result<(), MoveError> {
    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(MoveError::RemoveSource { source: e });
    }
    Ok(())
}
