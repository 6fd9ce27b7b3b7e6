//! Default source directory resolution.
//!
//! On Windows the desktop is `%USERPROFILE%\Desktop`; everywhere else it is
//! `$HOME/Desktop`. The organizer itself never calls this; only the CLI does
//! when no directory is given.

use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;

const DESKTOP_SEGMENT: &str = "Desktop";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DesktopError {
    #[error("USERPROFILE is not set; pass the directory to organize explicitly")]
    NoUserProfile,
    #[error("could not determine the home directory; pass the directory to organize explicitly")]
    NoHome,
}

/// Resolves the current user's desktop directory.
pub fn desktop_dir() -> Result<PathBuf, DesktopError> {
    resolve(
        cfg!(windows),
        std::env::var_os("USERPROFILE"),
        dirs::home_dir(),
    )
}

fn resolve(
    windows: bool,
    user_profile: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, DesktopError> {
    let root = if windows {
        user_profile
            .filter(|profile| !profile.is_empty())
            .map(PathBuf::from)
            .ok_or(DesktopError::NoUserProfile)?
    } else {
        home.ok_or(DesktopError::NoHome)?
    };
    Ok(root.join(DESKTOP_SEGMENT))
}
