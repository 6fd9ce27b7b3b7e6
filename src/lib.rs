//! deskclean - sweep a cluttered desktop into category folders
//!
//! This library classifies files by extension, provisions the destination
//! layout, moves files without ever overwriting, and skips a fixed exclusion
//! list. Behavior can be tuned through a TOML configuration file.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod desktop;
pub mod exclusion;
pub mod file_category;
pub mod file_organizer;
pub mod layout;
pub mod organizer;
pub mod output;

pub use classifier::Classifier;
pub use config::{ConfigError, Settings};
pub use exclusion::{ExclusionSet, SkipReason};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{FileMover, MoveError, MoveOutcome};
pub use layout::{DirectoryProvisioner, LayoutError};
pub use organizer::{EntryOutcome, OrganizeError, Organizer, OutcomeKind, RunReport};

pub use cli::{Cli, RunOptions, run_cli};
