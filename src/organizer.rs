//! Run orchestration.
//!
//! An [`Organizer`] provisions the destination layout, snapshots the source
//! directory listing, and then walks the entries one at a time: excluded
//! entries are recorded as skipped, non-regular entries are passed over
//! silently, and every regular file is classified and handed to the mover.
//! A failed move is recorded and the walk continues.

use crate::classifier::Classifier;
use crate::config::{ConfigError, Settings};
use crate::exclusion::{self, ExclusionSet, SkipReason, TOOL_FILES};
use crate::file_organizer::{FileMover, MoveError};
use crate::layout::{DirectoryProvisioner, LayoutError};
use std::collections::BTreeMap;
use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Could not read directory {}: {source}", path.display())]
    ReadSource { path: PathBuf, source: io::Error },
}

/// What happened to one entry of the source directory.
#[derive(Debug)]
pub enum OutcomeKind {
    /// The file was moved.
    Moved {
        category: String,
        destination: PathBuf,
    },
    /// Dry run: the file would be moved here.
    Planned {
        category: String,
        destination: PathBuf,
    },
    /// The entry was left in place on purpose.
    Skipped(SkipReason),
    /// The move failed; the file stays where it was.
    Failed(MoveError),
}

/// Outcome for a single source entry.
#[derive(Debug)]
pub struct EntryOutcome {
    /// Path of the entry in the source directory.
    pub source: PathBuf,
    /// Bare file name, lossily converted for display.
    pub name: String,
    pub kind: OutcomeKind,
}

impl EntryOutcome {
    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            OutcomeKind::Moved { category, .. } | OutcomeKind::Planned { category, .. } => {
                Some(category.as_str())
            }
            _ => None,
        }
    }
}

/// Every outcome of a run, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl RunReport {
    pub fn moved(&self) -> usize {
        self.count(|kind| matches!(kind, OutcomeKind::Moved { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|kind| matches!(kind, OutcomeKind::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|kind| matches!(kind, OutcomeKind::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|kind| matches!(kind, OutcomeKind::Failed(_)))
    }

    /// Number of moved (or planned) files per category, sorted by name.
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for category in self.outcomes.iter().filter_map(EntryOutcome::category) {
            *counts.entry(category.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Looks up the outcome recorded for a file name.
    pub fn outcome_for(&self, name: &str) -> Option<&EntryOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    fn count(&self, predicate: impl Fn(&OutcomeKind) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| predicate(&outcome.kind))
            .count()
    }
}

/// Receives progress notifications while a run walks the source directory.
pub trait Reporter {
    /// Called once the listing is known, before the first entry.
    fn started(&mut self, _entries: usize) {}

    /// Called after each recorded outcome.
    fn outcome(&mut self, _outcome: &EntryOutcome) {}

    /// Called after every listed entry, recorded or not.
    fn advanced(&mut self) {}

    fn finished(&mut self, _report: &RunReport) {}
}

/// Reporter that ignores every notification.
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Organizes one source directory.
#[derive(Debug, Clone)]
pub struct Organizer {
    source_dir: PathBuf,
    destination_root: PathBuf,
    classifier: Classifier,
    exclusions: ExclusionSet,
}

impl Organizer {
    /// Builds an organizer from explicit parts.
    ///
    /// A relative `source_dir` is made absolute against the current directory
    /// so listed entries compare correctly with absolute exclusions.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        destination_name: &str,
        classifier: Classifier,
        exclusions: ExclusionSet,
    ) -> Self {
        let source_dir = exclusion::absolutize(&source_dir.into());
        Self {
            destination_root: source_dir.join(destination_name),
            source_dir,
            classifier,
            exclusions,
        }
    }

    /// Builds an organizer for `source_dir` with the reference table and
    /// exclusion list.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use deskclean::organizer::{Organizer, SilentReporter};
    ///
    /// let organizer = Organizer::with_defaults("/home/user/Desktop");
    /// let report = organizer.run(&mut SilentReporter).expect("fatal error");
    /// println!("{} moved, {} failed", report.moved(), report.failed());
    /// ```
    pub fn with_defaults(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = exclusion::absolutize(&source_dir.into());
        let exclusions = ExclusionSet::with_defaults(&source_dir);
        Self::new(
            source_dir,
            crate::config::DEFAULT_DESTINATION,
            Classifier::default(),
            exclusions,
        )
    }

    /// Builds an organizer from validated settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings do not validate.
    pub fn from_settings(
        source_dir: impl Into<PathBuf>,
        settings: &Settings,
    ) -> Result<Self, ConfigError> {
        let source_dir = exclusion::absolutize(&source_dir.into());
        let table = settings.category_table()?;
        let excluded = settings
            .exclude
            .paths
            .iter()
            .map(PathBuf::as_path)
            .chain(TOOL_FILES.iter().map(Path::new));
        let exclusions =
            ExclusionSet::new(&source_dir, excluded).with_patterns(settings.ignore_patterns()?);
        let destination = settings.destination_name()?;

        Ok(Self::new(
            source_dir,
            destination,
            Classifier::new(table),
            exclusions,
        ))
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    /// Provisions the layout and moves every eligible file.
    ///
    /// # Errors
    ///
    /// Fails only if the layout cannot be provisioned or the source cannot
    /// be listed. Per-file failures are recorded in the report.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<RunReport, OrganizeError> {
        tracing::info!(source = %self.source_dir.display(), "organizing");
        DirectoryProvisioner::ensure_layout(
            &self.destination_root,
            self.classifier.table().dir_names(),
        )?;
        self.walk(reporter, false)
    }

    /// Classifies every eligible file without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be listed.
    pub fn plan(&self, reporter: &mut dyn Reporter) -> Result<RunReport, OrganizeError> {
        tracing::info!(source = %self.source_dir.display(), "planning");
        self.walk(reporter, true)
    }

    fn walk(&self, reporter: &mut dyn Reporter, dry_run: bool) -> Result<RunReport, OrganizeError> {
        let entries = self.list_source()?;
        reporter.started(entries.len());

        let mut report = RunReport::default();
        for entry in entries {
            if let Some(outcome) = self.process(&entry, dry_run) {
                reporter.outcome(&outcome);
                report.outcomes.push(outcome);
            }
            reporter.advanced();
        }

        reporter.finished(&report);
        Ok(report)
    }

    /// Snapshots the listing so moves never race the directory iterator.
    fn list_source(&self) -> Result<Vec<DirEntry>, OrganizeError> {
        let read_error = |source| OrganizeError::ReadSource {
            path: self.source_dir.clone(),
            source,
        };

        fs::read_dir(&self.source_dir)
            .map_err(read_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)
    }

    fn process(&self, entry: &DirEntry, dry_run: bool) -> Option<EntryOutcome> {
        let source = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let kind = self.decide(entry, &source, &name, dry_run)?;
        Some(EntryOutcome { source, name, kind })
    }

    /// Returns `None` for entries that are skipped silently.
    fn decide(
        &self,
        entry: &DirEntry,
        source: &Path,
        name: &str,
        dry_run: bool,
    ) -> Option<OutcomeKind> {
        if self.exclusions.is_excluded(source) {
            return Some(OutcomeKind::Skipped(SkipReason::Excluded));
        }

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => return Some(OutcomeKind::Failed(MoveError::Inspect { source: e })),
        };
        if !file_type.is_file() {
            tracing::debug!(entry = name, "not a regular file, leaving in place");
            return None;
        }

        if let Some(pattern) = self.exclusions.matching_pattern(name) {
            return Some(OutcomeKind::Skipped(SkipReason::Ignored {
                pattern: pattern.as_str().to_string(),
            }));
        }

        let category = self.classifier.classify(name);
        let category_dir = self.destination_root.join(category.dir_name());
        let category = category.name().to_string();

        let kind = if dry_run {
            match FileMover::free_destination(&category_dir, &entry.file_name()) {
                Ok(destination) => OutcomeKind::Planned {
                    category,
                    destination,
                },
                Err(e) => OutcomeKind::Failed(e),
            }
        } else {
            match FileMover::move_into(source, &category_dir) {
                Ok(destination) => OutcomeKind::Moved {
                    category,
                    destination,
                },
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "move failed");
                    OutcomeKind::Failed(e)
                }
            }
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recording {
        started: Option<usize>,
        outcomes: usize,
        advanced: usize,
        finished: bool,
    }

    impl Reporter for Recording {
        fn started(&mut self, entries: usize) {
            self.started = Some(entries);
        }

        fn outcome(&mut self, _outcome: &EntryOutcome) {
            self.outcomes += 1;
        }

        fn advanced(&mut self) {
            self.advanced += 1;
        }

        fn finished(&mut self, _report: &RunReport) {
            self.finished = true;
        }
    }

    #[test]
    fn test_run_reports_progress_for_every_entry() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(temp_dir.path().join("folder")).unwrap();

        let organizer = Organizer::with_defaults(temp_dir.path());
        let mut reporter = Recording::default();
        let report = organizer.run(&mut reporter).expect("run failed");

        // a.txt, folder/, and the freshly created destination root
        assert_eq!(reporter.started, Some(3));
        assert_eq!(reporter.advanced, 3);
        assert_eq!(reporter.outcomes, 1);
        assert!(reporter.finished);
        assert_eq!(report.moved(), 1);
    }

    #[test]
    fn test_run_on_missing_source_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let organizer = Organizer::with_defaults(temp_dir.path().join("absent"));

        let result = organizer.run(&mut SilentReporter);
        assert!(matches!(result, Err(OrganizeError::Layout(_))));
    }

    #[test]
    fn test_plan_on_missing_source_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let organizer = Organizer::with_defaults(temp_dir.path().join("absent"));

        let result = organizer.plan(&mut SilentReporter);
        assert!(matches!(result, Err(OrganizeError::ReadSource { .. })));
    }

    #[test]
    fn test_plan_does_not_touch_filesystem() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("song.mp3"), "x").unwrap();

        let organizer = Organizer::with_defaults(temp_dir.path());
        let report = organizer.plan(&mut SilentReporter).expect("plan failed");

        assert_eq!(report.planned(), 1);
        assert!(temp_dir.path().join("song.mp3").exists());
        assert!(!organizer.destination_root().exists());
        let outcome = report.outcome_for("song.mp3").unwrap();
        assert_eq!(outcome.category(), Some("Sounds"));
    }

    #[test]
    fn test_relative_source_is_made_absolute() {
        let organizer = Organizer::from_settings("desk", &Settings::default()).unwrap();
        let cwd = std::env::current_dir().expect("Failed to read current directory");

        assert_eq!(organizer.source_dir(), cwd.join("desk"));
        assert_eq!(
            organizer.destination_root(),
            cwd.join("desk").join("Organized Desktop")
        );
    }

    #[test]
    fn test_local_config_file_is_never_moved() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join(".deskcleanrc.toml"), "fallback = \"Other\"").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

        let mut settings = Settings::default();
        settings.exclude.paths.clear();
        let report = Organizer::from_settings(temp_dir.path(), &settings)
            .unwrap()
            .run(&mut SilentReporter)
            .expect("run failed");

        assert!(temp_dir.path().join(".deskcleanrc.toml").is_file());
        let outcome = report.outcome_for(".deskcleanrc.toml").unwrap();
        assert!(matches!(outcome.kind, OutcomeKind::Skipped(SkipReason::Excluded)));
        assert_eq!(report.moved(), 1);
    }

    #[test]
    fn test_category_counts_are_sorted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["b.png", "a.png", "c.zip", "d"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }

        let report = Organizer::with_defaults(temp_dir.path())
            .run(&mut SilentReporter)
            .expect("run failed");

        let counts: Vec<(String, usize)> = report.category_counts().into_iter().collect();
        assert_eq!(
            counts,
            vec![
                ("Archives".to_string(), 1),
                ("Images".to_string(), 2),
                ("Miscellaneous".to_string(), 1),
            ]
        );
    }
}
