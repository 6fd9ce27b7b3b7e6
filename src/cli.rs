//! Command-line interface module for deskclean.
//!
//! This module handles:
//! - Argument parsing
//! - Configuration loading
//! - Desktop resolution when no directory is given
//! - Console reporting of each file's outcome

use crate::config::Settings;
use crate::desktop;
use crate::exclusion;
use crate::organizer::{EntryOutcome, Organizer, OutcomeKind, Reporter, RunReport};
use crate::output::OutputFormatter;
use anyhow::Context;
use clap::{ArgAction, Parser};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// Sweep the files on your desktop into per-category folders.
#[derive(Debug, Parser)]
#[command(name = "deskclean", version, about)]
pub struct Cli {
    /// Directory to organize (defaults to your desktop)
    pub source: Option<PathBuf>,

    /// Show where files would go without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Options controlling a single organize run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// If true, classify only; nothing is created or moved.
    pub dry_run: bool,
    /// If true, draw a progress bar.
    pub progress: bool,
}

/// Runs the CLI application.
///
/// # Errors
///
/// Returns an error for fatal conditions only: bad configuration, an
/// unresolvable desktop, a destination that cannot be provisioned, or a
/// source directory that cannot be listed.
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Error loading configuration")?;

    if cli.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    // An explicit config file may live on the desktop it configures.
    if let Some(config) = &cli.config {
        settings.exclude.paths.push(exclusion::absolutize(config));
    }

    let source = match &cli.source {
        Some(path) => path.clone(),
        None => desktop::desktop_dir()?,
    };

    let options = RunOptions {
        dry_run: cli.dry_run,
        progress: !cli.no_progress,
    };

    organize(&source, &settings, options)?;
    Ok(())
}

/// Organizes `source` with the given settings, printing every outcome.
///
/// # Examples
///
/// ```no_run
/// use deskclean::cli::{organize, RunOptions};
/// use deskclean::config::Settings;
/// use std::path::Path;
///
/// let report = organize(
///     Path::new("/home/user/Desktop"),
///     &Settings::default(),
///     RunOptions::default(),
/// )
/// .expect("fatal error");
/// println!("{} files moved", report.moved());
/// ```
pub fn organize(
    source: &Path,
    settings: &Settings,
    options: RunOptions,
) -> anyhow::Result<RunReport> {
    let organizer =
        Organizer::from_settings(source, settings).context("Error compiling configuration")?;
    let mut reporter = ConsoleReporter::new(options);

    let result = if options.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "Analyzing contents of: {}",
            organizer.source_dir().display()
        ));
        organizer.plan(&mut reporter)
    } else {
        OutputFormatter::info(&format!(
            "Organizing contents of: {}",
            organizer.source_dir().display()
        ));
        organizer.run(&mut reporter)
    };

    result.with_context(|| format!("Could not organize {}", source.display()))
}

/// Prints outcomes as they arrive and drives the progress bar.
struct ConsoleReporter {
    options: RunOptions,
    progress: Option<ProgressBar>,
}

impl ConsoleReporter {
    fn new(options: RunOptions) -> Self {
        Self {
            options,
            progress: None,
        }
    }

    fn print(&self, line: impl FnOnce()) {
        match &self.progress {
            Some(pb) => pb.suspend(line),
            None => line(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn started(&mut self, entries: usize) {
        self.progress = Some(OutputFormatter::create_progress_bar(
            entries as u64,
            self.options.progress,
        ));
    }

    fn outcome(&mut self, outcome: &EntryOutcome) {
        self.print(|| print_outcome(outcome));
    }

    fn advanced(&mut self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    fn finished(&mut self, report: &RunReport) {
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }

        if self.options.dry_run {
            if report.planned() == 0 {
                OutputFormatter::plain("No files found to organize.");
            } else {
                OutputFormatter::summary_table(&report.category_counts(), report.planned());
            }
            OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
            return;
        }

        if report.moved() > 0 {
            OutputFormatter::summary_table(&report.category_counts(), report.moved());
        } else {
            OutputFormatter::plain("No files were moved.");
        }

        if report.failed() > 0 {
            OutputFormatter::warning(&format!(
                "{} file(s) could not be organized. Please review errors above.",
                report.failed()
            ));
        }
    }
}

fn print_outcome(outcome: &EntryOutcome) {
    match &outcome.kind {
        OutcomeKind::Moved {
            category,
            destination,
        } => {
            let message = match renamed_to(outcome, destination) {
                Some(new_name) => format!(
                    "Moved file {} to {} as {}",
                    outcome.name, category, new_name
                ),
                None => format!("Moved file {} to {}", outcome.name, category),
            };
            OutputFormatter::success(&message);
        }
        OutcomeKind::Planned {
            category,
            destination,
        } => {
            let message = match renamed_to(outcome, destination) {
                Some(new_name) => format!(
                    " - {} → would move to {}/ as {}",
                    outcome.name, category, new_name
                ),
                None => format!(" - {} → would move to {}/", outcome.name, category),
            };
            OutputFormatter::plain(&message);
        }
        OutcomeKind::Skipped(reason) => {
            OutputFormatter::warning(&format!(
                "Skipping file: {} ({})",
                outcome.source.display(),
                reason
            ));
        }
        OutcomeKind::Failed(error) => {
            OutputFormatter::error(&format!("Could not move file {}: {}", outcome.name, error));
        }
    }
}

/// The new file name if the destination differs from the original name.
fn renamed_to(outcome: &EntryOutcome, destination: &Path) -> Option<String> {
    let new_name = destination.file_name()?.to_string_lossy();
    (new_name != outcome.name).then(|| new_name.into_owned())
}
