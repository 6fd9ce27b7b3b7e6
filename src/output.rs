//! Output formatting and styling module.
//!
//! Every user-facing line goes through [`OutputFormatter`], so the per-file
//! messages, the progress bar and the closing summary share one look.

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars and summary tables
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deskclean::output::OutputFormatter;
    /// OutputFormatter::success("Moved file report.pdf to Documents");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deskclean::output::OutputFormatter;
    /// OutputFormatter::error("Could not move file report.pdf: permission denied");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deskclean::output::OutputFormatter;
    /// OutputFormatter::warning("Skipping file: Clean Desktop.lnk (excluded path)");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deskclean::output::OutputFormatter;
    /// OutputFormatter::info("Organizing contents of: /home/user/Desktop");
    /// ```
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a message prefixed with `[DRY RUN]` in yellow.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for the source directory walk.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of listed entries
    /// * `visible` - If false, the bar is hidden and draws nothing
    ///
    /// # Returns
    ///
    /// A configured `ProgressBar` ready for use.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deskclean::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(12, true);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
        if !visible {
            return ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
        }

        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints a table of file counts per category followed by a total.
    ///
    /// # Arguments
    ///
    /// * `category_counts` - Category names mapped to file counts, in name order
    /// * `total_files` - Total number of files moved (or planned)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deskclean::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 15);
    /// counts.insert("Images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
