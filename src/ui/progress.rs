//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::batch::BatchProgress;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows on `start` in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }

    /// Clear the spinner without any message
    pub fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
    }
}

/// Progress display for batch lookups.
///
/// An indicatif bar in interactive mode, one line per item in CI, nothing
/// when `quiet` (machine-readable output on stdout).
pub struct BatchProgressBar {
    bar: Option<ProgressBar>,
    plain: bool,
}

impl BatchProgressBar {
    pub fn new(ctx: &UiContext, total: usize, quiet: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                plain: false,
            };
        }

        if !ctx.use_fancy_output() {
            println!("Looking up {} compound(s)...", total);
            return Self {
                bar: None,
                plain: true,
            };
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("  {spinner:.cyan} Looking up  {bar:24.cyan/dim} {pos}/{len} {msg:.dim}  {elapsed:.dim}")
        {
            bar.set_style(
                bar_style
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
        }
        bar.enable_steady_tick(std::time::Duration::from_millis(120));

        Self {
            bar: Some(bar),
            plain: false,
        }
    }

    /// Reflect a progress snapshot
    pub fn update(&self, progress: &BatchProgress) {
        let item = progress.current_item.as_deref().unwrap_or("");
        if let Some(ref bar) = self.bar {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.current as u64);
            bar.set_message(truncate(item, 40));
        } else if self.plain {
            println!(
                "  [{}/{}] {:>3}% {}",
                progress.current, progress.total, progress.percentage, item
            );
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}
