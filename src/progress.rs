//! Progress reporting utilities using indicatif.
//!
//! [`Progress`] implements [`ProgressCallback`] with one spinner per phase on
//! stderr. The finder reports two phases: `ingest`, which counts lines read,
//! and `grouping`, whose message shows the current fixpoint pass.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for the analysis phases.
///
/// Implement this trait to receive progress updates from
/// [`DuplicateFinder`](crate::duplicates::DuplicateFinder).
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("ingest", "grouping")
    /// * `total` - Number of items to process, 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called periodically while items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far
    /// * `source` - Listing or item being processed
    fn on_progress(&self, current: usize, source: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Spinner-based progress reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// With `quiet` set every callback is a no-op.
    ///
    /// ```
    /// use finddup::progress::{Progress, ProgressCallback};
    ///
    /// let progress = Progress::new(true);
    /// progress.on_phase_start("ingest", 0);
    /// progress.on_phase_end("ingest");
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if self.quiet {
            return;
        }
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.set_style(Self::style());
        bar.set_prefix(phase_label(phase).to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(bar) {
                old.finish_and_clear();
            }
        }
    }

    fn on_progress(&self, current: usize, source: &str) {
        self.with_bar(|bar| {
            bar.set_position(current as u64);
            bar.set_message(format!("{current} lines from {}", truncate_source(source, 40)));
        });
    }

    fn on_phase_end(&self, _phase: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn on_message(&self, message: &str) {
        self.with_bar(|bar| bar.set_message(message.to_string()));
    }
}

fn phase_label(phase: &str) -> &str {
    match phase {
        "ingest" => "Reading listings",
        "grouping" => "Grouping directories",
        other => other,
    }
}

/// Keep the tail of a long source name.
fn truncate_source(source: &str, max_chars: usize) -> String {
    let count = source.chars().count();
    if count <= max_chars {
        return source.to_string();
    }
    let tail: String = source.chars().skip(count - (max_chars - 3)).collect();
    format!("...{tail}")
}
