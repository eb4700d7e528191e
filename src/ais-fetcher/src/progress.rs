use indicatif::{ProgressBar, ProgressStyle};
use kystdata_core::{FetchWindow, ProgressReporter};
use tracing::error;

/// Terminal progress bar, one tick per fetched window.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// A bar that draws nothing, for non-interactive runs.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} windows {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        Self {
            bar: bar.with_style(style),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for IndicatifProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn start(&self, total_windows: u64, message: &str) {
        self.bar.set_length(total_windows);
        self.bar.set_position(0);
        self.bar.set_message(message.to_string());
    }

    fn window_done(&self, window: &FetchWindow, num_positions: usize) {
        self.bar.inc(1);
        self.bar
            .set_message(format!("{num_positions} positions until {}", window.end));
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    fn report_error(&self, message: &str) {
        self.bar.suspend(|| error!("{message}"));
        self.bar.abandon_with_message(message.to_string());
    }
}
