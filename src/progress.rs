// Progress bars for the long-running converters

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Minimum time between two refreshes of the "latest record" message.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Wraps an indicatif bar and owns the throttle state for its message.
///
/// The position is updated on every call, but the message (usually a preview of the latest
/// record) is only rebuilt once per `REFRESH_INTERVAL`.
pub struct ProgressReporter {
    bar: ProgressBar,
    interval: Duration,
    last_update: Option<Instant>,
}

impl ProgressReporter {
    /// Bar counting records.
    pub fn records(label: &str, total: u64) -> Self {
        let template = format!(
            "{label}: [{{elapsed_precise}} / {{eta_precise}}] {{bar:40.cyan/blue}} {{pos:>7}}/{{len:7}} {{per_sec}} {{msg}}"
        );
        Self::with_template(&template, total)
    }

    /// Bar counting bytes of the input file.
    pub fn bytes(label: &str, total: u64) -> Self {
        let template = format!(
            "{label}: [{{elapsed_precise}} / {{eta_precise}}] {{bar:40.cyan/blue}} {{bytes:>9}}/{{total_bytes:9}} {{percent:>3}}% {{msg}}"
        );
        Self::with_template(&template, total)
    }

    /// A reporter that draws nothing, for tests and quiet runs.
    pub fn hidden(total: u64) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            interval: REFRESH_INTERVAL,
            last_update: None,
        }
        .with_length(total)
    }

    fn with_template(template: &str, total: u64) -> Self {
        let style = ProgressStyle::with_template(template).expect("Invalid progress style");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self {
            bar,
            interval: REFRESH_INTERVAL,
            last_update: None,
        }
    }

    fn with_length(self, total: u64) -> Self {
        self.bar.set_length(total);
        self
    }

    /// Returns true when enough time has passed since the last message refresh and records
    /// `now` as the new refresh time.
    pub fn should_refresh(&mut self, now: Instant) -> bool {
        match self.last_update {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_update = Some(now);
                true
            }
        }
    }

    /// Moves the bar to `position`; `message` is only evaluated when a refresh is due.
    pub fn update<F>(&mut self, position: u64, message: F)
    where
        F: FnOnce() -> Option<String>,
    {
        self.bar.set_position(position);
        if self.should_refresh(Instant::now()) {
            if let Some(msg) = message() {
                self.bar.set_message(msg);
            }
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(self) {
        self.bar.finish();
    }
}
