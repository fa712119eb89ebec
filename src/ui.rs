//! Terminal output — spinners and colored summaries.
//!
//! Uses `indicatif` for progress spinners and `console` for styling. A
//! [`WaitProgress`] accompanies a readiness-poll session and the demo run
//! on the terminal; structured diagnostics go through `tracing` instead.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::memory::JournalEntry;
use crate::poller::PollOutcome;

/// Visual progress indicator for a ledger waiting to become ACTIVE.
pub struct WaitProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl WaitProgress {
    /// Start the spinner for the named ledger.
    pub fn start(ledger: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Waiting for ledger {ledger} to become ACTIVE..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Stop the spinner and print the polling outcome.
    pub fn complete(&self, outcome: &PollOutcome) {
        self.pb.finish_and_clear();
        if outcome.timed_out {
            println!(
                "  {} Ledger still {} after {} attempts",
                self.red.apply_to("✗"),
                outcome.final_state,
                outcome.attempts_used
            );
        } else {
            println!(
                "  {} Ledger {} after {} {}",
                self.green.apply_to("✓"),
                outcome.final_state,
                outcome.attempts_used,
                if outcome.attempts_used == 1 {
                    "attempt"
                } else {
                    "attempts"
                }
            );
        }
    }

    /// Print the committed journal entries as pretty JSON.
    pub fn print_journal(&self, entries: &[JournalEntry]) {
        println!();
        println!("{}", self.yellow.apply_to("─── Committed journal ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(entries).unwrap_or_default()
        );
    }
}
