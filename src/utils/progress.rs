use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner that follows the pipeline through its stages. Silent reporters
/// draw nothing, which keeps `--json` output and tests clean.
pub struct ProgressReporter {
    spinner: Option<ProgressBar>,
    stages: usize,
}

impl ProgressReporter {
    /// A spinner whose messages are prefixed with `[n/stages]`.
    pub fn for_stages(message: &str, stages: usize, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));

        Self {
            spinner: Some(spinner),
            stages,
        }
    }

    pub fn silent() -> Self {
        Self {
            spinner: None,
            stages: 0,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.spinner.is_none()
    }

    /// Move to stage `step` (1-based).
    pub fn stage(&self, step: usize, message: &str) {
        if self.stages == 0 {
            self.set_message(message);
        } else {
            self.set_message(&format!("[{}/{}] {}", step, self.stages, message));
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(spinner) = &self.spinner {
            if !spinner.is_finished() {
                spinner.finish_and_clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_ignores_updates() {
        let progress = ProgressReporter::for_stages("starting", 3, true);
        assert!(progress.is_silent());
        progress.stage(1, "reading");
        progress.finish_with_message("done");
    }
}
