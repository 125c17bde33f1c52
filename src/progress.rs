use std::time::Duration;

use indicatif::{ProgressBar,ProgressStyle};

/// Terminal progress bar that is a no-op when disabled, so callers never need to branch.
/// Safe to tick from every worker thread at once.
pub struct CLProgressBar {
    pb: Option<ProgressBar>
}

impl CLProgressBar {
    pub fn new(work: u64, label: &str, enabled: bool) -> Self {
        let pb = if enabled {
            let pb = ProgressBar::new(work);
            let style = ProgressStyle::default_bar()
                .template("[{msg}] {wide_bar} ({per_sec}) {pos:>7}/{len:7} - Elapsed: {elapsed_precise}, Remaining: {eta_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_bar());

            pb.set_style(style);
            pb.set_message(label.to_string());

            // Update in separate thread
            pb.enable_steady_tick(Duration::from_millis(200));
            Some(pb)
        } else {
            None
        };

        CLProgressBar { pb }
    }

    pub fn inc(&self, amt: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(amt);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish();
        }
    }
}

#[cfg(test)]
mod progress_tests {
    use super::*;

    #[test]
    fn test_disabled_is_noop() {
        let pb = CLProgressBar::new(10, "noop", false);
        pb.inc(3);
        pb.finish();
        assert!(pb.pb.is_none());
    }

    #[test]
    fn test_enabled_counts() {
        let pb = CLProgressBar::new(10, "count", true);
        pb.inc(3);
        pb.inc(2);
        assert_eq!(pb.pb.as_ref().map(|p| p.position()), Some(5));
        pb.finish();
    }
}
