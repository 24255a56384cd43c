//! Scoped wall-clock measurement for the pipeline phases.

use std::time::{Duration, Instant};

/// Runs `work` and returns its result together with the elapsed time.
pub fn timed<T, F>(work: F) -> (T, Duration)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = work();
    (result, start.elapsed())
}

/// Measures from construction until [`Stopwatch::finish`], or until drop if
/// the run bails out early. The line is printed exactly once either way.
#[derive(Debug)]
pub struct Stopwatch {
    label: String,
    start: Instant,
    reported: bool,
}

impl Stopwatch {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
            reported: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(mut self) -> Duration {
        let elapsed = self.elapsed();
        self.report(elapsed);
        elapsed
    }

    fn report(&mut self, elapsed: Duration) {
        if !self.reported {
            println!(
                "Total time taken by {}: {} seconds",
                self.label,
                format_seconds(elapsed)
            );
            self.reported = true;
        }
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        self.report(elapsed);
    }
}

pub fn format_seconds(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64())
}

pub fn print_phase(label: &str, elapsed: Duration) {
    println!("Time taken to {label}: {} seconds", format_seconds(elapsed));
}
