use std::io::Write;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::planner::constants::PROGRESS_BAR_WIDTH;

/// Receives elapsed-time reports while a solve runs.
pub trait ProgressSink: Send {
    fn update(&mut self, elapsed: Duration, limit: Duration);
    fn finish(&mut self, elapsed: Duration);
}

/// Discards every report.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn update(&mut self, _elapsed: Duration, _limit: Duration) {}
    fn finish(&mut self, _elapsed: Duration) {}
}

/// Redraws a single-line bar on stderr.
#[derive(Debug, Default)]
pub struct StderrBar;

impl ProgressSink for StderrBar {
    fn update(&mut self, elapsed: Duration, limit: Duration) {
        let fraction = if limit.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / limit.as_secs_f64()
        };
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\rSolving {} {:>6.1}s / {:.0}s",
            render_bar(fraction, PROGRESS_BAR_WIDTH),
            elapsed.as_secs_f64(),
            limit.as_secs_f64()
        );
        let _ = err.flush();
    }

    fn finish(&mut self, elapsed: Duration) {
        let _ = writeln!(
            std::io::stderr().lock(),
            "\rSolve finished in {:.1}s{}",
            elapsed.as_secs_f64(),
            " ".repeat(PROGRESS_BAR_WIDTH)
        );
    }
}

/// `[####----] 50.0%`, clamped to 100%.
pub fn render_bar(fraction: f64, width: usize) -> String {
    let fraction = fraction.clamp(0.0, 1.0);
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {:>5.1}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0
    )
}

/// Run `work` on the calling thread while a scoped observer thread reports
/// elapsed time to `sink` every `poll`.
///
/// The observer is stopped through a channel and joined before the result of
/// `work` is returned, so no report can arrive after this call.
pub fn observe<T, S, F>(limit: Duration, poll: Duration, sink: &mut S, work: F) -> T
where
    S: ProgressSink,
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    thread::scope(|scope| {
        let observer = scope.spawn(move || {
            loop {
                match stop_rx.recv_timeout(poll) {
                    Err(RecvTimeoutError::Timeout) => sink.update(start.elapsed(), limit),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            sink.finish(start.elapsed());
        });

        let result = work();

        let _ = stop_tx.send(());
        if observer.join().is_err() {
            tracing::warn!("progress observer panicked");
        }
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        updates: usize,
        finishes: usize,
    }

    impl ProgressSink for RecordingSink {
        fn update(&mut self, _elapsed: Duration, _limit: Duration) {
            self.updates += 1;
        }

        fn finish(&mut self, _elapsed: Duration) {
            self.finishes += 1;
        }
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0.5, 8), "[####----]  50.0%");
        assert_eq!(render_bar(2.0, 4), "[####] 100.0%");
        assert_eq!(render_bar(0.0, 4), "[----]   0.0%");
    }

    #[test]
    fn test_observer_joined_before_result() {
        let mut sink = RecordingSink::default();
        let value = observe(
            Duration::from_secs(1),
            Duration::from_millis(10),
            &mut sink,
            || {
                thread::sleep(Duration::from_millis(200));
                42
            },
        );
        assert_eq!(value, 42);
        assert_eq!(sink.finishes, 1);
        assert!(sink.updates >= 1);
    }

    #[test]
    fn test_fast_work_still_finishes_once() {
        let mut sink = RecordingSink::default();
        let value = observe(
            Duration::from_secs(1),
            Duration::from_secs(60),
            &mut sink,
            || "done",
        );
        assert_eq!(value, "done");
        assert_eq!(sink.updates, 0);
        assert_eq!(sink.finishes, 1);
    }
}
