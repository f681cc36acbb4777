//! Frame pacing
//!
//! One capability-detection step at startup yields a single canonical
//! pacer; business logic never probes timers itself. The precise pacer
//! sleeps against a monotonic deadline; the coarse fallback approximates
//! ~60Hz with fixed sleeps, mirroring the timer-based fallback browsers
//! used before native frame callbacks.

use crate::env::Capabilities;
use std::time::{Duration, Instant};

/// Paces a run loop to frame boundaries.
pub trait FramePacer: Send {
    /// Block until the next frame boundary, returning its timestamp.
    fn next_frame(&mut self) -> Instant;

    /// Nominal frame interval.
    fn interval(&self) -> Duration;
}

/// Sleep-based pacer.
pub struct TimerPacer {
    interval: Duration,
    deadline: Option<Instant>,
    precise: bool,
}

impl TimerPacer {
    /// Deadline-tracking pacer at the given frame rate.
    pub fn precise(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            deadline: None,
            precise: true,
        }
    }

    /// Fixed-sleep fallback targeting ~60Hz.
    pub fn coarse() -> Self {
        Self {
            interval: Duration::from_millis(16),
            deadline: None,
            precise: false,
        }
    }
}

impl FramePacer for TimerPacer {
    fn next_frame(&mut self) -> Instant {
        let now = Instant::now();
        if self.precise {
            let deadline = match self.deadline {
                // Drift correction: schedule off the previous deadline, but
                // never fall more than one frame behind.
                Some(prev) => (prev + self.interval).max(now),
                None => now + self.interval,
            };
            self.deadline = Some(deadline);
            std::thread::sleep(deadline.saturating_duration_since(now));
            deadline
        } else {
            std::thread::sleep(self.interval);
            Instant::now()
        }
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Pacer that never sleeps; frames are whenever the caller asks. Used by
/// headless tests that drive update passes directly.
#[derive(Default)]
pub struct ManualPacer {
    frames: u64,
}

impl ManualPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames handed out so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FramePacer for ManualPacer {
    fn next_frame(&mut self) -> Instant {
        self.frames += 1;
        Instant::now()
    }

    fn interval(&self) -> Duration {
        Duration::ZERO
    }
}

/// Select the canonical pacer for this environment. Called once at startup.
pub fn detect_pacer(caps: &Capabilities) -> Box<dyn FramePacer> {
    if caps.high_res_timer {
        Box::new(TimerPacer::precise(60))
    } else {
        Box::new(TimerPacer::coarse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_pacer_counts_frames() {
        let mut pacer = ManualPacer::new();
        pacer.next_frame();
        pacer.next_frame();
        assert_eq!(pacer.frames(), 2);
        assert_eq!(pacer.interval(), Duration::ZERO);
    }

    #[test]
    fn detect_prefers_precise_timer() {
        let caps = Capabilities::default();
        assert_eq!(detect_pacer(&caps).interval(), Duration::from_secs_f64(1.0 / 60.0));

        let coarse = Capabilities {
            high_res_timer: false,
            ..Capabilities::default()
        };
        assert_eq!(detect_pacer(&coarse).interval(), Duration::from_millis(16));
    }

    #[test]
    fn precise_pacer_advances_deadline() {
        let mut pacer = TimerPacer::precise(1000);
        let first = pacer.next_frame();
        let second = pacer.next_frame();
        assert!(second >= first);
    }
}
