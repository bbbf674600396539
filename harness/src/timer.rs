//! Per-stage stopwatch
//!
//! One slot per [`Stage`]. A slot records the instant it was started and the
//! last completed duration; `read` reports that duration in seconds.

use std::cell::Cell;
use std::time::{Duration, Instant};

use convbench_shared::Stage;
use thiserror::Error;

/// Misuse of a timer slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer {0} is already running")]
    AlreadyRunning(Stage),

    #[error("timer {0} was stopped without being started")]
    NotRunning(Stage),
}

/// Monotonic time source, as an offset from an arbitrary fixed origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// `std::time::Instant` backed clock
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    started_at: Duration,
    elapsed: Duration,
    running: bool,
}

/// Fixed set of named stopwatches, one per pipeline stage
#[derive(Debug)]
pub struct StageTimer<C: Clock = MonotonicClock> {
    clock: C,
    slots: [Slot; Stage::COUNT],
}

impl StageTimer<MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for StageTimer<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> StageTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            slots: [Slot::default(); Stage::COUNT],
        }
    }

    pub fn start(&mut self, stage: Stage) -> Result<(), TimerError> {
        let now = self.clock.now();
        let slot = &mut self.slots[stage.index()];
        if slot.running {
            return Err(TimerError::AlreadyRunning(stage));
        }
        slot.started_at = now;
        slot.running = true;
        Ok(())
    }

    pub fn stop(&mut self, stage: Stage) -> Result<(), TimerError> {
        let now = self.clock.now();
        let slot = &mut self.slots[stage.index()];
        if !slot.running {
            return Err(TimerError::NotRunning(stage));
        }
        slot.elapsed = now.saturating_sub(slot.started_at);
        slot.running = false;
        Ok(())
    }

    /// Last completed duration of `stage` in seconds, 0.0 if none
    pub fn read(&self, stage: Stage) -> f64 {
        self.slots[stage.index()].elapsed.as_secs_f64()
    }

    pub fn is_running(&self, stage: Stage) -> bool {
        self.slots[stage.index()].running
    }

    /// Every stage's last duration, in [`Stage::ALL`] order
    pub fn snapshot(&self) -> [f64; Stage::COUNT] {
        Stage::ALL.map(|stage| self.read(stage))
    }

    /// Zero every recorded duration; running slots keep running
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.elapsed = Duration::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop_measures_elapsed() {
        let clock = ManualClock::new();
        let mut timer = StageTimer::with_clock(&clock);

        timer.start(Stage::WriteBuffer).unwrap();
        clock.advance(Duration::from_micros(250));
        timer.stop(Stage::WriteBuffer).unwrap();

        assert!((timer.read(Stage::WriteBuffer) - 0.000_25).abs() < 1e-12);
        assert_eq!(timer.read(Stage::ReadBuffer), 0.0);
    }

    #[test]
    fn test_monotonic_duration_non_negative() {
        let mut timer = StageTimer::new();
        timer.start(Stage::CreateBuffer).unwrap();
        timer.stop(Stage::CreateBuffer).unwrap();
        assert!(timer.read(Stage::CreateBuffer) >= 0.0);
    }

    #[test]
    fn test_stop_without_start() {
        let mut timer = StageTimer::new();
        assert_eq!(
            timer.stop(Stage::LaunchKernel),
            Err(TimerError::NotRunning(Stage::LaunchKernel))
        );
    }

    #[test]
    fn test_double_start() {
        let mut timer = StageTimer::new();
        timer.start(Stage::CreateKernel).unwrap();
        assert!(timer.is_running(Stage::CreateKernel));
        assert_eq!(
            timer.start(Stage::CreateKernel),
            Err(TimerError::AlreadyRunning(Stage::CreateKernel))
        );
    }

    #[test]
    fn test_slots_are_independent() {
        let clock = ManualClock::new();
        let mut timer = StageTimer::with_clock(&clock);

        timer.start(Stage::TotalResponseTime).unwrap();
        timer.start(Stage::CreateBuffer).unwrap();
        clock.advance(Duration::from_millis(1));
        timer.stop(Stage::CreateBuffer).unwrap();
        clock.advance(Duration::from_millis(2));
        timer.stop(Stage::TotalResponseTime).unwrap();

        assert!((timer.read(Stage::CreateBuffer) - 0.001).abs() < 1e-12);
        assert!((timer.read(Stage::TotalResponseTime) - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_clear_all() {
        let clock = ManualClock::new();
        let mut timer = StageTimer::with_clock(&clock);

        for stage in Stage::ALL {
            timer.start(stage).unwrap();
        }
        clock.advance(Duration::from_millis(5));
        for stage in Stage::ALL {
            timer.stop(stage).unwrap();
        }
        assert!(timer.snapshot().iter().all(|&secs| secs > 0.0));

        timer.clear_all();
        assert!(timer.snapshot().iter().all(|&secs| secs == 0.0));

        // Slots stay usable after a clear
        timer.start(Stage::ReadBuffer).unwrap();
        clock.advance(Duration::from_millis(1));
        timer.stop(Stage::ReadBuffer).unwrap();
        assert!(timer.read(Stage::ReadBuffer) > 0.0);
    }

    #[test]
    fn test_clear_all_keeps_running_slots() {
        let clock = ManualClock::new();
        let mut timer = StageTimer::with_clock(&clock);

        timer.start(Stage::TotalResponseTime).unwrap();
        clock.advance(Duration::from_millis(1));
        timer.clear_all();
        assert!(timer.is_running(Stage::TotalResponseTime));
        assert_eq!(timer.read(Stage::TotalResponseTime), 0.0);

        clock.advance(Duration::from_millis(2));
        timer.stop(Stage::TotalResponseTime).unwrap();
        assert!((timer.read(Stage::TotalResponseTime) - 0.003).abs() < 1e-12);
    }
}
