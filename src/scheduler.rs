use serde::Serialize;

use std::time::Instant;

pub const SAMPLING_PERIOD_US: u64 = 20; // 50kHz nominal sample rate

/// Monotonic microsecond time source.
pub trait Clock {
    fn now_us(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// `std::time::Instant` backed clock (esp_timer on ESP-IDF).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// Timing of the cycles since the last status window was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CycleStats {
    pub cycles: u64,
    pub elapsed_us: u64,
    pub last_period_us: u64,
    pub max_period_us: u64,
    pub overruns: u64,
}

impl CycleStats {
    /// Effective samples per second over the window
    pub fn sample_rate(&self) -> f64 {
        if self.elapsed_us == 0 {
            0.0
        } else {
            self.cycles as f64 * 1_000_000.0 / self.elapsed_us as f64
        }
    }
}

impl std::fmt::Display for CycleStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rate: {:.0} Hz :: Period: {}/{} us :: Overruns: {}",
            self.sample_rate(),
            self.last_period_us,
            self.max_period_us,
            self.overruns
        )
    }
}

/// Fixed period sample scheduler.
///
/// The deadline always advances by exactly one period, so a slow cycle makes
/// the next `tick` return immediately rather than skipping a sample.
pub struct Scheduler<C: Clock> {
    clock: C,
    period_us: u64,
    deadline: u64,
    last_tick: Option<u64>,
    stats: CycleStats,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C, period_us: u64) -> Self {
        let deadline = clock.now_us();
        Self {
            clock,
            period_us,
            deadline,
            last_tick: None,
            stats: CycleStats::default(),
        }
    }

    /// Spin until the current deadline, then schedule the next one. Returns
    /// the time the tick was released.
    pub fn tick(&mut self) -> u64 {
        let mut now = self.clock.now_us();
        if self.last_tick.is_some() && now > self.deadline {
            self.stats.overruns += 1;
        }
        while now < self.deadline {
            std::hint::spin_loop();
            now = self.clock.now_us();
        }
        self.deadline += self.period_us;

        if let Some(prev) = self.last_tick {
            let period = now - prev;
            self.stats.cycles += 1;
            self.stats.elapsed_us += period;
            self.stats.last_period_us = period;
            self.stats.max_period_us = self.stats.max_period_us.max(period);
        }
        self.last_tick = Some(now);
        now
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Return the stats for the current window and start a new one
    pub fn take_stats(&mut self) -> CycleStats {
        std::mem::take(&mut self.stats)
    }
}

/// Clock-time gate: `due` fires at most once per `interval_us`, however many
/// cycles that takes.
#[derive(Debug, Clone, Copy)]
pub struct Periodic {
    interval_us: u64,
    last: u64,
}

impl Periodic {
    pub fn new(interval_us: u64, start_us: u64) -> Self {
        Self {
            interval_us,
            last: start_us,
        }
    }

    pub fn due(&mut self, now_us: u64) -> bool {
        if now_us.saturating_sub(self.last) >= self.interval_us {
            self.last = now_us;
            true
        } else {
            false
        }
    }
}
