use crate::detector::{Detector, Events};
use crate::display::Surface;
use crate::history::{self, History};
use crate::input::{self, SampleSource};
use crate::render::Renderer;
use crate::scheduler::{Clock, CycleStats, Periodic, Scheduler, SAMPLING_PERIOD_US};
use crate::threshold::{self, Baseline};

pub const STATUS_INTERVAL_US: u64 = 1_000_000; // Clock time between status updates

/// Result of one sampling cycle
#[derive(Debug, Clone)]
pub struct Cycle {
    pub count: u64,
    pub released_us: u64,
    pub sample: u16,
    pub baseline: Baseline,
    pub sequence_length: u16,
    pub events: Events,
    pub status: Option<CycleStats>,
}

/// The sampling / detection / rendering engine. Owns all loop state.
pub struct Monitor<S, D, C: Clock> {
    source: S,
    surface: D,
    scheduler: Scheduler<C>,
    history: History,
    detector: Detector,
    renderer: Renderer,
    status_timer: Periodic,
    count: u64,
}

impl<S, D, C> Monitor<S, D, C>
where
    S: SampleSource,
    D: Surface,
    C: Clock,
{
    pub fn new(source: S, surface: D, clock: C) -> Self {
        Self::with_period(source, surface, clock, SAMPLING_PERIOD_US)
    }

    pub fn with_period(source: S, surface: D, clock: C, period_us: u64) -> Self {
        let scheduler = Scheduler::new(clock, period_us);
        let status_timer = Periodic::new(STATUS_INTERVAL_US, scheduler.deadline());
        Self {
            source,
            surface,
            scheduler,
            history: History::new(),
            detector: Detector::new(),
            renderer: Renderer::new(),
            status_timer,
            count: 0,
        }
    }

    /// Wait for the next sample slot and run one full cycle.
    pub fn cycle(&mut self) -> anyhow::Result<Cycle> {
        let released_us = self.scheduler.tick();

        let sample = history::rectify(self.source.read_microphone()?);
        self.history.shift_and_insert(sample);
        let baseline = threshold::recompute(&self.history);

        let sequence_length = input::sequence_length(self.source.read_position()?);
        let events = self
            .detector
            .update(sample, baseline.threshold, sequence_length);
        for event in &events {
            log::info!("[{}] {event}", self.count);
        }

        self.renderer.render(
            &mut self.surface,
            &self.history,
            &baseline,
            &events,
            sequence_length,
        )?;

        self.count += 1;
        let status = if self.status_timer.due(released_us) {
            let stats = self.scheduler.take_stats();
            self.renderer.render_status(&mut self.surface, &stats)?;
            log::info!("{}", serde_json::to_string(&stats)?);
            Some(stats)
        } else {
            None
        };

        Ok(Cycle {
            count: self.count,
            released_us,
            sample,
            baseline,
            sequence_length,
            events,
            status,
        })
    }

    /// Run `f` after every cycle until it returns an error
    pub fn run<F>(&mut self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(&Cycle) -> anyhow::Result<()>,
    {
        loop {
            let cycle = self.cycle()?;
            f(&cycle)?;
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn stats(&self) -> &CycleStats {
        self.scheduler.stats()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }
}
