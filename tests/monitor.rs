use std::cell::Cell;
use std::collections::VecDeque;

use embedded_graphics::prelude::{Point, Size};

use clapscope::detector::{DetectorEvent, SEQUENCE_MAX};
use clapscope::display::{Colour, Surface};
use clapscope::history::{ADC_MAX, ADC_MID, HISTORY_LEN};
use clapscope::input::{sequence_length, SampleSource};
use clapscope::monitor::{Monitor, STATUS_INTERVAL_US};
use clapscope::scheduler::Clock;
use clapscope::threshold::THRESHOLD_OFFSET;

const LOUD: u16 = 4000;

/// Advances by `step` microseconds every time it is read
struct StepClock {
    now: Cell<u64>,
    step: u64,
}

impl Clock for StepClock {
    fn now_us(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

fn clock(step: u64) -> StepClock {
    StepClock {
        now: Cell::new(0),
        step,
    }
}

/// Plays back scripted microphone readings, then holds mid-scale
struct Script {
    microphone: VecDeque<u16>,
    position: u16,
}

impl Script {
    fn new(position: u16) -> Self {
        Self {
            microphone: VecDeque::new(),
            position,
        }
    }

    fn quiet(mut self, n: usize) -> Self {
        self.microphone.extend(std::iter::repeat(ADC_MID).take(n));
        self
    }

    fn loud(mut self, n: usize) -> Self {
        self.microphone.extend(std::iter::repeat(LOUD).take(n));
        self
    }
}

impl SampleSource for Script {
    fn read_microphone(&mut self) -> anyhow::Result<u16> {
        Ok(self.microphone.pop_front().unwrap_or(ADC_MID))
    }

    fn read_position(&mut self) -> anyhow::Result<u16> {
        Ok(self.position)
    }
}

#[derive(Default)]
struct Recorder {
    lines: usize,
    rects: Vec<(Point, Size, Colour)>,
    printed: Vec<String>,
}

impl Surface for Recorder {
    fn draw_line(&mut self, _start: Point, _end: Point, _colour: Colour) -> anyhow::Result<()> {
        self.lines += 1;
        Ok(())
    }
    fn fill_rect(&mut self, origin: Point, size: Size, colour: Colour) -> anyhow::Result<()> {
        self.rects.push((origin, size, colour));
        Ok(())
    }
    fn set_cursor(&mut self, _position: Point) -> anyhow::Result<()> {
        Ok(())
    }
    fn print(&mut self, text: &str) -> anyhow::Result<()> {
        self.printed.push(text.to_string());
        Ok(())
    }
}

type TestMonitor = Monitor<Script, Recorder, StepClock>;

fn monitor(script: Script) -> TestMonitor {
    Monitor::with_period(script, Recorder::default(), clock(1), 1)
}

/// Run `n` cycles, collecting (cycle count, event)
fn run(monitor: &mut TestMonitor, n: usize) -> Vec<(u64, DetectorEvent)> {
    let mut events = Vec::new();
    for _ in 0..n {
        let cycle = monitor.cycle().unwrap();
        events.extend(cycle.events.iter().map(|&e| (cycle.count, e)));
    }
    events
}

#[test]
fn mid_scale_input_never_claps() {
    let mut monitor = monitor(Script::new(ADC_MAX).quiet(100));
    for _ in 0..100 {
        let cycle = monitor.cycle().unwrap();
        assert_eq!(cycle.sample, 0);
        assert_eq!(cycle.baseline.threshold, THRESHOLD_OFFSET);
        assert!(cycle.events.is_empty());
    }
    assert!(monitor.history().as_slice().iter().all(|&s| s == 0));
    assert_eq!(monitor.detector().claps_in_sequence(), 0);
    assert!(monitor.surface().printed.is_empty());
}

#[test]
fn claps_are_tallied_over_a_sequence() {
    let script = Script::new(ADC_MAX).quiet(10).loud(3).quiet(20).loud(3);
    let mut monitor = monitor(script);
    let events = run(&mut monitor, 400);

    assert_eq!(
        events,
        vec![
            (11, DetectorEvent::SequenceStarted { length: 320 }),
            (11, DetectorEvent::Clap { count: 1 }),
            (34, DetectorEvent::Clap { count: 2 }),
            (330, DetectorEvent::SequenceEnded { claps: 2 }),
        ]
    );
    let printed = &monitor.surface().printed;
    assert_eq!(printed.last().map(String::as_str), Some("Sequence ended: 2 claps"));
}

#[test]
fn position_change_applies_to_next_sequence_only() {
    let mut monitor = monitor(Script::new(ADC_MAX).loud(1).quiet(10));
    run(&mut monitor, 1);
    assert_eq!(monitor.detector().sequence_remaining(), SEQUENCE_MAX - 1);

    // Knob turned to the minimum mid-sequence
    monitor_source_position(&mut monitor, 0);
    run(&mut monitor, 10);
    assert_eq!(monitor.detector().sequence_remaining(), SEQUENCE_MAX - 11);

    let events = run(&mut monitor, SEQUENCE_MAX as usize);
    assert!(events.contains(&(
        SEQUENCE_MAX as u64,
        DetectorEvent::SequenceEnded { claps: 1 }
    )));

    // Next sequence uses the new one sample length
    monitor_source_push(&mut monitor, &[LOUD]);
    let events = run(&mut monitor, 1);
    assert_eq!(
        events.iter().map(|(_, e)| *e).collect::<Vec<_>>(),
        vec![
            DetectorEvent::SequenceStarted { length: 1 },
            DetectorEvent::Clap { count: 1 },
            DetectorEvent::SequenceEnded { claps: 1 },
        ]
    );
}

#[test]
fn duration_bar_follows_position() {
    let mut monitor = monitor(Script::new(2048));
    run(&mut monitor, 5);
    let width = sequence_length(2048) as u32;
    let bars = |m: &TestMonitor| {
        m.surface()
            .rects
            .iter()
            .filter(|(_, _, c)| *c == Colour::BarForeground)
            .map(|(_, size, _)| size.width)
            .collect::<Vec<_>>()
    };
    assert_eq!(bars(&monitor), vec![width]);

    monitor_source_position(&mut monitor, ADC_MAX);
    run(&mut monitor, 5);
    assert_eq!(bars(&monitor), vec![width, 320]);
}

#[test]
fn quiet_trace_stops_drawing_once_settled() {
    let mut monitor = monitor(Script::new(ADC_MAX).loud(1));
    run(&mut monitor, HISTORY_LEN + 1);

    // The loud sample has scrolled off, nothing left to update
    let before = monitor.surface().lines;
    run(&mut monitor, 10);
    assert_eq!(monitor.surface().lines, before);
}

#[test]
fn status_reported_once_per_second_of_clock_time() {
    // 100us period: a window is 10 000 cycles
    let mut monitor = Monitor::with_period(
        Script::new(ADC_MAX),
        Recorder::default(),
        clock(1),
        100,
    );
    let mut reports = Vec::new();
    for _ in 0..20_001 {
        let cycle = monitor.cycle().unwrap();
        if let Some(status) = cycle.status {
            reports.push((cycle.count, cycle.released_us, status));
        }
    }

    assert_eq!(
        reports.iter().map(|(count, ..)| *count).collect::<Vec<_>>(),
        vec![10_001, 20_001]
    );
    for (_, released, status) in &reports {
        assert!(released % STATUS_INTERVAL_US == 0);
        assert_eq!(status.cycles, 10_000);
        assert_eq!(status.overruns, 0);
        assert_eq!(status.max_period_us, 100);
        assert_eq!(status.sample_rate().round(), 10_000.0);
    }
    assert_eq!(monitor.stats().cycles, 0);
    assert!(monitor
        .surface()
        .printed
        .last()
        .is_some_and(|s| s.contains("Hz")));
}

#[test]
fn status_still_reported_when_cycles_overrun() {
    // Every cycle takes 1ms against a 1us period
    let mut monitor = Monitor::with_period(
        Script::new(ADC_MAX),
        Recorder::default(),
        clock(1_000),
        1,
    );
    let mut reports = Vec::new();
    for _ in 0..20_000 {
        let cycle = monitor.cycle().unwrap();
        if let Some(status) = cycle.status {
            reports.push((cycle.count, status));
        }
    }

    assert_eq!(reports.len(), 20);
    assert_eq!(reports[0].0, 1_000);
    for (_, status) in &reports {
        assert!(status.overruns > 0);
        assert_eq!(status.overruns, status.cycles);
        assert_eq!(status.max_period_us, 1_000);
        assert_eq!(status.sample_rate().round(), 1_000.0);
    }
}

fn monitor_source_position(monitor: &mut TestMonitor, position: u16) {
    monitor.source_mut().position = position;
}

fn monitor_source_push(monitor: &mut TestMonitor, readings: &[u16]) {
    monitor.source_mut().microphone.extend(readings);
}
