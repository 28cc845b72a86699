use core::fmt::Write;

use embedded_graphics::prelude::{Point, Size};

use crate::detector::DetectorEvent;
use crate::display::{Colour, Surface, DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::history::{History, ADC_MAX, HISTORY_LEN};
use crate::scheduler::CycleStats;
use crate::threshold::Baseline;

// Screen layout (rows from the top)
pub const TEXT_X: i32 = 20;
pub const LINE_HEIGHT: u32 = 12;
pub const SEQUENCE_LINE_Y: i32 = 4;
pub const CLAP_LINE_Y: i32 = SEQUENCE_LINE_Y + LINE_HEIGHT as i32;
pub const STATUS_LINE_Y: i32 = CLAP_LINE_Y + LINE_HEIGHT as i32;
pub const INFO_BOTTOM: i32 = STATUS_LINE_Y + LINE_HEIGHT as i32; // Trace never goes above this row
pub const BAR_HEIGHT: u32 = 8;
pub const BAR_TOP: i32 = (DISPLAY_HEIGHT - BAR_HEIGHT) as i32;
pub const FLOOR: i32 = BAR_TOP - 1; // Row for a silent sample

const TRACE_SPAN: u32 = (FLOOR - INFO_BOTTOM) as u32;
// Segment k joins column k-1 to k; the segment into the last column is never drawn
const SEGMENTS: core::ops::Range<usize> = 1..HISTORY_LEN - 1;

type Message = heapless::String<64>;

/// Map a sample (or threshold) onto a trace row, saturating at full scale.
pub fn sample_to_row(value: u32) -> u8 {
    let value = value.min(ADC_MAX as u32);
    (FLOOR as u32 - value * TRACE_SPAN / ADC_MAX as u32) as u8
}

/// Differential renderer.
///
/// Keeps a shadow copy of what is currently on screen so each frame only
/// erases and redraws what changed. Never clears the trace area.
pub struct Renderer {
    trace: [u8; HISTORY_LEN],
    threshold_row: u8,
    bar_width: Option<u16>,
    drawn: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            trace: [FLOOR as u8; HISTORY_LEN],
            threshold_row: FLOOR as u8,
            bar_width: None,
            drawn: false,
        }
    }

    pub fn render<S: Surface>(
        &mut self,
        surface: &mut S,
        history: &History,
        baseline: &Baseline,
        events: &[DetectorEvent],
        sequence_length: u16,
    ) -> anyhow::Result<()> {
        self.render_trace(surface, history, baseline.threshold)?;
        self.render_bar(surface, sequence_length)?;
        self.render_events(surface, events)
    }

    fn render_trace<S: Surface>(
        &mut self,
        surface: &mut S,
        history: &History,
        threshold: u32,
    ) -> anyhow::Result<()> {
        let mut rows = [0_u8; HISTORY_LEN];
        for (row, &sample) in rows.iter_mut().zip(history.as_slice()) {
            *row = sample_to_row(sample as u32);
        }
        let threshold_row = sample_to_row(threshold);

        if !self.drawn {
            for k in SEGMENTS {
                draw_segment(surface, &rows, k, Colour::Trace)?;
            }
            draw_threshold(surface, threshold_row, Colour::Threshold)?;
            self.trace = rows;
            self.threshold_row = threshold_row;
            self.drawn = true;
            return Ok(());
        }

        let mut redraw = [false; HISTORY_LEN];
        let threshold_moved = threshold_row != self.threshold_row;
        let mut threshold_damaged = false;

        // Erasing the old threshold line cuts through any segment crossing it
        if threshold_moved {
            draw_threshold(surface, self.threshold_row, Colour::Background)?;
            for k in SEGMENTS {
                if spans(&self.trace, k, self.threshold_row) {
                    redraw[k] = true;
                }
            }
        }

        for k in SEGMENTS {
            if self.trace[k - 1] == rows[k - 1] && self.trace[k] == rows[k] {
                continue;
            }
            draw_segment(surface, &self.trace, k, Colour::Background)?;
            // Neighbours share the end columns
            redraw[k - 1] = true;
            redraw[k] = true;
            redraw[k + 1] = true;
            threshold_damaged |= spans(&self.trace, k, threshold_row);
        }

        // Trace pixels landing on the threshold row overpaint it
        for k in SEGMENTS.filter(|&k| redraw[k]) {
            draw_segment(surface, &rows, k, Colour::Trace)?;
            threshold_damaged |= spans(&rows, k, threshold_row);
        }
        if threshold_moved || threshold_damaged {
            draw_threshold(surface, threshold_row, Colour::Threshold)?;
        }

        self.trace = rows;
        self.threshold_row = threshold_row;
        Ok(())
    }

    /// Duration bar, only touched when the sequence length changes
    fn render_bar<S: Surface>(
        &mut self,
        surface: &mut S,
        sequence_length: u16,
    ) -> anyhow::Result<()> {
        let width = sequence_length.min(DISPLAY_WIDTH as u16);
        if self.bar_width == Some(width) {
            return Ok(());
        }
        surface.fill_rect(
            Point::new(0, BAR_TOP),
            Size::new(DISPLAY_WIDTH, BAR_HEIGHT),
            Colour::BarBackground,
        )?;
        if width > 0 {
            surface.fill_rect(
                Point::new(0, BAR_TOP),
                Size::new(width as u32, BAR_HEIGHT),
                Colour::BarForeground,
            )?;
        }
        self.bar_width = Some(width);
        Ok(())
    }

    fn render_events<S: Surface>(
        &mut self,
        surface: &mut S,
        events: &[DetectorEvent],
    ) -> anyhow::Result<()> {
        for event in events {
            let y = match event {
                DetectorEvent::SequenceStarted { .. } | DetectorEvent::SequenceEnded { .. } => {
                    SEQUENCE_LINE_Y
                }
                DetectorEvent::Clap { .. } => CLAP_LINE_Y,
            };
            let mut msg = Message::new();
            write!(msg, "{event}").map_err(|_| anyhow::anyhow!("Message too long: {event:?}"))?;
            print_line(surface, y, &msg)?;
        }
        Ok(())
    }

    /// Timing status line, refreshed once per status window
    pub fn render_status<S: Surface>(
        &mut self,
        surface: &mut S,
        stats: &CycleStats,
    ) -> anyhow::Result<()> {
        let mut msg = Message::new();
        write!(
            msg,
            "{:.0} Hz  max {} us  late {}",
            stats.sample_rate(),
            stats.max_period_us,
            stats.overruns
        )
        .map_err(|_| anyhow::anyhow!("Message too long: {stats:?}"))?;
        print_line(surface, STATUS_LINE_Y, &msg)
    }
}

fn print_line<S: Surface>(surface: &mut S, y: i32, text: &str) -> anyhow::Result<()> {
    surface.fill_rect(
        Point::new(0, y),
        Size::new(DISPLAY_WIDTH, LINE_HEIGHT),
        Colour::Background,
    )?;
    surface.set_cursor(Point::new(TEXT_X, y))?;
    surface.print(text)
}

fn draw_segment<S: Surface>(
    surface: &mut S,
    rows: &[u8; HISTORY_LEN],
    k: usize,
    colour: Colour,
) -> anyhow::Result<()> {
    surface.draw_line(
        Point::new(k as i32 - 1, rows[k - 1] as i32),
        Point::new(k as i32, rows[k] as i32),
        colour,
    )
}

fn draw_threshold<S: Surface>(surface: &mut S, row: u8, colour: Colour) -> anyhow::Result<()> {
    surface.draw_line(
        Point::new(0, row as i32),
        Point::new(HISTORY_LEN as i32 - 1, row as i32),
        colour,
    )
}

fn spans(rows: &[u8; HISTORY_LEN], k: usize, row: u8) -> bool {
    let (a, b) = (rows[k - 1], rows[k]);
    a.min(b) <= row && row <= a.max(b)
}
