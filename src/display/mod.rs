mod graphics;

pub use graphics::GraphicsSurface;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor, Size, WebColors};

pub const DISPLAY_WIDTH: u32 = 320;
pub const DISPLAY_HEIGHT: u32 = 240;

/// Symbolic drawing colours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Colour {
    Background,
    Trace,
    Threshold,
    BarBackground,
    BarForeground,
    Text,
}

impl From<Colour> for Rgb565 {
    fn from(colour: Colour) -> Self {
        match colour {
            Colour::Background => Rgb565::BLACK,
            Colour::Trace | Colour::Text => Rgb565::GREEN,
            Colour::Threshold => Rgb565::YELLOW,
            Colour::BarBackground => Rgb565::BLUE,
            Colour::BarForeground => Rgb565::CSS_CYAN,
        }
    }
}

/// Drawing primitives the renderer needs from the screen. All calls are
/// synchronous and immediately visible (no double buffering).
pub trait Surface {
    fn draw_line(&mut self, start: Point, end: Point, colour: Colour) -> anyhow::Result<()>;
    fn fill_rect(&mut self, origin: Point, size: Size, colour: Colour) -> anyhow::Result<()>;
    fn set_cursor(&mut self, position: Point) -> anyhow::Result<()>;
    fn print(&mut self, text: &str) -> anyhow::Result<()>;
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn draw_line(&mut self, start: Point, end: Point, colour: Colour) -> anyhow::Result<()> {
        (**self).draw_line(start, end, colour)
    }
    fn fill_rect(&mut self, origin: Point, size: Size, colour: Colour) -> anyhow::Result<()> {
        (**self).fill_rect(origin, size, colour)
    }
    fn set_cursor(&mut self, position: Point) -> anyhow::Result<()> {
        (**self).set_cursor(position)
    }
    fn print(&mut self, text: &str) -> anyhow::Result<()> {
        (**self).print(text)
    }
}
