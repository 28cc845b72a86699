use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PointsIter, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use super::{Colour, Surface};

/// [`Surface`] on top of any `embedded-graphics` RGB565 draw target.
pub struct GraphicsSurface<D> {
    target: D,
    cursor: Point,
}

impl<D> GraphicsSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: std::fmt::Debug,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            cursor: Point::zero(),
        }
    }

    pub fn clear(&mut self, colour: Colour) -> anyhow::Result<()> {
        self.target
            .clear(colour.into())
            .map_err(|e| anyhow::anyhow!("clear: {e:?}"))
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    fn fill(&mut self, area: Rectangle, colour: Rgb565) -> anyhow::Result<()> {
        self.target
            .fill_solid(&area, colour)
            .map_err(|e| anyhow::anyhow!("draw_line: {e:?}"))
    }
}

impl<D> Surface for GraphicsSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: std::fmt::Debug,
{
    /// Lines go out as solid fills: one for a horizontal line, one per
    /// vertical run otherwise. SPI panels pay a window setup per fill, so a
    /// trace segment between adjacent columns costs two fills, not one per
    /// pixel.
    fn draw_line(&mut self, start: Point, end: Point, colour: Colour) -> anyhow::Result<()> {
        let colour = colour.into();
        if start.y == end.y {
            return self.fill(Rectangle::with_corners(start, end), colour);
        }

        let mut run: Option<(Point, Point)> = None;
        for point in Line::new(start, end).points() {
            run = match run {
                Some((first, last)) if point.x == last.x && (point.y - last.y).abs() == 1 => {
                    Some((first, point))
                }
                Some((first, last)) => {
                    self.fill(Rectangle::with_corners(first, last), colour)?;
                    Some((point, point))
                }
                None => Some((point, point)),
            };
        }
        match run {
            Some((first, last)) => self.fill(Rectangle::with_corners(first, last), colour),
            None => Ok(()),
        }
    }

    fn fill_rect(&mut self, origin: Point, size: Size, colour: Colour) -> anyhow::Result<()> {
        self.target
            .fill_solid(&Rectangle::new(origin, size), colour.into())
            .map_err(|e| anyhow::anyhow!("fill_rect: {e:?}"))
    }

    fn set_cursor(&mut self, position: Point) -> anyhow::Result<()> {
        self.cursor = position;
        Ok(())
    }

    fn print(&mut self, text: &str) -> anyhow::Result<()> {
        let style = MonoTextStyle::new(&FONT_6X10, Colour::Text.into());
        self.cursor = Text::with_baseline(text, self.cursor, style, Baseline::Top)
            .draw(&mut self.target)
            .map_err(|e| anyhow::anyhow!("print: {e:?}"))?;
        Ok(())
    }
}
