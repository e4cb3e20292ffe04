use patternlock::engine::{Frame, Point};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Circle, Line, Points};
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Draws one session [`Frame`] on a braille canvas.
pub struct LockGrid<'a> {
    pub frame: &'a Frame,
    pub theme: &'a Theme,
    pub title: &'a str,
    pub focused: bool,
}

impl<'a> LockGrid<'a> {
    pub fn new(frame: &'a Frame, theme: &'a Theme, title: &'a str) -> Self {
        Self {
            frame,
            theme,
            title,
            focused: false,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(title: &str, theme: &Theme, focused: bool) -> Block<'static> {
        let border = if focused {
            theme.colors.border_focused()
        } else {
            theme.colors.border()
        };
        Block::bordered()
            .title(format!(" {title} "))
            .border_style(Style::default().fg(border))
    }

    /// Area the canvas paints into, i.e. the surface pointer events map to.
    pub fn inner(area: Rect) -> Rect {
        Block::bordered().inner(area)
    }
}

/// Mixes `color` toward `background` for partially transparent strokes.
/// Non-RGB colors can't be mixed and are returned unchanged when visible.
fn fade(color: Color, background: Color, alpha: f32) -> Color {
    match (color, background) {
        (Color::Rgb(r, g, b), Color::Rgb(br, bg, bb)) => {
            let mix = |c: u8, base: u8| (base as f32 + (c as f32 - base as f32) * alpha).round() as u8;
            Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
        }
        _ => color,
    }
}

impl Widget for LockGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let inner = Self::inner(area);
        let width = inner.width as f64;
        let height = inner.height as f64 * crate::ui::layout::ROW_SCALE as f64;
        // Canvas y grows upward; session y grows downward.
        let flip = |p: Point| (p.x as f64, height - p.y as f64);

        let canvas = Canvas::default()
            .block(Self::block(self.title, self.theme, self.focused))
            .background_color(colors.bg())
            .marker(symbols::Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                if let Some(path) = &self.frame.path {
                    let color = colors.line(path.color);
                    for pair in path.points.windows(2) {
                        let (x1, y1) = flip(pair[0]);
                        let (x2, y2) = flip(pair[1]);
                        ctx.draw(&Line { x1, y1, x2, y2, color });
                    }
                    if let Some(trailing) = path.trailing.filter(|t| t.alpha > 0.0) {
                        let (x1, y1) = flip(trailing.from);
                        let (x2, y2) = flip(trailing.to);
                        let color = fade(color, colors.bg(), trailing.alpha);
                        ctx.draw(&Line { x1, y1, x2, y2, color });
                    }
                }
                ctx.layer();

                for dot in &self.frame.dots {
                    if dot.alpha <= 0.0 {
                        continue;
                    }
                    let color = fade(colors.dot(dot.color), colors.bg(), dot.alpha);
                    let center = Point::new(dot.center.x, dot.center.y + dot.translate_y);
                    let (x, y) = flip(center);
                    let radius = (dot.drawn_size / 2.0) as f64;
                    ctx.draw(&Points { coords: &[(x, y)], color });
                    if radius >= 0.5 {
                        ctx.draw(&Circle { x, y, radius, color });
                    }
                }
            });

        canvas.render(area, buf);
    }
}
