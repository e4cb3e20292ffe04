use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Toggles shown in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeFlags {
    pub stealth: bool,
    pub input: bool,
    pub haptics: bool,
}

pub struct Header<'a> {
    pub title: &'a str,
    pub flags: ModeFlags,
    pub cells: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str, flags: ModeFlags, cells: usize, theme: &'a Theme) -> Self {
        Self {
            title,
            flags,
            cells,
            theme,
        }
    }
}

fn flag_span<'a>(label: &'a str, on: bool, theme: &Theme) -> Span<'a> {
    let colors = &theme.colors;
    let style = if on {
        Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.border())
    };
    Span::styled(format!(" {label} "), style)
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.header_bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(colors.header_fg()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {} cells ", self.cells), Style::default().fg(colors.fg())),
            flag_span("stealth", self.flags.stealth, self.theme),
            flag_span("input", self.flags.input, self.theme),
            flag_span("haptics", self.flags.haptics, self.theme),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}

pub struct Footer<'a> {
    pub message: &'a str,
    pub hints: &'a [&'a str],
    pub theme: &'a Theme,
}

impl<'a> Footer<'a> {
    pub fn new(message: &'a str, hints: &'a [&'a str], theme: &'a Theme) -> Self {
        Self {
            message,
            hints,
            theme,
        }
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", self.message))
            .title_style(Style::default().fg(colors.fg()))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let hints = self.hints.join("  ");
        Paragraph::new(Line::from(Span::styled(
            format!(" {hints}"),
            Style::default().fg(colors.accent()),
        )))
        .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_header_shows_title_and_count() {
        let theme = Theme::default();
        let flags = ModeFlags {
            stealth: false,
            input: true,
            haptics: true,
        };
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        Header::new("Record", flags, 4, &theme).render(area, &mut buf);
        let text = row_text(&buf, 1);
        assert!(text.contains("Record"));
        assert!(text.contains("4 cells"));
        assert!(text.contains("stealth"));
    }

    #[test]
    fn test_footer_shows_message_and_hints() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        Footer::new("Pattern completed", &["[q] Quit", "[s] Stealth"], &theme).render(area, &mut buf);
        assert!(row_text(&buf, 0).contains("Pattern completed"));
        assert!(row_text(&buf, 1).contains("[s] Stealth"));
    }
}
