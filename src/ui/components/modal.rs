use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::ui::layout::centered_rect;
use crate::ui::theme::Theme;

/// Competition exit confirmation. Progress is discarded on confirm, so the
/// session never ends by accident.
pub struct ExitModal<'a> {
    pub theme: &'a Theme,
}

impl Widget for ExitModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let popup = centered_rect(50, 30, area);

        Clear.render(popup, buf);
        let block = Block::bordered()
            .title(" Exit Competition? ")
            .border_style(Style::default().fg(colors.incorrect()))
            .style(Style::default().bg(colors.card_bg()));
        let inner = block.inner(popup);
        block.render(popup, buf);

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Your progress will be lost.",
                Style::default().fg(colors.card_fg()),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "[y] ",
                    Style::default()
                        .fg(colors.incorrect())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("Exit    ", Style::default().fg(colors.card_fg())),
                Span::styled(
                    "[n] ",
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("Keep playing", Style::default().fg(colors.card_fg())),
            ]),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}
