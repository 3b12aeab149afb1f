use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// The three choice cards plus the instruction line. Layout is identical in
/// both modes; practice adds key hints and feedback flashes.
pub struct GameBoard<'a> {
    pub choices: &'a [String; 3],
    /// (was the tap correct, tapped index) while the verdict flash is up.
    pub feedback: Option<(bool, usize)>,
    /// Index to flash green during feedback.
    pub correct_index: usize,
    pub can_answer: bool,
    pub is_speaking: bool,
    pub competition: bool,
    pub theme: &'a Theme,
}

impl Widget for GameBoard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(5),
            ])
            .split(area);

        let instruction = if self.is_speaking {
            "Listen carefully..."
        } else if self.competition {
            ""
        } else if self.feedback.is_some() {
            ""
        } else if self.can_answer {
            "Tap 1, 2 or 3 to pick the word you heard"
        } else {
            ""
        };
        let speaker = if self.is_speaking { "((( " } else { "    " };
        let speaker_end = if self.is_speaking { " )))" } else { "    " };
        let line = Line::from(vec![
            Span::styled(speaker, Style::default().fg(colors.accent_alt())),
            Span::styled(instruction, Style::default().fg(colors.muted())),
            Span::styled(speaker_end, Style::default().fg(colors.accent_alt())),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(rows[0], buf);

        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ])
            .split(rows[1]);

        for (idx, choice) in self.choices.iter().enumerate() {
            self.render_card(idx, choice, cards[idx], buf);
        }
    }
}

impl GameBoard<'_> {
    fn render_card(&self, idx: usize, choice: &str, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let (border, text) = match self.feedback {
            Some((_, _)) if idx == self.correct_index => (colors.correct(), colors.correct()),
            Some((false, chosen)) if idx == chosen => (colors.incorrect(), colors.incorrect()),
            _ => (colors.border(), colors.card_fg()),
        };

        let title = if self.competition {
            String::new()
        } else {
            format!(" [{}] ", idx + 1)
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.card_bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }
        let word_y = inner.y + inner.height / 2;
        let word_area = Rect::new(inner.x, word_y, inner.width, 1);
        Paragraph::new(Line::from(Span::styled(
            choice,
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(word_area, buf);
    }
}
