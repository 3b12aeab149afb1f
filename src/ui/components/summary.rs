use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::session::result::{ResultDetail, ResultItem};
use crate::ui::theme::Theme;

/// The result list on the summary screen. Rows are revealed one by one by
/// the host's reveal animation; the selected row can be re-spoken.
pub struct SummaryList<'a> {
    pub items: &'a [ResultItem],
    pub revealed: usize,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl Widget for SummaryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Results ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let visible = inner.height as usize;
        let shown = self.revealed.min(self.items.len());

        // Keep the selection in view; while revealing, follow the tail.
        let first = if shown <= visible {
            0
        } else if self.revealed < self.items.len() {
            shown - visible
        } else {
            self.selected.saturating_sub(visible / 2).min(shown - visible)
        };

        for (row, item) in self.items[first..shown].iter().enumerate() {
            let y = inner.y + row as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let is_selected = first + row == self.selected && self.revealed >= self.items.len();
            let line = self.row_line(item, is_selected);
            Paragraph::new(line).render(Rect::new(inner.x, y, inner.width, 1), buf);
        }
    }
}

impl SummaryList<'_> {
    fn row_line(&self, item: &ResultItem, selected: bool) -> Line<'_> {
        let colors = &self.theme.colors;
        let base = if selected {
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.fg())
        };

        let number = format!(" {:>3}. ", item.question_number);
        let mut spans = vec![Span::styled(number, base)];

        match &item.detail {
            ResultDetail::Practice {
                correct,
                user_answer,
                correct_answer,
            } => {
                let (mark, mark_color) = if *correct {
                    ("+", colors.correct())
                } else {
                    ("x", colors.incorrect())
                };
                spans.push(Span::styled(
                    format!("{mark} "),
                    base.patch(Style::default().fg(mark_color)),
                ));
                spans.push(Span::styled(format!("{:<12}", item.sound), base));
                if !*correct {
                    spans.push(Span::styled(
                        format!("  you: {user_answer}  answer: {correct_answer}"),
                        base.patch(Style::default().fg(colors.muted())),
                    ));
                }
            }
            ResultDetail::Competition { choices, target } => {
                for (idx, choice) in choices.iter().enumerate() {
                    if idx == *target {
                        spans.push(Span::styled(
                            format!("[{choice}] "),
                            base.patch(
                                Style::default()
                                    .fg(colors.accent())
                                    .add_modifier(Modifier::BOLD),
                            ),
                        ));
                    } else {
                        spans.push(Span::styled(
                            format!("{choice} "),
                            base.patch(Style::default().fg(colors.muted())),
                        ));
                    }
                }
            }
        }

        Line::from(spans)
    }
}
