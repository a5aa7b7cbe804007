use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::theme::OCEANIC_NEXT;

/// Modal message that has to be dismissed before anything else happens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPopup {
    message: String,
}

impl AlertPopup {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 30, area);
        f.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from(Span::styled(
                self.message.clone(),
                Style::default().fg(OCEANIC_NEXT.base_05),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to dismiss",
                Style::default()
                    .fg(OCEANIC_NEXT.base_03)
                    .add_modifier(Modifier::ITALIC),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Alert ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(OCEANIC_NEXT.base_08))
                    .style(Style::default().bg(OCEANIC_NEXT.base_00)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(paragraph, popup_area);
    }
}

// Helper function for centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
