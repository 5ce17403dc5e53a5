//! Terminal view of a breathing session.

mod breath;
mod status;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use boxbreath::BreathingSession;

use crate::app::AudioStatus;

use breath::render_breath;
use status::render_status;

pub fn render(frame: &mut Frame, session: &BreathingSession, audio: AudioStatus) {
    let area = frame.area();

    // Main layout: status, breath, help
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(7),    // Instruction + progress
            Constraint::Length(1), // Help bar
        ])
        .split(area);

    render_status(frame, chunks[0], session, audio);
    render_breath(frame, chunks[1], session);

    let help = Paragraph::new(
        " [Space] Start/Stop  [S] Sound  [[/]] Ambient  [-/=] Cues  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}
