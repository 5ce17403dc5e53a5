//! Status bar widget - shows run state, cycles, sound and bus volumes

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use boxbreath::BreathingSession;

use crate::app::AudioStatus;

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    session: &BreathingSession,
    audio: AudioStatus,
) {
    let block = Block::default().title(" boxbreath ").borders(Borders::ALL);

    let state = session.state();
    let settings = session.synthesizer().settings();

    let (run_symbol, run_label) = if state.running {
        ("▶", "Breathing")
    } else {
        ("■", "Stopped")
    };

    let sound = match (audio, state.sound_enabled) {
        (AudioStatus::Disabled, _) => ("Audio off", Color::DarkGray),
        (AudioStatus::Unavailable, _) => ("No device", Color::Red),
        (_, false) => ("Muted", Color::Yellow),
        (_, true) => ("Sound on", Color::Green),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", run_symbol, run_label),
            Style::default().fg(if state.running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("Cycles: {}  ", state.cycle_count),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("{}  ", sound.0), Style::default().fg(sound.1)),
        Span::styled(
            format!(
                "Ambient: {:.0}%  Cues: {:.0}%",
                settings.ambient_volume, settings.cues_volume
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
