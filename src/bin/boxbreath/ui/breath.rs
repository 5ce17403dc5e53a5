//! Phase instruction and progress gauge

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use boxbreath::{BreathingSession, PhaseName};

fn phase_color(name: PhaseName) -> Color {
    match name {
        PhaseName::Inhale => Color::Cyan,
        PhaseName::Hold | PhaseName::Hold2 => Color::Yellow,
        PhaseName::Exhale => Color::Green,
    }
}

pub fn render_breath(frame: &mut Frame, area: Rect, session: &BreathingSession) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let scheduler = session.scheduler();
    if !scheduler.is_running() {
        let idle = Paragraph::new("Press Space to Begin")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White));
        frame.render_widget(idle, chunks[0]);
        return;
    }

    let phase = scheduler.current_phase();
    let color = phase_color(phase.name);

    // Full lungs render bold, empty lungs dim
    let modifier = if phase.name.is_expanded() {
        Modifier::BOLD
    } else {
        Modifier::DIM
    };
    let instruction = Paragraph::new(phase.name.instruction())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(modifier));
    frame.render_widget(instruction, chunks[0]);

    let remaining_ms = phase.duration_ms.saturating_sub(scheduler.phase_elapsed_ms());
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(f64::from(scheduler.phase_progress()))
        .label(format!("{:.1}s", remaining_ms as f32 / 1000.0));
    frame.render_widget(gauge, chunks[2]);
}
