use super::{constants::RESULT_HINT, draw::center_rect};
use crate::{app::App, session::GamePhase};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

pub fn draw_result(f: &mut Frame, app: &App) {
    let Some(scenario) = app.session.scenario() else {
        return;
    };
    let (headline, color) = match app.session.phase() {
        GamePhase::Won => ("谈判成功", Color::Green),
        _ => ("谈判失败", Color::Red),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            headline,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(format!(
            "最终说服度 {} / 目标 {}",
            app.session.score(),
            scenario.winning_score
        )),
        Line::from(format!("用了 {} 个回合", app.session.user_turns())),
    ];
    if let Some(feedback) = app.session.last_feedback() {
        lines.push(Line::from(Span::styled(
            feedback.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        app.status.clone().unwrap_or_else(|| RESULT_HINT.to_string()),
        Style::default().fg(Color::DarkGray),
    )));

    let area = center_rect(f.area(), Constraint::Percentage(60), Constraint::Length(11));
    let popup = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}
