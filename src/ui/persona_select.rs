// src/ui/persona_select.rs

use super::{
    constants::PERSONA_HINT,
    draw::center_rect,
    menu::{render_header, render_status, scenario_summary, theme_color},
};
use crate::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

pub fn draw_persona_select(f: &mut Frame, app: &mut App) {
    let Some(scenario) = app.session.scenario().cloned() else {
        return;
    };

    let [header, summary, list, status] = Layout::vertical([
        Constraint::Max(1),
        Constraint::Length(6),
        Constraint::Min(6),
        Constraint::Max(1),
    ])
    .areas(f.area());

    render_header(f, header);

    let summary_block = Block::default()
        .title(format!(" {} ", scenario.title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme_color(&scenario.theme)));
    let summary_widget = Paragraph::new(scenario_summary(&scenario))
        .wrap(Wrap { trim: true })
        .block(summary_block);
    f.render_widget(
        summary_widget,
        center_rect(summary, Constraint::Percentage(80), Constraint::Percentage(100)),
    );

    let items: Vec<ListItem> = scenario
        .personas
        .iter()
        .map(|persona| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    persona.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("  {}", persona.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let personas = List::new(items)
        .block(
            Block::default()
                .title(" 选择你的对手 ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("> ");
    f.render_stateful_widget(
        personas,
        center_rect(list, Constraint::Percentage(80), Constraint::Percentage(100)),
        &mut app.persona_state,
    );

    render_status(f, app.status.as_deref(), PERSONA_HINT, status);
}
