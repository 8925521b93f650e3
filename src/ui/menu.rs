// src/ui/menu.rs

use super::{
    constants::{MENU_HINT, TITLE},
    draw::center_rect,
};
use crate::{app::App, scenario::Scenario};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

pub fn draw_menu(f: &mut Frame, app: &mut App) {
    let [header, title, list, details, status] = Layout::vertical([
        Constraint::Max(1),
        Constraint::Length(7),
        Constraint::Min(7),
        Constraint::Length(6),
        Constraint::Max(1),
    ])
    .areas(f.area());

    render_header(f, header);
    render_title(f, title);
    render_scenarios(f, app, list);
    render_details(f, app, details);
    render_status(f, app.status.as_deref(), MENU_HINT, status);
}

pub fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(format!("Parley v{}", env!("CARGO_PKG_VERSION")))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title_area = center_rect(area, Constraint::Length(32), Constraint::Length(7));
    let title = Paragraph::new(TITLE)
        .alignment(Alignment::Left)
        .style(Style::default().fg(Color::Green));
    f.render_widget(title, title_area);
}

fn render_scenarios(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .catalog
        .scenarios()
        .iter()
        .map(|scenario| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", icon_glyph(&scenario.icon))),
                Span::styled(
                    scenario.title.clone(),
                    Style::default().fg(theme_color(&scenario.theme)),
                ),
                Span::styled(
                    format!("  [{}]", scenario.difficulty.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" 选择场景 ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let list_area = center_rect(area, Constraint::Percentage(70), Constraint::Percentage(100));
    f.render_stateful_widget(list, list_area, &mut app.scenario_state);
}

fn render_details(f: &mut Frame, app: &App, area: Rect) {
    let selected = app.scenario_state.selected().unwrap_or(0);
    let Some(scenario) = app.catalog.scenarios().get(selected) else {
        return;
    };

    let details = Paragraph::new(scenario_summary(scenario))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    let details_area = center_rect(area, Constraint::Percentage(70), Constraint::Percentage(100));
    f.render_widget(details, details_area);
}

pub fn scenario_summary(scenario: &Scenario) -> Vec<Line<'static>> {
    vec![
        Line::from(scenario.description.clone()),
        Line::from(vec![
            Span::styled("你的身份：", Style::default().fg(Color::DarkGray)),
            Span::raw(scenario.user_role.clone()),
        ]),
        Line::from(vec![
            Span::styled("目标：", Style::default().fg(Color::DarkGray)),
            Span::styled(scenario.goal.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
            format!(
                "{} 回合  起始 {} 分  目标 {} 分",
                scenario.turn_limit, scenario.base_score, scenario.winning_score
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

pub fn render_status(f: &mut Frame, status: Option<&str>, hint: &str, area: Rect) {
    let status = match status {
        Some(message) => Paragraph::new(message.to_string()).style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(hint.to_string()).style(Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(status.alignment(Alignment::Center), area);
}

pub fn theme_color(theme: &str) -> Color {
    theme.parse().unwrap_or(Color::Gray)
}

fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "Briefcase" => "💼",
        "Car" => "🚗",
        "Gavel" => "⚖",
        "ShieldAlert" => "🚨",
        _ => "•",
    }
}
