use super::{constants::PLAYING_HINT, menu::theme_color, spinner::spinner_frame};
use crate::{
    app::App,
    message::{Message, Role},
    scenario::MAX_SCORE,
    session::{GamePhase, ScoreBand},
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

pub fn draw_in_game(f: &mut Frame, app: &mut App) {
    let [header, stats, transcript, feedback, input] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(4),
    ])
    .areas(f.area());

    draw_header(f, app, header);
    draw_stats(f, app, stats);
    draw_transcript(f, app, transcript);
    draw_feedback(f, app, feedback);
    draw_user_input(f, app, input);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let (Some(scenario), Some(persona)) = (app.session.scenario(), app.session.persona()) else {
        return;
    };
    let mood = app
        .session
        .messages()
        .iter()
        .rev()
        .find_map(Message::mood)
        .unwrap_or_default();

    let header = Line::from(vec![
        Span::styled(
            scenario.title.clone(),
            Style::default()
                .fg(theme_color(&scenario.theme))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  vs  "),
        Span::styled(persona.name.clone(), Style::default().fg(Color::Green)),
        Span::styled(format!("  [{mood}]"), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(header).alignment(Alignment::Center), area);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let Some(scenario) = app.session.scenario() else {
        return;
    };
    let [gauge_area, turns_area] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(16)]).areas(area);

    let score = app.session.score();
    let color = match app.session.score_band() {
        Some(ScoreBand::Reached) => Color::Green,
        Some(ScoreBand::Near) => Color::Yellow,
        _ => Color::Red,
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" 说服度 ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(f64::from(score.clamp(0, MAX_SCORE)) / f64::from(MAX_SCORE))
        .label(format!("{score} / {}", scenario.winning_score));
    f.render_widget(gauge, gauge_area);

    let turns_left = app.session.turns_left().unwrap_or(0).max(0);
    let turns = Paragraph::new(format!("{turns_left} / {}", scenario.turn_limit))
        .alignment(Alignment::Center)
        .style(Style::default().fg(if turns_left <= 2 {
            Color::Red
        } else {
            Color::White
        }))
        .block(
            Block::default()
                .title(" 剩余回合 ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(turns, turns_area);
}

fn draw_transcript(f: &mut Frame, app: &App, area: Rect) {
    let persona_name = app
        .session
        .persona()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);

    let lines = transcript_lines(app.session.messages(), &persona_name);
    let width = usize::from(inner.width.max(1));
    let total_height: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    let scroll = total_height.saturating_sub(usize::from(inner.height));

    let transcript = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    f.render_widget(transcript, area);
}

pub fn transcript_lines(messages: &[Message], persona_name: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        match message.role() {
            Role::User => {
                lines.push(
                    Line::from(Span::styled(
                        format!("你：{}", message.content()),
                        Style::default().fg(Color::Cyan),
                    ))
                    .alignment(Alignment::Right),
                );
            }
            Role::Ai => {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{persona_name}："),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(message.content().to_string(), Style::default().fg(Color::Green)),
                ]));
                let delta = match message.score_delta() {
                    Some(delta) if delta > 0 => format!(" +{delta}"),
                    Some(delta) if delta < 0 => format!(" {delta}"),
                    _ => String::new(),
                };
                lines.push(Line::from(Span::styled(
                    format!("  [{}]{delta}", message.mood().unwrap_or_default()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        lines.push(Line::default());
    }
    lines
}

fn draw_feedback(f: &mut Frame, app: &App, area: Rect) {
    let Some(feedback) = app.session.last_feedback() else {
        return;
    };
    let hint = Paragraph::new(format!("提示：{feedback}"))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    f.render_widget(hint, area);
}

fn draw_user_input(f: &mut Frame, app: &mut App, area: Rect) {
    let awaiting = app.session.is_awaiting_response();
    let title = if awaiting {
        let name = app.session.persona().map_or("", |p| p.name.as_str());
        spinner_frame(&app.spinner, name)
    } else {
        PLAYING_HINT.to_string()
    };
    let active = app.session.phase() == GamePhase::Playing && !awaiting;

    app.input.set_block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(if active {
                Color::White
            } else {
                Color::DarkGray
            })),
    );
    app.input.set_cursor_style(if active {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    f.render_widget(&app.input, area);
}
