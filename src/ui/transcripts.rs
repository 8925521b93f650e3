// src/ui/transcripts.rs

use super::{
    constants::{BROWSER_HINT, VIEWER_HINT},
    draw::center_rect,
    game::transcript_lines,
    menu::{render_header, render_status},
};
use crate::{
    app::{App, TranscriptBrowser},
    save::Transcript,
    session::GamePhase,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::*,
};

pub fn draw_transcripts(f: &mut Frame, app: &mut App) {
    let [header, body, status] = Layout::vertical([
        Constraint::Max(1),
        Constraint::Min(5),
        Constraint::Max(1),
    ])
    .areas(f.area());

    render_header(f, header);
    let status_text = app.status.clone();
    let Some(browser) = app.browser.as_mut() else {
        return;
    };
    let hint = match &browser.opened {
        Some(transcript) => {
            draw_viewer(f, transcript, browser.scroll, body);
            VIEWER_HINT
        }
        None => {
            draw_list(f, browser, body);
            BROWSER_HINT
        }
    };
    render_status(f, status_text.as_deref(), hint, status);
}

fn draw_list(f: &mut Frame, browser: &mut TranscriptBrowser, area: Rect) {
    let items: Vec<ListItem> = browser
        .names
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(" 对局记录 ")
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
    f.render_stateful_widget(list, list_area, &mut browser.state);
}

fn draw_viewer(f: &mut Frame, transcript: &Transcript, scroll: u16, area: Rect) {
    let [summary, body] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(3)]).areas(area);

    f.render_widget(
        Paragraph::new(summary_lines(transcript)).alignment(Alignment::Center),
        summary,
    );

    let lines = transcript_lines(&transcript.messages, &transcript.persona_name);
    let viewer = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(viewer, body);
}

fn summary_lines(transcript: &Transcript) -> Vec<Line<'static>> {
    let (outcome, color) = match transcript.outcome {
        GamePhase::Won => ("成功", Color::Green),
        _ => ("失败", Color::Red),
    };
    vec![
        Line::from(vec![
            Span::styled(
                transcript.scenario_title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  vs  "),
            Span::styled(transcript.persona_name.clone(), Style::default().fg(Color::Green)),
            Span::styled(format!("  {outcome}"), Style::default().fg(color)),
        ]),
        Line::from(Span::styled(
            format!(
                "最终 {} / 目标 {}  保存于 {}",
                transcript.final_score, transcript.winning_score, transcript.saved_at
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_outcome_and_score() {
        let transcript = Transcript {
            scenario_id: "used-car".into(),
            scenario_title: "二手车交易".into(),
            persona_id: "emotional-student".into(),
            persona_name: "含泪卖车的留学生".into(),
            outcome: GamePhase::Won,
            final_score: 85,
            winning_score: 80,
            saved_at: "2026-10-19T10:00:00+08:00".into(),
            messages: Vec::new(),
        };
        let text: Vec<String> = summary_lines(&transcript)
            .iter()
            .map(|l| l.to_string())
            .collect();

        assert_eq!(text[0], "二手车交易  vs  含泪卖车的留学生  成功");
        assert!(text[1].starts_with("最终 85 / 目标 80"));
    }
}
