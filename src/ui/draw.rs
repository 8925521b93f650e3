// ui/draw.rs

use crate::app::App;
use crate::session::GamePhase;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};

use super::{game, menu, persona_select, result, transcripts};

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 20;

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();
    if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
        let warning = Paragraph::new("Terminal too small. Please resize.")
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center);
        f.render_widget(warning, size);
        return;
    }

    match app.session.phase() {
        GamePhase::Menu if app.browser.is_some() => transcripts::draw_transcripts(f, app),
        GamePhase::Menu => menu::draw_menu(f, app),
        GamePhase::PersonaSelect => persona_select::draw_persona_select(f, app),
        GamePhase::Playing => game::draw_in_game(f, app),
        GamePhase::Won | GamePhase::Lost => {
            game::draw_in_game(f, app);
            result::draw_result(f, app);
        }
    }
}

pub fn center_rect(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}
