// /app.rs
use crate::tui::{Tui, TuiEvent};
use crate::{
    ai::GameAI,
    ai_response::TurnResult,
    save::{Transcript, TranscriptStore},
    scenario::Catalog,
    session::{GamePhase, GameSession},
    settings::ApiKeyStatus,
    ui::{self, spinner::Spinner, textarea::new_textarea},
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tui_textarea::TextArea;
use uuid::Uuid;

pub const INPUT_PLACEHOLDER: &str = "输入你的论点，按 Enter 发送";
pub const NO_KEY_STATUS: &str = "未配置 OPENAI_API_KEY，对手将以离线回复应答";
pub const REJECTED_KEY_STATUS: &str = "API 密钥被拒绝，对手将以离线回复应答";
pub const UNREACHABLE_STATUS: &str = "暂时无法连接 OpenAI，对手的回复可能中断";

/// Read-only view over saved transcripts, opened from the menu.
pub struct TranscriptBrowser {
    pub names: Vec<String>,
    pub state: ListState,
    pub opened: Option<Transcript>,
    pub scroll: u16,
}

#[derive(Debug)]
pub enum Action {
    Quit,
    TurnResolved(Uuid, TurnResult),
}

pub struct App {
    running: bool,

    pub catalog: Catalog,
    pub session: GameSession,
    ai: GameAI,
    store: Option<TranscriptStore>,

    // --- UI elements
    pub input: TextArea<'static>,
    pub scenario_state: ListState,
    pub persona_state: ListState,
    pub spinner: Spinner,
    pub status: Option<String>,
    pub browser: Option<TranscriptBrowser>,

    action_sender: mpsc::UnboundedSender<Action>,
    action_receiver: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(catalog: Catalog, ai: GameAI, store: Option<TranscriptStore>) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();

        let status = (!ai.is_configured()).then(|| NO_KEY_STATUS.to_string());

        Self {
            running: true,
            catalog,
            session: GameSession::new(),
            ai,
            store,
            input: new_textarea(INPUT_PLACEHOLDER),
            scenario_state: ListState::default().with_selected(Some(0)),
            persona_state: ListState::default().with_selected(Some(0)),
            spinner: Spinner::new(),
            status,
            browser: None,
            action_sender,
            action_receiver,
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn report_key_status(&mut self, status: ApiKeyStatus) {
        match status {
            ApiKeyStatus::Valid => {}
            ApiKeyStatus::Rejected => self.set_status(REJECTED_KEY_STATUS),
            ApiKeyStatus::Unreachable => self.set_status(UNREACHABLE_STATUS),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(8.0) // spinner speed
            .frame_rate(30.0);

        tui.enter()?;

        while self.running {
            tui.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                Some(event) = tui.next() => self.handle_tui_event(event),
                Some(action) = self.action_receiver.recv() => self.handle_action(action),
            }
        }

        tui.exit()?;
        Ok(())
    }

    fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) => self.on_key(key_event),
            TuiEvent::Paste(text) => {
                if self.session.phase() == GamePhase::Playing {
                    self.input.insert_str(text);
                }
            }
            TuiEvent::Tick => {
                if self.session.is_awaiting_response() {
                    self.spinner.next_frame();
                }
            }
            TuiEvent::Error => log::warn!("Terminal event stream reported an error"),
            TuiEvent::Init | TuiEvent::Render | TuiEvent::Resize(_, _) => {}
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::TurnResolved(turn_id, result) => {
                if let Some(outcome) = self.session.complete_turn(turn_id, result) {
                    if outcome.phase.is_finished() {
                        self.status = None;
                    }
                }
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match self.session.phase() {
            GamePhase::Menu => self.on_menu_key(key),
            GamePhase::PersonaSelect => self.on_persona_key(key),
            GamePhase::Playing => self.on_playing_key(key),
            GamePhase::Won | GamePhase::Lost => self.on_result_key(key),
        }
    }

    fn on_menu_key(&mut self, key: KeyEvent) {
        if self.browser.is_some() {
            self.on_browser_key(key);
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scenario_state.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => {
                select_next_bounded(&mut self.scenario_state, self.catalog.len())
            }
            KeyCode::Enter => {
                let selected = self.scenario_state.selected().unwrap_or(0);
                if let Some(scenario) = self.catalog.scenarios().get(selected).cloned() {
                    self.status = None;
                    self.persona_state.select(Some(0));
                    self.session.choose_scenario(scenario);
                    self.input = new_textarea(INPUT_PLACEHOLDER);
                }
            }
            KeyCode::Char('l') => self.open_browser(),
            KeyCode::Char('q') | KeyCode::Esc => self.handle_action(Action::Quit),
            _ => {}
        }
    }

    fn open_browser(&mut self) {
        let Some(store) = &self.store else {
            self.status = Some("无法读取记录：找不到数据目录".into());
            return;
        };
        match store.list() {
            Ok(names) if names.is_empty() => {
                self.status = Some("还没有保存的对局记录".into());
            }
            Ok(names) => {
                self.status = None;
                self.browser = Some(TranscriptBrowser {
                    // newest first
                    names: names.into_iter().rev().collect(),
                    state: ListState::default().with_selected(Some(0)),
                    opened: None,
                    scroll: 0,
                });
            }
            Err(e) => {
                log::error!("Failed to list transcripts in {}: {e}", store.dir().display());
                self.status = Some(format!("读取记录失败：{e}"));
            }
        }
    }

    fn on_browser_key(&mut self, key: KeyEvent) {
        let Some(browser) = self.browser.as_mut() else {
            return;
        };

        if browser.opened.is_some() {
            match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    browser.scroll = browser.scroll.saturating_sub(1)
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    browser.scroll = browser.scroll.saturating_add(1)
                }
                KeyCode::Esc | KeyCode::Char('q') => {
                    browser.opened = None;
                    browser.scroll = 0;
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => browser.state.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => {
                select_next_bounded(&mut browser.state, browser.names.len())
            }
            KeyCode::Enter => {
                let selected = browser.state.selected().unwrap_or(0);
                let (Some(store), Some(name)) = (&self.store, browser.names.get(selected)) else {
                    return;
                };
                match store.load(name) {
                    Ok(transcript) => {
                        browser.opened = Some(transcript);
                        browser.scroll = 0;
                        self.status = None;
                    }
                    Err(e) => {
                        log::error!("Failed to load transcript {name}: {e}");
                        self.status = Some(format!("读取记录失败：{e}"));
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.browser = None;
                self.status = None;
            }
            _ => {}
        }
    }

    fn on_persona_key(&mut self, key: KeyEvent) {
        let persona_count = self.session.scenario().map_or(0, |s| s.personas.len());
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.persona_state.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => {
                select_next_bounded(&mut self.persona_state, persona_count)
            }
            KeyCode::Enter => {
                let selected = self.persona_state.selected().unwrap_or(0);
                let persona_id = self
                    .session
                    .scenario()
                    .and_then(|s| s.personas.get(selected))
                    .map(|p| p.id.clone());
                if let Some(persona_id) = persona_id {
                    self.session.choose_persona(&persona_id);
                    self.input = new_textarea(INPUT_PLACEHOLDER);
                }
            }
            KeyCode::Esc => {
                self.session.return_to_menu();
            }
            _ => {}
        }
    }

    fn on_playing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => {
                if self.session.abandon() {
                    self.persona_state.select(Some(0));
                    self.input = new_textarea(INPUT_PLACEHOLDER);
                }
            }
            _ => {
                self.input.input(key);
            }
        }
    }

    fn on_result_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                self.session.retry();
                self.persona_state.select(Some(0));
                self.input = new_textarea(INPUT_PLACEHOLDER);
                self.status = None;
            }
            KeyCode::Char('m') | KeyCode::Esc => {
                self.session.return_to_menu();
                self.status = None;
            }
            KeyCode::Char('s') => self.save_transcript(),
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        let input = self.input.lines().join("\n");
        let Some(pending) = self.session.begin_turn(&input) else {
            return;
        };
        self.input = new_textarea(INPUT_PLACEHOLDER);

        let ai = self.ai.clone();
        let sender = self.action_sender.clone();
        tokio::spawn(async move {
            let result = ai.generate_turn(&pending.request).await;
            if sender
                .send(Action::TurnResolved(pending.id, result))
                .is_err()
            {
                log::warn!("Turn {} resolved after the app closed", pending.id);
            }
        });
    }

    fn save_transcript(&mut self) {
        let Some(store) = &self.store else {
            self.status = Some("无法保存：找不到数据目录".into());
            return;
        };
        self.status = Some(match store.save_session(&self.session) {
            Ok(path) => format!("对局记录已保存到 {}", path.display()),
            Err(e) => {
                log::error!("Failed to save transcript: {e}");
                format!("保存失败：{e}")
            }
        });
    }
}

fn select_next_bounded(state: &mut ListState, len: usize) {
    let next = state.selected().map_or(0, |i| i + 1);
    if next < len {
        state.select(Some(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockTurnGenerator;
    use std::sync::Arc;
    use tokio::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn app_with(ai: GameAI) -> App {
        App::new(Catalog::builtin().unwrap(), ai, None)
    }

    #[test]
    fn menu_navigation_selects_scenario() {
        let mut app = app_with(GameAI::unconfigured(Duration::from_secs(1)));
        assert!(app.status.is_some());

        app.on_key(key(KeyCode::Up));
        assert_eq!(app.scenario_state.selected(), Some(0));
        for _ in 0..10 {
            app.on_key(key(KeyCode::Down));
        }
        assert_eq!(app.scenario_state.selected(), Some(app.catalog.len() - 1));

        app.scenario_state.select(Some(0));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.session.phase(), GamePhase::PersonaSelect);

        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.session.phase(), GamePhase::Menu);
    }

    #[test]
    fn ctrl_c_quits_from_any_phase() {
        let mut app = app_with(GameAI::unconfigured(Duration::from_secs(1)));
        app.on_key(key(KeyCode::Enter));
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.is_running());
    }

    #[tokio::test]
    async fn enter_submits_once_and_result_comes_back() {
        let mut generator = MockTurnGenerator::new();
        generator.expect_generate().times(1).returning(|_| {
            Ok(TurnResult {
                text: "有点意思".into(),
                score_delta: 10,
                ai_mood: "好奇".into(),
                is_game_over: false,
                is_win: false,
                feedback: None,
            })
        });
        let mut app = app_with(GameAI::new(Arc::new(generator), Duration::from_secs(1)));

        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.session.phase(), GamePhase::Playing);

        type_text(&mut app, "市场价更高");
        app.on_key(key(KeyCode::Enter));
        assert!(app.session.is_awaiting_response());
        assert!(app.input.lines().concat().is_empty());

        type_text(&mut app, "再考虑一下");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.session.user_turns(), 1);

        let action = app.action_receiver.recv().await.unwrap();
        app.handle_action(action);
        assert!(!app.session.is_awaiting_response());
        assert_eq!(app.session.score(), 40);
        assert_eq!(app.session.messages().len(), 3);
    }

    #[test]
    fn result_keys_retry_and_return_to_menu() {
        let mut app = app_with(GameAI::unconfigured(Duration::from_secs(1)));
        app.on_key(key(KeyCode::Enter));
        app.on_key(key(KeyCode::Enter));
        let pending = app.session.begin_turn("我要加薪").unwrap();
        let mut result = TurnResult::fallback();
        result.is_game_over = true;
        app.handle_action(Action::TurnResolved(pending.id, result));
        assert_eq!(app.session.phase(), GamePhase::Lost);

        app.on_key(key(KeyCode::Char('s')));
        assert!(app.status.as_deref().unwrap().starts_with("无法保存"));

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.session.phase(), GamePhase::PersonaSelect);

        app.on_key(key(KeyCode::Esc));
        assert_eq!(app.session.phase(), GamePhase::Menu);
    }

    #[test]
    fn key_check_outcome_shows_on_status_line() {
        let mut app = app_with(GameAI::unconfigured(Duration::from_secs(1)));
        assert_eq!(app.status.as_deref(), Some(NO_KEY_STATUS));

        app.report_key_status(ApiKeyStatus::Rejected);
        assert_eq!(app.status.as_deref(), Some(REJECTED_KEY_STATUS));

        app.report_key_status(ApiKeyStatus::Unreachable);
        assert_eq!(app.status.as_deref(), Some(UNREACHABLE_STATUS));

        app.status = None;
        app.report_key_status(ApiKeyStatus::Valid);
        assert!(app.status.is_none());
    }

    fn finished_session(catalog: &Catalog) -> GameSession {
        let mut session = GameSession::new();
        session.choose_scenario(catalog.get("used-car").unwrap().clone());
        session.choose_persona("emotional-student");
        let pending = session.begin_turn("我只能出 9000").unwrap();
        let mut result = TurnResult::fallback();
        result.is_game_over = true;
        session.complete_turn(pending.id, result);
        session
    }

    #[test]
    fn saved_games_open_read_only_from_menu() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        let catalog = Catalog::builtin().unwrap();
        store.save_session(&finished_session(&catalog)).unwrap();

        let mut app = App::new(
            catalog,
            GameAI::unconfigured(Duration::from_secs(1)),
            Some(store),
        );
        app.on_key(key(KeyCode::Char('l')));
        let browser = app.browser.as_ref().unwrap();
        assert_eq!(browser.names.len(), 1);
        assert!(browser.opened.is_none());

        app.on_key(key(KeyCode::Down));
        assert_eq!(app.browser.as_ref().unwrap().state.selected(), Some(0));

        app.on_key(key(KeyCode::Enter));
        let opened = app.browser.as_ref().unwrap().opened.as_ref().unwrap();
        assert_eq!(opened.outcome, GamePhase::Lost);
        assert_eq!(opened.messages.len(), 3);

        // typing inside the viewer must not start a game
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.session.phase(), GamePhase::Menu);

        app.on_key(key(KeyCode::Esc));
        assert!(app.browser.as_ref().unwrap().opened.is_none());
        app.on_key(key(KeyCode::Esc));
        assert!(app.browser.is_none());
        assert!(app.is_running());
        assert_eq!(app.session.phase(), GamePhase::Menu);
    }

    #[test]
    fn browser_stays_closed_without_saved_games() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(
            Catalog::builtin().unwrap(),
            GameAI::unconfigured(Duration::from_secs(1)),
            Some(TranscriptStore::new(dir.path().join("none"))),
        );
        app.on_key(key(KeyCode::Char('l')));
        assert!(app.browser.is_none());
        assert_eq!(app.status.as_deref(), Some("还没有保存的对局记录"));

        let mut app = app_with(GameAI::unconfigured(Duration::from_secs(1)));
        app.on_key(key(KeyCode::Char('l')));
        assert!(app.browser.is_none());
        assert!(app.status.as_deref().unwrap().starts_with("无法读取记录"));
    }
}
