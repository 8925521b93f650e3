// src/session.rs
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;

use crate::ai::GameAI;
use crate::ai_response::TurnResult;
use crate::evaluator::{TurnOutcome, apply_turn};
use crate::message::{Message, count_user_turns};
use crate::prompt::{GenerationRequest, build_request};
use crate::scenario::{Persona, Scenario};
use crate::strategy::select_strategy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum GamePhase {
    #[default]
    Menu,
    PersonaSelect,
    Playing,
    Won,
    Lost,
}

impl GamePhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Where the score sits relative to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Low,
    Near,
    Reached,
}

impl ScoreBand {
    pub fn classify(score: i32, winning_score: i32) -> Self {
        if score >= winning_score {
            ScoreBand::Reached
        } else if score * 10 > winning_score * 6 {
            ScoreBand::Near
        } else {
            ScoreBand::Low
        }
    }
}

/// A generation request that occupies the session's single in-flight slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTurn {
    pub id: Uuid,
    pub request: GenerationRequest,
}

/// The mutable state of one game.
///
/// Every transition is guarded: calling one from the wrong phase leaves the
/// session untouched and reports `false`/`None`.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    scenario: Option<Scenario>,
    persona: Option<Persona>,
    messages: Vec<Message>,
    score: i32,
    phase: GamePhase,
    pending: Option<Uuid>,
    last_feedback: Option<String>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn last_feedback(&self) -> Option<&str> {
        self.last_feedback.as_deref()
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.pending.is_some()
    }

    pub fn user_turns(&self) -> u32 {
        count_user_turns(&self.messages)
    }

    pub fn turns_left(&self) -> Option<i32> {
        self.scenario
            .as_ref()
            .map(|s| s.turns_left(self.user_turns()))
    }

    pub fn score_band(&self) -> Option<ScoreBand> {
        self.scenario
            .as_ref()
            .map(|s| ScoreBand::classify(self.score, s.winning_score))
    }

    /// MENU -> PERSONA_SELECT, or straight to PLAYING for a single-opponent scenario.
    pub fn choose_scenario(&mut self, scenario: Scenario) -> bool {
        if self.phase != GamePhase::Menu || scenario.personas.is_empty() {
            log::debug!("Ignoring scenario selection in phase {}", self.phase);
            return false;
        }

        let sole = scenario.sole_persona().cloned();
        self.scenario = Some(scenario);
        match sole {
            Some(persona) => self.start(persona),
            None => self.phase = GamePhase::PersonaSelect,
        }
        true
    }

    /// PERSONA_SELECT -> PLAYING.
    pub fn choose_persona(&mut self, persona_id: &str) -> bool {
        if self.phase != GamePhase::PersonaSelect {
            log::debug!("Ignoring persona selection in phase {}", self.phase);
            return false;
        }
        let Some(persona) = self
            .scenario
            .as_ref()
            .and_then(|s| s.persona(persona_id))
            .cloned()
        else {
            log::debug!("Unknown persona {persona_id}");
            return false;
        };
        self.start(persona);
        true
    }

    fn start(&mut self, persona: Persona) {
        let base_score = self.scenario.as_ref().map_or(0, |s| s.base_score);
        log::info!("Starting negotiation against {}", persona.name);
        self.score = base_score;
        self.messages = vec![Message::opening(persona.initial_message.clone())];
        self.persona = Some(persona);
        self.pending = None;
        self.last_feedback = None;
        self.phase = GamePhase::Playing;
    }

    /// Appends the player's message and claims the in-flight slot.
    ///
    /// Returns `None` for blank input, outside PLAYING, or while another turn
    /// is still waiting for its reply.
    pub fn begin_turn(&mut self, input: &str) -> Option<PendingTurn> {
        let text = input.trim();
        if text.is_empty() || self.phase != GamePhase::Playing || self.pending.is_some() {
            log::debug!(
                "Rejected submission (phase {}, awaiting {})",
                self.phase,
                self.pending.is_some()
            );
            return None;
        }
        let (scenario, persona) = (self.scenario.as_ref()?, self.persona.as_ref()?);

        self.messages.push(Message::user(text));
        let strategy = select_strategy(scenario, &self.messages, self.score);
        log::debug!("Turn {} strategy: {}", self.user_turns(), strategy);
        let request = build_request(scenario, persona, &self.messages, self.score, strategy);

        let id = Uuid::new_v4();
        self.pending = Some(id);
        Some(PendingTurn { id, request })
    }

    /// Resolves the pending turn. Results for any other turn id are dropped.
    pub fn complete_turn(&mut self, turn_id: Uuid, result: TurnResult) -> Option<TurnOutcome> {
        if self.pending != Some(turn_id) {
            log::debug!("Dropping result for stale turn {turn_id}");
            return None;
        }
        self.pending = None;
        let scenario = self.scenario.as_ref()?;

        let outcome = apply_turn(scenario, &self.messages, self.score, &result);
        self.score = outcome.score;
        self.messages.push(outcome.message.clone());
        self.last_feedback = outcome.feedback.clone();
        if outcome.phase != self.phase {
            log::info!("Game {} with score {}", outcome.phase, outcome.score);
        }
        self.phase = outcome.phase;
        Some(outcome)
    }

    /// Runs a whole turn against the collaborator.
    pub async fn submit(&mut self, input: &str, ai: &GameAI) -> Option<TurnOutcome> {
        let pending = self.begin_turn(input)?;
        let result = ai.generate_turn(&pending.request).await;
        self.complete_turn(pending.id, result)
    }

    /// WON/LOST -> PERSONA_SELECT with the same scenario.
    pub fn retry(&mut self) -> bool {
        if !self.phase.is_finished() {
            return false;
        }
        self.reset_to_persona_select();
        true
    }

    /// PLAYING -> PERSONA_SELECT, giving up the current negotiation.
    pub fn abandon(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.pending.is_some() {
            return false;
        }
        let single = self.scenario.as_ref().is_some_and(|s| !s.has_persona_choice());
        if single {
            self.reset_to_menu();
        } else {
            self.reset_to_persona_select();
        }
        true
    }

    /// PERSONA_SELECT/WON/LOST -> MENU.
    pub fn return_to_menu(&mut self) -> bool {
        match self.phase {
            GamePhase::PersonaSelect | GamePhase::Won | GamePhase::Lost => {
                self.reset_to_menu();
                true
            }
            _ => false,
        }
    }

    fn reset_to_persona_select(&mut self) {
        let sole = self.scenario.as_ref().and_then(|s| s.sole_persona()).cloned();
        self.clear_game();
        match sole {
            Some(persona) => self.start(persona),
            None => self.phase = GamePhase::PersonaSelect,
        }
    }

    fn reset_to_menu(&mut self) {
        self.clear_game();
        self.scenario = None;
        self.phase = GamePhase::Menu;
    }

    fn clear_game(&mut self) {
        self.persona = None;
        self.messages.clear();
        self.score = 0;
        self.pending = None;
        self.last_feedback = None;
    }
}
