// src/strategy.rs
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

use crate::message::{Message, Role, count_user_turns};
use crate::scenario::Scenario;

/// How many recent scored opponent replies make up the momentum window.
const MOMENTUM_WINDOW: usize = 2;

/// Behavioral mode that conditions the opponent's next reply.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    Concede,
    FinalStand,
    Pressure,
    StalemateBreaker,
    Dominant,
    Closing,
    Standard,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    // The model is tuned against these exact strings.
    pub fn directive(&self) -> &'static str {
        match self {
            Strategy::Concede => "Accept the deal enthusiastically; finalize agreement.",
            Strategy::FinalStand => {
                "Last turn: accept if convincing and near goal; otherwise reject firmly and end."
            }
            Strategy::Pressure => "Impatient, threaten to walk away without a major concession.",
            Strategy::StalemateBreaker => {
                "Propose a concrete compromise to break the deadlock; constructive but firm."
            }
            Strategy::Dominant => "Dismissive, skeptical; make the user work harder.",
            Strategy::Closing => "Wavering; ask for one last small assurance before agreeing.",
            Strategy::Standard => "Respond naturally; evaluate logic fairly.",
        }
    }
}

/// Quantities derived from the transcript that drive strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameMetrics {
    pub user_turns: u32,
    /// Signed: reaches zero or below once the limit is used up.
    pub turns_left: i32,
    pub momentum: i32,
}

impl GameMetrics {
    pub fn from_history(scenario: &Scenario, history: &[Message]) -> Self {
        let user_turns = count_user_turns(history);
        Self {
            user_turns,
            turns_left: scenario.turns_left(user_turns),
            momentum: momentum(history),
        }
    }
}

/// Sum of the last two recorded opponent deltas. Replies without a delta do
/// not occupy a slot in the window.
pub fn momentum(history: &[Message]) -> i32 {
    history
        .iter()
        .rev()
        .filter(|m| m.role() == Role::Ai)
        .filter_map(Message::score_delta)
        .take(MOMENTUM_WINDOW)
        .sum()
}

pub fn select_strategy(scenario: &Scenario, history: &[Message], current_score: i32) -> Strategy {
    let metrics = GameMetrics::from_history(scenario, history);
    select_with_metrics(scenario, &metrics, current_score)
}

/// First matching rule wins; the order is part of the game's behavior.
pub fn select_with_metrics(scenario: &Scenario, metrics: &GameMetrics, score: i32) -> Strategy {
    let winning = scenario.winning_score;

    if score >= winning {
        Strategy::Concede
    } else if metrics.turns_left <= 1 {
        Strategy::FinalStand
    } else if metrics.turns_left <= 3 && score * 10 < winning * 6 {
        Strategy::Pressure
    } else if metrics.momentum.abs() <= 4 && metrics.user_turns >= 2 && score < winning - 10 {
        Strategy::StalemateBreaker
    } else if score < scenario.base_score && metrics.user_turns >= 2 {
        Strategy::Dominant
    } else if score > winning - 15 {
        Strategy::Closing
    } else {
        Strategy::Standard
    }
}
