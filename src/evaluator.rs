// src/evaluator.rs
use crate::ai_response::TurnResult;
use crate::message::{Message, count_user_turns};
use crate::scenario::{MAX_SCORE, Scenario};
use crate::session::GamePhase;

/// What a single opponent reply does to the game.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub score: i32,
    pub phase: GamePhase,
    pub message: Message,
    pub feedback: Option<String>,
}

/// Applies a reply to the running score and decides the next phase.
///
/// `history` must already contain the user message this reply answers. The
/// collaborator's `is_win`/`is_game_over` flags are advisory: reaching the
/// winning score always wins, and running out of turns always ends the game.
pub fn apply_turn(
    scenario: &Scenario,
    history: &[Message],
    current_score: i32,
    result: &TurnResult,
) -> TurnOutcome {
    let score = current_score
        .saturating_add(result.score_delta)
        .clamp(0, MAX_SCORE);
    let message = Message::ai(
        result.text.clone(),
        result.ai_mood.clone(),
        result.recorded_delta(),
    );

    let reached_goal = score >= scenario.winning_score;
    let out_of_turns = count_user_turns(history) >= scenario.turn_limit;

    let phase = if result.is_win || reached_goal {
        GamePhase::Won
    } else if result.is_game_over || out_of_turns {
        // the goal check above already covers a game-over reply that reached the threshold
        GamePhase::Lost
    } else {
        GamePhase::Playing
    };

    TurnOutcome {
        score,
        phase,
        message,
        feedback: result.feedback.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::scenario::Catalog;

    fn salary() -> Scenario {
        Catalog::builtin()
            .unwrap()
            .get("salary-negotiation")
            .unwrap()
            .clone()
    }

    fn reply(delta: i32) -> TurnResult {
        TurnResult {
            text: "嗯".into(),
            score_delta: delta,
            ai_mood: "思考".into(),
            is_game_over: false,
            is_win: false,
            feedback: None,
        }
    }

    fn history_with_user_turns(turns: u32) -> Vec<Message> {
        let mut history = vec![Message::opening("hi")];
        for i in 0..turns {
            if i > 0 {
                history.push(Message::ai("...", "Calm", 0));
            }
            history.push(Message::user(format!("turn {i}")));
        }
        history
    }

    #[test]
    fn score_moves_by_delta() {
        let outcome = apply_turn(&salary(), &history_with_user_turns(1), 30, &reply(10));
        assert_eq!(outcome.score, 40);
        assert_eq!(outcome.phase, GamePhase::Playing);
        assert_eq!(outcome.message.role(), Role::Ai);
        assert_eq!(outcome.message.score_delta(), Some(10));
        assert_eq!(outcome.message.mood(), Some("思考"));
    }

    #[test]
    fn score_is_clamped() {
        let history = history_with_user_turns(1);
        assert_eq!(apply_turn(&salary(), &history, 5, &reply(-15)).score, 0);
        assert_eq!(apply_turn(&salary(), &history, 0, &reply(i32::MIN)).score, 0);
        assert_eq!(apply_turn(&salary(), &history, 95, &reply(i32::MAX)).score, 100);
    }

    #[test]
    fn reaching_winning_score_wins_without_flag() {
        let outcome = apply_turn(&salary(), &history_with_user_turns(3), 80, &reply(5));
        assert_eq!(outcome.score, 85);
        assert_eq!(outcome.phase, GamePhase::Won);
    }

    #[test]
    fn win_flag_wins_below_threshold() {
        let mut result = reply(2);
        result.is_win = true;
        let outcome = apply_turn(&salary(), &history_with_user_turns(2), 50, &result);
        assert_eq!(outcome.phase, GamePhase::Won);
    }

    #[test]
    fn threshold_overrides_game_over_without_win() {
        let mut result = reply(15);
        result.is_game_over = true;
        let outcome = apply_turn(&salary(), &history_with_user_turns(4), 75, &result);
        assert_eq!(outcome.phase, GamePhase::Won);
    }

    #[test]
    fn game_over_below_threshold_loses() {
        let mut result = reply(-5);
        result.is_game_over = true;
        let outcome = apply_turn(&salary(), &history_with_user_turns(2), 40, &result);
        assert_eq!(outcome.phase, GamePhase::Lost);
    }

    #[test]
    fn final_turn_is_inclusive() {
        let scenario = salary();
        let seventh = apply_turn(&scenario, &history_with_user_turns(7), 40, &reply(0));
        assert_eq!(seventh.phase, GamePhase::Playing);

        let eighth = apply_turn(&scenario, &history_with_user_turns(8), 40, &reply(0));
        assert_eq!(eighth.phase, GamePhase::Lost);
    }

    #[test]
    fn recorded_delta_stays_in_range_while_score_uses_raw_delta() {
        let outcome = apply_turn(&salary(), &history_with_user_turns(8), 40, &reply(50));
        assert_eq!(outcome.score, 90);
        assert_eq!(outcome.phase, GamePhase::Won);
        assert_eq!(outcome.message.score_delta(), Some(15));
    }

    #[test]
    fn carries_feedback() {
        let mut result = reply(3);
        result.feedback = Some("论据清晰".into());
        let outcome = apply_turn(&salary(), &history_with_user_turns(1), 30, &result);
        assert_eq!(outcome.feedback.as_deref(), Some("论据清晰"));
    }
}
