// src/prompt.rs
use serde_json::{Value, json};

use crate::message::{Message, Role};
use crate::scenario::{MAX_SCORE, Persona, Scenario};
use crate::strategy::{GameMetrics, Strategy};

pub const PLAYER_LABEL: &str = "Player";
pub const RESPONSE_SCHEMA_NAME: &str = "negotiation_turn";

/// Everything the generation service needs to produce one opponent reply.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub strategy: Strategy,
    pub instructions: String,
    pub transcript: String,
    pub response_schema: Value,
}

impl GenerationRequest {
    /// Full prompt sent as a single user message.
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\n--- CONVERSATION HISTORY ---\n{}\n----------------------------\n\nGenerate the next turn response in JSON.",
            self.instructions, self.transcript
        )
    }
}

pub fn build_request(
    scenario: &Scenario,
    persona: &Persona,
    history: &[Message],
    current_score: i32,
    strategy: Strategy,
) -> GenerationRequest {
    let metrics = GameMetrics::from_history(scenario, history);

    GenerationRequest {
        strategy,
        instructions: instructions(scenario, persona, &metrics, current_score, strategy),
        transcript: render_transcript(persona, history),
        response_schema: response_schema(),
    }
}

fn instructions(
    scenario: &Scenario,
    persona: &Persona,
    metrics: &GameMetrics,
    current_score: i32,
    strategy: Strategy,
) -> String {
    format!(
        r#"You are a roleplay game engine.
You are playing the role of: {name} ({title}).
The user is playing: {user_role}.

--- CHARACTER PROFILE ---
NAME: {name}
DESCRIPTION: {description}
PERSONALITY STYLE: {style} (Adopt this tone strictly!)

--- SCENARIO INFO ---
SCENARIO: {scenario}
USER GOAL: {goal}

--- GAME STATE ---
CURRENT PERSUASION SCORE: {score}/{max}
WINNING SCORE NEEDED: {winning}
TURNS REMAINING: {turns_left}

--- STRATEGY INSTRUCTION ---
ACTIVE STRATEGY: **{strategy}**
DIRECTIVE: {directive}

--- RULES ---
1. **IMPORTANT**: YOU MUST SPEAK CHINESE (Simplified Chinese).
2. Act fully in character according to your PERSONALITY STYLE.
3. Adjust 'scoreDelta' based on argument quality (-15 to +15).
4. If score reaches {winning}, you MUST accept (isWin=true).
5. If turns run out (0 left) and score is below winning score, you MUST reject (Loss).
6. Keep response concise (under 50 words).

Output strictly in JSON matching the schema."#,
        name = persona.name,
        title = scenario.title,
        user_role = scenario.user_role,
        description = persona.description,
        style = persona.style,
        scenario = scenario.description,
        goal = scenario.goal,
        score = current_score,
        max = MAX_SCORE,
        winning = scenario.winning_score,
        turns_left = metrics.turns_left,
        strategy = strategy.name(),
        directive = strategy.directive(),
    )
}

pub fn render_transcript(persona: &Persona, history: &[Message]) -> String {
    history
        .iter()
        .map(|message| {
            let speaker = match message.role() {
                Role::User => PLAYER_LABEL,
                Role::Ai => persona.name.as_str(),
            };
            format!("{speaker}: {}", message.content())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shape every reply must match. Mirrors `TurnResult`.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": {
                "type": "string",
                "description": "The in-character response from the AI role (IN CHINESE)."
            },
            "scoreDelta": {
                "type": "integer",
                "description": "The change in persuasion score (-15 to +15) based on the user's latest argument quality."
            },
            "aiMood": {
                "type": "string",
                "description": "One word describing the AI's current emotion (e.g. Angry, Impressed, Skeptical, Happy) IN CHINESE."
            },
            "feedback": {
                "type": "string",
                "description": "A very short (max 10 words) out-of-character hint or observation about the user's move IN CHINESE."
            },
            "isGameOver": {
                "type": "boolean",
                "description": "True if the conversation has naturally reached a conclusion (either success or total failure)."
            },
            "isWin": {
                "type": "boolean",
                "description": "True ONLY if the user has definitively achieved their goal within the narrative."
            }
        },
        "required": ["text", "scoreDelta", "aiMood", "isGameOver", "isWin"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Catalog;

    fn setup() -> (Scenario, Persona, Vec<Message>) {
        let scenario = Catalog::builtin()
            .unwrap()
            .get("used-car")
            .unwrap()
            .clone();
        let persona = scenario.persona("impatient-owner").unwrap().clone();
        let history = vec![
            Message::opening(persona.initial_message.clone()),
            Message::user("车门有锈，10000 元吧"),
            Message::ai("做梦！", "愤怒", -5),
            Message::user("那我去别家看看"),
        ];
        (scenario, persona, history)
    }

    #[test]
    fn transcript_alternates_speakers_in_order() {
        let (_, persona, history) = setup();
        let transcript = render_transcript(&persona, &history);
        let lines: Vec<_> = transcript.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("急躁的私家车主: 看好了没"));
        assert_eq!(lines[1], "Player: 车门有锈，10000 元吧");
        assert_eq!(lines[2], "急躁的私家车主: 做梦！");
        assert_eq!(lines[3], "Player: 那我去别家看看");
    }

    #[test]
    fn instructions_carry_state_and_directive() {
        let (scenario, persona, history) = setup();
        let request = build_request(&scenario, &persona, &history, 15, Strategy::Dominant);

        assert_eq!(request.strategy, Strategy::Dominant);
        let text = &request.instructions;
        assert!(text.contains("NAME: 急躁的私家车主"));
        assert!(text.contains("PERSONALITY STYLE: Rude, Hasty, Aggressive, Take-it-or-leave-it"));
        assert!(text.contains("USER GOAL: 以 10,000 元或更低的价格买下车。"));
        assert!(text.contains("CURRENT PERSUASION SCORE: 15/100"));
        assert!(text.contains("WINNING SCORE NEEDED: 80"));
        assert!(text.contains("TURNS REMAINING: 8"));
        assert!(text.contains("ACTIVE STRATEGY: **DOMINANT**"));
        assert!(text.contains("DIRECTIVE: Dismissive, skeptical; make the user work harder."));
        assert!(text.contains("Simplified Chinese"));
        assert!(text.contains("under 50 words"));
        assert!(text.contains("If score reaches 80, you MUST accept (isWin=true)."));
    }

    #[test]
    fn prompt_includes_transcript_after_instructions() {
        let (scenario, persona, history) = setup();
        let request = build_request(&scenario, &persona, &history, 20, Strategy::Standard);
        let prompt = request.prompt();
        let rules = prompt.find("--- RULES ---").unwrap();
        let transcript = prompt.find("Player: 那我去别家看看").unwrap();
        assert!(rules < transcript);
        assert!(prompt.ends_with("Generate the next turn response in JSON."));
    }

    #[test]
    fn schema_requires_turn_result_fields() {
        let schema = response_schema();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, ["text", "scoreDelta", "aiMood", "isGameOver", "isWin"]);
        assert!(schema["properties"]["feedback"].is_object());
    }

    #[test]
    fn building_is_deterministic() {
        let (scenario, persona, history) = setup();
        let a = build_request(&scenario, &persona, &history, 42, Strategy::Closing);
        let b = build_request(&scenario, &persona, &history, 42, Strategy::Closing);
        assert_eq!(a, b);
    }
}
