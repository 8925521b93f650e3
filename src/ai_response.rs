// src/ai_response.rs
use serde::{Deserialize, Serialize};

use crate::error::AIError;

/// Range the opponent is asked to keep its score changes in.
pub const MAX_SCORE_DELTA: i32 = 15;

pub const FALLBACK_TEXT: &str = "（连接不稳定，请重试）... 我刚刚走神了，你说什么？";
pub const FALLBACK_MOOD: &str = "困惑";
pub const UNCONFIGURED_TEXT: &str = "（未配置 API 密钥）... 对方暂时无法回应，请先在设置中填写密钥。";
pub const UNCONFIGURED_MOOD: &str = "离线";

/// The structured answer the generation service returns for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub text: String,
    pub score_delta: i32,
    pub ai_mood: String,
    pub is_game_over: bool,
    pub is_win: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl TurnResult {
    /// Substituted for any failed, timed out or malformed generation call.
    pub fn fallback() -> Self {
        Self::neutral(FALLBACK_TEXT, FALLBACK_MOOD)
    }

    /// Returned on every turn when no credential was configured at startup.
    pub fn unconfigured() -> Self {
        Self::neutral(UNCONFIGURED_TEXT, UNCONFIGURED_MOOD)
    }

    fn neutral(text: &str, mood: &str) -> Self {
        Self {
            text: text.to_string(),
            score_delta: 0,
            ai_mood: mood.to_string(),
            is_game_over: false,
            is_win: false,
            feedback: None,
        }
    }

    /// Parses a model reply, tolerating prose or code fences around the object.
    pub fn from_json(raw: &str) -> Result<Self, AIError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AIError::EmptyResponse);
        }

        let body = match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => {
                return Err(AIError::TurnResultParse(format!(
                    "no JSON object in response: {trimmed}"
                )));
            }
        };

        let result: TurnResult = serde_json::from_str(body)?;
        if result.text.trim().is_empty() {
            return Err(AIError::TurnResultParse("empty text field".to_string()));
        }
        Ok(result)
    }

    /// The delta as recorded on the transcript, within the advertised range.
    pub fn recorded_delta(&self) -> i32 {
        self.score_delta.clamp(-MAX_SCORE_DELTA, MAX_SCORE_DELTA)
    }
}
