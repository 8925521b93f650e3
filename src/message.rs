use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai_response::MAX_SCORE_DELTA;
use crate::error::MessageError;

pub const OPENING_MOOD: &str = "Neutral";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One line of the negotiation transcript. Never mutated once appended.
///
/// Mood and score delta only exist on opponent messages; the constructors are
/// the only way to build a message, so a user message cannot carry either.
/// Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage")]
pub struct Message {
    id: Uuid,
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score_delta: Option<i32>,
}

#[derive(Deserialize)]
struct RawMessage {
    id: Uuid,
    role: Role,
    content: String,
    #[serde(default)]
    mood: Option<String>,
    #[serde(default)]
    score_delta: Option<i32>,
}

impl TryFrom<RawMessage> for Message {
    type Error = MessageError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        match raw.role {
            Role::User if raw.mood.is_some() || raw.score_delta.is_some() => {
                return Err(MessageError::UserWithOpponentFields);
            }
            Role::Ai if raw.mood.is_none() => return Err(MessageError::MissingMood),
            _ => {}
        }
        if let Some(delta) = raw.score_delta {
            if !(-MAX_SCORE_DELTA..=MAX_SCORE_DELTA).contains(&delta) {
                return Err(MessageError::DeltaOutOfRange(delta));
            }
        }

        Ok(Self {
            id: raw.id,
            role: raw.role,
            content: raw.content,
            mood: raw.mood,
            score_delta: raw.score_delta,
        })
    }
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            mood: None,
            score_delta: None,
        }
    }

    pub fn ai(content: impl Into<String>, mood: impl Into<String>, score_delta: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Ai,
            content: content.into(),
            mood: Some(mood.into()),
            score_delta: Some(score_delta),
        }
    }

    /// The opponent's first line: neutral mood, no recorded delta.
    pub fn opening(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Ai,
            content: content.into(),
            mood: Some(OPENING_MOOD.to_string()),
            score_delta: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn mood(&self) -> Option<&str> {
        self.mood.as_deref()
    }

    pub fn score_delta(&self) -> Option<i32> {
        self.score_delta
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

pub fn count_user_turns(history: &[Message]) -> u32 {
    u32::try_from(history.iter().filter(|m| m.is_user()).count()).unwrap_or(u32::MAX)
}
