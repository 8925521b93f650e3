use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::message::Message;
use crate::session::{GamePhase, GameSession};
use crate::settings::data_dir;

/// A finished negotiation, as written to disk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transcript {
    pub scenario_id: String,
    pub scenario_title: String,
    pub persona_id: String,
    pub persona_name: String,
    pub outcome: GamePhase,
    pub final_score: i32,
    pub winning_score: i32,
    pub saved_at: String,
    pub messages: Vec<Message>,
}

impl Transcript {
    /// Only won or lost games produce a transcript.
    pub fn from_session(session: &GameSession) -> Option<Self> {
        if !session.phase().is_finished() {
            return None;
        }
        let scenario = session.scenario()?;
        let persona = session.persona()?;

        Some(Self {
            scenario_id: scenario.id.clone(),
            scenario_title: scenario.title.clone(),
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            outcome: session.phase(),
            final_score: session.score(),
            winning_score: scenario.winning_score,
            saved_at: Local::now().to_rfc3339(),
            messages: session.messages().to_vec(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(data_dir()?.join("transcripts")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_session(&self, session: &GameSession) -> Result<PathBuf> {
        let transcript = Transcript::from_session(session).ok_or(AppError::NothingToSave)?;
        self.save(&transcript)
    }

    pub fn save(&self, transcript: &Transcript) -> Result<PathBuf> {
        create_dir_all(&self.dir)?;
        let name = format!(
            "{}-{}-{}.json",
            transcript.scenario_id,
            transcript.persona_id,
            Local::now().format("%Y%m%d-%H%M%S%3f")
        );
        let path = self.dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(transcript)?)?;
        log::info!("Transcript saved to {}", path.display());
        Ok(path)
    }

    /// Names of saved transcripts, oldest first.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.is_file() && path.extension()? == "json" {
                    path.file_stem()?.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<Transcript> {
        let data = fs::read_to_string(self.dir.join(format!("{name}.json")))?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_response::TurnResult;
    use crate::scenario::Catalog;

    fn finished_session() -> GameSession {
        let catalog = Catalog::builtin().unwrap();
        let mut session = GameSession::new();
        session.choose_scenario(catalog.get("used-car").unwrap().clone());
        session.choose_persona("emotional-student");
        let pending = session.begin_turn("我只能出 9000").unwrap();
        let mut result = TurnResult::fallback();
        result.is_win = true;
        session.complete_turn(pending.id, result);
        session
    }

    #[test]
    fn unfinished_sessions_cannot_be_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        assert!(matches!(
            store.save_session(&GameSession::new()),
            Err(AppError::NothingToSave)
        ));
    }

    #[test]
    fn saves_lists_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path().join("transcripts"));
        assert!(store.list().unwrap().is_empty());

        let session = finished_session();
        let path = store.save_session(&session).unwrap();
        assert!(path.starts_with(store.dir()));

        let names = store.list().unwrap();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("used-car-emotional-student-"));

        let loaded = store.load(&names[0]).unwrap();
        assert_eq!(loaded.outcome, GamePhase::Won);
        assert_eq!(loaded.final_score, 20);
        assert_eq!(loaded.messages, session.messages());
    }
}
