// src/scenario.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use strum_macros::{Display, EnumIter};

use crate::error::CatalogError;

const BUILTIN_SCENARIOS: &str = include_str!("../assets/scenarios.json");

pub const MAX_SCORE: i32 = 100;
pub const MAX_TURN_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
            Difficulty::Extreme => "极难",
        }
    }
}

/// One opponent the player can negotiate against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Tone guidance handed to the model verbatim.
    pub style: String,
    pub initial_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub user_role: String,
    pub goal: String,
    pub turn_limit: u32,
    pub base_score: i32,
    pub winning_score: i32,
    pub theme: String,
    pub icon: String,
    pub personas: Vec<Persona>,
}

impl Scenario {
    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|persona| persona.id == id)
    }

    /// Scenarios with a single embedded opponent skip persona selection.
    pub fn has_persona_choice(&self) -> bool {
        self.personas.len() > 1
    }

    pub fn sole_persona(&self) -> Option<&Persona> {
        match self.personas.as_slice() {
            [persona] => Some(persona),
            _ => None,
        }
    }

    /// Turns remaining after `user_turns`; negative once the limit is passed.
    pub fn turns_left(&self, user_turns: u32) -> i32 {
        let limit = i32::try_from(self.turn_limit).unwrap_or(i32::MAX);
        let used = i32::try_from(user_turns).unwrap_or(i32::MAX);
        limit.saturating_sub(used)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidScenario {
            scenario: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.personas.is_empty() {
            return Err(invalid("no personas"));
        }
        if self.turn_limit == 0 {
            return Err(invalid("turn limit must be positive"));
        }
        if self.turn_limit > MAX_TURN_LIMIT {
            return Err(invalid("turn limit too large"));
        }
        if !(0..=MAX_SCORE).contains(&self.base_score) {
            return Err(invalid("base score out of range"));
        }
        if !(0..=MAX_SCORE).contains(&self.winning_score) {
            return Err(invalid("winning score out of range"));
        }
        if self.winning_score < self.base_score {
            return Err(invalid("winning score below base score"));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.personas.iter().find(|p| !seen.insert(p.id.as_str())) {
            return Err(invalid(&format!("duplicate persona id {}", duplicate.id)));
        }
        Ok(())
    }
}

/// Read-only scenario catalog, validated once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for scenario in &scenarios {
            scenario.validate()?;
            if !seen.insert(scenario.id.as_str()) {
                return Err(CatalogError::DuplicateScenario(scenario.id.clone()));
            }
        }
        Ok(Self { scenarios })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_SCENARIOS)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let scenarios: Vec<Scenario> = serde_json::from_str(json)?;
        Self::new(scenarios)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|scenario| scenario.id == id)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().expect("builtin catalog should parse");
        assert_eq!(catalog.len(), 5);

        let salary = catalog.get("salary-negotiation").unwrap();
        assert_eq!(salary.turn_limit, 8);
        assert_eq!(salary.base_score, 30);
        assert_eq!(salary.winning_score, 85);
        assert_eq!(salary.personas.len(), 3);
        assert!(salary.has_persona_choice());
        assert!(salary.persona("data-cto").is_some());
    }

    #[test]
    fn single_persona_scenario_has_no_choice() {
        let catalog = Catalog::builtin().unwrap();
        let rent = catalog.get("rent-renewal").unwrap();
        assert!(!rent.has_persona_choice());
        assert_eq!(rent.sole_persona().unwrap().id, "calculating-landlord");
    }

    #[test]
    fn rejects_unwinnable_scenario() {
        let mut scenario = Catalog::builtin().unwrap().scenarios()[0].clone();
        scenario.winning_score = scenario.base_score - 1;
        assert!(matches!(
            Catalog::new(vec![scenario]),
            Err(CatalogError::InvalidScenario { .. })
        ));
    }

    #[test]
    fn rejects_scenario_without_personas() {
        let mut scenario = Catalog::builtin().unwrap().scenarios()[0].clone();
        scenario.personas.clear();
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("no personas"));
    }

    #[test]
    fn rejects_oversized_turn_limit() {
        let mut scenario = Catalog::builtin().unwrap().scenarios()[0].clone();
        scenario.turn_limit = MAX_TURN_LIMIT;
        assert!(scenario.validate().is_ok());

        scenario.turn_limit = u32::MAX;
        let err = scenario.validate().unwrap_err();
        assert!(err.to_string().contains("turn limit too large"));
    }

    #[test]
    fn turns_left_never_wraps() {
        let mut scenario = Catalog::builtin().unwrap().scenarios()[0].clone();
        assert_eq!(scenario.turns_left(3), 5);
        assert_eq!(scenario.turns_left(9), -1);

        scenario.turn_limit = u32::MAX;
        assert_eq!(scenario.turns_left(0), i32::MAX);
        scenario.turn_limit = 0;
        assert_eq!(scenario.turns_left(u32::MAX), -i32::MAX);
    }

    #[test]
    fn rejects_duplicate_scenarios() {
        let scenario = Catalog::builtin().unwrap().scenarios()[0].clone();
        assert!(matches!(
            Catalog::new(vec![scenario.clone(), scenario]),
            Err(CatalogError::DuplicateScenario(_))
        ));
        assert!(matches!(Catalog::new(vec![]), Err(CatalogError::Empty)));
    }

    #[test]
    fn loads_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let builtin = Catalog::builtin().unwrap();
        let subset = &builtin.scenarios()[..2];
        std::fs::write(&path, serde_json::to_string(subset).unwrap()).unwrap();

        let loaded = Catalog::load_from_file(&path).unwrap();
        assert_eq!(loaded.scenarios(), subset);

        let missing = Catalog::load_from_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(CatalogError::Read { .. })));
    }

    #[test]
    fn difficulty_labels() {
        let labels: Vec<_> = Difficulty::iter().map(|d| d.label()).collect();
        assert_eq!(labels, ["简单", "中等", "困难", "极难"]);
        assert_eq!(Difficulty::Extreme.to_string(), "Extreme");
    }
}
