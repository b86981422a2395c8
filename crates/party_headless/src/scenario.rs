//! Scenario loading and configuration.
//!
//! A scenario bundles everything one battle needs: tuning constants, the
//! gear catalog, both parties and a strategy per side. Scenarios are RON
//! files; the default skirmish is also built into the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use party_core::data::PartyData;
use party_core::prelude::*;
use std::result::Result;

use crate::strategies::Strategy;

/// Built-in scenario used when no file is given.
pub const SKIRMISH_RON: &str = include_str!("../scenarios/skirmish.ron");

/// Name that resolves to [`SKIRMISH_RON`].
pub const SKIRMISH_NAME: &str = "skirmish";

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Scenario content is inconsistent (bad config, unknown gear, full party).
    #[error("Invalid scenario: {0}")]
    Invalid(#[from] CombatError),
}

/// A complete battle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Tuning constants.
    #[serde(default)]
    pub config: CombatConfig,
    /// Gear definitions referenced by party members.
    #[serde(default)]
    pub gear: Vec<GearDefinition>,
    /// Player party.
    pub player: PartyData,
    /// Enemy party.
    pub enemy: PartyData,
    /// Action strategy for the player party.
    #[serde(default)]
    pub player_strategy: Strategy,
    /// Action strategy for the enemy party.
    #[serde(default)]
    pub enemy_strategy: Strategy,
    /// Default seed when none is given on the command line.
    #[serde(default)]
    pub seed: u64,
    /// Rounds before a battle counts as stalled.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

const fn default_max_rounds() -> u32 {
    100
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// The config is validated here so a bad file fails before any battle.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    /// The built-in three-on-three skirmish.
    pub fn skirmish() -> Result<Self, ScenarioError> {
        Self::from_ron_str(SKIRMISH_RON)
    }

    /// Resolve a CLI argument: an existing file path, or a built-in name.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        let path = Path::new(name_or_path);
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading scenario file");
            return Self::load(path);
        }
        match name_or_path {
            SKIRMISH_NAME => Self::skirmish(),
            _ => Err(ScenarioError::FileNotFound(name_or_path.to_string())),
        }
    }

    /// Gear catalog built from the scenario's definitions.
    #[must_use]
    pub fn catalog(&self) -> GearCatalog {
        self.gear.iter().cloned().collect()
    }

    /// Build both live parties.
    pub fn parties(&self) -> Result<(Party, Party), ScenarioError> {
        let catalog = self.catalog();
        Ok((
            self.player.to_party(&catalog)?,
            self.enemy.to_party(&catalog)?,
        ))
    }

    /// Seed to use when the caller gives none.
    #[must_use]
    pub fn seed_or_default(&self, seed: Option<u64>) -> u64 {
        seed.unwrap_or(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_skirmish_parses() {
        let scenario = Scenario::skirmish().unwrap();
        assert_eq!(scenario.name, "Skirmish");
        assert_eq!(scenario.gear.len(), 5);
        assert_eq!(scenario.enemy_strategy, Strategy::Aggressive);

        let (player, enemy) = scenario.parties().unwrap();
        assert_eq!(player.len(), 3);
        assert_eq!(enemy.len(), 3);
    }

    #[test]
    fn test_minimal_scenario_uses_defaults() {
        let scenario = Scenario::from_ron_str(
            r#"Scenario(
                name: "Duel",
                player: PartyData(name: "A", members: [CharacterData(name: "Aria")]),
                enemy: PartyData(name: "B", members: [CharacterData(name: "Grik")]),
            )"#,
        )
        .unwrap();

        assert_eq!(scenario.config, CombatConfig::default());
        assert_eq!(scenario.player_strategy, Strategy::FirstReady);
        assert_eq!(scenario.max_rounds, 100);
        assert!(scenario.catalog().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Scenario::from_ron_str(
            r#"Scenario(
                name: "Broken",
                config: CombatConfig(defense_divisor: 0),
                player: PartyData(name: "A"),
                enemy: PartyData(name: "B"),
            )"#,
        );
        assert!(matches!(result, Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_unknown_gear_surfaces_on_parties() {
        let scenario = Scenario::from_ron_str(
            r#"Scenario(
                name: "Unarmed",
                player: PartyData(name: "A", members: [
                    CharacterData(name: "Aria", equipment: [GearItemData(id: "void_blade")]),
                ]),
                enemy: PartyData(name: "B"),
            )"#,
        )
        .unwrap();

        match scenario.parties() {
            Err(ScenarioError::Invalid(CombatError::UnknownGear(id))) => {
                assert_eq!(id, "void_blade");
            }
            other => panic!("expected unknown gear, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SKIRMISH_RON.as_bytes()).unwrap();

        let path = file.path().to_str().unwrap();
        let scenario = Scenario::resolve(path).unwrap();
        assert_eq!(scenario, Scenario::skirmish().unwrap());
    }

    #[test]
    fn test_resolve_unknown_name() {
        assert!(matches!(
            Scenario::resolve("no_such_scenario"),
            Err(ScenarioError::FileNotFound(_))
        ));
        assert!(Scenario::resolve(SKIRMISH_NAME).is_ok());
    }
}
