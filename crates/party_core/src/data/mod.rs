//! Plain-data snapshots for characters, parties and their actions.
//!
//! Save/load, stores and campaign systems live outside the combat core and
//! exchange only these structures with it. Every snapshot deserializes from
//! RON; conversion into live combat types validates names (targeting rules,
//! effect kinds, gear ids) and reports bad data as errors.
//!
//! **Note:** This module contains no IO - it only parses and produces text.

mod character_data;
mod effect_data;
mod party_data;
mod skill_data;

pub use character_data::{CharacterData, GearItemData};
pub use effect_data::StatusEffectData;
pub use party_data::PartyData;
pub use skill_data::SkillData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CombatError, Result};

/// Parse a RON document, naming it in any error.
pub fn from_ron<T: DeserializeOwned>(source_name: &str, text: &str) -> Result<T> {
    ron::from_str(text).map_err(|e| CombatError::DataParseError {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Render a value as pretty RON.
pub fn to_ron<T: Serialize>(value: &T) -> Result<String> {
    ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| CombatError::InvalidState(format!("Failed to write RON: {e}")))
}
