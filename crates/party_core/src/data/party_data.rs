//! Party snapshots.

use serde::{Deserialize, Serialize};

use crate::data::CharacterData;
use crate::equipment::GearCatalog;
use crate::error::Result;
use crate::party::Party;

/// Data-driven party.
///
/// # Example RON
///
/// ```ron
/// PartyData(
///     name: "Heroes",
///     members: [
///         CharacterData(name: "Aria", role: Warrior),
///         CharacterData(name: "Lio", role: Cleric),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyData {
    /// Party name.
    pub name: String,
    /// Members in party order.
    #[serde(default)]
    pub members: Vec<CharacterData>,
}

impl PartyData {
    /// Build a live party.
    ///
    /// Fails with [`crate::error::CombatError::PartyFull`] when more members
    /// are listed than a party can hold.
    pub fn to_party(&self, catalog: &GearCatalog) -> Result<Party> {
        let members = self
            .members
            .iter()
            .map(|member| member.to_character(catalog))
            .collect::<Result<Vec<_>>>()?;
        Party::with_members(self.name.clone(), members)
    }
}

impl From<&Party> for PartyData {
    fn from(party: &Party) -> Self {
        Self {
            name: party.name.clone(),
            members: party.members().iter().map(CharacterData::from).collect(),
        }
    }
}
