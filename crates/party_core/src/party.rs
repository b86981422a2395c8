//! Parties and combatant references.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::error::{CombatError, Result};

/// Maximum number of characters in a party.
pub const MAX_PARTY_SIZE: usize = 5;

/// One of the two opposing sides in a combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player's party.
    Player,
    /// The opposing party.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Enemy => f.write_str("enemy"),
        }
    }
}

/// Stable reference to a party member within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId {
    /// Owning side.
    pub side: Side,
    /// Index within the party's member list.
    pub slot: usize,
}

impl CombatantId {
    /// Create a new combatant reference.
    #[must_use]
    pub const fn new(side: Side, slot: usize) -> Self {
        Self { side, slot }
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.side, self.slot)
    }
}

/// An ordered group of up to [`MAX_PARTY_SIZE`] characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Party {
    /// Party name.
    pub name: String,
    members: Vec<Character>,
}

impl Party {
    /// Create an empty party.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Create a party from a list of members.
    ///
    /// Fails with [`CombatError::PartyFull`] rather than truncating.
    pub fn with_members(
        name: impl Into<String>,
        members: impl IntoIterator<Item = Character>,
    ) -> Result<Self> {
        let mut party = Self::new(name);
        for member in members {
            party.add_member(member)?;
        }
        Ok(party)
    }

    /// Append a member.
    pub fn add_member(&mut self, character: Character) -> Result<usize> {
        if self.members.len() >= MAX_PARTY_SIZE {
            return Err(CombatError::PartyFull {
                party: self.name.clone(),
                capacity: MAX_PARTY_SIZE,
            });
        }
        self.members.push(character);
        Ok(self.members.len() - 1)
    }

    /// Remove and return the member at `slot`.
    ///
    /// Later members shift down one slot.
    pub fn remove_member(&mut self, slot: usize) -> Option<Character> {
        (slot < self.members.len()).then(|| self.members.remove(slot))
    }

    /// All members in party order.
    #[must_use]
    pub fn members(&self) -> &[Character] {
        &self.members
    }

    /// Member at `slot`.
    #[must_use]
    pub fn member(&self, slot: usize) -> Option<&Character> {
        self.members.get(slot)
    }

    /// Mutable member at `slot`.
    pub fn member_mut(&mut self, slot: usize) -> Option<&mut Character> {
        self.members.get_mut(slot)
    }

    /// Mutable access to every member.
    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.members.iter_mut()
    }

    /// Living members with their slots, in party order. Always recomputed.
    pub fn alive_members(&self) -> impl Iterator<Item = (usize, &Character)> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, member)| member.is_alive())
    }

    /// Number of living members.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_members().count()
    }

    /// A party with no living members is defeated.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.alive_count() == 0
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the party has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Role, StatBlock};

    fn member(name: &str) -> Character {
        Character::new(name, Role::Warrior, StatBlock::default())
    }

    #[test]
    fn test_sixth_member_rejected() {
        let mut party = Party::new("Heroes");
        for i in 0..MAX_PARTY_SIZE {
            party.add_member(member(&format!("H{i}"))).unwrap();
        }
        let err = party.add_member(member("Extra")).unwrap_err();
        assert_eq!(
            err,
            CombatError::PartyFull {
                party: "Heroes".into(),
                capacity: MAX_PARTY_SIZE
            }
        );
        assert_eq!(party.len(), MAX_PARTY_SIZE);
    }

    #[test]
    fn test_with_members_does_not_truncate() {
        let members = (0..6).map(|i| member(&format!("H{i}")));
        assert!(Party::with_members("Too Many", members).is_err());
    }

    #[test]
    fn test_alive_members_is_live_view() {
        let mut party = Party::with_members("Heroes", [member("A"), member("B")]).unwrap();
        assert_eq!(party.alive_count(), 2);

        party.member_mut(0).unwrap().take_damage(1000);
        let alive: Vec<usize> = party.alive_members().map(|(slot, _)| slot).collect();
        assert_eq!(alive, vec![1]);
        assert!(!party.is_defeated());

        party.member_mut(1).unwrap().take_damage(1000);
        assert!(party.is_defeated());
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Player.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Player);
    }
}
