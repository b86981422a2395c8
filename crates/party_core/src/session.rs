//! Combat session state machine and per-round turn order.
//!
//! A session is *active* until one side has no living members, then
//! *complete* with an outcome. A complete session is terminal: advancing it
//! is a no-op and the engine refuses to execute turns on it.
//!
//! # Turn Order
//!
//! At the start of every round the living characters of both parties are
//! collected (player party first, each in party order), then stably sorted
//! by descending dexterity. The materialized list is walked with a cursor;
//! a new list (and a new generation number) is produced only when the cursor
//! runs off the end. Characters that die mid-round stay in the list but are
//! skipped, so [`CombatSession::current_turn`] always names a living
//! character or nothing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::error::{CombatError, Result};
use crate::party::{CombatantId, Party, Side};

/// One scheduled turn: a character and the side that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnOrderEntry {
    /// The character to act.
    pub combatant: CombatantId,
}

impl TurnOrderEntry {
    /// Owning side of the scheduled character.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.combatant.side
    }
}

/// The acting order for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnOrder {
    entries: Vec<TurnOrderEntry>,
    cursor: usize,
    generation: u32,
}

impl TurnOrder {
    /// Build the order for a new round from the living members of both parties.
    #[must_use]
    pub fn for_round(player: &Party, enemy: &Party, generation: u32) -> Self {
        let mut ranked: Vec<(u32, TurnOrderEntry)> = player
            .alive_members()
            .map(|(slot, c)| (c.turn_order_stat(), CombatantId::new(Side::Player, slot)))
            .chain(
                enemy
                    .alive_members()
                    .map(|(slot, c)| (c.turn_order_stat(), CombatantId::new(Side::Enemy, slot))),
            )
            .map(|(dex, combatant)| (dex, TurnOrderEntry { combatant }))
            .collect();

        // Stable sort keeps input order on ties.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        Self {
            entries: ranked.into_iter().map(|(_, entry)| entry).collect(),
            cursor: 0,
            generation,
        }
    }

    /// Head of the queue without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<TurnOrderEntry> {
        self.entries.get(self.cursor).copied()
    }

    /// Entries not yet consumed this round, head first.
    #[must_use]
    pub fn remaining(&self) -> &[TurnOrderEntry] {
        self.entries.get(self.cursor..).unwrap_or(&[])
    }

    /// Every entry materialized for this round, including consumed ones.
    #[must_use]
    pub fn entries(&self) -> &[TurnOrderEntry] {
        &self.entries
    }

    /// Number of times the order has been regenerated.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if every entry has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    fn pop(&mut self) {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
    }
}

/// How a finished combat ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// The named side has living members; the other has none.
    Victory(Side),
    /// Both sides reached zero living members in the same check.
    MutualDefeat,
}

impl CombatOutcome {
    /// Winning side, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Side> {
        match self {
            CombatOutcome::Victory(side) => Some(side),
            CombatOutcome::MutualDefeat => None,
        }
    }
}

/// State of one combat between two parties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatSession {
    player: Party,
    enemy: Party,
    turn_order: TurnOrder,
    round: u32,
    outcome: Option<CombatOutcome>,
}

impl CombatSession {
    /// Create a session at round 1 with a fresh turn order.
    ///
    /// If either party starts with no living members the session is
    /// complete immediately.
    #[must_use]
    pub fn new(player: Party, enemy: Party) -> Self {
        let turn_order = TurnOrder::for_round(&player, &enemy, 0);
        let mut session = Self {
            player,
            enemy,
            turn_order,
            round: 1,
            outcome: None,
        };
        session.evaluate_victory();
        session
    }

    /// Current round number (starts at 1).
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether the session has reached a terminal outcome.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// Terminal outcome, if reached.
    #[must_use]
    pub const fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    /// Winning side; `None` while active or after mutual defeat.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(CombatOutcome::winner)
    }

    /// The round's acting order.
    #[must_use]
    pub fn turn_order(&self) -> &TurnOrder {
        &self.turn_order
    }

    /// Party on `side`.
    #[must_use]
    pub fn party(&self, side: Side) -> &Party {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub(crate) fn party_mut(&mut self, side: Side) -> &mut Party {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Look up a combatant.
    #[must_use]
    pub fn character(&self, id: CombatantId) -> Option<&Character> {
        self.party(id.side).member(id.slot)
    }

    /// Look up a combatant, failing with [`CombatError::UnknownCombatant`].
    pub fn require(&self, id: CombatantId) -> Result<&Character> {
        self.character(id)
            .ok_or_else(|| CombatError::UnknownCombatant(id.to_string()))
    }

    pub(crate) fn character_mut(&mut self, id: CombatantId) -> Result<&mut Character> {
        self.party_mut(id.side)
            .member_mut(id.slot)
            .ok_or_else(|| CombatError::UnknownCombatant(id.to_string()))
    }

    /// Every combatant in both parties, player party first.
    pub fn combatants(&self) -> impl Iterator<Item = (CombatantId, &Character)> {
        let player = self
            .player
            .members()
            .iter()
            .enumerate()
            .map(|(slot, c)| (CombatantId::new(Side::Player, slot), c));
        let enemy = self
            .enemy
            .members()
            .iter()
            .enumerate()
            .map(|(slot, c)| (CombatantId::new(Side::Enemy, slot), c));
        player.chain(enemy)
    }

    /// The combatant whose turn it is, without consuming the turn.
    #[must_use]
    pub fn current_turn(&self) -> Option<TurnOrderEntry> {
        self.turn_order.peek()
    }

    /// Consume the current turn.
    ///
    /// Dead entries are skipped. When the order is exhausted the round
    /// counter increments and a new order is built from the living
    /// characters. Victory is evaluated afterwards. No-op once complete.
    pub fn advance_turn(&mut self) {
        if self.is_complete() {
            return;
        }

        self.turn_order.pop();
        self.skip_dead_entries();

        if self.turn_order.is_exhausted() {
            self.round += 1;
            let generation = self.turn_order.generation() + 1;
            self.turn_order = TurnOrder::for_round(&self.player, &self.enemy, generation);
            tracing::trace!(round = self.round, generation, "Turn order regenerated");
        }

        self.evaluate_victory();
    }

    fn skip_dead_entries(&mut self) {
        while let Some(entry) = self.turn_order.peek() {
            if self.character(entry.combatant).is_some_and(Character::is_alive) {
                break;
            }
            self.turn_order.pop();
        }
    }

    /// Record an outcome if either party has been eliminated.
    fn evaluate_victory(&mut self) {
        let outcome = match (self.player.is_defeated(), self.enemy.is_defeated()) {
            (false, false) => return,
            (true, true) => CombatOutcome::MutualDefeat,
            (false, true) => CombatOutcome::Victory(Side::Player),
            (true, false) => CombatOutcome::Victory(Side::Enemy),
        };
        tracing::debug!(round = self.round, ?outcome, "Combat session complete");
        self.outcome = Some(outcome);
    }

    /// Deterministic hash of the full session state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize session state to bytes.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| CombatError::InvalidState(format!("Failed to serialize session: {e}")))
    }

    /// Deserialize session state from bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| CombatError::InvalidState(format!("Failed to deserialize session: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Role, StatBlock};

    fn fighter(name: &str, dexterity: u32, health: u32) -> Character {
        Character::new(name, Role::Warrior, StatBlock::new(10, dexterity, health))
    }

    fn session(player: Vec<Character>, enemy: Vec<Character>) -> CombatSession {
        CombatSession::new(
            Party::with_members("Heroes", player).unwrap(),
            Party::with_members("Goblins", enemy).unwrap(),
        )
    }

    fn order(session: &CombatSession) -> Vec<CombatantId> {
        session
            .turn_order()
            .remaining()
            .iter()
            .map(|entry| entry.combatant)
            .collect()
    }

    #[test]
    fn test_order_by_descending_dexterity() {
        let s = session(
            vec![fighter("Slow", 3, 50), fighter("Fast", 12, 50)],
            vec![fighter("Mid", 7, 50)],
        );
        assert_eq!(
            order(&s),
            vec![
                CombatantId::new(Side::Player, 1),
                CombatantId::new(Side::Enemy, 0),
                CombatantId::new(Side::Player, 0),
            ]
        );
    }

    #[test]
    fn test_ties_keep_player_first_then_party_order() {
        let s = session(
            vec![fighter("A", 5, 50), fighter("B", 5, 50)],
            vec![fighter("X", 5, 50)],
        );
        assert_eq!(
            order(&s),
            vec![
                CombatantId::new(Side::Player, 0),
                CombatantId::new(Side::Player, 1),
                CombatantId::new(Side::Enemy, 0),
            ]
        );
    }

    #[test]
    fn test_dead_characters_excluded_at_round_start() {
        let s = session(
            vec![fighter("A", 5, 50), fighter("Fallen", 9, 50).with_current_health(0)],
            vec![fighter("X", 5, 50)],
        );
        assert_eq!(s.turn_order().remaining().len(), 2);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let s = session(vec![fighter("A", 5, 50)], vec![fighter("X", 4, 50)]);
        assert_eq!(s.current_turn(), s.current_turn());
        assert_eq!(s.turn_order().remaining().len(), 2);
    }

    #[test]
    fn test_round_increments_when_order_exhausted() {
        let mut s = session(vec![fighter("A", 5, 50)], vec![fighter("X", 4, 50)]);
        assert_eq!(s.round(), 1);
        s.advance_turn();
        assert_eq!(s.round(), 1);
        s.advance_turn();
        assert_eq!(s.round(), 2);
        assert_eq!(s.turn_order().generation(), 1);
        assert_eq!(s.turn_order().remaining().len(), 2);
    }

    #[test]
    fn test_mid_round_death_is_skipped() {
        let mut s = session(
            vec![fighter("A", 9, 50)],
            vec![fighter("X", 5, 50), fighter("Y", 1, 50)],
        );
        s.party_mut(Side::Enemy).member_mut(0).unwrap().take_damage(50);
        s.advance_turn();
        assert_eq!(
            s.current_turn().map(|e| e.combatant),
            Some(CombatantId::new(Side::Enemy, 1))
        );
    }

    #[test]
    fn test_victory_when_one_side_eliminated() {
        let mut s = session(vec![fighter("A", 9, 50)], vec![fighter("X", 5, 50)]);
        s.party_mut(Side::Enemy).member_mut(0).unwrap().take_damage(50);
        s.advance_turn();
        assert!(s.is_complete());
        assert_eq!(s.winner(), Some(Side::Player));
    }

    #[test]
    fn test_mutual_defeat_has_no_winner() {
        let mut s = session(vec![fighter("A", 9, 50)], vec![fighter("X", 5, 50)]);
        s.party_mut(Side::Enemy).member_mut(0).unwrap().take_damage(50);
        s.party_mut(Side::Player).member_mut(0).unwrap().take_damage(50);
        s.advance_turn();
        assert_eq!(s.outcome(), Some(CombatOutcome::MutualDefeat));
        assert_eq!(s.winner(), None);
    }

    #[test]
    fn test_advance_after_completion_is_noop() {
        let mut s = session(vec![fighter("A", 9, 50)], vec![fighter("X", 5, 50)]);
        s.party_mut(Side::Enemy).member_mut(0).unwrap().take_damage(50);
        s.advance_turn();
        let round = s.round();
        let order = s.turn_order().clone();

        s.advance_turn();
        s.advance_turn();
        assert_eq!(s.round(), round);
        assert_eq!(s.turn_order(), &order);
    }

    #[test]
    fn test_empty_party_completes_immediately() {
        let s = CombatSession::new(
            Party::with_members("Heroes", [fighter("A", 9, 50)]).unwrap(),
            Party::new("Nobody"),
        );
        assert_eq!(s.winner(), Some(Side::Player));
    }

    #[test]
    fn test_serialization_round_trip_preserves_hash() {
        let s = session(vec![fighter("A", 9, 50)], vec![fighter("X", 5, 50)]);
        let restored = CombatSession::deserialize(&s.serialize().unwrap()).unwrap();
        assert_eq!(restored.state_hash(), s.state_hash());
    }
}
