//! Combat participants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::equipment::{EquipmentSlot, GearCatalog, GearInstance};
use crate::error::Result;
use crate::skill::{ActionDefinition, CooldownTracker};
use crate::stats::{EffectiveStats, Health, Role, StatBlock, StatKind};
use crate::status::StatusEffect;

/// A character that can take part in combat.
///
/// Health stays within `[0, max]` at all times and the character is alive
/// exactly while current health is above zero. Level and experience belong to
/// progression services and are carried here untouched by combat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Character {
    /// Display name.
    pub name: String,
    /// Archetype.
    pub role: Role,
    /// Base attributes.
    pub stats: StatBlock,
    /// Progression level.
    pub level: u32,
    /// Progression experience.
    pub experience: u64,
    /// Equipped gear by slot.
    pub equipment: BTreeMap<EquipmentSlot, GearInstance>,
    /// Equipped actions, in preference order.
    pub actions: Vec<ActionDefinition>,
    /// Last-used rounds for this character's actions.
    pub cooldowns: CooldownTracker,
    health: Health,
    effects: Vec<StatusEffect>,
}

impl Character {
    /// Create a level 1 character at full health with no gear or actions.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role, stats: StatBlock) -> Self {
        Self {
            name: name.into(),
            role,
            stats,
            level: 1,
            experience: 0,
            equipment: BTreeMap::new(),
            actions: Vec::new(),
            cooldowns: CooldownTracker::new(),
            health: Health::new(stats.health),
            effects: Vec::new(),
        }
    }

    /// Builder method to equip an action.
    #[must_use]
    pub fn with_action(mut self, action: ActionDefinition) -> Self {
        self.actions.push(action);
        self
    }

    /// Builder method to start below full health.
    #[must_use]
    pub fn with_current_health(mut self, current: u32) -> Self {
        self.health = Health::with_current(current, self.health.max());
        self
    }

    /// Current health state.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Whether current health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Active status effects, in application order.
    #[must_use]
    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    /// Find an equipped action by name.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|action| action.name == name)
    }

    /// Whether the action is off cooldown at `round`.
    #[must_use]
    pub fn can_use(&self, action: &ActionDefinition, round: u32) -> bool {
        self.cooldowns.can_use(action, round)
    }

    /// Apply damage, returning the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.health.apply_damage(amount)
    }

    /// Restore health, returning the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        self.health.heal(amount)
    }

    /// Set maximum health (see [`Health::set_max`]).
    pub fn set_max_health(&mut self, max: u32) {
        self.health.set_max(max);
    }

    /// Attach an effect, replacing any active effect with the same name.
    pub fn apply_effect(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.name == effect.name) {
            *existing = effect;
        } else {
            self.effects.push(effect);
        }
    }

    /// Replace the whole effect list (used when committing a tick).
    pub(crate) fn replace_effects(&mut self, effects: Vec<StatusEffect>) {
        self.effects = effects;
    }

    /// Remove every active effect.
    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    /// Sum of active modifiers for one stat.
    #[must_use]
    pub fn modifier_total(&self, stat: StatKind) -> i32 {
        self.effects
            .iter()
            .filter_map(StatusEffect::stat_delta)
            .filter(|(kind, _)| *kind == stat)
            .map(|(_, amount)| amount)
            .sum()
    }

    /// Dexterity used for turn ordering: base plus active modifiers.
    #[must_use]
    pub fn turn_order_stat(&self) -> u32 {
        self.stats
            .dexterity
            .saturating_add_signed(self.modifier_total(StatKind::Dexterity))
    }

    /// Gear projection plus active stat modifiers.
    pub fn modified_stats(
        &self,
        catalog: &GearCatalog,
        upgrade_step_percent: u32,
    ) -> Result<EffectiveStats> {
        let mut stats = catalog.effective_stats(self, upgrade_step_percent)?;
        for (stat, amount) in self.effects.iter().filter_map(StatusEffect::stat_delta) {
            stats.apply_modifier(stat, amount);
        }
        Ok(stats)
    }
}
