//! Target resolution.
//!
//! Rules are resolved against *living* members only. Single-target rules
//! pick the first eligible member in party order (slot 0 first); this is the
//! tie-break for every single-target rule.

use crate::error::{CombatError, Result};
use crate::party::CombatantId;
use crate::session::CombatSession;
use crate::skill::{ActionDefinition, TargetRule};

/// Resolve `rule` for `actor`. May return an empty list.
#[must_use]
pub fn resolve_targets(
    session: &CombatSession,
    actor: CombatantId,
    rule: TargetRule,
) -> Vec<CombatantId> {
    let side = if rule.targets_enemies() {
        actor.side.opponent()
    } else {
        actor.side
    };

    let mut candidates = session
        .party(side)
        .alive_members()
        .map(|(slot, _)| CombatantId::new(side, slot));

    match rule {
        TargetRule::SingleEnemy => candidates.next().into_iter().collect(),
        TargetRule::AllEnemies => candidates.collect(),
        TargetRule::SingleAlly => candidates.find(|id| *id != actor).into_iter().collect(),
        TargetRule::AllAllies => candidates.filter(|id| *id != actor).collect(),
        TargetRule::SelfOnly => session
            .character(actor)
            .filter(|c| c.is_alive())
            .map(|_| actor)
            .into_iter()
            .collect(),
    }
}

/// Resolve targets for an action, failing with [`CombatError::NoValidTargets`]
/// when nobody qualifies.
pub fn require_targets(
    session: &CombatSession,
    actor: CombatantId,
    action: &ActionDefinition,
) -> Result<Vec<CombatantId>> {
    let targets = resolve_targets(session, actor, action.target);
    if targets.is_empty() {
        return Err(CombatError::NoValidTargets {
            action: action.name.clone(),
            rule: action.target.to_string(),
        });
    }
    Ok(targets)
}

/// Whether `action` would find at least one target for `actor`.
#[must_use]
pub fn has_targets(session: &CombatSession, actor: CombatantId, action: &ActionDefinition) -> bool {
    !resolve_targets(session, actor, action.target).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::math::from_percent;
    use crate::party::{Party, Side};
    use crate::stats::{Role, StatBlock};

    fn member(name: &str, alive: bool) -> Character {
        let c = Character::new(name, Role::Warrior, StatBlock::default());
        if alive {
            c
        } else {
            c.with_current_health(0)
        }
    }

    fn session() -> CombatSession {
        CombatSession::new(
            Party::with_members(
                "Heroes",
                [member("A", true), member("B", false), member("C", true)],
            )
            .unwrap(),
            Party::with_members(
                "Goblins",
                [member("X", false), member("Y", true), member("Z", true)],
            )
            .unwrap(),
        )
    }

    const A: CombatantId = CombatantId::new(Side::Player, 0);
    const C: CombatantId = CombatantId::new(Side::Player, 2);
    const Y: CombatantId = CombatantId::new(Side::Enemy, 1);
    const Z: CombatantId = CombatantId::new(Side::Enemy, 2);

    #[test]
    fn test_single_enemy_is_first_living_in_party_order() {
        assert_eq!(resolve_targets(&session(), A, TargetRule::SingleEnemy), vec![Y]);
    }

    #[test]
    fn test_all_enemies_skips_dead() {
        assert_eq!(
            resolve_targets(&session(), A, TargetRule::AllEnemies),
            vec![Y, Z]
        );
    }

    #[test]
    fn test_ally_rules_exclude_self() {
        let s = session();
        assert_eq!(resolve_targets(&s, A, TargetRule::SingleAlly), vec![C]);
        assert_eq!(resolve_targets(&s, C, TargetRule::SingleAlly), vec![A]);
        assert_eq!(resolve_targets(&s, A, TargetRule::AllAllies), vec![C]);
    }

    #[test]
    fn test_self_only() {
        assert_eq!(resolve_targets(&session(), Z, TargetRule::SelfOnly), vec![Z]);
    }

    #[test]
    fn test_enemy_side_targets_player_party() {
        assert_eq!(resolve_targets(&session(), Y, TargetRule::SingleEnemy), vec![A]);
    }

    #[test]
    fn test_lone_survivor_ally_heal_has_no_targets() {
        let s = CombatSession::new(
            Party::with_members("Heroes", [member("A", true), member("B", false)]).unwrap(),
            Party::with_members("Goblins", [member("Y", true)]).unwrap(),
        );
        let mend = ActionDefinition::new("Mend", TargetRule::SingleAlly, from_percent(-100));
        let err = require_targets(&s, A, &mend).unwrap_err();
        assert_eq!(
            err,
            CombatError::NoValidTargets {
                action: "Mend".into(),
                rule: "SingleAlly".into(),
            }
        );
        assert!(!has_targets(&s, A, &mend));
    }
}
