//! Damage resolution for a single move use.

use crate::rng::TurnRng;
use crate::snapshot::CombatantSnapshot;
use schema::{DamageClass, MoveData, PokemonType};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageOutcome {
    pub amount: u16,
    pub effectiveness: f64,
}

/// Resolve one use of `move_data` by `attacker` against `defender`.
///
/// Status moves and immune defenders deal exactly 0. Any other hit deals at
/// least 1 after the level curve, the attack/defense ratio, type
/// effectiveness and a random factor in [0.85, 1.0] are applied.
pub fn resolve(
    attacker: &CombatantSnapshot,
    defender: &CombatantSnapshot,
    move_data: &MoveData,
    rng: &mut TurnRng,
) -> DamageOutcome {
    if !move_data.is_damaging() {
        return DamageOutcome {
            amount: 0,
            effectiveness: 1.0,
        };
    }

    let effectiveness =
        PokemonType::effectiveness(move_data.move_type, &defender.defending_types());
    if effectiveness == 0.0 {
        return DamageOutcome {
            amount: 0,
            effectiveness,
        };
    }

    let (attack, defense) = match move_data.damage_class {
        DamageClass::Physical => (attacker.stats.attack, defender.stats.defense),
        DamageClass::Special => (attacker.stats.sp_attack, defender.stats.sp_defense),
        DamageClass::Status => unreachable!("status moves return early"),
    };

    let level_term = 2.0 * f64::from(attacker.level) / 5.0 + 2.0;
    let ratio = f64::from(attack) / f64::from(defense.max(1));
    let base = (level_term * f64::from(move_data.power) * ratio) / 50.0 + 2.0;
    let rolled = base * effectiveness * rng.damage_factor("damage spread");

    DamageOutcome {
        amount: rolled.max(1.0) as u16,
        effectiveness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::MoveSlot;
    use crate::stats::Stats;
    use pretty_assertions::assert_eq;
    use schema::{MoveId, SpeciesId};

    fn combatant(level: u8, stats: Stats, types: (PokemonType, Option<PokemonType>)) -> CombatantSnapshot {
        CombatantSnapshot {
            species: SpeciesId(0),
            name: "Test".into(),
            level,
            current_hp: stats.hp,
            max_hp: stats.hp,
            stats,
            moves: vec![MoveSlot {
                move_id: MoveId(0),
                pp: 10,
            }],
            types,
            roster_ref: None,
        }
    }

    fn flat_stats(value: u16) -> Stats {
        Stats {
            hp: 30,
            attack: value,
            defense: value,
            sp_attack: value,
            sp_defense: value,
            speed: value,
        }
    }

    fn physical_move(power: u16, move_type: PokemonType) -> MoveData {
        MoveData {
            id: MoveId(0),
            name: "Test Move".into(),
            move_type,
            power,
            accuracy: 100,
            max_pp: 10,
            damage_class: DamageClass::Physical,
        }
    }

    #[test]
    fn neutral_hit_with_pinned_spread() {
        // Level 5, power 40, equal attack and defense, factor pinned to 1.0:
        // ((2*5/5 + 2) * 40 * 1) / 50 + 2 = 5.2, truncated to 5.
        let attacker = combatant(5, flat_stats(9), (PokemonType::Normal, None));
        let defender = combatant(5, flat_stats(9), (PokemonType::Normal, None));
        let mv = physical_move(40, PokemonType::Normal);
        let mut rng = TurnRng::new_for_test(vec![100]);

        let outcome = resolve(&attacker, &defender, &mv, &mut rng);
        assert_eq!(outcome.amount, 5);
        assert_eq!(outcome.effectiveness, 1.0);
    }

    #[test]
    fn levels_off_the_curve_keep_their_fraction() {
        // Level 7, power 100, equal attack and defense, factor pinned to 1.0:
        // ((2*7/5 + 2) * 100 * 1) / 50 + 2 = 11.6, truncated to 11. Integer
        // math on the level term would lose the .8 and land on 10.
        let attacker = combatant(7, flat_stats(20), (PokemonType::Normal, None));
        let defender = combatant(7, flat_stats(20), (PokemonType::Normal, None));
        let mv = physical_move(100, PokemonType::Normal);
        let mut rng = TurnRng::new_for_test(vec![100]);

        assert_eq!(resolve(&attacker, &defender, &mv, &mut rng).amount, 11);
    }

    #[test]
    fn immunity_short_circuits_to_zero() {
        let attacker = combatant(50, flat_stats(100), (PokemonType::Electric, None));
        let defender = combatant(50, flat_stats(10), (PokemonType::Ground, None));
        let mv = physical_move(120, PokemonType::Electric);
        // No rng value needed: an immune hit must not consume a roll.
        let mut rng = TurnRng::new_for_test(vec![]);

        let outcome = resolve(&attacker, &defender, &mv, &mut rng);
        assert_eq!(outcome.amount, 0);
        assert_eq!(outcome.effectiveness, 0.0);
    }

    #[test]
    fn status_moves_deal_nothing() {
        let attacker = combatant(20, flat_stats(50), (PokemonType::Grass, None));
        let defender = combatant(20, flat_stats(50), (PokemonType::Fire, None));
        let mv = MoveData {
            id: MoveId(0),
            name: "Growl".into(),
            move_type: PokemonType::Normal,
            power: 0,
            accuracy: 100,
            max_pp: 40,
            damage_class: DamageClass::Status,
        };
        let mut rng = TurnRng::new_for_test(vec![]);

        assert_eq!(resolve(&attacker, &defender, &mv, &mut rng).amount, 0);
    }

    #[test]
    fn weak_hits_still_deal_at_least_one() {
        let attacker = combatant(1, flat_stats(1), (PokemonType::Normal, None));
        let defender = combatant(100, flat_stats(500), (PokemonType::Steel, None));
        let mv = physical_move(10, PokemonType::Normal);
        let mut rng = TurnRng::new_for_test(vec![1]);

        assert_eq!(resolve(&attacker, &defender, &mv, &mut rng).amount, 1);
    }

    #[test]
    fn super_effective_doubles_the_pinned_hit() {
        let attacker = combatant(5, flat_stats(9), (PokemonType::Water, None));
        let neutral = combatant(5, flat_stats(9), (PokemonType::Normal, None));
        let weak = combatant(5, flat_stats(9), (PokemonType::Fire, None));
        let mv = MoveData {
            id: MoveId(0),
            name: "Water Gun".into(),
            move_type: PokemonType::Water,
            power: 40,
            accuracy: 100,
            max_pp: 25,
            damage_class: DamageClass::Special,
        };

        let mut rng = TurnRng::new_for_test(vec![100, 100]);
        let plain = resolve(&attacker, &neutral, &mv, &mut rng);
        let strong = resolve(&attacker, &weak, &mv, &mut rng);
        assert_eq!(plain.amount, 5);
        assert_eq!(strong.amount, 10);
        assert_eq!(strong.effectiveness, 2.0);
    }
}
