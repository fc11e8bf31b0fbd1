//! Battle-local copies of combatants.
//!
//! A battle never mutates roster rows directly. It works on snapshots and the
//! engine writes surviving HP and PP back when the battle resolves. Wild and
//! generated trainer pokemon are snapshots with no roster reference at all.

use crate::data::Dex;
use crate::errors::EngineResult;
use crate::external::{RosterEntry, RosterId};
use crate::stats::Stats;
use schema::{MoveId, PokemonType, SpeciesId};
use serde::{Deserialize, Serialize};

pub const MAX_MOVES: usize = 4;
pub const PVP_LEVEL: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub pp: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub species: SpeciesId,
    /// Nickname if the owner gave one, species name otherwise.
    pub name: String,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub stats: Stats,
    pub moves: Vec<MoveSlot>,
    pub types: (PokemonType, Option<PokemonType>),
    /// Present for owned pokemon; the write-back target when battle ends.
    pub roster_ref: Option<RosterId>,
}

impl CombatantSnapshot {
    /// A freshly generated combatant (wild encounter or trainer team member):
    /// full HP, the four most recent learnset moves at full PP.
    pub fn from_species(dex: &Dex, species: SpeciesId, level: u8) -> EngineResult<Self> {
        let data = dex.species(species)?;
        let stats = Stats::derive(&data.base_stats, level);
        let known = data.moves_learned_by(level);
        let mut moves = Vec::with_capacity(MAX_MOVES);
        for move_id in known.iter().rev().take(MAX_MOVES).rev() {
            let md = dex.move_data(*move_id)?;
            moves.push(MoveSlot {
                move_id: *move_id,
                pp: md.max_pp,
            });
        }
        if moves.is_empty() {
            moves = fallback_slots(dex, &data.types());
        }
        Ok(Self {
            species,
            name: data.name.clone(),
            level,
            current_hp: stats.hp,
            max_hp: stats.hp,
            stats,
            moves,
            types: (data.type1, data.type2),
            roster_ref: None,
        })
    }

    /// Snapshot of an owned pokemon, carrying over its current HP and the PP
    /// remaining on each move.
    pub fn from_roster(dex: &Dex, entry: &RosterEntry) -> EngineResult<Self> {
        let data = dex.species(entry.species)?;
        let moves = entry
            .moves
            .iter()
            .map(|m| MoveSlot {
                move_id: m.move_id,
                pp: m.pp,
            })
            .collect();
        Ok(Self {
            species: entry.species,
            name: entry
                .nickname
                .clone()
                .unwrap_or_else(|| data.name.clone()),
            level: entry.level,
            current_hp: entry.current_hp.min(entry.stats.hp),
            max_hp: entry.stats.hp,
            stats: entry.stats,
            moves,
            types: (data.type1, data.type2),
            roster_ref: Some(entry.id),
        })
    }

    /// Ranked play levels every combatant to 50 and rebuilds stats at full
    /// HP. If the pokemon knows no moves at all it is given a usable set:
    /// first its strongest level-50 learnset moves, then damaging moves of
    /// its own types, then the universal fallback list.
    pub fn scaled_for_pvp(dex: &Dex, entry: &RosterEntry) -> EngineResult<Self> {
        let data = dex.species(entry.species)?;
        let stats = Stats::derive(&data.base_stats, PVP_LEVEL);

        let mut moves: Vec<MoveSlot> = entry
            .moves
            .iter()
            .map(|m| MoveSlot {
                move_id: m.move_id,
                pp: m.pp,
            })
            .collect();

        if moves.is_empty() {
            moves = learnset_slots(dex, data, PVP_LEVEL);
        }
        if moves.is_empty() {
            moves = fallback_slots(dex, &data.types());
        }

        Ok(Self {
            species: entry.species,
            name: entry
                .nickname
                .clone()
                .unwrap_or_else(|| data.name.clone()),
            level: PVP_LEVEL,
            current_hp: stats.hp,
            max_hp: stats.hp,
            stats,
            moves,
            types: (data.type1, data.type2),
            roster_ref: Some(entry.id),
        })
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn take_damage(&mut self, amount: u16) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u16) {
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
    }

    pub fn defending_types(&self) -> Vec<PokemonType> {
        match self.types.1 {
            Some(t2) => vec![self.types.0, t2],
            None => vec![self.types.0],
        }
    }

    pub fn move_slot_mut(&mut self, move_id: MoveId) -> Option<&mut MoveSlot> {
        self.moves.iter_mut().find(|s| s.move_id == move_id)
    }
}

/// Best learnset moves for ranked play: damaging before status, then higher
/// power, then later learn level. A learnset row pointing at a move the
/// catalog no longer carries is skipped, not an error; the caller falls
/// through to the next tier if nothing survives.
fn learnset_slots(dex: &Dex, data: &schema::SpeciesData, level: u8) -> Vec<MoveSlot> {
    let mut scored = Vec::new();
    for entry in data.learnset.iter().filter(|e| e.level <= level) {
        let Ok(md) = dex.move_data(entry.move_id) else {
            continue;
        };
        scored.push((md.is_damaging(), md.power, entry.level, md.id, md.max_pp));
    }
    scored.sort_by(|a, b| b.cmp(a));
    scored.dedup_by_key(|s| s.3);
    scored
        .into_iter()
        .take(MAX_MOVES)
        .map(|(_, _, _, move_id, max_pp)| MoveSlot {
            move_id,
            pp: max_pp,
        })
        .collect()
}

fn fallback_slots(dex: &Dex, types: &[PokemonType]) -> Vec<MoveSlot> {
    let typed = dex.damaging_moves_of_types(types);
    let pool = if typed.is_empty() {
        dex.fallback_moves()
    } else {
        typed
    };
    pool.into_iter()
        .take(MAX_MOVES)
        .map(|m| MoveSlot {
            move_id: m.id,
            pp: m.max_pp,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dex;
    use pretty_assertions::assert_eq;

    fn dex() -> Dex {
        Dex::from_ron(include_str!("../data/dex.ron")).unwrap()
    }

    #[test]
    fn wild_snapshot_takes_the_latest_four_moves() {
        let dex = dex();
        let snap = CombatantSnapshot::from_species(&dex, SpeciesId(1), 13).unwrap();
        assert!(snap.moves.len() <= MAX_MOVES);
        assert_eq!(snap.current_hp, snap.max_hp);
        assert!(snap.roster_ref.is_none());
        for slot in &snap.moves {
            let md = dex.move_data(slot.move_id).unwrap();
            assert_eq!(slot.pp, md.max_pp);
        }
    }

    #[test]
    fn pvp_scaling_levels_to_fifty_and_fills_hp() {
        let dex = dex();
        let entry = crate::memory::tests_support::roster_entry(&dex, SpeciesId(4), 12);
        let snap = CombatantSnapshot::scaled_for_pvp(&dex, &entry).unwrap();
        assert_eq!(snap.level, PVP_LEVEL);
        assert_eq!(snap.current_hp, snap.max_hp);
        let expected = Stats::derive(&dex.species(SpeciesId(4)).unwrap().base_stats, PVP_LEVEL);
        assert_eq!(snap.stats, expected);
    }

    #[test]
    fn pvp_scaling_keeps_known_moves_and_their_pp() {
        let dex = dex();
        let mut entry = crate::memory::tests_support::roster_entry(&dex, SpeciesId(4), 12);
        entry.moves.truncate(1);
        entry.moves[0].pp = 3;
        let snap = CombatantSnapshot::scaled_for_pvp(&dex, &entry).unwrap();
        assert_eq!(snap.moves.len(), 1);
        assert_eq!(snap.moves[0].pp, 3);
    }

    #[test]
    fn stale_learnset_rows_are_skipped_not_fatal() {
        use crate::data::DexData;
        use schema::{BaseStats, DamageClass, LearnsetEntry, MoveData};

        // One learnset row points at a move the catalog no longer carries.
        let dex = Dex::from_data(DexData {
            species: vec![schema::SpeciesData {
                id: SpeciesId(901),
                pokedex_number: 901,
                name: "Testmon".into(),
                type1: PokemonType::Normal,
                type2: None,
                base_stats: BaseStats {
                    hp: 40,
                    attack: 40,
                    defense: 40,
                    sp_attack: 40,
                    sp_defense: 40,
                    speed: 40,
                },
                learnset: vec![
                    LearnsetEntry {
                        level: 1,
                        move_id: MoveId(1),
                    },
                    LearnsetEntry {
                        level: 1,
                        move_id: MoveId(999),
                    },
                ],
                evolves_from: None,
                evolution_level: None,
            }],
            moves: vec![MoveData {
                id: MoveId(1),
                name: "Tackle".into(),
                move_type: PokemonType::Normal,
                power: 40,
                accuracy: 100,
                max_pp: 35,
                damage_class: DamageClass::Physical,
            }],
        });

        let entry = RosterEntry {
            id: RosterId(7),
            species: SpeciesId(901),
            nickname: None,
            level: 20,
            experience: 8000,
            current_hp: 30,
            stats: Stats::derive(
                &dex.species(SpeciesId(901)).unwrap().base_stats,
                20,
            ),
            moves: vec![],
            in_team: true,
            order: 0,
        };

        let snap = CombatantSnapshot::scaled_for_pvp(&dex, &entry).unwrap();
        assert_eq!(snap.moves.len(), 1);
        assert_eq!(snap.moves[0].move_id, MoveId(1));
    }

    #[test]
    fn pvp_scaling_invents_moves_for_a_moveless_pokemon() {
        let dex = dex();
        let mut entry = crate::memory::tests_support::roster_entry(&dex, SpeciesId(4), 12);
        entry.moves.clear();
        let snap = CombatantSnapshot::scaled_for_pvp(&dex, &entry).unwrap();
        assert!(!snap.moves.is_empty());
        let first = dex.move_data(snap.moves[0].move_id).unwrap();
        assert!(first.is_damaging());
    }
}
