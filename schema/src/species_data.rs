use crate::{MoveId, PokemonType};
use serde::{Deserialize, Serialize};

/// Stable identifier of a species in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

/// One level-up learnset edge: the species knows `move_id` from `level` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnsetEntry {
    pub level: u8,
    pub move_id: MoveId,
}

/// Immutable species reference data, including the evolution edge pointing
/// back at the pre-evolution (mirrors how the catalog stores it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub pokedex_number: u16,
    pub name: String,
    pub type1: PokemonType,
    pub type2: Option<PokemonType>,
    pub base_stats: BaseStats,
    pub learnset: Vec<LearnsetEntry>,
    pub evolves_from: Option<SpeciesId>,
    pub evolution_level: Option<u8>,
}

impl SpeciesData {
    /// The species' one or two types, in declaration order.
    pub fn types(&self) -> Vec<PokemonType> {
        match self.type2 {
            Some(t2) => vec![self.type1, t2],
            None => vec![self.type1],
        }
    }

    /// Moves known at `level` via the level-up learnset, ordered by the level
    /// they were learned at (ascending), ties by move id.
    pub fn moves_learned_by(&self, level: u8) -> Vec<MoveId> {
        let mut known: Vec<&LearnsetEntry> =
            self.learnset.iter().filter(|e| e.level <= level).collect();
        known.sort_by_key(|e| (e.level, e.move_id));
        known.iter().map(|e| e.move_id).collect()
    }
}
