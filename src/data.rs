//! The reference catalog of species and moves, loaded once at startup.

use crate::errors::{DataError, EngineResult};
use schema::{MoveData, MoveId, PokemonType, SpeciesData, SpeciesId};
use serde::Deserialize;
use std::collections::HashMap;

/// Flat catalog shape as stored on disk (RON).
#[derive(Debug, Deserialize)]
pub struct DexData {
    pub species: Vec<SpeciesData>,
    pub moves: Vec<MoveData>,
}

/// Indexed catalog the engine queries during battles.
#[derive(Debug)]
pub struct Dex {
    species: HashMap<SpeciesId, SpeciesData>,
    moves: HashMap<MoveId, MoveData>,
}

/// Move names tried, in order, when a species has nothing else to fight with.
const FALLBACK_MOVE_NAMES: &[&str] = &[
    "Quick Attack",
    "Tackle",
    "Scratch",
    "Pound",
    "Ember",
    "Water Gun",
    "Vine Whip",
    "Thunder Shock",
];

impl Dex {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        let data: DexData = ron::from_str(text)?;
        Ok(Self::from_data(data))
    }

    pub fn from_data(data: DexData) -> Self {
        Self {
            species: data.species.into_iter().map(|s| (s.id, s)).collect(),
            moves: data.moves.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn species(&self, id: SpeciesId) -> EngineResult<&SpeciesData> {
        self.species
            .get(&id)
            .ok_or_else(|| DataError::UnknownSpecies(id).into())
    }

    pub fn move_data(&self, id: MoveId) -> EngineResult<&MoveData> {
        self.moves
            .get(&id)
            .ok_or_else(|| DataError::UnknownMove(id).into())
    }

    /// The species `id` evolves into, if any. The catalog stores evolution
    /// edges on the evolved form, so this is a reverse scan.
    pub fn evolution_of(&self, id: SpeciesId) -> Option<&SpeciesData> {
        self.species.values().find(|s| s.evolves_from == Some(id))
    }

    /// Damaging moves of any of the given types, strongest first. Ties break
    /// by move id so the ordering is stable across runs.
    pub fn damaging_moves_of_types(&self, types: &[PokemonType]) -> Vec<&MoveData> {
        let mut found: Vec<&MoveData> = self
            .moves
            .values()
            .filter(|m| m.is_damaging() && types.contains(&m.move_type))
            .collect();
        found.sort_by_key(|m| (std::cmp::Reverse(m.power), m.id));
        found
    }

    /// The universal last-resort moveset, filtered to moves the catalog
    /// actually contains.
    pub fn fallback_moves(&self) -> Vec<&MoveData> {
        FALLBACK_MOVE_NAMES
            .iter()
            .filter_map(|name| self.moves.values().find(|m| m.name == *name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bundled_catalog_parses_and_indexes() {
        let dex = Dex::from_ron(include_str!("../data/dex.ron")).expect("bundled catalog");

        let bulbasaur = dex.species(SpeciesId(1)).unwrap();
        assert_eq!(bulbasaur.name, "Bulbasaur");
        assert_eq!(
            dex.evolution_of(SpeciesId(1)).map(|s| s.name.as_str()),
            Some("Ivysaur")
        );

        let tackle = dex.move_data(MoveId(1)).unwrap();
        assert_eq!(tackle.name, "Tackle");
    }

    #[test]
    fn unknown_ids_are_data_errors() {
        let dex = Dex::from_ron(include_str!("../data/dex.ron")).unwrap();
        assert!(dex.species(SpeciesId(9999)).is_err());
        assert!(dex.move_data(MoveId(9999)).is_err());
    }

    #[test]
    fn type_filtered_moves_come_strongest_first() {
        let dex = Dex::from_ron(include_str!("../data/dex.ron")).unwrap();
        let fire = dex.damaging_moves_of_types(&[PokemonType::Fire]);
        assert!(!fire.is_empty());
        for pair in fire.windows(2) {
            assert!(pair[0].power >= pair[1].power);
        }
    }
}
