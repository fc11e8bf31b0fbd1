use crate::SpeciesId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Town,
    Route,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub kind: LocationKind,
}

/// Encounter rarity tiers with the fixed weights the encounter roll uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    VeryRare,
}

impl Rarity {
    pub fn weight(self) -> u32 {
        match self {
            Rarity::Common => 60,
            Rarity::Uncommon => 30,
            Rarity::Rare => 9,
            Rarity::VeryRare => 1,
        }
    }
}

/// One row of a location's wild-encounter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterEntry {
    pub species: SpeciesId,
    pub min_level: u8,
    pub max_level: u8,
    pub rarity: Rarity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_weights_match_the_encounter_table() {
        assert_eq!(Rarity::Common.weight(), 60);
        assert_eq!(Rarity::Uncommon.weight(), 30);
        assert_eq!(Rarity::Rare.weight(), 9);
        assert_eq!(Rarity::VeryRare.weight(), 1);
    }
}
