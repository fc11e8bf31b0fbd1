use crate::PokemonType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a move in the reference catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageClass {
    Physical,
    Special,
    Status,
}

/// Immutable move reference data.
///
/// `accuracy` is carried for completeness but the engine never rolls it; the
/// resolution model always lands a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub move_type: PokemonType,
    /// Base power; 0 for status moves.
    pub power: u16,
    pub accuracy: u8,
    pub max_pp: u8,
    pub damage_class: DamageClass,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.damage_class != DamageClass::Status
    }
}

impl fmt::Display for MoveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
