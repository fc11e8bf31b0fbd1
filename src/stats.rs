//! Derived battle stats.
//!
//! Stats come from base stats and level alone; there are no IVs, EVs or
//! natures in this model. HP gets the larger level scaling plus a flat 10,
//! every other stat gets a flat 5. All arithmetic is integer division.

use schema::BaseStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

impl Stats {
    pub fn derive(base: &BaseStats, level: u8) -> Self {
        let level = u16::from(level);
        let scale = |b: u8| (2 * u16::from(b) * level) / 100 + 5;
        Self {
            hp: (2 * u16::from(base.hp) * level) / 100 + level + 10,
            attack: scale(base.attack),
            defense: scale(base.defense),
            sp_attack: scale(base.sp_attack),
            sp_defense: scale(base.sp_defense),
            speed: scale(base.speed),
        }
    }
}
