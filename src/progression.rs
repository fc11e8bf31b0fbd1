//! Experience, level-ups and evolution.

use crate::data::Dex;
use crate::errors::EngineResult;
use crate::external::{PlayerId, PokedexTracker, RosterEntry};
use crate::stats::Stats;
use schema::SpeciesId;

pub const MAX_LEVEL: u8 = 100;

/// Total experience needed to have reached `level` (the cubic curve).
/// Level 1 is the floor and costs nothing.
pub fn experience_required(level: u8) -> u32 {
    if level <= 1 {
        return 0;
    }
    u32::from(level).pow(3)
}

/// What a batch of experience did to one pokemon.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    pub levels_gained: u8,
    pub new_level: u8,
    pub evolved_into: Option<SpeciesId>,
}

/// Award experience, applying every level-up it pays for and every evolution
/// step the final level unlocks.
///
/// Level-ups rebuild stats from the catalog and keep the pokemon at the same
/// fraction of its max HP (rounded, but never dropping a conscious pokemon
/// to 0). Evolution fully heals and registers the new form as caught.
pub fn add_experience(
    entry: &mut RosterEntry,
    amount: u32,
    dex: &Dex,
    pokedex: &dyn PokedexTracker,
    player: &PlayerId,
) -> EngineResult<Progress> {
    entry.experience = entry.experience.saturating_add(amount);

    let mut progress = Progress {
        new_level: entry.level,
        ..Progress::default()
    };

    while entry.level < MAX_LEVEL && entry.experience >= experience_required(entry.level + 1) {
        level_up(entry, dex)?;
        progress.levels_gained += 1;
        progress.new_level = entry.level;
    }

    // A big enough grant can carry a pokemon past several evolution
    // thresholds at once; each stage applies in order.
    while let Some(evolved) = dex.evolution_of(entry.species) {
        if !evolved.evolution_level.is_some_and(|l| l <= entry.level) {
            break;
        }
        entry.species = evolved.id;
        entry.stats = Stats::derive(&evolved.base_stats, entry.level);
        entry.current_hp = entry.stats.hp;
        pokedex.mark_seen(player, evolved.id);
        pokedex.mark_caught(player, evolved.id);
        progress.evolved_into = Some(evolved.id);
    }

    Ok(progress)
}

fn level_up(entry: &mut RosterEntry, dex: &Dex) -> EngineResult<()> {
    let hp_fraction = f64::from(entry.current_hp) / f64::from(entry.stats.hp.max(1));
    entry.level += 1;
    let base = dex.species(entry.species)?.base_stats;
    entry.stats = Stats::derive(&base, entry.level);
    entry.current_hp = if entry.current_hp == 0 {
        0
    } else {
        let scaled = (f64::from(entry.stats.hp) * hp_fraction).round() as u16;
        scaled.clamp(1, entry.stats.hp)
    };
    Ok(())
}
