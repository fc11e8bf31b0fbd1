//! The engine's view of the world outside a battle.
//!
//! Rosters, bags, locations, the pokedex and trainer profiles live in some
//! host application. The engine talks to them through the traits below so a
//! test can swap in the in-memory implementations from [`crate::memory`]
//! while a server wires in its own storage. All traits take `&self`;
//! implementations are expected to manage their own interior mutability.

use crate::stats::Stats;
use schema::{EncounterEntry, Location, LocationId, MoveId, SpeciesId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one owned pokemon in a player's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterId(pub u64);

/// A move slot on an owned pokemon, with its remaining PP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMove {
    pub move_id: MoveId,
    pub pp: u8,
}

/// One owned pokemon as the host stores it. The engine reads this to build
/// battle snapshots and writes it back when a battle resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: RosterId,
    pub species: SpeciesId,
    pub nickname: Option<String>,
    pub level: u8,
    pub experience: u32,
    pub current_hp: u16,
    pub stats: Stats,
    pub moves: Vec<RosterMove>,
    pub in_team: bool,
    pub order: u8,
}

impl RosterEntry {
    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }
}

/// Consumable items a battle action can spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Potion,
    SuperPotion,
    HyperPotion,
    PokeBall,
    UltraBall,
}

impl ItemKind {
    /// HP restored when used in battle; None for balls.
    pub fn heal_amount(self) -> Option<u16> {
        match self {
            ItemKind::Potion => Some(20),
            ItemKind::SuperPotion => Some(50),
            ItemKind::HyperPotion => Some(200),
            ItemKind::PokeBall | ItemKind::UltraBall => None,
        }
    }

    /// Catch-rate multiplier; None for healing items.
    pub fn ball_multiplier(self) -> Option<f64> {
        match self {
            ItemKind::PokeBall => Some(1.0),
            ItemKind::UltraBall => Some(2.0),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Potion => "Potion",
            ItemKind::SuperPotion => "Super Potion",
            ItemKind::HyperPotion => "Hyper Potion",
            ItemKind::PokeBall => "Poke Ball",
            ItemKind::UltraBall => "Ultra Ball",
        };
        write!(f, "{}", name)
    }
}

/// Storage for owned pokemon.
pub trait RosterStore: Send + Sync {
    /// The player's battle team, ordered by slot.
    fn team(&self, player: &PlayerId) -> Vec<RosterEntry>;

    fn entry(&self, player: &PlayerId, id: RosterId) -> Option<RosterEntry>;

    /// Persist an updated entry (HP, PP, level, experience, species).
    fn save(&self, player: &PlayerId, entry: &RosterEntry);

    /// Add a freshly captured pokemon to the player's collection and return
    /// its new roster id.
    fn create_captured(&self, player: &PlayerId, entry: RosterEntry) -> RosterId;

    /// Restore every owned pokemon to full HP.
    fn heal_all(&self, player: &PlayerId);
}

/// The player's item bag.
pub trait BagStore: Send + Sync {
    fn count(&self, player: &PlayerId, item: ItemKind) -> u32;

    /// Spend one of `item`; returns false if none were left.
    fn consume(&self, player: &PlayerId, item: ItemKind) -> bool;
}

/// Where players are and what lives there.
pub trait LocationDirectory: Send + Sync {
    fn location_of(&self, player: &PlayerId) -> Option<Location>;

    /// The town a defeated player wakes up in.
    fn nearest_town(&self, from: LocationId) -> Option<Location>;

    fn teleport(&self, player: &PlayerId, to: LocationId);

    fn encounters(&self, location: LocationId) -> Vec<EncounterEntry>;
}

/// Pokedex bookkeeping. Seen on encounter, caught on capture or evolution.
pub trait PokedexTracker: Send + Sync {
    fn mark_seen(&self, player: &PlayerId, species: SpeciesId);
    fn mark_caught(&self, player: &PlayerId, species: SpeciesId);
}

/// Money, PvP rating and match history.
pub trait ProfileStore: Send + Sync {
    fn add_money(&self, player: &PlayerId, amount: u32);
    fn rating(&self, player: &PlayerId) -> i32;
    fn set_rating(&self, player: &PlayerId, rating: i32);
    fn record_win(&self, player: &PlayerId);
    fn record_loss(&self, player: &PlayerId);
}

/// Everything the engine needs from the host, bundled for handing around.
#[derive(Clone)]
pub struct World {
    pub dex: Arc<crate::data::Dex>,
    pub roster: Arc<dyn RosterStore>,
    pub bag: Arc<dyn BagStore>,
    pub map: Arc<dyn LocationDirectory>,
    pub pokedex: Arc<dyn PokedexTracker>,
    pub profiles: Arc<dyn ProfileStore>,
}
