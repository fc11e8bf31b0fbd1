//! In-memory implementations of the host-side stores.
//!
//! These back the test suite and make the crate runnable without a real
//! persistence layer. A server embedding the engine supplies its own
//! implementations instead.

use crate::external::{
    BagStore, ItemKind, LocationDirectory, PlayerId, PokedexTracker, ProfileStore, RosterEntry,
    RosterId, RosterStore,
};
use schema::{EncounterEntry, Location, LocationId, LocationKind, SpeciesId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryRoster {
    entries: Mutex<HashMap<PlayerId, Vec<RosterEntry>>>,
    next_id: AtomicU64,
}

impl InMemoryRoster {
    pub fn give(&self, player: &PlayerId, mut entry: RosterEntry) -> RosterId {
        let id = RosterId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        entry.id = id;
        self.entries
            .lock()
            .expect("roster poisoned")
            .entry(player.clone())
            .or_default()
            .push(entry);
        id
    }

    pub fn all(&self, player: &PlayerId) -> Vec<RosterEntry> {
        self.entries
            .lock()
            .expect("roster poisoned")
            .get(player)
            .cloned()
            .unwrap_or_default()
    }
}

impl RosterStore for InMemoryRoster {
    fn team(&self, player: &PlayerId) -> Vec<RosterEntry> {
        let mut team: Vec<RosterEntry> = self
            .all(player)
            .into_iter()
            .filter(|e| e.in_team)
            .collect();
        team.sort_by_key(|e| e.order);
        team
    }

    fn entry(&self, player: &PlayerId, id: RosterId) -> Option<RosterEntry> {
        self.all(player).into_iter().find(|e| e.id == id)
    }

    fn save(&self, player: &PlayerId, entry: &RosterEntry) {
        let mut entries = self.entries.lock().expect("roster poisoned");
        let owned = entries.entry(player.clone()).or_default();
        match owned.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => owned.push(entry.clone()),
        }
    }

    fn create_captured(&self, player: &PlayerId, entry: RosterEntry) -> RosterId {
        self.give(player, entry)
    }

    fn heal_all(&self, player: &PlayerId) {
        let mut entries = self.entries.lock().expect("roster poisoned");
        if let Some(owned) = entries.get_mut(player) {
            for entry in owned {
                entry.current_hp = entry.stats.hp;
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryBag {
    counts: Mutex<HashMap<(PlayerId, ItemKind), u32>>,
}

impl InMemoryBag {
    pub fn grant(&self, player: &PlayerId, item: ItemKind, amount: u32) {
        *self
            .counts
            .lock()
            .expect("bag poisoned")
            .entry((player.clone(), item))
            .or_default() += amount;
    }
}

impl BagStore for InMemoryBag {
    fn count(&self, player: &PlayerId, item: ItemKind) -> u32 {
        self.counts
            .lock()
            .expect("bag poisoned")
            .get(&(player.clone(), item))
            .copied()
            .unwrap_or(0)
    }

    fn consume(&self, player: &PlayerId, item: ItemKind) -> bool {
        let mut counts = self.counts.lock().expect("bag poisoned");
        match counts.get_mut(&(player.clone(), item)) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

pub struct InMemoryMap {
    locations: HashMap<LocationId, Location>,
    encounter_tables: Mutex<HashMap<LocationId, Vec<EncounterEntry>>>,
    positions: Mutex<HashMap<PlayerId, LocationId>>,
}

impl InMemoryMap {
    pub fn new(locations: Vec<Location>) -> Self {
        Self {
            locations: locations.into_iter().map(|l| (l.id, l)).collect(),
            encounter_tables: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_encounters(&self, location: LocationId, table: Vec<EncounterEntry>) {
        self.encounter_tables
            .lock()
            .expect("map poisoned")
            .insert(location, table);
    }

    pub fn place(&self, player: &PlayerId, location: LocationId) {
        self.positions
            .lock()
            .expect("map poisoned")
            .insert(player.clone(), location);
    }
}

impl LocationDirectory for InMemoryMap {
    fn location_of(&self, player: &PlayerId) -> Option<Location> {
        let positions = self.positions.lock().expect("map poisoned");
        positions
            .get(player)
            .and_then(|id| self.locations.get(id))
            .cloned()
    }

    // Closest is approximated by lowest id among towns; the test map is
    // small enough that this is the behavior the scenarios want.
    fn nearest_town(&self, _from: LocationId) -> Option<Location> {
        self.locations
            .values()
            .filter(|l| l.kind == LocationKind::Town)
            .min_by_key(|l| l.id)
            .cloned()
    }

    fn teleport(&self, player: &PlayerId, to: LocationId) {
        self.place(player, to);
    }

    fn encounters(&self, location: LocationId) -> Vec<EncounterEntry> {
        self.encounter_tables
            .lock()
            .expect("map poisoned")
            .get(&location)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct InMemoryPokedex {
    seen: Mutex<HashMap<PlayerId, HashSet<SpeciesId>>>,
    caught: Mutex<HashMap<PlayerId, HashSet<SpeciesId>>>,
}

impl InMemoryPokedex {
    pub fn has_seen(&self, player: &PlayerId, species: SpeciesId) -> bool {
        self.seen
            .lock()
            .expect("pokedex poisoned")
            .get(player)
            .is_some_and(|s| s.contains(&species))
    }

    pub fn has_caught(&self, player: &PlayerId, species: SpeciesId) -> bool {
        self.caught
            .lock()
            .expect("pokedex poisoned")
            .get(player)
            .is_some_and(|s| s.contains(&species))
    }
}

impl PokedexTracker for InMemoryPokedex {
    fn mark_seen(&self, player: &PlayerId, species: SpeciesId) {
        self.seen
            .lock()
            .expect("pokedex poisoned")
            .entry(player.clone())
            .or_default()
            .insert(species);
    }

    fn mark_caught(&self, player: &PlayerId, species: SpeciesId) {
        self.mark_seen(player, species);
        self.caught
            .lock()
            .expect("pokedex poisoned")
            .entry(player.clone())
            .or_default()
            .insert(species);
    }
}

#[derive(Debug, Clone)]
struct Profile {
    money: u32,
    rating: i32,
    wins: u32,
    losses: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            money: 0,
            rating: 1000,
            wins: 0,
            losses: 0,
        }
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: Mutex<HashMap<PlayerId, Profile>>,
}

impl InMemoryProfiles {
    fn with<R>(&self, player: &PlayerId, f: impl FnOnce(&mut Profile) -> R) -> R {
        let mut profiles = self.profiles.lock().expect("profiles poisoned");
        f(profiles.entry(player.clone()).or_default())
    }

    pub fn money(&self, player: &PlayerId) -> u32 {
        self.with(player, |p| p.money)
    }

    pub fn wins(&self, player: &PlayerId) -> u32 {
        self.with(player, |p| p.wins)
    }

    pub fn losses(&self, player: &PlayerId) -> u32 {
        self.with(player, |p| p.losses)
    }
}

impl ProfileStore for InMemoryProfiles {
    fn add_money(&self, player: &PlayerId, amount: u32) {
        self.with(player, |p| p.money += amount);
    }

    fn rating(&self, player: &PlayerId) -> i32 {
        self.with(player, |p| p.rating)
    }

    fn set_rating(&self, player: &PlayerId, rating: i32) {
        self.with(player, |p| p.rating = rating);
    }

    fn record_win(&self, player: &PlayerId) {
        self.with(player, |p| p.wins += 1);
    }

    fn record_loss(&self, player: &PlayerId) {
        self.with(player, |p| p.losses += 1);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tests_support::player;

    #[test]
    fn bag_consumes_down_to_zero() {
        let bag = InMemoryBag::default();
        let red = player("red");
        bag.grant(&red, ItemKind::PokeBall, 2);
        assert!(bag.consume(&red, ItemKind::PokeBall));
        assert!(bag.consume(&red, ItemKind::PokeBall));
        assert!(!bag.consume(&red, ItemKind::PokeBall));
        assert_eq!(bag.count(&red, ItemKind::PokeBall), 0);
    }

    #[test]
    fn pokedex_caught_implies_seen() {
        let dex = InMemoryPokedex::default();
        let red = player("red");
        dex.mark_caught(&red, SpeciesId(25));
        assert!(dex.has_seen(&red, SpeciesId(25)));
        assert!(dex.has_caught(&red, SpeciesId(25)));
    }

    #[test]
    fn new_profiles_start_at_the_baseline_rating() {
        let profiles = InMemoryProfiles::default();
        assert_eq!(profiles.rating(&player("red")), 1000);
    }
}
