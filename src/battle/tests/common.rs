//! Shared fixtures: a two-location map, the demo catalog and in-memory
//! stores behind a ready-to-use service.

use crate::data::Dex;
use crate::external::{PlayerId, RosterId, RosterStore, World};
use crate::memory::tests_support::roster_entry;
use crate::memory::{
    InMemoryBag, InMemoryMap, InMemoryPokedex, InMemoryProfiles, InMemoryRoster,
};
use crate::service::BattleService;
use schema::{EncounterEntry, Location, LocationId, LocationKind, Rarity, SpeciesId};
use std::sync::Arc;

pub const TOWN: LocationId = LocationId(1);
pub const ROUTE: LocationId = LocationId(2);

pub fn red() -> PlayerId {
    PlayerId("red".into())
}

pub fn blue() -> PlayerId {
    PlayerId("blue".into())
}

pub struct TestWorld {
    pub world: World,
    pub roster: Arc<InMemoryRoster>,
    pub bag: Arc<InMemoryBag>,
    pub map: Arc<InMemoryMap>,
    pub pokedex: Arc<InMemoryPokedex>,
    pub profiles: Arc<InMemoryProfiles>,
}

impl TestWorld {
    pub fn new() -> Self {
        let dex = Arc::new(Dex::from_ron(include_str!("../../../data/dex.ron")).unwrap());
        let roster = Arc::new(InMemoryRoster::default());
        let bag = Arc::new(InMemoryBag::default());
        let map = Arc::new(InMemoryMap::new(vec![
            Location {
                id: TOWN,
                name: "Pallet Town".into(),
                kind: LocationKind::Town,
            },
            Location {
                id: ROUTE,
                name: "Route 1".into(),
                kind: LocationKind::Route,
            },
        ]));
        let pokedex = Arc::new(InMemoryPokedex::default());
        let profiles = Arc::new(InMemoryProfiles::default());
        let world = World {
            dex,
            roster: roster.clone(),
            bag: bag.clone(),
            map: map.clone(),
            pokedex: pokedex.clone(),
            profiles: profiles.clone(),
        };
        Self {
            world,
            roster,
            bag,
            map,
            pokedex,
            profiles,
        }
    }

    pub fn service(&self) -> BattleService {
        BattleService::new(self.world.clone())
    }

    pub fn add_team_member(&self, player: &PlayerId, species: SpeciesId, level: u8) -> RosterId {
        self.roster
            .give(player, roster_entry(&self.world.dex, species, level))
    }

    pub fn set_hp(&self, player: &PlayerId, id: RosterId, hp: u16) {
        let mut entry = self.world.roster.entry(player, id).unwrap();
        entry.current_hp = hp;
        self.world.roster.save(player, &entry);
    }
}

/// A single-row table: wild Pidgey, always level 3.
pub fn pidgey_route() -> Vec<EncounterEntry> {
    vec![EncounterEntry {
        species: SpeciesId(16),
        min_level: 3,
        max_level: 3,
        rarity: Rarity::Common,
    }]
}

/// Pidgey plus Pikachu, for trainers that need two distinct species.
pub fn two_species_route() -> Vec<EncounterEntry> {
    vec![
        EncounterEntry {
            species: SpeciesId(16),
            min_level: 3,
            max_level: 3,
            rarity: Rarity::Common,
        },
        EncounterEntry {
            species: SpeciesId(25),
            min_level: 3,
            max_level: 3,
            rarity: Rarity::Rare,
        },
    ]
}
