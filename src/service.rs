//! The concurrent battle registry.
//!
//! One [`BattleService`] owns every live battle. The registry lock is only
//! held long enough to find or insert a battle; each battle then has its own
//! lock, so concurrent players in different battles never contend.

use crate::battle::engine::{self, Action, ActionReport};
use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::state::{Battle, BattleId, BattleKind, BattleView, PlayerSide, TrainerOpponent};
use crate::encounter;
use crate::errors::{EngineError, EngineResult, PreconditionError, RoomError};
use crate::external::{PlayerId, World};
use crate::rng::TurnRng;
use crate::snapshot::CombatantSnapshot;
use schema::LocationKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct BattleService {
    world: World,
    battles: Mutex<HashMap<BattleId, Arc<Mutex<Battle>>>>,
}

impl BattleService {
    pub fn new(world: World) -> Self {
        Self {
            world,
            battles: Mutex::new(HashMap::new()),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn insert(&self, battle: Battle) -> BattleId {
        let id = battle.id;
        self.battles
            .lock()
            .expect("battle registry poisoned")
            .insert(id, Arc::new(Mutex::new(battle)));
        id
    }

    pub(crate) fn battle(&self, id: BattleId) -> EngineResult<Arc<Mutex<Battle>>> {
        self.battles
            .lock()
            .expect("battle registry poisoned")
            .get(&id)
            .cloned()
            .ok_or(EngineError::BattleNotFound)
    }

    /// The player's unfinished battle, if any. Waiting rooms count: a player
    /// hosting a room cannot start something else.
    pub(crate) fn find_for(&self, player: &PlayerId) -> Option<Arc<Mutex<Battle>>> {
        let battles = self.battles.lock().expect("battle registry poisoned");
        battles
            .values()
            .find(|b| {
                let b = b.lock().expect("battle poisoned");
                !b.status.is_terminal() && b.involves(player)
            })
            .cloned()
    }

    pub(crate) fn for_each_battle(&self, mut f: impl FnMut(&mut Battle)) {
        let battles = self.battles.lock().expect("battle registry poisoned");
        for battle in battles.values() {
            f(&mut battle.lock().expect("battle poisoned"));
        }
    }

    /// Roll a wild encounter at the player's location and open the battle.
    pub fn start_wild_battle(&self, player: &PlayerId) -> EngineResult<(BattleId, Vec<String>)> {
        self.start_wild_battle_with_rng(player, &mut TurnRng::new_random())
    }

    pub fn start_wild_battle_with_rng(
        &self,
        player: &PlayerId,
        rng: &mut TurnRng,
    ) -> EngineResult<(BattleId, Vec<String>)> {
        if self.find_for(player).is_some() {
            return Err(RoomError::AlreadyInBattle.into());
        }
        let here = self
            .world
            .map
            .location_of(player)
            .filter(|l| l.kind == LocationKind::Route)
            .ok_or(PreconditionError::NotOnRoute)?;
        let team = self.battle_team(player)?;

        let table = self.world.map.encounters(here.id);
        let row = *encounter::pick_encounter(&table, rng)?;
        let level = encounter::roll_level(&row, rng);
        let wild = CombatantSnapshot::from_species(&self.world.dex, row.species, level)?;
        self.world.pokedex.mark_seen(player, row.species);

        let mut bus = EventBus::new();
        bus.push(BattleEvent::WildAppeared {
            name: wild.name.clone(),
            level,
        });
        let side = PlayerSide::new(player.clone(), team);
        bus.push(BattleEvent::SwitchedIn {
            player: player.to_string(),
            name: side.active().name.clone(),
        });

        let id = self.insert(Battle::new(BattleKind::Wild { player: side, wild }));
        log::info!("player {} started wild battle {:?}", player, id);
        Ok((id, bus.into_log()))
    }

    /// Roll a trainer from the local encounter table and open the battle.
    pub fn start_trainer_battle(&self, player: &PlayerId) -> EngineResult<(BattleId, Vec<String>)> {
        self.start_trainer_battle_with_rng(player, &mut TurnRng::new_random())
    }

    pub fn start_trainer_battle_with_rng(
        &self,
        player: &PlayerId,
        rng: &mut TurnRng,
    ) -> EngineResult<(BattleId, Vec<String>)> {
        if self.find_for(player).is_some() {
            return Err(RoomError::AlreadyInBattle.into());
        }
        let here = self
            .world
            .map
            .location_of(player)
            .filter(|l| l.kind == LocationKind::Route)
            .ok_or(PreconditionError::NotOnRoute)?;
        let team = self.battle_team(player)?;

        let table = self.world.map.encounters(here.id);
        let rolled = encounter::generate_trainer(&self.world.dex, &table, rng)?;
        for member in &rolled.team {
            self.world.pokedex.mark_seen(player, member.species);
        }

        let mut bus = EventBus::new();
        bus.push(BattleEvent::TrainerIntro {
            name: rolled.name.clone(),
            dialogue: rolled.dialogue.clone(),
        });
        let trainer = TrainerOpponent {
            name: rolled.name,
            dialogue: rolled.dialogue,
            money_reward: rolled.money_reward,
            team: rolled.team,
            active: 0,
        };
        bus.push(BattleEvent::TrainerSentOut {
            trainer: trainer.name.clone(),
            name: trainer.active().name.clone(),
        });
        let side = PlayerSide::new(player.clone(), team);
        bus.push(BattleEvent::SwitchedIn {
            player: player.to_string(),
            name: side.active().name.clone(),
        });

        let id = self.insert(Battle::new(BattleKind::Trainer {
            player: side,
            trainer,
        }));
        log::info!("player {} started trainer battle {:?}", player, id);
        Ok((id, bus.into_log()))
    }

    /// Submit an action with fresh randomness.
    pub fn submit(
        &self,
        id: BattleId,
        player: &PlayerId,
        action: Action,
    ) -> EngineResult<ActionReport> {
        self.submit_with_rng(id, player, action, &mut TurnRng::new_random())
    }

    pub fn submit_with_rng(
        &self,
        id: BattleId,
        player: &PlayerId,
        action: Action,
        rng: &mut TurnRng,
    ) -> EngineResult<ActionReport> {
        let battle = self.battle(id)?;
        let mut battle = battle.lock().expect("battle poisoned");
        engine::apply_action(&mut battle, player, action, &self.world, rng)
    }

    pub fn view(&self, id: BattleId, player: &PlayerId) -> EngineResult<BattleView> {
        let battle = self.battle(id)?;
        let battle = battle.lock().expect("battle poisoned");
        engine::view_for(&battle, player, &self.world)
    }

    /// Snapshots of the player's in-team pokemon, erroring when none of them
    /// can fight.
    fn battle_team(&self, player: &PlayerId) -> EngineResult<Vec<CombatantSnapshot>> {
        let entries = self.world.roster.team(player);
        if entries.iter().all(|e| e.is_fainted()) {
            return Err(PreconditionError::NoHealthyPokemon.into());
        }
        entries
            .iter()
            .map(|e| CombatantSnapshot::from_roster(&self.world.dex, e))
            .collect()
    }

    pub(crate) fn pvp_team(
        &self,
        player: &PlayerId,
        required: usize,
    ) -> EngineResult<Vec<CombatantSnapshot>> {
        let entries = self.world.roster.team(player);
        let healthy: Vec<_> = entries.iter().filter(|e| !e.is_fainted()).collect();
        if healthy.len() < required {
            return Err(RoomError::NotEnoughPokemon(required).into());
        }
        healthy
            .into_iter()
            .take(required)
            .map(|e| CombatantSnapshot::scaled_for_pvp(&self.world.dex, e))
            .collect()
    }
}
