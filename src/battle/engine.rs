//! Turn resolution: one player action in, events and a possibly finished
//! battle out.

use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::state::{
    Battle, BattleKind, BattleStatus, BattleView, CombatantView, MoveView, PlayerSide,
    TrainerOpponent,
};
use crate::capture::{self, CaptureOutcome};
use crate::damage;
use crate::errors::{ActionError, EngineResult, PreconditionError};
use crate::external::{ItemKind, PlayerId, RosterEntry, RosterId, RosterMove, World};
use crate::progression;
use crate::rng::TurnRng;
use crate::rooms;
use crate::snapshot::CombatantSnapshot;
use schema::MoveId;
use serde::Serialize;

/// Everything a player can do with their turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Attack { move_id: MoveId },
    UseItem { item: ItemKind, target: Option<usize> },
    Switch { target: usize },
    Capture { ball: ItemKind },
    Flee,
    Surrender,
}

/// Spoils and aftermath of a finished battle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BattleOutcome {
    pub winner: Option<PlayerId>,
    pub experience: u32,
    pub money: u32,
    pub levels_gained: u8,
    pub evolved_into: Option<String>,
    pub captured: Option<String>,
    pub fled: bool,
    pub teleported_to: Option<String>,
}

/// What one action produced: the display log, the actor's refreshed view and
/// the outcome once the battle has ended.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub events: Vec<String>,
    pub view: BattleView,
    pub ended: bool,
    pub outcome: Option<BattleOutcome>,
}

/// Apply `action` for `player`. Validation happens before any state changes;
/// an `Err` leaves the battle untouched.
pub fn apply_action(
    battle: &mut Battle,
    player: &PlayerId,
    action: Action,
    world: &World,
    rng: &mut TurnRng,
) -> EngineResult<ActionReport> {
    match battle.status {
        BattleStatus::Waiting => return Err(ActionError::NotStarted.into()),
        s if s.is_terminal() => return Err(ActionError::BattleOver.into()),
        _ => {}
    }
    if !battle.involves(player) {
        return Err(ActionError::NotYourTurn.into());
    }

    let mut bus = EventBus::new();
    let outcome = match battle.kind {
        BattleKind::Wild { .. } => wild_action(battle, action, world, rng, &mut bus)?,
        BattleKind::Trainer { .. } => trainer_action(battle, action, world, rng, &mut bus)?,
        BattleKind::Pvp { .. } => pvp_action(battle, player, action, world, rng, &mut bus)?,
    };

    battle.turn += 1;
    let ended = battle.status.is_terminal();
    let view = view_for(battle, player, world)?;
    Ok(ActionReport {
        events: bus.into_log(),
        view,
        ended,
        outcome,
    })
}

/// The actor-specific projection of the battle. Opponent movesets stay
/// hidden; an unfilled PvP room has no opponent to show.
pub fn view_for(battle: &Battle, player: &PlayerId, world: &World) -> EngineResult<BattleView> {
    let side = battle
        .side_of(player)
        .ok_or(ActionError::NotYourTurn)?;
    let you = combatant_view(side.active(), true, world)?;
    let (opponent, your_turn) = match &battle.kind {
        BattleKind::Wild { wild, .. } => (
            Some(combatant_view(wild, false, world)?),
            battle.status == BattleStatus::Active,
        ),
        BattleKind::Trainer { trainer, .. } => (
            Some(combatant_view(trainer.active(), false, world)?),
            battle.status == BattleStatus::Active,
        ),
        BattleKind::Pvp {
            sides,
            current_turn,
            ..
        } => {
            let other = sides.iter().find(|s| s.player != *player);
            let opponent = match other {
                Some(s) => Some(combatant_view(s.active(), false, world)?),
                None => None,
            };
            let your_turn = battle.status == BattleStatus::Active
                && sides[*current_turn].player == *player;
            (opponent, your_turn)
        }
    };
    Ok(BattleView {
        id: battle.id,
        status: battle.status,
        turn: battle.turn,
        you,
        opponent,
        your_turn,
    })
}

fn combatant_view(
    snap: &CombatantSnapshot,
    with_moves: bool,
    world: &World,
) -> EngineResult<CombatantView> {
    let mut moves = Vec::new();
    if with_moves {
        for slot in &snap.moves {
            let md = world.dex.move_data(slot.move_id)?;
            moves.push(MoveView {
                name: md.name.clone(),
                pp: slot.pp,
                max_pp: md.max_pp,
            });
        }
    }
    Ok(CombatantView {
        name: snap.name.clone(),
        level: snap.level,
        current_hp: snap.current_hp,
        max_hp: snap.max_hp,
        moves,
    })
}

fn wild_action(
    battle: &mut Battle,
    action: Action,
    world: &World,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EngineResult<Option<BattleOutcome>> {
    let BattleKind::Wild { player: side, wild } = &mut battle.kind else {
        unreachable!("wild_action on a non-wild battle")
    };

    match action {
        Action::Flee => {
            bus.push(BattleEvent::Fled);
            battle.status = BattleStatus::Fled;
            write_back_side(side, world);
            Ok(Some(BattleOutcome {
                fled: true,
                ..BattleOutcome::default()
            }))
        }
        Action::Capture { ball } => {
            let multiplier = ball
                .ball_multiplier()
                .ok_or(ActionError::UnusableItem)?;
            if !world.bag.consume(&side.player, ball) {
                return Err(PreconditionError::OutOfItem(ball).into());
            }
            bus.push(BattleEvent::CaptureAttempt {
                ball: ball.to_string(),
                target: wild.name.clone(),
            });
            match capture::attempt(wild, multiplier, rng) {
                CaptureOutcome::Caught => {
                    bus.push(BattleEvent::CaptureSucceeded {
                        name: wild.name.clone(),
                    });
                    let entry = roster_entry_from_wild(wild);
                    world.roster.create_captured(&side.player, entry);
                    world.pokedex.mark_caught(&side.player, wild.species);
                    battle.status = BattleStatus::Won;
                    battle.winner = Some(side.player.clone());
                    write_back_side(side, world);
                    Ok(Some(BattleOutcome {
                        winner: Some(side.player.clone()),
                        captured: Some(wild.name.clone()),
                        ..BattleOutcome::default()
                    }))
                }
                CaptureOutcome::Escaped { almost } => {
                    bus.push(BattleEvent::CaptureFailed {
                        name: wild.name.clone(),
                        almost,
                    });
                    let wild_name = wild.name.clone();
                    if retaliate(wild, &wild_name, side, world, rng, bus)? {
                        finish_defeat(battle, world, bus);
                        return Ok(Some(lost_outcome(bus)));
                    }
                    Ok(None)
                }
            }
        }
        Action::Attack { move_id } => {
            let fainted = player_attack(side, wild, move_id, world, rng, bus)?;
            if fainted {
                let level = wild.level;
                battle.status = BattleStatus::Won;
                battle.winner = Some(side.player.clone());
                write_back_side(side, world);
                let experience = u32::from(level) * 10;
                let money = u32::from(level) * 5;
                let (levels_gained, evolved_into) =
                    award_spoils(side, experience, money, world, bus)?;
                bus.push(BattleEvent::BattleWon {
                    opponent: wild.name.clone(),
                });
                return Ok(Some(BattleOutcome {
                    winner: Some(side.player.clone()),
                    experience,
                    money,
                    levels_gained,
                    evolved_into,
                    ..BattleOutcome::default()
                }));
            }
            let wild_name = wild.name.clone();
            if retaliate(wild, &wild_name, side, world, rng, bus)? {
                finish_defeat(battle, world, bus);
                return Ok(Some(lost_outcome(bus)));
            }
            Ok(None)
        }
        Action::UseItem { item, target } => {
            use_healing_item(side, item, target, world, bus)?;
            let wild_name = wild.name.clone();
            if retaliate(wild, &wild_name, side, world, rng, bus)? {
                finish_defeat(battle, world, bus);
                return Ok(Some(lost_outcome(bus)));
            }
            Ok(None)
        }
        Action::Switch { target } => {
            switch_active(side, target, bus)?;
            let wild_name = wild.name.clone();
            if retaliate(wild, &wild_name, side, world, rng, bus)? {
                finish_defeat(battle, world, bus);
                return Ok(Some(lost_outcome(bus)));
            }
            Ok(None)
        }
        Action::Surrender => Err(ActionError::CannotSurrender.into()),
    }
}

fn trainer_action(
    battle: &mut Battle,
    action: Action,
    world: &World,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EngineResult<Option<BattleOutcome>> {
    let BattleKind::Trainer {
        player: side,
        trainer,
    } = &mut battle.kind
    else {
        unreachable!("trainer_action on a non-trainer battle")
    };

    match action {
        Action::Flee => Err(ActionError::CannotFlee.into()),
        Action::Capture { .. } => Err(ActionError::CannotCapture.into()),
        Action::Surrender => Err(ActionError::CannotSurrender.into()),
        Action::Attack { move_id } => {
            let fainted = {
                let target = &mut trainer.team[trainer.active];
                player_attack(side, target, move_id, world, rng, bus)?
            };
            if fainted {
                let trainer_name = trainer.name.clone();
                if trainer.send_next() {
                    bus.push(BattleEvent::TrainerSentOut {
                        trainer: trainer_name,
                        name: trainer.active().name.clone(),
                    });
                    return Ok(None);
                }
                battle.status = BattleStatus::Won;
                battle.winner = Some(side.player.clone());
                write_back_side(side, world);
                let experience: u32 = trainer
                    .team
                    .iter()
                    .map(|member| u32::from(member.level) * 10)
                    .sum();
                let money = trainer.money_reward;
                let (levels_gained, evolved_into) =
                    award_spoils(side, experience, money, world, bus)?;
                bus.push(BattleEvent::BattleWon {
                    opponent: trainer.name.clone(),
                });
                return Ok(Some(BattleOutcome {
                    winner: Some(side.player.clone()),
                    experience,
                    money,
                    levels_gained,
                    evolved_into,
                    ..BattleOutcome::default()
                }));
            }
            if trainer_retaliate(trainer, side, world, rng, bus)? {
                finish_defeat(battle, world, bus);
                return Ok(Some(lost_outcome(bus)));
            }
            Ok(None)
        }
        Action::UseItem { item, target } => {
            use_healing_item(side, item, target, world, bus)?;
            if trainer_retaliate(trainer, side, world, rng, bus)? {
                finish_defeat(battle, world, bus);
                return Ok(Some(lost_outcome(bus)));
            }
            Ok(None)
        }
        Action::Switch { target } => {
            switch_active(side, target, bus)?;
            if trainer_retaliate(trainer, side, world, rng, bus)? {
                finish_defeat(battle, world, bus);
                return Ok(Some(lost_outcome(bus)));
            }
            Ok(None)
        }
    }
}

fn pvp_action(
    battle: &mut Battle,
    player: &PlayerId,
    action: Action,
    world: &World,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EngineResult<Option<BattleOutcome>> {
    let BattleKind::Pvp {
        sides,
        current_turn,
        format,
        ..
    } = &mut battle.kind
    else {
        unreachable!("pvp_action on a non-pvp battle")
    };

    let actor = *current_turn;
    if sides[actor].player != *player {
        return Err(ActionError::NotYourTurn.into());
    }

    match action {
        Action::Flee => Err(ActionError::CannotFlee.into()),
        Action::Capture { .. } => Err(ActionError::CannotCapture.into()),
        Action::UseItem { .. } => Err(ActionError::UnusableItem.into()),
        Action::Surrender => {
            bus.push(BattleEvent::Surrendered {
                player: sides[actor].player.to_string(),
            });
            let winner = 1 - actor;
            Ok(Some(finish_pvp(battle, winner, world, bus)))
        }
        Action::Switch { target } => {
            if !format.allows_switching() {
                return Err(ActionError::SwitchNotAllowed.into());
            }
            switch_active(&mut sides[actor], target, bus)?;
            *current_turn = 1 - actor;
            Ok(None)
        }
        Action::Attack { move_id } => {
            let (attacker, defender) = two_sides(sides, actor);
            if attacker.active().is_fainted() {
                return Err(ActionError::MustSwitch.into());
            }
            let md = world.dex.move_data(move_id)?;
            let slot = attacker
                .active_mut()
                .move_slot_mut(move_id)
                .ok_or(ActionError::MoveNotKnown(move_id))?;
            if slot.pp == 0 {
                return Err(ActionError::NoPpLeft(md.name.clone()).into());
            }
            slot.pp -= 1;
            let pp_left = slot.pp;
            bus.push(BattleEvent::MoveUsed {
                user: attacker.active().name.clone(),
                move_name: md.name.clone(),
                pp_left,
            });
            let hit = damage::resolve(attacker.active(), defender.active(), md, rng);
            apply_hit(defender.active_mut(), hit, bus);

            if defender.active().is_fainted() {
                bus.push(BattleEvent::Fainted {
                    name: defender.active().name.clone(),
                });
                if defender.next_living().is_none() {
                    return Ok(Some(finish_pvp(battle, actor, world, bus)));
                }
                // The fainted side gets the turn and must spend it on an
                // explicit switch.
            }
            let BattleKind::Pvp { current_turn, .. } = &mut battle.kind else {
                unreachable!()
            };
            *current_turn = 1 - actor;
            Ok(None)
        }
    }
}

fn two_sides(sides: &mut [PlayerSide], actor: usize) -> (&mut PlayerSide, &mut PlayerSide) {
    let (left, right) = sides.split_at_mut(1);
    if actor == 0 {
        (&mut left[0], &mut right[0])
    } else {
        (&mut right[0], &mut left[0])
    }
}

/// Settle ratings and records for a decided PvP battle.
fn finish_pvp(
    battle: &mut Battle,
    winner_idx: usize,
    world: &World,
    bus: &mut EventBus,
) -> BattleOutcome {
    let BattleKind::Pvp { sides, .. } = &battle.kind else {
        unreachable!()
    };
    let winner = sides[winner_idx].player.clone();
    let loser = sides[1 - winner_idx].player.clone();

    let (new_winner, new_loser) =
        rooms::elo_update(world.profiles.rating(&winner), world.profiles.rating(&loser));
    world.profiles.set_rating(&winner, new_winner);
    world.profiles.set_rating(&loser, new_loser);
    world.profiles.record_win(&winner);
    world.profiles.record_loss(&loser);

    battle.status = BattleStatus::Won;
    battle.winner = Some(winner.clone());
    bus.push(BattleEvent::BattleWon {
        opponent: loser.to_string(),
    });
    BattleOutcome {
        winner: Some(winner),
        ..BattleOutcome::default()
    }
}

/// The acting player's attack against `target`. True if the target fainted.
fn player_attack(
    side: &mut PlayerSide,
    target: &mut CombatantSnapshot,
    move_id: MoveId,
    world: &World,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EngineResult<bool> {
    let md = world.dex.move_data(move_id)?;
    let slot = side
        .active_mut()
        .move_slot_mut(move_id)
        .ok_or(ActionError::MoveNotKnown(move_id))?;
    if slot.pp == 0 {
        return Err(ActionError::NoPpLeft(md.name.clone()).into());
    }
    slot.pp -= 1;
    let pp_left = slot.pp;
    bus.push(BattleEvent::MoveUsed {
        user: side.active().name.clone(),
        move_name: md.name.clone(),
        pp_left,
    });

    let hit = damage::resolve(side.active(), target, md, rng);
    apply_hit(target, hit, bus);
    if target.is_fainted() {
        bus.push(BattleEvent::Fainted {
            name: target.name.clone(),
        });
        return Ok(true);
    }
    Ok(false)
}

fn apply_hit(target: &mut CombatantSnapshot, hit: damage::DamageOutcome, bus: &mut EventBus) {
    target.take_damage(hit.amount);
    bus.push(BattleEvent::DamageDealt {
        target: target.name.clone(),
        amount: hit.amount,
    });
    bus.push(BattleEvent::Effectiveness {
        multiplier: hit.effectiveness,
    });
}

/// The wild or trainer pokemon's counterattack. True if the player has no
/// pokemon left afterwards.
fn retaliate(
    enemy: &mut CombatantSnapshot,
    enemy_name: &str,
    side: &mut PlayerSide,
    world: &World,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EngineResult<bool> {
    if enemy.moves.is_empty() {
        return Ok(false);
    }
    let pick = rng.pick_index(enemy.moves.len(), "enemy move");
    let slot = &mut enemy.moves[pick];
    // Scripted opponents never run dry; their PP is cosmetic.
    slot.pp = slot.pp.saturating_sub(1);
    let move_id = slot.move_id;
    let pp_left = slot.pp;
    let md = world.dex.move_data(move_id)?;
    bus.push(BattleEvent::MoveUsed {
        user: enemy_name.to_string(),
        move_name: md.name.clone(),
        pp_left,
    });

    let hit = damage::resolve(enemy, side.active(), md, rng);
    apply_hit(side.active_mut(), hit, bus);

    if side.active().is_fainted() {
        bus.push(BattleEvent::Fainted {
            name: side.active().name.clone(),
        });
        match side.next_living() {
            Some(slot) => {
                side.active = slot;
                bus.push(BattleEvent::SwitchedIn {
                    player: side.player.to_string(),
                    name: side.active().name.clone(),
                });
            }
            None => return Ok(true),
        }
    }
    Ok(false)
}

fn trainer_retaliate(
    trainer: &mut TrainerOpponent,
    side: &mut PlayerSide,
    world: &World,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> EngineResult<bool> {
    let name = trainer.active().name.clone();
    retaliate(trainer.active_mut(), &name, side, world, rng, bus)
}

fn use_healing_item(
    side: &mut PlayerSide,
    item: ItemKind,
    target: Option<usize>,
    world: &World,
    bus: &mut EventBus,
) -> EngineResult<()> {
    let amount = item.heal_amount().ok_or(ActionError::UnusableItem)?;
    let slot = target.unwrap_or(side.active);
    let target_snap = side
        .team
        .get(slot)
        .ok_or(ActionError::InvalidSwitchTarget)?;
    if target_snap.is_fainted() {
        return Err(ActionError::TargetFainted.into());
    }
    if !world.bag.consume(&side.player, item) {
        return Err(PreconditionError::OutOfItem(item).into());
    }
    let snap = &mut side.team[slot];
    let healed = amount.min(snap.max_hp - snap.current_hp);
    snap.heal(amount);
    bus.push(BattleEvent::ItemUsed {
        user: side.player.to_string(),
        item: item.to_string(),
        target: side.team[slot].name.clone(),
        healed,
    });
    Ok(())
}

fn switch_active(side: &mut PlayerSide, target: usize, bus: &mut EventBus) -> EngineResult<()> {
    let snap = side
        .team
        .get(target)
        .ok_or(ActionError::InvalidSwitchTarget)?;
    if target == side.active {
        return Err(ActionError::AlreadyActive.into());
    }
    if snap.is_fainted() {
        return Err(ActionError::TargetFainted.into());
    }
    side.active = target;
    bus.push(BattleEvent::SwitchedIn {
        player: side.player.to_string(),
        name: side.active().name.clone(),
    });
    Ok(())
}

/// Persist surviving HP and PP for every owned pokemon on a side.
fn write_back_side(side: &PlayerSide, world: &World) {
    for snap in &side.team {
        let Some(rid) = snap.roster_ref else { continue };
        let Some(mut entry) = world.roster.entry(&side.player, rid) else {
            continue;
        };
        entry.current_hp = snap.current_hp;
        for stored in &mut entry.moves {
            if let Some(slot) = snap.moves.iter().find(|s| s.move_id == stored.move_id) {
                stored.pp = slot.pp;
            }
        }
        world.roster.save(&side.player, &entry);
    }
}

/// Experience to the active pokemon's roster entry, money to the profile.
/// Returns the levels gained and the name of the evolved form, if any.
fn award_spoils(
    side: &PlayerSide,
    experience: u32,
    money: u32,
    world: &World,
    bus: &mut EventBus,
) -> EngineResult<(u8, Option<String>)> {
    let mut levels_gained = 0;
    let mut evolved_into = None;
    if let Some(rid) = side.active().roster_ref {
        if let Some(mut entry) = world.roster.entry(&side.player, rid) {
            bus.push(BattleEvent::ExperienceGained {
                name: side.active().name.clone(),
                amount: experience,
            });
            let old_species = entry.species;
            let progress = progression::add_experience(
                &mut entry,
                experience,
                &world.dex,
                world.pokedex.as_ref(),
                &side.player,
            )?;
            if progress.levels_gained > 0 {
                bus.push(BattleEvent::LeveledUp {
                    name: side.active().name.clone(),
                    level: progress.new_level,
                });
            }
            if let Some(evolved) = progress.evolved_into {
                let new_name = world.dex.species(evolved)?.name.clone();
                bus.push(BattleEvent::Evolved {
                    old_name: world.dex.species(old_species)?.name.clone(),
                    new_name: new_name.clone(),
                });
                evolved_into = Some(new_name);
            }
            levels_gained = progress.levels_gained;
            world.roster.save(&side.player, &entry);
        }
    }
    world.profiles.add_money(&side.player, money);
    bus.push(BattleEvent::MoneyGained { amount: money });
    Ok((levels_gained, evolved_into))
}

/// The player is out of pokemon: heal the roster and send them home.
fn finish_defeat(battle: &mut Battle, world: &World, bus: &mut EventBus) {
    let side = match &battle.kind {
        BattleKind::Wild { player, .. } | BattleKind::Trainer { player, .. } => player,
        BattleKind::Pvp { .. } => unreachable!("pvp defeats settle through finish_pvp"),
    };
    battle.status = BattleStatus::Lost;
    bus.push(BattleEvent::BattleLost);
    world.roster.heal_all(&side.player);
    if let Some(here) = world.map.location_of(&side.player) {
        if let Some(town) = world.map.nearest_town(here.id) {
            world.map.teleport(&side.player, town.id);
            bus.push(BattleEvent::TeleportedTo {
                location: town.name,
            });
        }
    }
}

fn lost_outcome(bus: &EventBus) -> BattleOutcome {
    let teleported_to = bus.events().iter().find_map(|e| match e {
        BattleEvent::TeleportedTo { location } => Some(location.clone()),
        _ => None,
    });
    BattleOutcome {
        teleported_to,
        ..BattleOutcome::default()
    }
}

/// A freshly caught pokemon goes to the reserve with its two most recent
/// level-up moves.
fn roster_entry_from_wild(wild: &CombatantSnapshot) -> RosterEntry {
    RosterEntry {
        // The store assigns the real id.
        id: RosterId(0),
        species: wild.species,
        nickname: None,
        level: wild.level,
        experience: progression::experience_required(wild.level),
        current_hp: wild.current_hp,
        stats: wild.stats,
        moves: wild
            .moves
            .iter()
            .rev()
            .take(2)
            .rev()
            .map(|s| RosterMove {
                move_id: s.move_id,
                pp: s.pp,
            })
            .collect(),
        in_team: false,
        order: u8::MAX,
    }
}
