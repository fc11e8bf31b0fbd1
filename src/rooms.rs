//! PvP matchmaking: rooms, joining, and ratings.

use crate::battle::events::{BattleEvent, EventBus};
use crate::battle::state::{Battle, BattleId, BattleKind, BattleStatus, PlayerSide, PvpFormat, Room};
use crate::errors::{EngineResult, RoomError};
use crate::external::PlayerId;
use crate::rng::TurnRng;
use crate::service::BattleService;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Rooms nobody joins are reaped lazily after this long.
pub const ROOM_TTL: Duration = Duration::from_secs(30 * 60);

const CODE_LENGTH: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A joinable room as shown in the public lobby list.
#[derive(Debug, Clone, Serialize)]
pub struct RoomListing {
    pub code: String,
    pub host: PlayerId,
    pub format: PvpFormat,
    pub has_password: bool,
}

impl BattleService {
    /// Open a room and wait for an opponent. The host's team is leveled for
    /// ranked play immediately so the lobby can show it.
    pub fn create_room(
        &self,
        player: &PlayerId,
        format: PvpFormat,
        is_private: bool,
        password: Option<String>,
    ) -> EngineResult<(BattleId, String)> {
        self.reap_expired_rooms();
        if self.find_for(player).is_some() {
            return Err(RoomError::AlreadyInBattle.into());
        }
        let team = self.pvp_team(player, format.required_pokemon())?;
        let code = self.unique_room_code();
        let room = Room {
            code: code.clone(),
            is_private,
            password,
            created_at: Instant::now(),
        };
        let battle = Battle::new(BattleKind::Pvp {
            room,
            sides: vec![PlayerSide::new(player.clone(), team)],
            current_turn: 0,
            format,
        });
        let id = self.insert(battle);
        log::info!("player {} opened pvp room {}", player, code);
        Ok((id, code))
    }

    /// Join a waiting room by code. The faster lead pokemon moves first; a
    /// speed tie is settled by coin flip.
    pub fn join_room(
        &self,
        player: &PlayerId,
        code: &str,
        password: Option<&str>,
    ) -> EngineResult<(BattleId, Vec<String>)> {
        self.join_room_with_rng(player, code, password, &mut TurnRng::new_random())
    }

    pub fn join_room_with_rng(
        &self,
        player: &PlayerId,
        code: &str,
        password: Option<&str>,
        rng: &mut TurnRng,
    ) -> EngineResult<(BattleId, Vec<String>)> {
        let handle = self
            .waiting_room(code)
            .ok_or(RoomError::RoomNotFound)?;
        if let Some(existing) = self.find_for(player) {
            let err = if Arc::ptr_eq(&existing, &handle) {
                RoomError::SelfJoin
            } else {
                RoomError::AlreadyInBattle
            };
            return Err(err.into());
        }
        let mut battle = handle.lock().expect("battle poisoned");
        // Someone may have joined between lookup and lock.
        if battle.status != BattleStatus::Waiting {
            return Err(RoomError::RoomNotFound.into());
        }
        if let BattleKind::Pvp { room, .. } = &battle.kind {
            if room.created_at.elapsed() > ROOM_TTL {
                log::info!("room {} expired unjoined", room.code);
                battle.status = BattleStatus::Draw;
                return Err(RoomError::RoomExpired.into());
            }
        }
        let BattleKind::Pvp {
            room,
            sides,
            current_turn,
            format,
        } = &mut battle.kind
        else {
            return Err(RoomError::RoomNotFound.into());
        };

        if room.password.as_deref() != password {
            return Err(RoomError::WrongPassword.into());
        }
        let team = self.pvp_team(player, format.required_pokemon())?;
        sides.push(PlayerSide::new(player.clone(), team));

        let host_speed = sides[0].active().stats.speed;
        let joiner_speed = sides[1].active().stats.speed;
        *current_turn = if host_speed > joiner_speed {
            0
        } else if joiner_speed > host_speed {
            1
        } else if rng.coin("first turn tie") {
            0
        } else {
            1
        };
        battle.status = BattleStatus::Active;

        let mut bus = EventBus::new();
        let BattleKind::Pvp { sides, current_turn, .. } = &battle.kind else {
            unreachable!()
        };
        for side in sides {
            bus.push(BattleEvent::SwitchedIn {
                player: side.player.to_string(),
                name: side.active().name.clone(),
            });
        }
        log::info!(
            "player {} joined room {}; {} moves first",
            player,
            code,
            sides[*current_turn].player
        );
        Ok((battle.id, bus.into_log()))
    }

    /// Public, unexpired rooms still waiting for an opponent.
    pub fn open_rooms(&self) -> Vec<RoomListing> {
        self.reap_expired_rooms();
        let mut listings = Vec::new();
        self.for_each_battle(|battle| {
            if battle.status != BattleStatus::Waiting {
                return;
            }
            if let BattleKind::Pvp {
                room,
                sides,
                format,
                ..
            } = &battle.kind
            {
                if !room.is_private {
                    listings.push(RoomListing {
                        code: room.code.clone(),
                        host: sides[0].player.clone(),
                        format: *format,
                        has_password: room.password.is_some(),
                    });
                }
            }
        });
        listings.sort_by(|a, b| a.code.cmp(&b.code));
        listings
    }

    /// Waiting rooms past their TTL end as draws; nobody's rating moves.
    fn reap_expired_rooms(&self) {
        self.for_each_battle(|battle| {
            if battle.status != BattleStatus::Waiting {
                return;
            }
            if let BattleKind::Pvp { room, .. } = &battle.kind {
                if room.created_at.elapsed() > ROOM_TTL {
                    log::info!("room {} expired unjoined", room.code);
                    battle.status = BattleStatus::Draw;
                }
            }
        });
    }

    fn waiting_room(&self, code: &str) -> Option<Arc<Mutex<Battle>>> {
        let mut found = None;
        let mut id = None;
        self.for_each_battle(|battle| {
            if battle.status != BattleStatus::Waiting {
                return;
            }
            if let BattleKind::Pvp { room, .. } = &battle.kind {
                if room.code == code {
                    id = Some(battle.id);
                }
            }
        });
        if let Some(id) = id {
            found = self.battle(id).ok();
        }
        found
    }

    fn unique_room_code(&self) -> String {
        loop {
            let code = generate_room_code();
            let mut taken = false;
            self.for_each_battle(|battle| {
                if battle.status != BattleStatus::Waiting {
                    return;
                }
                if let BattleKind::Pvp { room, .. } = &battle.kind {
                    if room.code == code {
                        taken = true;
                    }
                }
            });
            if !taken {
                return code;
            }
        }
    }
}

/// Six uppercase letters or digits.
pub fn generate_room_code() -> String {
    use rand::Rng;
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Standard Elo with K = 32, truncated toward zero like the original
/// bookkeeping, and no rating ever drops below 0.
pub fn elo_update(winner_rating: i32, loser_rating: i32) -> (i32, i32) {
    const K: f64 = 32.0;
    let expected_winner =
        1.0 / (1.0 + 10f64.powf(f64::from(loser_rating - winner_rating) / 400.0));
    let delta = K * (1.0 - expected_winner);
    let new_winner = (f64::from(winner_rating) + delta) as i32;
    let new_loser = ((f64::from(loser_rating) - delta) as i32).max(0);
    (new_winner, new_loser)
}
