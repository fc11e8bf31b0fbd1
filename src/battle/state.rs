//! Battle state: who is fighting whom, whose turn it is, and how it ends.

use crate::external::PlayerId;
use crate::snapshot::CombatantSnapshot;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BattleId(pub Uuid);

impl BattleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BattleId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    /// A PvP room waiting for a second player.
    Waiting,
    Active,
    Won,
    Lost,
    Fled,
    /// PvP rooms that expire or otherwise end with no winner.
    Draw,
}

impl BattleStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BattleStatus::Waiting | BattleStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PvpFormat {
    OneVsOne,
    TwoVsTwo,
}

impl PvpFormat {
    pub fn required_pokemon(self) -> usize {
        match self {
            PvpFormat::OneVsOne => 1,
            PvpFormat::TwoVsTwo => 2,
        }
    }

    pub fn allows_switching(self) -> bool {
        matches!(self, PvpFormat::TwoVsTwo)
    }
}

/// One human participant's half of a battle.
#[derive(Debug, Clone)]
pub struct PlayerSide {
    pub player: PlayerId,
    pub team: Vec<CombatantSnapshot>,
    pub active: usize,
}

impl PlayerSide {
    pub fn new(player: PlayerId, team: Vec<CombatantSnapshot>) -> Self {
        let active = team.iter().position(|c| !c.is_fainted()).unwrap_or(0);
        Self {
            player,
            team,
            active,
        }
    }

    pub fn active(&self) -> &CombatantSnapshot {
        &self.team[self.active]
    }

    pub fn active_mut(&mut self) -> &mut CombatantSnapshot {
        &mut self.team[self.active]
    }

    /// First conscious team slot other than the active one.
    pub fn next_living(&self) -> Option<usize> {
        self.team
            .iter()
            .enumerate()
            .position(|(i, c)| i != self.active && !c.is_fainted())
    }

    pub fn all_fainted(&self) -> bool {
        self.team.iter().all(CombatantSnapshot::is_fainted)
    }
}

/// A computer-controlled trainer and their team.
#[derive(Debug, Clone)]
pub struct TrainerOpponent {
    pub name: String,
    pub dialogue: String,
    pub money_reward: u32,
    pub team: Vec<CombatantSnapshot>,
    pub active: usize,
}

impl TrainerOpponent {
    pub fn active(&self) -> &CombatantSnapshot {
        &self.team[self.active]
    }

    pub fn active_mut(&mut self) -> &mut CombatantSnapshot {
        &mut self.team[self.active]
    }

    /// Advance to the next conscious team member; false when none remain.
    pub fn send_next(&mut self) -> bool {
        match self.team.iter().position(|c| !c.is_fainted()) {
            Some(i) => {
                self.active = i;
                true
            }
            None => false,
        }
    }
}

/// The matchmaking shell around a PvP battle.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: String,
    pub is_private: bool,
    pub password: Option<String>,
    pub created_at: Instant,
}

#[derive(Debug)]
pub enum BattleKind {
    Wild {
        player: PlayerSide,
        wild: CombatantSnapshot,
    },
    Trainer {
        player: PlayerSide,
        trainer: TrainerOpponent,
    },
    Pvp {
        room: Room,
        /// One side while the room waits, two once it fills.
        sides: Vec<PlayerSide>,
        /// Index into `sides` of whoever acts next.
        current_turn: usize,
        format: PvpFormat,
    },
}

#[derive(Debug)]
pub struct Battle {
    pub id: BattleId,
    pub status: BattleStatus,
    pub turn: u32,
    pub kind: BattleKind,
    pub winner: Option<PlayerId>,
}

impl Battle {
    pub fn new(kind: BattleKind) -> Self {
        let status = match &kind {
            BattleKind::Pvp { sides, .. } if sides.len() < 2 => BattleStatus::Waiting,
            _ => BattleStatus::Active,
        };
        Self {
            id: BattleId::new(),
            status,
            turn: 0,
            kind,
            winner: None,
        }
    }

    /// Does `player` sit on one of this battle's sides?
    pub fn involves(&self, player: &PlayerId) -> bool {
        match &self.kind {
            BattleKind::Wild { player: side, .. } | BattleKind::Trainer { player: side, .. } => {
                side.player == *player
            }
            BattleKind::Pvp { sides, .. } => sides.iter().any(|s| s.player == *player),
        }
    }

    pub fn side_of(&self, player: &PlayerId) -> Option<&PlayerSide> {
        match &self.kind {
            BattleKind::Wild { player: side, .. } | BattleKind::Trainer { player: side, .. } => {
                (side.player == *player).then_some(side)
            }
            BattleKind::Pvp { sides, .. } => sides.iter().find(|s| s.player == *player),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveView {
    pub name: String,
    pub pp: u8,
    pub max_pp: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombatantView {
    pub name: String,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    /// Populated for the viewer's own side only.
    pub moves: Vec<MoveView>,
}

/// What one participant is allowed to see of a battle.
#[derive(Debug, Clone, Serialize)]
pub struct BattleView {
    pub id: BattleId,
    pub status: BattleStatus,
    pub turn: u32,
    pub you: CombatantView,
    pub opponent: Option<CombatantView>,
    pub your_turn: bool,
}
