//! A turn-based creature battle engine.
//!
//! The crate covers the whole battle lifecycle: wild encounters rolled from
//! location tables, generated trainer opponents, captures, experience and
//! evolution, and code-based PvP rooms with Elo ratings. Persistence and
//! transport stay outside; the host wires its stores in through the traits
//! in [`external`] and drives everything through a [`service::BattleService`].

pub mod battle;
pub mod capture;
pub mod damage;
pub mod data;
pub mod encounter;
pub mod errors;
pub mod external;
pub mod memory;
pub mod progression;
pub mod rng;
pub mod rooms;
pub mod service;
pub mod snapshot;
pub mod stats;

// Battle flow
pub use battle::engine::{apply_action, Action, ActionReport, BattleOutcome};
pub use battle::events::{BattleEvent, EventBus};
pub use battle::state::{Battle, BattleId, BattleStatus, BattleView, PvpFormat};

// Resolution pieces
pub use capture::CaptureOutcome;
pub use damage::DamageOutcome;
pub use rng::TurnRng;
pub use snapshot::CombatantSnapshot;
pub use stats::Stats;

// Host integration
pub use data::Dex;
pub use errors::{EngineError, EngineResult};
pub use external::{ItemKind, PlayerId, RosterEntry, RosterId, World};
pub use service::BattleService;
