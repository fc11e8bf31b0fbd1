use crate::external::ItemKind;
use schema::{MoveId, SpeciesId};
use thiserror::Error;

/// Reference-catalog lookups that came back empty. These indicate stale or
/// inconsistent data rather than a bad player request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("unknown species id {0:?}")]
    UnknownSpecies(SpeciesId),
    #[error("unknown move id {0:?}")]
    UnknownMove(MoveId),
}

/// A submitted action the current battle state rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the battle is already over")]
    BattleOver,
    #[error("the battle has not started yet")]
    NotStarted,
    #[error("active pokemon does not know move {0:?}")]
    MoveNotKnown(MoveId),
    #[error("{0} has no PP left")]
    NoPpLeft(String),
    #[error("cannot flee from this battle")]
    CannotFlee,
    #[error("cannot throw a ball in this battle")]
    CannotCapture,
    #[error("cannot surrender in this battle")]
    CannotSurrender,
    #[error("switching is not allowed in this format")]
    SwitchNotAllowed,
    #[error("your active pokemon has fainted; send out another one")]
    MustSwitch,
    #[error("no pokemon in that team slot")]
    InvalidSwitchTarget,
    #[error("that pokemon has fainted")]
    TargetFainted,
    #[error("that pokemon is already battling")]
    AlreadyActive,
    #[error("that item cannot be used here")]
    UnusableItem,
}

/// PvP room lifecycle failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("you already have a battle in progress")]
    AlreadyInBattle,
    #[error("no open room with that code")]
    RoomNotFound,
    #[error("wrong room password")]
    WrongPassword,
    #[error("cannot join your own room")]
    SelfJoin,
    #[error("this format needs at least {0} able pokemon")]
    NotEnoughPokemon(usize),
    #[error("the room has expired")]
    RoomExpired,
}

/// Checks that fail before a battle or an item use can begin at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no {0} left in the bag")]
    OutOfItem(ItemKind),
    #[error("no pokemon able to battle")]
    NoHealthyPokemon,
    #[error("wild pokemon only appear on routes")]
    NotOnRoute,
    #[error("nothing lives around here")]
    NoEncounters,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("battle not found")]
    BattleNotFound,
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
}

pub type EngineResult<T> = Result<T, EngineError>;
