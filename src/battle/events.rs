//! What happened during a turn, as data first and text second.
//!
//! The engine pushes [`BattleEvent`]s onto an [`EventBus`] while it resolves
//! an action. Events carry display names rather than ids so the log is
//! self-contained. Some events exist only for bookkeeping and format to
//! nothing.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BattleEvent {
    WildAppeared {
        name: String,
        level: u8,
    },
    TrainerIntro {
        name: String,
        dialogue: String,
    },
    TrainerSentOut {
        trainer: String,
        name: String,
    },
    MoveUsed {
        user: String,
        move_name: String,
        pp_left: u8,
    },
    DamageDealt {
        target: String,
        amount: u16,
    },
    Effectiveness {
        multiplier: f64,
    },
    Fainted {
        name: String,
    },
    SwitchedIn {
        player: String,
        name: String,
    },
    ItemUsed {
        user: String,
        item: String,
        target: String,
        healed: u16,
    },
    CaptureAttempt {
        ball: String,
        target: String,
    },
    CaptureSucceeded {
        name: String,
    },
    CaptureFailed {
        name: String,
        almost: bool,
    },
    Fled,
    ExperienceGained {
        name: String,
        amount: u32,
    },
    LeveledUp {
        name: String,
        level: u8,
    },
    Evolved {
        old_name: String,
        new_name: String,
    },
    MoneyGained {
        amount: u32,
    },
    TeleportedTo {
        location: String,
    },
    BattleWon {
        opponent: String,
    },
    BattleLost,
    Surrendered {
        player: String,
    },
}

impl BattleEvent {
    /// Player-facing line for this event, or None for silent bookkeeping
    /// events (neutral effectiveness, turn counters).
    pub fn format(&self) -> Option<String> {
        use BattleEvent::*;
        let line = match self {
            WildAppeared { name, level } => {
                format!("A wild {} appeared! (Lv. {})", name, level)
            }
            TrainerIntro { name, dialogue } => {
                format!("{} wants to battle! \"{}\"", name, dialogue)
            }
            TrainerSentOut { trainer, name } => format!("{} sent out {}!", trainer, name),
            MoveUsed {
                user, move_name, ..
            } => format!("{} used {}!", user, move_name),
            DamageDealt { target, amount } => {
                format!("{} took {} damage!", target, amount)
            }
            Effectiveness { multiplier } => match multiplier {
                m if *m == 0.0 => "It had no effect...".to_string(),
                m if *m < 1.0 => "It's not very effective...".to_string(),
                m if *m > 1.0 => "It's super effective!".to_string(),
                _ => return None,
            },
            Fainted { name } => format!("{} fainted!", name),
            SwitchedIn { player, name } => format!("{} sent out {}!", player, name),
            ItemUsed {
                user,
                item,
                target,
                healed,
            } => format!(
                "{} used a {} on {}. It restored {} HP!",
                user, item, target, healed
            ),
            CaptureAttempt { ball, target } => {
                format!("You threw a {} at {}!", ball, target)
            }
            CaptureSucceeded { name } => format!("Gotcha! {} was caught!", name),
            CaptureFailed { name, almost } => {
                if *almost {
                    format!("So close! {} broke free!", name)
                } else {
                    format!("Oh no! {} escaped!", name)
                }
            }
            Fled => "Got away safely!".to_string(),
            ExperienceGained { name, amount } => {
                format!("{} gained {} EXP!", name, amount)
            }
            LeveledUp { name, level } => format!("{} grew to level {}!", name, level),
            Evolved { old_name, new_name } => {
                format!("What? {} is evolving... into {}!", old_name, new_name)
            }
            MoneyGained { amount } => format!("You got ${} for winning!", amount),
            TeleportedTo { location } => {
                format!("You blacked out and woke up in {}.", location)
            }
            BattleWon { opponent } => format!("You defeated {}!", opponent),
            BattleLost => "You have no pokemon left able to battle!".to_string(),
            Surrendered { player } => format!("{} surrendered!", player),
        };
        Some(line)
    }
}

/// Ordered accumulator for one action's events.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// The displayable log, silent events dropped.
    pub fn into_log(self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }
}
