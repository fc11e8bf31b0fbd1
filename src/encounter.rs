//! Seeding battles: wild encounter rolls and generated trainer opponents.

use crate::data::Dex;
use crate::errors::{EngineResult, PreconditionError};
use crate::rng::TurnRng;
use crate::snapshot::CombatantSnapshot;
use schema::{EncounterEntry, Rarity};

/// Rarities from most to least frequent; their weights sum to 100.
const RARITY_ORDER: [Rarity; 4] = [
    Rarity::Common,
    Rarity::Uncommon,
    Rarity::Rare,
    Rarity::VeryRare,
];

/// Pick one row of a location's encounter table.
///
/// Rarity is decided first, weighted by [`Rarity::weight`], then a uniform
/// pick among that rarity's rows. An unpopulated tier falls back toward
/// common, then to whatever rarer tiers remain, so sparse tables still work.
pub fn pick_encounter<'a>(
    table: &'a [EncounterEntry],
    rng: &mut TurnRng,
) -> EngineResult<&'a EncounterEntry> {
    if table.is_empty() {
        return Err(PreconditionError::NoEncounters.into());
    }

    let roll = u32::from(rng.range(1, 100, "encounter rarity"));
    let mut rolled = RARITY_ORDER.len() - 1;
    let mut cutoff = 0;
    for (i, rarity) in RARITY_ORDER.iter().enumerate() {
        cutoff += rarity.weight();
        if roll <= cutoff {
            rolled = i;
            break;
        }
    }

    let ladder = RARITY_ORDER[..=rolled]
        .iter()
        .rev()
        .chain(RARITY_ORDER[rolled + 1..].iter());
    for rarity in ladder {
        let rows: Vec<&EncounterEntry> = table.iter().filter(|e| e.rarity == *rarity).collect();
        if !rows.is_empty() {
            return Ok(rows[rng.pick_index(rows.len(), "encounter row")]);
        }
    }
    unreachable!("a non-empty table has at least one populated tier")
}

pub fn roll_level(entry: &EncounterEntry, rng: &mut TurnRng) -> u8 {
    rng.range(entry.min_level, entry.max_level.max(entry.min_level), "encounter level")
}

/// Trainer difficulty bands. The weights below pick a tier, the tier fixes
/// team size, level range and payout per team member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerTier {
    Beginner,
    Intermediate,
    Advanced,
    GymLeader,
}

impl TrainerTier {
    /// 40 / 30 / 20 / 10 split.
    fn roll(rng: &mut TurnRng) -> Self {
        match rng.range(1, 100, "trainer tier") {
            1..=40 => TrainerTier::Beginner,
            41..=70 => TrainerTier::Intermediate,
            71..=90 => TrainerTier::Advanced,
            _ => TrainerTier::GymLeader,
        }
    }

    fn team_size_range(self) -> (u8, u8) {
        match self {
            TrainerTier::Beginner => (1, 2),
            TrainerTier::Intermediate => (2, 3),
            TrainerTier::Advanced => (3, 4),
            TrainerTier::GymLeader => (5, 6),
        }
    }

    fn level_range(self) -> (u8, u8) {
        match self {
            TrainerTier::Beginner => (3, 7),
            TrainerTier::Intermediate => (8, 15),
            TrainerTier::Advanced => (16, 25),
            TrainerTier::GymLeader => (26, 40),
        }
    }

    /// Prize money per pokemon on the team.
    fn reward_per_member(self) -> u32 {
        match self {
            TrainerTier::Beginner => 50,
            TrainerTier::Intermediate => 100,
            TrainerTier::Advanced => 200,
            TrainerTier::GymLeader => 500,
        }
    }

    fn title(self) -> &'static str {
        match self {
            TrainerTier::Beginner => "Youngster",
            TrainerTier::Intermediate => "Hiker",
            TrainerTier::Advanced => "Ace Trainer",
            TrainerTier::GymLeader => "Gym Leader",
        }
    }

    fn dialogue(self) -> &'static str {
        match self {
            TrainerTier::Beginner => "Hey! Let's battle!",
            TrainerTier::Intermediate => "You look tough. Show me what you've got!",
            TrainerTier::Advanced => "I won't go easy on you.",
            TrainerTier::GymLeader => "Prove yourself worthy of a badge!",
        }
    }
}

const TRAINER_NAMES: &[&str] = &[
    "Joey", "Mina", "Brock", "Sawyer", "Erika", "Wade", "Karen", "Falk",
];

/// A trainer opponent rolled from a route's encounter table.
#[derive(Debug, Clone)]
pub struct GeneratedTrainer {
    pub name: String,
    pub dialogue: String,
    pub money_reward: u32,
    pub team: Vec<CombatantSnapshot>,
}

/// Roll a trainer whose team is drawn from the local encounter table. Team
/// members avoid repeating a species while the table has unused rows left.
pub fn generate_trainer(
    dex: &Dex,
    table: &[EncounterEntry],
    rng: &mut TurnRng,
) -> EngineResult<GeneratedTrainer> {
    if table.is_empty() {
        return Err(PreconditionError::NoEncounters.into());
    }

    let tier = TrainerTier::roll(rng);
    let (min_size, max_size) = tier.team_size_range();
    let size = rng.range(min_size, max_size, "trainer team size");
    let (min_level, max_level) = tier.level_range();

    let mut team = Vec::with_capacity(usize::from(size));
    let mut used = Vec::new();
    for _ in 0..size {
        let fresh: Vec<&EncounterEntry> = table
            .iter()
            .filter(|e| !used.contains(&e.species))
            .collect();
        let entry = if fresh.is_empty() {
            &table[rng.pick_index(table.len(), "trainer species")]
        } else {
            fresh[rng.pick_index(fresh.len(), "trainer species")]
        };
        used.push(entry.species);

        let level = rng.range(min_level, max_level, "trainer member level");
        team.push(CombatantSnapshot::from_species(dex, entry.species, level)?);
    }

    let name = format!(
        "{} {}",
        tier.title(),
        TRAINER_NAMES[rng.pick_index(TRAINER_NAMES.len(), "trainer name")]
    );

    Ok(GeneratedTrainer {
        name,
        dialogue: tier.dialogue().to_string(),
        money_reward: tier.reward_per_member() * u32::from(size),
        team,
    })
}
