use serde::{Deserialize, Serialize};
use std::fmt;

/// The 18 elemental types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl PokemonType {
    /// Effectiveness multiplier for one attacking type against one defending
    /// type. Pairs not listed in the matchup table are neutral (1.0).
    ///
    /// Returns: 2.0 = super effective, 1.0 = neutral, 0.5 = not very
    /// effective, 0.0 = immune.
    pub fn matchup(attacking: PokemonType, defending: PokemonType) -> f64 {
        use PokemonType::*;

        match (attacking, defending) {
            // Normal
            (Normal, Ghost) => 0.0,
            (Normal, Rock) | (Normal, Steel) => 0.5,

            // Fire
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => 0.5,
            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => 2.0,

            // Water
            (Water, Water) | (Water, Grass) | (Water, Dragon) => 0.5,
            (Water, Fire) | (Water, Ground) | (Water, Rock) => 2.0,

            // Electric
            (Electric, Ground) => 0.0,
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => 0.5,
            (Electric, Water) | (Electric, Flying) => 2.0,

            // Grass
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => 0.5,
            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => 2.0,

            // Ice
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => 0.5,
            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => 2.0,

            // Fighting
            (Fighting, Ghost) => 0.0,
            (Fighting, Poison)
            | (Fighting, Flying)
            | (Fighting, Psychic)
            | (Fighting, Bug)
            | (Fighting, Fairy) => 0.5,
            (Fighting, Normal)
            | (Fighting, Ice)
            | (Fighting, Rock)
            | (Fighting, Dark)
            | (Fighting, Steel) => 2.0,

            // Poison
            (Poison, Steel) => 0.0,
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => 0.5,
            (Poison, Grass) | (Poison, Fairy) => 2.0,

            // Ground
            (Ground, Flying) => 0.0,
            (Ground, Grass) | (Ground, Bug) => 0.5,
            (Ground, Fire)
            | (Ground, Electric)
            | (Ground, Poison)
            | (Ground, Rock)
            | (Ground, Steel) => 2.0,

            // Flying
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => 0.5,
            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => 2.0,

            // Psychic
            (Psychic, Dark) => 0.0,
            (Psychic, Psychic) | (Psychic, Steel) => 0.5,
            (Psychic, Fighting) | (Psychic, Poison) => 2.0,

            // Bug
            (Bug, Fire)
            | (Bug, Fighting)
            | (Bug, Poison)
            | (Bug, Flying)
            | (Bug, Ghost)
            | (Bug, Steel)
            | (Bug, Fairy) => 0.5,
            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => 2.0,

            // Rock
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => 0.5,
            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => 2.0,

            // Ghost
            (Ghost, Normal) => 0.0,
            (Ghost, Dark) => 0.5,
            (Ghost, Psychic) | (Ghost, Ghost) => 2.0,

            // Dragon
            (Dragon, Fairy) => 0.0,
            (Dragon, Steel) => 0.5,
            (Dragon, Dragon) => 2.0,

            // Dark
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => 0.5,
            (Dark, Psychic) | (Dark, Ghost) => 2.0,

            // Steel
            (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => 0.5,
            (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => 2.0,

            // Fairy
            (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => 0.5,
            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => 2.0,

            _ => 1.0,
        }
    }

    /// Effectiveness against a defender with one or two types: the product of
    /// the per-type matchups, so 4x, 0.25x and immune outcomes are possible.
    pub fn effectiveness(attacking: PokemonType, defending: &[PokemonType]) -> f64 {
        defending
            .iter()
            .map(|d| Self::matchup(attacking, *d))
            .product()
    }

    pub fn is_immune(attacking: PokemonType, defending: &[PokemonType]) -> bool {
        Self::effectiveness(attacking, defending) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PokemonType::*;

    #[test]
    fn unlisted_pairs_are_neutral() {
        assert_eq!(PokemonType::matchup(Normal, Normal), 1.0);
        assert_eq!(PokemonType::matchup(Fire, Normal), 1.0);
        assert_eq!(PokemonType::matchup(Dragon, Water), 1.0);
    }

    #[test]
    fn single_type_lookups() {
        assert_eq!(PokemonType::effectiveness(Water, &[Fire]), 2.0);
        assert_eq!(PokemonType::effectiveness(Electric, &[Ground]), 0.0);
        assert_eq!(PokemonType::effectiveness(Fire, &[Water]), 0.5);
        assert_eq!(PokemonType::effectiveness(Ghost, &[Normal]), 0.0);
    }

    #[test]
    fn dual_type_effectiveness_is_multiplicative() {
        assert_eq!(PokemonType::effectiveness(Water, &[Fire, Rock]), 4.0);
        assert_eq!(PokemonType::effectiveness(Grass, &[Fire, Flying]), 0.25);
        assert_eq!(PokemonType::effectiveness(Electric, &[Water, Ground]), 0.0);
    }

    #[test]
    fn immunity_beats_any_other_multiplier() {
        assert!(PokemonType::is_immune(Ground, &[Fire, Flying]));
        assert!(!PokemonType::is_immune(Ground, &[Fire, Rock]));
    }
}
