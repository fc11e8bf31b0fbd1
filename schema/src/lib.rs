// Pokemon Arena Schema - Shared reference-data definitions
//
// This crate contains the data types shared between the battle engine and
// whatever layer loads or serves reference data: elemental types and the
// effectiveness matrix, move data, species data, and encounter/location data.
// It carries no battle logic beyond the type chart itself.

pub use move_data::*;
pub use pokemon_types::*;
pub use species_data::*;
pub use world_data::*;

pub mod move_data;
pub mod pokemon_types;
pub mod species_data;
pub mod world_data;
