pub mod engine;
pub mod events;
pub mod state;

#[cfg(test)]
mod tests;
