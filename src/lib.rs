//! Waggle - grid-world bee colony simulation driven by behavior trees

pub mod behavior;
pub mod core;
pub mod entity;
pub mod simulation;
pub mod spatial;
pub mod world;

pub use crate::core::config::SimulationConfig;
pub use crate::world::World;
