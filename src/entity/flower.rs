//! Flowers - the nectar and pollen sources bees harvest

use serde::{Deserialize, Serialize};

use crate::core::types::{FlowerId, GridPos};

/// A flower rooted on one grid cell
///
/// Bees deduct nectar when harvesting, carry pollen away and set
/// `has_seed` when pollen from another flower is dumped here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flower {
    pub id: FlowerId,
    pub pos: GridPos,
    pub nectar: f32,
    pub pollen: f32,
    pub has_seed: bool,
}

impl Flower {
    pub fn new(id: FlowerId, pos: GridPos, nectar: f32, pollen: f32) -> Self {
        Self {
            id,
            pos,
            nectar,
            pollen,
            has_seed: false,
        }
    }

    /// Whether the flower holds enough nectar to be worth a harvest trip
    pub fn harvestable(&self, min_nectar: f32) -> bool {
        self.nectar >= min_nectar
    }
}
