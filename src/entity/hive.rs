//! Hives - colony home, food stock and bee roster

use serde::{Deserialize, Serialize};

use crate::core::types::{BeeId, GridPos, HiveId};

/// A hive anchored on one grid cell
///
/// Owns the roster of member bees; each bee holds a non-owning handle
/// back to its hive. At most one member is the hive's scout at a time,
/// tracked by `has_scout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hive {
    pub id: HiveId,
    pub pos: GridPos,
    /// Aggregate nectar stock deposited by recruits
    pub food: f32,
    pub has_scout: bool,
    pub members: Vec<BeeId>,
}

impl Hive {
    pub fn new(id: HiveId, pos: GridPos) -> Self {
        Self {
            id,
            pos,
            food: 0.0,
            has_scout: false,
            members: Vec::new(),
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
