//! Tick system - orchestrates simulation updates
//!
//! Each tick refreshes the scent field, then walks every living agent's
//! behavior tree to completion, one agent at a time. The serial order is
//! observable state: a scout's recruitment broadcast reaches a hive-mate
//! within the same tick only if that mate has not acted yet; otherwise
//! the mate picks the report up on its next tick. Agents act in spawn
//! order.

use serde::Serialize;

use crate::core::types::{BeeId, DenId, FlowerId, GridPos, HiveId};
use crate::entity::bee::{bee_tree, BeeCtx};
use crate::entity::den::{den_tree, DenCtx};
use crate::world::World;

/// Events generated during one simulation tick
///
/// Side effects on the world are the primary output of a tick; these
/// events are the reporting channel for logs, the demo binary and
/// tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimulationEvent {
    /// A scoutless hive promoted this bee
    ScoutPromoted { bee: BeeId },
    /// The bee was removed from its cell and hive roster
    BeeDied { bee: BeeId, scout: bool },
    /// A scout handed its food location to idle hive-mates
    RecruitsDispatched {
        scout: BeeId,
        recruits: usize,
        location: GridPos,
    },
    NectarHarvested {
        bee: BeeId,
        flower: FlowerId,
        amount: f32,
    },
    NectarDeposited {
        bee: BeeId,
        hive: HiveId,
        amount: f32,
    },
    /// The den stood unused past its lifetime
    DenCollapsed { den: DenId },
}

/// Advance the world by one tick, returning the events it produced
pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    world.current_tick += 1;
    world.refresh_scent();

    let mut events = Vec::new();

    let tree = bee_tree();
    for id in world.living_bees() {
        let mut ctx = BeeCtx {
            world: &mut *world,
            events: &mut events,
            id,
        };
        tree.evaluate(&mut ctx);
    }

    let dens = den_tree();
    for id in world.standing_dens() {
        let mut ctx = DenCtx {
            world: &mut *world,
            events: &mut events,
            id,
        };
        dens.evaluate(&mut ctx);
    }

    if !events.is_empty() {
        tracing::debug!(
            tick = world.current_tick,
            count = events.len(),
            "tick produced events"
        );
    }
    events
}
