//! Dens - stationary agents driven by the same tree pattern as bees
//!
//! A den does nothing but count ticks since it was last used and
//! collapse once the count passes its lifetime. Whatever resets the
//! count (a predator moving back in, for instance) lives outside this
//! crate and calls [`Den::mark_used`].

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::behavior::{Action, Condition, Node, Status};
use crate::core::types::{DenId, GridPos};
use crate::simulation::tick::SimulationEvent;
use crate::world::{Occupant, World};

/// A den occupying one grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Den {
    pub id: DenId,
    pub pos: GridPos,
    pub time_since_used: u32,
    /// Ticks of disuse after which the den collapses
    pub lifetime: u32,
    pub standing: bool,
}

impl Den {
    pub fn new(id: DenId, pos: GridPos, lifetime: u32) -> Self {
        Self {
            id,
            pos,
            time_since_used: 0,
            lifetime,
            standing: true,
        }
    }

    /// External reset hook: an occupant made use of the den this tick
    pub fn mark_used(&mut self) {
        self.time_since_used = 0;
    }
}

/// Evaluation context threaded through the den's tree
pub struct DenCtx<'w> {
    pub world: &'w mut World,
    pub events: &'w mut Vec<SimulationEvent>,
    pub id: DenId,
}

/// Dens have no predicate leaves; the type exists so the tree runtime
/// has something to name
#[derive(Debug, Clone, Copy)]
pub enum DenCondition {}

impl<'w> Condition<DenCtx<'w>> for DenCondition {
    fn check(&self, _ctx: &DenCtx<'w>) -> bool {
        match *self {}
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DenAction {
    /// Tick the disuse counter and collapse past the lifetime
    AdvanceDisuse,
}

impl<'w> Action<DenCtx<'w>> for DenAction {
    fn apply(&self, ctx: &mut DenCtx<'w>) -> Status {
        match self {
            DenAction::AdvanceDisuse => advance_disuse(ctx),
        }
    }
}

fn advance_disuse(ctx: &mut DenCtx<'_>) -> Status {
    let (id, pos, lifetime) = {
        let den = ctx.world.den(ctx.id);
        (den.id, den.pos, den.lifetime)
    };

    let disused = {
        let den = ctx.world.den_mut(ctx.id);
        den.time_since_used += 1;
        den.time_since_used
    };

    if disused >= lifetime {
        ctx.world.remove_occupant(Occupant::Den(id), pos);
        ctx.world.den_mut(ctx.id).standing = false;
        ctx.events.push(SimulationEvent::DenCollapsed { den: id });
        Status::Fail
    } else {
        Status::Success
    }
}

pub type DenNode = Node<DenCondition, DenAction>;

/// The den's (one-leaf) behavior tree, built once and shared
pub fn den_tree() -> &'static DenNode {
    static TREE: OnceLock<DenNode> = OnceLock::new();
    TREE.get_or_init(|| Node::sequence(vec![Node::Action(DenAction::AdvanceDisuse)]))
}
