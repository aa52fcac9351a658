//! The grid world - cell-indexed occupants, flowers, scent and arenas
//!
//! Agents are stored in dense arenas addressed by small handle types;
//! cell buckets hold handles, so movement is a handle relocation
//! between two buckets and death unlinks the handle everywhere while
//! the slot stays behind, marked dead. Handles are never reused within
//! a run.

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{BeeId, DenId, FlowerId, GridPos, HiveId, Tick};
use crate::entity::{Bee, Den, Flower, Hive};
use crate::spatial::Grid;

/// Handle to anything that can stand in a cell's occupant list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Bee(BeeId),
    Hive(HiveId),
    Den(DenId),
}

/// The world all agents share
pub struct World {
    width: i32,
    height: i32,
    pub config: SimulationConfig,
    pub current_tick: Tick,
    /// Single source of randomness: flight noise, exploration shuffle,
    /// demo scatter
    pub rng: ChaCha8Rng,
    bees: Vec<Bee>,
    hives: Vec<Hive>,
    flowers: Vec<Flower>,
    dens: Vec<Den>,
    occupants: Grid<Vec<Occupant>>,
    flower_cells: Grid<Vec<FlowerId>>,
    scent: Grid<f32>,
}

impl World {
    pub fn new(width: i32, height: i32, config: SimulationConfig, seed: u64) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(SimError::Config(format!(
                "world dimensions {}x{} must be positive",
                width, height
            )));
        }
        config.validate().map_err(SimError::Config)?;
        Ok(Self {
            width,
            height,
            config,
            current_tick: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            bees: Vec::new(),
            hives: Vec::new(),
            flowers: Vec::new(),
            dens: Vec::new(),
            occupants: Grid::new(width, height),
            flower_cells: Grid::new(width, height),
            scent: Grid::new(width, height),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.occupants.in_bounds(pos)
    }

    // === SPAWNING ===

    pub fn spawn_hive(&mut self, pos: GridPos) -> Result<HiveId> {
        self.check_bounds(pos, "hive")?;
        let id = HiveId(self.hives.len() as u32);
        self.hives.push(Hive::new(id, pos));
        self.bucket_mut(pos).push(Occupant::Hive(id));
        Ok(id)
    }

    /// Spawn a bee belonging to `hive`. Passing `scout` claims the
    /// hive's scout slot immediately instead of waiting for promotion.
    pub fn spawn_bee(&mut self, pos: GridPos, hive: HiveId, scout: bool) -> Result<BeeId> {
        self.check_bounds(pos, "bee")?;
        if scout && self.hive(hive).has_scout {
            return Err(SimError::Spawn("hive already has a scout".into()));
        }
        let id = BeeId(self.bees.len() as u32);
        let mut bee = Bee::new(id, pos, hive, &self.config);
        if scout {
            bee.promote_to_scout(self.width, self.height, self.config.smell_range);
            self.hive_mut(hive).has_scout = true;
        }
        bee.in_hive = self.cell_has_hive(pos);
        self.bees.push(bee);
        self.bucket_mut(pos).push(Occupant::Bee(id));
        self.hive_mut(hive).members.push(id);
        Ok(id)
    }

    pub fn spawn_flower(&mut self, pos: GridPos, nectar: f32, pollen: f32) -> Result<FlowerId> {
        self.check_bounds(pos, "flower")?;
        let id = FlowerId(self.flowers.len() as u32);
        self.flowers.push(Flower::new(id, pos, nectar, pollen));
        if let Some(cell) = self.flower_cells.get_mut(pos) {
            cell.push(id);
        }
        Ok(id)
    }

    pub fn spawn_den(&mut self, pos: GridPos) -> Result<DenId> {
        self.check_bounds(pos, "den")?;
        let id = DenId(self.dens.len() as u32);
        self.dens.push(Den::new(id, pos, self.config.den_lifetime));
        self.bucket_mut(pos).push(Occupant::Den(id));
        Ok(id)
    }

    fn check_bounds(&self, pos: GridPos, kind: &str) -> Result<()> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(SimError::Spawn(format!(
                "{} position ({}, {}) is outside the {}x{} grid",
                kind, pos.x, pos.y, self.width, self.height
            )))
        }
    }

    // === ARENA ACCESS ===
    //
    // Handles are only ever minted by this world, so indexing is direct.

    pub fn bee(&self, id: BeeId) -> &Bee {
        &self.bees[id.0 as usize]
    }

    pub fn bee_mut(&mut self, id: BeeId) -> &mut Bee {
        &mut self.bees[id.0 as usize]
    }

    pub fn hive(&self, id: HiveId) -> &Hive {
        &self.hives[id.0 as usize]
    }

    pub fn hive_mut(&mut self, id: HiveId) -> &mut Hive {
        &mut self.hives[id.0 as usize]
    }

    pub fn flower(&self, id: FlowerId) -> &Flower {
        &self.flowers[id.0 as usize]
    }

    pub fn flower_mut(&mut self, id: FlowerId) -> &mut Flower {
        &mut self.flowers[id.0 as usize]
    }

    pub fn den(&self, id: DenId) -> &Den {
        &self.dens[id.0 as usize]
    }

    pub fn den_mut(&mut self, id: DenId) -> &mut Den {
        &mut self.dens[id.0 as usize]
    }

    /// Living bees in spawn order - the order they act in each tick
    pub fn living_bees(&self) -> Vec<BeeId> {
        self.bees.iter().filter(|b| b.alive).map(|b| b.id).collect()
    }

    pub fn standing_dens(&self) -> Vec<DenId> {
        self.dens.iter().filter(|d| d.standing).map(|d| d.id).collect()
    }

    pub fn living_bee_count(&self) -> usize {
        self.bees.iter().filter(|b| b.alive).count()
    }

    pub fn hive_ids(&self) -> impl Iterator<Item = HiveId> + '_ {
        self.hives.iter().map(|h| h.id)
    }

    // === CELL ACCESS ===

    pub fn occupants_at(&self, pos: GridPos) -> &[Occupant] {
        self.occupants.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn flowers_at(&self, pos: GridPos) -> &[FlowerId] {
        self.flower_cells.get(pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn smell_at(&self, pos: GridPos) -> f32 {
        self.scent.get(pos).copied().unwrap_or(0.0)
    }

    pub fn cell_has_hive(&self, pos: GridPos) -> bool {
        self.occupants_at(pos)
            .iter()
            .any(|occ| matches!(occ, Occupant::Hive(_)))
    }

    fn bucket_mut(&mut self, pos: GridPos) -> &mut Vec<Occupant> {
        self.occupants
            .get_mut(pos)
            .expect("bucket position checked against bounds")
    }

    /// Move an occupant handle between the two affected cell buckets
    pub fn relocate(&mut self, occupant: Occupant, from: GridPos, to: GridPos) {
        self.remove_occupant(occupant, from);
        if let Some(bucket) = self.occupants.get_mut(to) {
            bucket.push(occupant);
        }
    }

    pub fn remove_occupant(&mut self, occupant: Occupant, pos: GridPos) {
        if let Some(bucket) = self.occupants.get_mut(pos) {
            if let Some(index) = bucket.iter().position(|o| *o == occupant) {
                bucket.remove(index);
            }
        }
    }

    // === SCENT FIELD ===

    /// Rebuild the nectar scent field from current flower stocks
    ///
    /// Each flower projects its nectar value over `scent_radius` cells
    /// with linear falloff; overlapping flowers combine by maximum, so
    /// the gradient always peaks on a flower cell.
    pub fn refresh_scent(&mut self) {
        self.scent.fill(0.0);
        let radius = self.config.scent_radius;
        let falloff = radius as f32 + 1.0;
        for flower in &self.flowers {
            if flower.nectar <= 0.0 {
                continue;
            }
            for dx in -radius..=radius {
                for dy in -radius..=radius {
                    let cell = flower.pos.offset(dx, dy);
                    let dist = flower.pos.distance(cell);
                    let strength = flower.nectar * (1.0 - dist / falloff);
                    if strength <= 0.0 {
                        continue;
                    }
                    if let Some(current) = self.scent.get_mut(cell) {
                        if strength > *current {
                            *current = strength;
                        }
                    }
                }
            }
        }
    }

    // === DEMO SCATTER ===

    /// Populate the world for the demo binary and integration tests:
    /// hives with their bees on top, flowers and dens scattered
    /// uniformly
    pub fn populate_random(
        &mut self,
        hives: u32,
        bees_per_hive: u32,
        flowers: u32,
        dens: u32,
    ) -> Result<()> {
        for _ in 0..hives {
            let pos = self.random_pos();
            let hive = self.spawn_hive(pos)?;
            for _ in 0..bees_per_hive {
                self.spawn_bee(pos, hive, false)?;
            }
        }
        for _ in 0..flowers {
            let pos = self.random_pos();
            let nectar = self.rng.gen_range(10.0f32..60.0);
            let pollen = self.rng.gen_range(0.0f32..4.0);
            self.spawn_flower(pos, nectar, pollen)?;
        }
        for _ in 0..dens {
            let pos = self.random_pos();
            self.spawn_den(pos)?;
        }
        Ok(())
    }

    fn random_pos(&mut self) -> GridPos {
        GridPos::new(
            self.rng.gen_range(0..self.width),
            self.rng.gen_range(0..self.height),
        )
    }
}
