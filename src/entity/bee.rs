//! Bees - the colony's mobile agents
//!
//! Every living bee is driven once per tick by a fixed behavior tree:
//! a death check, a chain of bookkeeping steps, then one priority
//! fallback that picks exactly one coherent behavior - eating, scout
//! work or recruit work. Role branching (scout vs recruit) stays inside
//! the tree behind predicate leaves, so the same topology serves every
//! bee and survives scout promotion without a rebuild.
//!
//! Scouts search for food by climbing the nectar scent field, biased
//! away from cells their orientation map says they have already
//! covered, and report findings back at the hive by overwriting the
//! food location of idle hive-mates. Recruits travel to the reported
//! cell, harvest nectar (moving pollen around as a side effect) and
//! haul it home.

use std::sync::OnceLock;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::{Action, Condition, Node, Status};
use crate::core::config::SimulationConfig;
use crate::core::types::{BeeId, Direction, FlowerId, GridPos, HiveId, SenseRange};
use crate::simulation::tick::SimulationEvent;
use crate::spatial::Grid;
use crate::world::{Occupant, World};

/// A bee and everything it privately tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bee {
    pub id: BeeId,
    pub hive: HiveId,
    pub pos: GridPos,
    /// Grows by `hunger_speed` every tick; eating forces it to zero or
    /// below
    pub hunger: f32,
    /// May go negative under starvation; the death check catches it on
    /// the next evaluation
    pub health: f32,
    pub age: u32,
    pub life_span: u32,
    pub hunger_speed: f32,
    /// Move only at zero; each completed move ADDS the cooldown back on
    pub movement_timer: u32,
    pub movement_cooldown: u32,
    pub scout: bool,
    /// Recomputed after every move from the destination cell's occupants
    pub in_hive: bool,
    pub nectar_amount: f32,
    pub nectar_capacity: f32,
    /// Flower whose pollen this bee carries, if any
    pub carried_pollen: Option<FlowerId>,
    /// Cell known to hold food - set by own senses or a scout's report
    pub food_location: Option<GridPos>,
    /// Cell currently being flown toward
    pub target_location: Option<GridPos>,
    pub vision_range: SenseRange,
    pub smell_range: SenseRange,
    /// Scout-only visited map biasing search away from covered ground
    pub orientation_map: Option<Grid<bool>>,
    pub alive: bool,
}

impl Bee {
    pub(crate) fn new(id: BeeId, pos: GridPos, hive: HiveId, config: &SimulationConfig) -> Self {
        Self {
            id,
            hive,
            pos,
            hunger: 0.0,
            health: config.max_health,
            age: 0,
            life_span: config.bee_life_span,
            hunger_speed: config.hunger_speed,
            movement_timer: config.movement_cooldown,
            movement_cooldown: config.movement_cooldown,
            scout: false,
            in_hive: false,
            nectar_amount: 0.0,
            nectar_capacity: config.nectar_capacity,
            carried_pollen: None,
            food_location: None,
            target_location: None,
            vision_range: config.vision_range,
            // A recruit smells no farther than it sees
            smell_range: config.vision_range,
            orientation_map: None,
            alive: true,
        }
    }

    pub(crate) fn promote_to_scout(&mut self, width: i32, height: i32, smell_range: SenseRange) {
        self.scout = true;
        self.smell_range = smell_range;
        self.orientation_map = Some(Grid::new(width, height));
    }
}

/// Evaluation context threaded through one bee's tree walk
pub struct BeeCtx<'w> {
    pub world: &'w mut World,
    pub events: &'w mut Vec<SimulationEvent>,
    pub id: BeeId,
}

impl BeeCtx<'_> {
    fn bee(&self) -> &Bee {
        self.world.bee(self.id)
    }

    fn bee_mut(&mut self) -> &mut Bee {
        self.world.bee_mut(self.id)
    }
}

/// Predicate leaves of the bee tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeeCondition {
    /// Health gone or life span reached
    Dying,
    IsScout,
    IsRecruit,
    InHive,
    NotInHive,
    /// Hungry enough to prioritize eating
    NeedsToEat,
    HiveHasFood,
    HasNectar,
    KnowsWhereFoodIs,
    FoodUnknown,
    /// Scout is worn down and already home
    ShouldRestInHive,
    /// Scout is critically hurt and must head home
    ShouldReturnToHive,
    ShouldSearchForFood,
    /// Some hive-mate at the hive cell has no food location yet
    RecruitsAvailable,
    OnFoodLocation,
    /// The remembered food cell still holds a harvestable flower
    FoodLocationHasNectar,
    CanMove,
}

impl<'w> Condition<BeeCtx<'w>> for BeeCondition {
    fn check(&self, ctx: &BeeCtx<'w>) -> bool {
        let bee = ctx.bee();
        let config = &ctx.world.config;
        match self {
            BeeCondition::Dying => bee.health <= 0.0 || bee.age >= bee.life_span,
            BeeCondition::IsScout => bee.scout,
            BeeCondition::IsRecruit => !bee.scout,
            BeeCondition::InHive => bee.in_hive,
            BeeCondition::NotInHive => !bee.in_hive,
            BeeCondition::NeedsToEat => bee.hunger >= config.hunger_tolerance,
            BeeCondition::HiveHasFood => {
                ctx.world.hive(bee.hive).food >= config.nectar_eat_portion
            }
            BeeCondition::HasNectar => bee.nectar_amount > 0.0,
            BeeCondition::KnowsWhereFoodIs => bee.food_location.is_some(),
            BeeCondition::FoodUnknown => bee.food_location.is_none(),
            BeeCondition::ShouldRestInHive => bee.health < config.hive_rest_health_threshold,
            BeeCondition::ShouldReturnToHive => bee.health < config.hive_seek_health_threshold,
            // Scouts currently always search when nothing above matched
            BeeCondition::ShouldSearchForFood => true,
            BeeCondition::RecruitsAvailable => {
                let hive_pos = ctx.world.hive(bee.hive).pos;
                ctx.world.occupants_at(hive_pos).iter().any(|occ| match occ {
                    Occupant::Bee(other) => {
                        let other = ctx.world.bee(*other);
                        other.hive == bee.hive && other.food_location.is_none()
                    }
                    _ => false,
                })
            }
            BeeCondition::OnFoodLocation => bee.food_location == Some(bee.pos),
            BeeCondition::FoodLocationHasNectar => bee
                .food_location
                .is_some_and(|loc| best_flower_at(ctx.world, loc).is_some()),
            BeeCondition::CanMove => bee.movement_timer == 0,
        }
    }
}

/// Side-effecting leaves of the bee tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeeAction {
    Die,
    MakeScoutIfNeeded,
    ReduceMovementTimer,
    IncreaseAge,
    IncreaseHunger,
    TakeDamage,
    ReplenishHealth,
    UpdateOrientationMap,
    EatFromHive,
    EatCarriedNectar,
    SendRecruits,
    SetHiveAsTarget,
    DepositNectar,
    TakeNectar,
    ClearFoodLocation,
    SpotNearbyFood,
    SetFoodAsTarget,
    FindBestSmell,
    FlyToTarget,
    Explore,
}

impl<'w> Action<BeeCtx<'w>> for BeeAction {
    fn apply(&self, ctx: &mut BeeCtx<'w>) -> Status {
        match self {
            BeeAction::Die => die(ctx),
            BeeAction::MakeScoutIfNeeded => make_scout_if_needed(ctx),
            BeeAction::ReduceMovementTimer => reduce_movement_timer(ctx),
            BeeAction::IncreaseAge => increase_age(ctx),
            BeeAction::IncreaseHunger => increase_hunger(ctx),
            BeeAction::TakeDamage => take_damage(ctx),
            BeeAction::ReplenishHealth => replenish_health(ctx),
            BeeAction::UpdateOrientationMap => update_orientation_map(ctx),
            BeeAction::EatFromHive => eat_from_hive(ctx),
            BeeAction::EatCarriedNectar => eat_carried_nectar(ctx),
            BeeAction::SendRecruits => send_recruits(ctx),
            BeeAction::SetHiveAsTarget => set_hive_as_target(ctx),
            BeeAction::DepositNectar => deposit_nectar(ctx),
            BeeAction::TakeNectar => take_nectar(ctx),
            BeeAction::ClearFoodLocation => clear_food_location(ctx),
            BeeAction::SpotNearbyFood => spot_nearby_food(ctx),
            BeeAction::SetFoodAsTarget => set_food_as_target(ctx),
            BeeAction::FindBestSmell => find_best_smell(ctx),
            BeeAction::FlyToTarget => fly_to_target(ctx),
            BeeAction::Explore => explore(ctx),
        }
    }
}

/// Remove the bee from the world: cell bucket, hive roster, scout flag
fn die(ctx: &mut BeeCtx<'_>) -> Status {
    let (id, pos, hive_id, was_scout) = {
        let bee = ctx.bee();
        (bee.id, bee.pos, bee.hive, bee.scout)
    };

    ctx.world.remove_occupant(Occupant::Bee(id), pos);
    let hive = ctx.world.hive_mut(hive_id);
    hive.members.retain(|member| *member != id);
    if was_scout {
        hive.has_scout = false;
    }
    ctx.bee_mut().alive = false;
    ctx.events.push(SimulationEvent::BeeDied { bee: id, scout: was_scout });
    Status::Success
}

/// Promote this bee if its hive currently has no scout
fn make_scout_if_needed(ctx: &mut BeeCtx<'_>) -> Status {
    let hive_id = ctx.bee().hive;
    if !ctx.world.hive(hive_id).has_scout {
        let (width, height) = (ctx.world.width(), ctx.world.height());
        let smell_range = ctx.world.config.smell_range;
        let id = ctx.id;
        ctx.bee_mut().promote_to_scout(width, height, smell_range);
        ctx.world.hive_mut(hive_id).has_scout = true;
        ctx.events.push(SimulationEvent::ScoutPromoted { bee: id });
    }
    Status::Success
}

fn reduce_movement_timer(ctx: &mut BeeCtx<'_>) -> Status {
    let bee = ctx.bee_mut();
    bee.movement_timer = bee.movement_timer.saturating_sub(1);
    Status::Success
}

fn increase_age(ctx: &mut BeeCtx<'_>) -> Status {
    ctx.bee_mut().age += 1;
    Status::Success
}

fn increase_hunger(ctx: &mut BeeCtx<'_>) -> Status {
    let bee = ctx.bee_mut();
    bee.hunger += bee.hunger_speed;
    Status::Success
}

/// Starvation damage, ramping with how far past the threshold hunger is
fn take_damage(ctx: &mut BeeCtx<'_>) -> Status {
    let threshold = ctx.world.config.hunger_damage_threshold;
    let factor = ctx.world.config.hunger_damage_factor;
    let bee = ctx.bee_mut();
    if bee.hunger >= threshold {
        bee.health -= (bee.hunger - threshold) * factor;
    }
    Status::Success
}

/// Regenerate when well fed, twice as fast inside the hive
fn replenish_health(ctx: &mut BeeCtx<'_>) -> Status {
    let config = &ctx.world.config;
    let (heal_threshold, heal_amount, hive_factor, max_health) = (
        config.heal_hunger_threshold,
        config.heal_amount,
        config.in_hive_heal_factor,
        config.max_health,
    );
    let bee = ctx.bee_mut();
    let factor = if bee.in_hive { hive_factor } else { 1.0 };
    if bee.hunger < heal_threshold && bee.health > 0.0 {
        bee.health = (bee.health + heal_amount * factor).min(max_health);
    }
    Status::Success
}

fn update_orientation_map(ctx: &mut BeeCtx<'_>) -> Status {
    let pos = ctx.bee().pos;
    let bee = ctx.bee_mut();
    if bee.scout {
        if let Some(map) = bee.orientation_map.as_mut() {
            map.set(pos, true);
        }
    }
    Status::Success
}

/// A meal satiates completely: hunger lands at zero or below
fn eat_from_hive(ctx: &mut BeeCtx<'_>) -> Status {
    let satisfaction = ctx.world.config.nectar_satisfaction;
    let portion = ctx.world.config.nectar_eat_portion;
    let hive_id = ctx.bee().hive;
    {
        let bee = ctx.bee_mut();
        bee.hunger = (bee.hunger - satisfaction).min(0.0);
    }
    ctx.world.hive_mut(hive_id).food -= portion;
    Status::Success
}

fn eat_carried_nectar(ctx: &mut BeeCtx<'_>) -> Status {
    let satisfaction = ctx.world.config.nectar_satisfaction;
    let portion = ctx.world.config.nectar_eat_portion;
    let bee = ctx.bee_mut();
    bee.hunger = (bee.hunger - satisfaction).min(0.0);
    bee.nectar_amount = (bee.nectar_amount - portion).max(0.0);
    Status::Success
}

/// Broadcast this scout's food location to every idle hive-mate on the
/// hive cell, then forget it and start the search map over
fn send_recruits(ctx: &mut BeeCtx<'_>) -> Status {
    let (hive_id, my_id, food) = {
        let bee = ctx.bee();
        (bee.hive, bee.id, bee.food_location)
    };
    let Some(location) = food else {
        return Status::Fail;
    };

    let hive_pos = ctx.world.hive(hive_id).pos;
    let recruits: Vec<BeeId> = ctx
        .world
        .occupants_at(hive_pos)
        .iter()
        .filter_map(|occ| match occ {
            Occupant::Bee(other_id) => {
                let other = ctx.world.bee(*other_id);
                (other.hive == hive_id && other.food_location.is_none()).then_some(*other_id)
            }
            _ => None,
        })
        .collect();

    for recruit in &recruits {
        ctx.world.bee_mut(*recruit).food_location = Some(location);
    }

    let me = ctx.bee_mut();
    me.food_location = None;
    if let Some(map) = me.orientation_map.as_mut() {
        map.fill(false);
    }

    ctx.events.push(SimulationEvent::RecruitsDispatched {
        scout: my_id,
        recruits: recruits.len(),
        location,
    });
    Status::Success
}

fn set_hive_as_target(ctx: &mut BeeCtx<'_>) -> Status {
    let hive_pos = ctx.world.hive(ctx.bee().hive).pos;
    ctx.bee_mut().target_location = Some(hive_pos);
    Status::Success
}

fn deposit_nectar(ctx: &mut BeeCtx<'_>) -> Status {
    let (my_id, hive_id, amount) = {
        let bee = ctx.bee();
        (bee.id, bee.hive, bee.nectar_amount)
    };
    ctx.world.hive_mut(hive_id).food += amount;
    ctx.bee_mut().nectar_amount = 0.0;
    ctx.events.push(SimulationEvent::NectarDeposited {
        bee: my_id,
        hive: hive_id,
        amount,
    });
    Status::Success
}

/// Harvest the best flower on the food cell, moving pollen as a side
/// effect: pollen carried from a different flower is dumped here and
/// seeds this one, and fresh pollen is picked up if the flower has
/// enough
fn take_nectar(ctx: &mut BeeCtx<'_>) -> Status {
    let (my_id, capacity, carried, food) = {
        let bee = ctx.bee();
        (bee.id, bee.nectar_capacity, bee.carried_pollen, bee.food_location)
    };
    let Some(location) = food else {
        return Status::Fail;
    };
    let Some(flower_id) = best_flower_at(ctx.world, location) else {
        return Status::Fail;
    };

    if let Some(source) = carried {
        if source != flower_id {
            ctx.bee_mut().carried_pollen = None;
            ctx.world.flower_mut(flower_id).has_seed = true;
        }
    }

    ctx.world.flower_mut(flower_id).nectar -= capacity;
    ctx.bee_mut().nectar_amount = capacity;

    let pollen_portion = ctx.world.config.pollen_portion;
    let took_pollen = {
        let flower = ctx.world.flower_mut(flower_id);
        if flower.pollen >= pollen_portion {
            flower.pollen -= pollen_portion;
            true
        } else {
            false
        }
    };
    if took_pollen {
        ctx.bee_mut().carried_pollen = Some(flower_id);
    }

    ctx.events.push(SimulationEvent::NectarHarvested {
        bee: my_id,
        flower: flower_id,
        amount: capacity,
    });
    Status::Success
}

fn clear_food_location(ctx: &mut BeeCtx<'_>) -> Status {
    ctx.bee_mut().food_location = None;
    Status::Success
}

/// Direct vision: remember the first nearby cell whose flower clearly
/// has nectar to spare
fn spot_nearby_food(ctx: &mut BeeCtx<'_>) -> Status {
    let (pos, range) = {
        let bee = ctx.bee();
        (bee.pos, bee.vision_range)
    };
    let min_nectar = ctx.world.config.min_nectar_in_flower;

    for dx in -range.left..=range.right {
        for dy in -range.up..=range.down {
            let cell = pos.offset(dx, dy);
            if !ctx.world.in_bounds(cell) {
                continue;
            }
            let found = ctx
                .world
                .flowers_at(cell)
                .iter()
                .any(|&flower| ctx.world.flower(flower).nectar > min_nectar);
            if found {
                ctx.bee_mut().food_location = Some(cell);
                return Status::Success;
            }
        }
    }
    Status::Fail
}

fn set_food_as_target(ctx: &mut BeeCtx<'_>) -> Status {
    let food = ctx.bee().food_location;
    ctx.bee_mut().target_location = food;
    Status::Success
}

/// Pick the strongest-smelling unvisited cell in smell range as the
/// next waypoint
fn find_best_smell(ctx: &mut BeeCtx<'_>) -> Status {
    let (pos, range) = {
        let bee = ctx.bee();
        (bee.pos, bee.smell_range)
    };

    let mut best_smell = 0.0f32;
    let mut best_location = None;
    let bee = ctx.bee();
    for dx in -range.left..=range.right {
        for dy in -range.up..=range.down {
            let cell = pos.offset(dx, dy);
            if !ctx.world.in_bounds(cell) {
                continue;
            }
            let visited = bee
                .orientation_map
                .as_ref()
                .map_or(false, |map| *map.get(cell).unwrap_or(&false));
            let smell = ctx.world.smell_at(cell);
            if smell > best_smell && !visited {
                best_smell = smell;
                best_location = Some(cell);
            }
        }
    }

    match best_location {
        Some(cell) => {
            ctx.bee_mut().target_location = Some(cell);
            Status::Success
        }
        None => Status::Fail,
    }
}

/// One step toward the current target, with a 20% chance of drifting in
/// a random direction instead. Off-grid destinations fail without
/// consuming the move.
fn fly_to_target(ctx: &mut BeeCtx<'_>) -> Status {
    let (pos, target) = {
        let bee = ctx.bee();
        (bee.pos, bee.target_location)
    };
    let Some(target) = target else {
        return Status::Fail;
    };

    let noise = ctx.world.config.flight_noise_chance;
    let (dx, dy) = if noise > 0.0 && ctx.world.rng.gen::<f32>() <= noise {
        let index = ctx.world.rng.gen_range(0..Direction::ALL.len());
        Direction::ALL[index].delta()
    } else {
        pos.step_toward(target)
    };

    let dest = pos.offset(dx, dy);
    if !ctx.world.in_bounds(dest) {
        return Status::Fail;
    }
    relocate_bee(ctx, dest);
    Status::Success
}

/// Unguided exploration: of the neighboring cells (shuffled), take the
/// one farthest from the hive, skipping cells already covered except on
/// the final candidate, where revisiting is allowed
fn explore(ctx: &mut BeeCtx<'_>) -> Status {
    let pos = ctx.bee().pos;
    let hive_pos = ctx.world.hive(ctx.bee().hive).pos;

    let mut directions = Direction::ALL;
    directions.shuffle(&mut ctx.world.rng);

    let mut best_dest = None;
    let mut max_dist = 0.0f32;
    let bee = ctx.bee();
    for (i, dir) in directions.iter().enumerate() {
        let (dx, dy) = dir.delta();
        let cand = pos.offset(dx, dy);
        if !ctx.world.in_bounds(cand) {
            continue;
        }
        let visited = bee
            .orientation_map
            .as_ref()
            .map_or(false, |map| *map.get(cand).unwrap_or(&false));
        if visited && i < directions.len() - 1 {
            continue;
        }
        let dist = hive_pos.distance(cand);
        if dist > max_dist {
            max_dist = dist;
            best_dest = Some(cand);
        }
    }

    match best_dest {
        Some(dest) => {
            relocate_bee(ctx, dest);
            Status::Success
        }
        None => Status::Fail,
    }
}

/// Complete a move: accumulate cooldown, relocate the cell handle,
/// update the position and rederive `in_hive` from the new cell
fn relocate_bee(ctx: &mut BeeCtx<'_>, dest: GridPos) {
    let (id, from, cooldown) = {
        let bee = ctx.bee();
        (bee.id, bee.pos, bee.movement_cooldown)
    };
    ctx.world.relocate(Occupant::Bee(id), from, dest);
    let in_hive = ctx.world.cell_has_hive(dest);
    let bee = ctx.bee_mut();
    bee.movement_timer += cooldown;
    bee.pos = dest;
    bee.in_hive = in_hive;
}

/// The flower worth harvesting on `pos`: most nectar wins among those
/// at or above the minimum, first one wins ties
fn best_flower_at(world: &World, pos: GridPos) -> Option<FlowerId> {
    let min_nectar = world.config.min_nectar_in_flower;
    let mut best = None;
    let mut best_nectar = 0.0f32;
    for &flower_id in world.flowers_at(pos) {
        let flower = world.flower(flower_id);
        if flower.harvestable(min_nectar) && flower.nectar > best_nectar {
            best = Some(flower_id);
            best_nectar = flower.nectar;
        }
    }
    best
}

pub type BeeNode = Node<BeeCondition, BeeAction>;

/// The bee's behavior tree, built once and walked by every bee
pub fn bee_tree() -> &'static BeeNode {
    static TREE: OnceLock<BeeNode> = OnceLock::new();
    TREE.get_or_init(build_bee_tree)
}

fn build_bee_tree() -> BeeNode {
    use BeeAction as A;
    use BeeCondition as C;

    let eat = Node::sequence(vec![
        Node::Condition(C::NeedsToEat),
        Node::fallback(vec![
            Node::sequence(vec![
                Node::Condition(C::InHive),
                Node::Condition(C::HiveHasFood),
                Node::Action(A::EatFromHive),
            ]),
            Node::sequence(vec![
                Node::Condition(C::HasNectar),
                Node::Action(A::EatCarriedNectar),
            ]),
        ]),
    ]);

    // Scout: resting/returning outranks reporting, which outranks
    // searching; the search itself prefers scent over blind exploring
    // over plain vision
    let rest_or_return = Node::fallback(vec![
        Node::sequence(vec![
            Node::Condition(C::InHive),
            Node::Condition(C::ShouldRestInHive),
        ]),
        Node::sequence(vec![
            Node::Condition(C::ShouldReturnToHive),
            Node::Action(A::SetHiveAsTarget),
            Node::Condition(C::CanMove),
            Node::Action(A::FlyToTarget),
        ]),
    ]);

    let report_food = Node::sequence(vec![
        Node::Condition(C::KnowsWhereFoodIs),
        Node::fallback(vec![
            Node::sequence(vec![
                Node::Condition(C::InHive),
                Node::Condition(C::RecruitsAvailable),
                Node::Action(A::SendRecruits),
            ]),
            Node::sequence(vec![
                Node::Condition(C::NotInHive),
                Node::Action(A::SetHiveAsTarget),
                Node::Condition(C::CanMove),
                Node::Action(A::FlyToTarget),
            ]),
        ]),
    ]);

    let search_food = Node::sequence(vec![
        Node::Condition(C::FoodUnknown),
        Node::Condition(C::ShouldSearchForFood),
        Node::fallback(vec![
            Node::sequence(vec![
                Node::Action(A::FindBestSmell),
                Node::Condition(C::CanMove),
                Node::Action(A::FlyToTarget),
            ]),
            Node::sequence(vec![
                Node::Condition(C::CanMove),
                Node::Action(A::Explore),
            ]),
            Node::Action(A::SpotNearbyFood),
        ]),
    ]);

    let scout = Node::sequence(vec![
        Node::Condition(C::IsScout),
        Node::fallback(vec![rest_or_return, report_food, search_food]),
    ]);

    // Recruit: harvest where you stand, else haul what you carry, else
    // head for known food, else drift home to await a report
    let harvest = Node::sequence(vec![
        Node::Condition(C::OnFoodLocation),
        Node::fallback(vec![
            Node::sequence(vec![
                Node::Condition(C::FoodLocationHasNectar),
                Node::Action(A::TakeNectar),
            ]),
            Node::Action(A::ClearFoodLocation),
        ]),
    ]);

    let haul = Node::sequence(vec![
        Node::Condition(C::HasNectar),
        Node::fallback(vec![
            Node::sequence(vec![
                Node::Condition(C::InHive),
                Node::Action(A::DepositNectar),
            ]),
            Node::sequence(vec![
                Node::Action(A::SetHiveAsTarget),
                Node::Condition(C::CanMove),
                Node::Action(A::FlyToTarget),
            ]),
        ]),
    ]);

    let seek_known_food = Node::sequence(vec![
        Node::Condition(C::KnowsWhereFoodIs),
        Node::Action(A::SetFoodAsTarget),
        Node::Condition(C::CanMove),
        Node::Action(A::FlyToTarget),
    ]);

    let return_when_idle = Node::sequence(vec![
        Node::Condition(C::NotInHive),
        Node::Condition(C::FoodUnknown),
        Node::Action(A::SetHiveAsTarget),
        Node::Condition(C::CanMove),
        Node::Action(A::FlyToTarget),
    ]);

    let recruit = Node::sequence(vec![
        Node::Condition(C::IsRecruit),
        Node::fallback(vec![harvest, haul, seek_known_food, return_when_idle]),
    ]);

    Node::fallback(vec![
        Node::sequence(vec![Node::Condition(C::Dying), Node::Action(A::Die)]),
        Node::sequence(vec![
            Node::Action(A::MakeScoutIfNeeded),
            Node::Action(A::ReduceMovementTimer),
            Node::Action(A::IncreaseAge),
            Node::Action(A::IncreaseHunger),
            Node::Action(A::TakeDamage),
            Node::Action(A::ReplenishHealth),
            Node::Action(A::UpdateOrientationMap),
            Node::fallback(vec![eat, scout, recruit]),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        // Deterministic flight for unit tests
        config.flight_noise_chance = 0.0;
        config
    }

    fn world_with_hive() -> (World, HiveId) {
        let mut world = World::new(16, 16, quiet_config(), 7).unwrap();
        let hive = world.spawn_hive(GridPos::new(8, 8)).unwrap();
        (world, hive)
    }

    #[test]
    fn test_best_flower_prefers_most_nectar_first_on_ties() {
        let (mut world, _hive) = world_with_hive();
        let pos = GridPos::new(2, 2);
        let _below_minimum = world.spawn_flower(pos, 4.9, 0.0).unwrap();
        let first_rich = world.spawn_flower(pos, 7.0, 0.0).unwrap();
        let _tied_rich = world.spawn_flower(pos, 7.0, 0.0).unwrap();
        assert_eq!(best_flower_at(&world, pos), Some(first_rich));
    }

    #[test]
    fn test_eating_forces_hunger_nonpositive() {
        let (mut world, hive) = world_with_hive();
        let bee = world.spawn_bee(GridPos::new(8, 8), hive, false).unwrap();
        world.hive_mut(hive).food = 1.0;
        world.bee_mut(bee).hunger = 12.0;

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::EatFromHive.apply(&mut ctx), Status::Success);

        assert!(world.bee(bee).hunger <= 0.0);
        assert!((world.hive(hive).food - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_take_nectar_moves_pollen_and_caps_load() {
        let (mut world, hive) = world_with_hive();
        let pos = GridPos::new(3, 3);
        let flower = world.spawn_flower(pos, 6.0, 3.0).unwrap();
        let bee = world.spawn_bee(pos, hive, false).unwrap();
        world.bee_mut(bee).food_location = Some(pos);

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::TakeNectar.apply(&mut ctx), Status::Success);

        assert!((world.flower(flower).nectar - 5.5).abs() < 1e-6);
        assert!((world.flower(flower).pollen - 1.0).abs() < 1e-6);
        assert!((world.bee(bee).nectar_amount - 0.5).abs() < 1e-6);
        assert_eq!(world.bee(bee).carried_pollen, Some(flower));
    }

    #[test]
    fn test_dumping_foreign_pollen_seeds_the_flower() {
        let (mut world, hive) = world_with_hive();
        let old_pos = GridPos::new(1, 1);
        let old_flower = world.spawn_flower(old_pos, 20.0, 0.0).unwrap();
        let pos = GridPos::new(3, 3);
        let flower = world.spawn_flower(pos, 6.0, 0.0).unwrap();
        let bee = world.spawn_bee(pos, hive, false).unwrap();
        world.bee_mut(bee).food_location = Some(pos);
        world.bee_mut(bee).carried_pollen = Some(old_flower);

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::TakeNectar.apply(&mut ctx), Status::Success);

        assert!(world.flower(flower).has_seed);
        // Too little pollen here to pick a fresh load up
        assert_eq!(world.bee(bee).carried_pollen, None);
    }

    #[test]
    fn test_fly_off_grid_fails_without_consuming_move() {
        let (mut world, hive) = world_with_hive();
        let corner = GridPos::new(0, 0);
        let bee = world.spawn_bee(corner, hive, false).unwrap();
        world.bee_mut(bee).movement_timer = 0;
        world.bee_mut(bee).target_location = Some(GridPos::new(-4, -4));

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::FlyToTarget.apply(&mut ctx), Status::Fail);

        assert_eq!(world.bee(bee).pos, corner);
        assert_eq!(world.bee(bee).movement_timer, 0);
    }

    #[test]
    fn test_fly_accumulates_cooldown_and_relocates_handle() {
        let (mut world, hive) = world_with_hive();
        let start = GridPos::new(4, 4);
        let bee = world.spawn_bee(start, hive, false).unwrap();
        world.bee_mut(bee).movement_timer = 0;
        world.bee_mut(bee).target_location = Some(GridPos::new(8, 8));

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::FlyToTarget.apply(&mut ctx), Status::Success);

        let dest = GridPos::new(5, 5);
        assert_eq!(world.bee(bee).pos, dest);
        assert_eq!(world.bee(bee).movement_timer, 4);
        assert!(world.occupants_at(start).is_empty());
        assert!(world.occupants_at(dest).contains(&Occupant::Bee(bee)));
    }

    #[test]
    fn test_arriving_at_hive_cell_sets_in_hive() {
        let (mut world, hive) = world_with_hive();
        let next_door = GridPos::new(7, 8);
        let bee = world.spawn_bee(next_door, hive, false).unwrap();
        assert!(!world.bee(bee).in_hive);
        world.bee_mut(bee).movement_timer = 0;
        world.bee_mut(bee).target_location = Some(GridPos::new(8, 8));

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::FlyToTarget.apply(&mut ctx), Status::Success);
        assert!(world.bee(bee).in_hive);
    }

    #[test]
    fn test_find_best_smell_picks_strongest_unvisited() {
        let (mut world, hive) = world_with_hive();
        let bee = world.spawn_bee(GridPos::new(8, 8), hive, true).unwrap();
        // Flowers at different distances produce different peaks
        world.spawn_flower(GridPos::new(11, 8), 10.0, 0.0).unwrap();
        world.spawn_flower(GridPos::new(5, 8), 3.0, 0.0).unwrap();
        world.refresh_scent();

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::FindBestSmell.apply(&mut ctx), Status::Success);
        assert_eq!(world.bee(bee).target_location, Some(GridPos::new(11, 8)));
    }

    #[test]
    fn test_find_best_smell_skips_visited_cells() {
        let (mut world, hive) = world_with_hive();
        let bee = world.spawn_bee(GridPos::new(8, 8), hive, true).unwrap();
        world.spawn_flower(GridPos::new(11, 8), 10.0, 0.0).unwrap();
        world.refresh_scent();
        if let Some(map) = world.bee_mut(bee).orientation_map.as_mut() {
            map.set(GridPos::new(11, 8), true);
        }

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::FindBestSmell.apply(&mut ctx), Status::Success);
        // The peak is covered, so a neighboring scent cell wins instead
        let target = world.bee(bee).target_location.unwrap();
        assert_ne!(target, GridPos::new(11, 8));
        assert!(world.smell_at(target) > 0.0);
    }

    #[test]
    fn test_send_recruits_reaches_only_idle_hive_mates() {
        let (mut world, hive) = world_with_hive();
        let hive_pos = GridPos::new(8, 8);
        let scout = world.spawn_bee(hive_pos, hive, true).unwrap();
        let idle = world.spawn_bee(hive_pos, hive, false).unwrap();
        let busy = world.spawn_bee(hive_pos, hive, false).unwrap();
        let away = world.spawn_bee(GridPos::new(1, 1), hive, false).unwrap();

        let food = GridPos::new(12, 12);
        world.bee_mut(scout).food_location = Some(food);
        world.bee_mut(busy).food_location = Some(GridPos::new(2, 2));

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: scout };
        assert_eq!(BeeAction::SendRecruits.apply(&mut ctx), Status::Success);

        assert_eq!(world.bee(idle).food_location, Some(food));
        assert_eq!(world.bee(busy).food_location, Some(GridPos::new(2, 2)));
        assert_eq!(world.bee(away).food_location, None);
        assert_eq!(world.bee(scout).food_location, None);
    }

    #[test]
    fn test_explore_prefers_unvisited_cell_farthest_from_hive() {
        let (mut world, hive) = world_with_hive();
        let bee = world.spawn_bee(GridPos::new(10, 8), hive, true).unwrap();
        world.bee_mut(bee).movement_timer = 0;

        let mut events = Vec::new();
        let mut ctx = BeeCtx { world: &mut world, events: &mut events, id: bee };
        assert_eq!(BeeAction::Explore.apply(&mut ctx), Status::Success);

        // All neighbors are unvisited; the farthest from the hive at
        // (8,8) is (11, y) on the far column
        let dest = world.bee(bee).pos;
        assert_eq!(dest.x, 11);
    }

    #[test]
    fn test_tree_builds_with_death_check_first() {
        let tree = bee_tree();
        match tree {
            Node::Fallback(children) => {
                assert_eq!(children.len(), 2);
                match &children[0] {
                    Node::Sequence(death) => {
                        assert!(matches!(death[0], Node::Condition(BeeCondition::Dying)));
                        assert!(matches!(death[1], Node::Action(BeeAction::Die)));
                    }
                    _ => panic!("death branch should be a sequence"),
                }
            }
            _ => panic!("root should be a fallback"),
        }
    }
}
