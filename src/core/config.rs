//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};

use crate::core::types::SenseRange;

/// Configuration for the bee colony simulation
///
/// Defaults reproduce the tuning the colony was balanced around.
/// Changing them shifts how quickly bees starve, forage and die.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === HUNGER & HEALTH ===
    /// Hunger level at which a bee starts looking for something to eat
    ///
    /// Below this, the eat branch of the decision tree never fires and
    /// the bee keeps scouting or hauling nectar instead.
    pub hunger_tolerance: f32,

    /// Hunger level beyond which starvation damage sets in
    ///
    /// Each tick above it, health drops by
    /// `(hunger - threshold) * hunger_damage_factor`, so damage ramps up
    /// the longer a bee goes unfed. No floor is applied; health may go
    /// negative and the death check catches it next evaluation.
    pub hunger_damage_threshold: f32,

    /// Scale for starvation damage per tick
    pub hunger_damage_factor: f32,

    /// Hunger added every tick
    pub hunger_speed: f32,

    /// Hunger ceiling below which a bee regenerates health
    pub heal_hunger_threshold: f32,

    /// Health restored per tick when regenerating
    pub heal_amount: f32,

    /// Regeneration multiplier while resting inside the hive
    pub in_hive_heal_factor: f32,

    /// Upper bound on health
    pub max_health: f32,

    /// Health below which a scout stays in the hive to rest
    pub hive_rest_health_threshold: f32,

    /// Health below which a scout abandons its search and heads home
    pub hive_seek_health_threshold: f32,

    // === NECTAR ===
    /// Minimum nectar a flower must hold to be worth harvesting
    pub min_nectar_in_flower: f32,

    /// Nectar a bee can carry after one harvest
    pub nectar_capacity: f32,

    /// How much hunger one meal removes
    ///
    /// Eating drives hunger to `min(0, hunger - nectar_satisfaction)`:
    /// a meal always leaves the bee fully satiated, never merely less
    /// hungry.
    pub nectar_satisfaction: f32,

    /// Nectar consumed per meal, from hive stock or carried load
    pub nectar_eat_portion: f32,

    /// Pollen units a flower must hold for a bee to pick some up,
    /// and the amount taken when it does
    pub pollen_portion: f32,

    // === MOVEMENT & SENSES ===
    /// Ticks a bee must wait between moves
    ///
    /// Completed moves ADD this onto the timer rather than resetting it,
    /// so queued cooldown accumulates.
    pub movement_cooldown: u32,

    /// Chance per move of flying in a random direction instead of
    /// toward the target (imprecise flight)
    pub flight_noise_chance: f32,

    /// How far any bee can see flowers
    pub vision_range: SenseRange,

    /// How far a scout can read the nectar scent field
    pub smell_range: SenseRange,

    // === LIFECYCLE ===
    /// Ticks a bee lives before dying of old age
    pub bee_life_span: u32,

    /// Ticks of disuse before a den collapses
    pub den_lifetime: u32,

    // === WORLD ===
    /// Radius over which a flower's nectar scent spreads, with linear
    /// falloff to zero at the edge
    pub scent_radius: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Hunger & health
            hunger_tolerance: 20.0,
            hunger_damage_threshold: 75.0,
            hunger_damage_factor: 0.5,
            hunger_speed: 1.0,
            heal_hunger_threshold: 50.0,
            heal_amount: 10.0,
            in_hive_heal_factor: 2.0,
            max_health: 100.0,
            hive_rest_health_threshold: 80.0,
            hive_seek_health_threshold: 30.0,

            // Nectar
            min_nectar_in_flower: 5.0,
            nectar_capacity: 0.5,
            nectar_satisfaction: 20.0,
            nectar_eat_portion: 0.05,
            pollen_portion: 2.0,

            // Movement & senses
            movement_cooldown: 4,
            flight_noise_chance: 0.2,
            vision_range: SenseRange::uniform(1),
            smell_range: SenseRange::uniform(8),

            // Lifecycle
            bee_life_span: 24 * 150,
            den_lifetime: 24 * 7,

            // World
            scent_radius: 8,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml(text: &str) -> crate::core::error::Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config
            .validate()
            .map_err(crate::core::error::SimError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        // A bee must get hungry before it starts starving
        if self.hunger_tolerance >= self.hunger_damage_threshold {
            return Err(format!(
                "hunger_tolerance ({}) should be < hunger_damage_threshold ({})",
                self.hunger_tolerance, self.hunger_damage_threshold
            ));
        }

        // The rest threshold must sit above the seek-home threshold,
        // otherwise a scout would leave the hive sicker than it arrived
        if self.hive_seek_health_threshold >= self.hive_rest_health_threshold {
            return Err(format!(
                "hive_seek_health_threshold ({}) should be < hive_rest_health_threshold ({})",
                self.hive_seek_health_threshold, self.hive_rest_health_threshold
            ));
        }

        if !(0.0..=1.0).contains(&self.flight_noise_chance) {
            return Err(format!(
                "flight_noise_chance ({}) must be within 0.0..=1.0",
                self.flight_noise_chance
            ));
        }

        if self.nectar_capacity <= 0.0 || self.nectar_eat_portion <= 0.0 {
            return Err("nectar amounts must be positive".into());
        }

        if self.nectar_eat_portion > self.nectar_capacity {
            return Err(format!(
                "nectar_eat_portion ({}) should be <= nectar_capacity ({})",
                self.nectar_eat_portion, self.nectar_capacity
            ));
        }

        if self.hunger_speed <= 0.0 || self.heal_amount <= 0.0 {
            return Err("rates must be positive".into());
        }

        if self.bee_life_span == 0 || self.den_lifetime == 0 {
            return Err("life spans must be positive".into());
        }

        if self.scent_radius < 0 {
            return Err(format!("scent_radius ({}) must be >= 0", self.scent_radius));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_ordering_enforced() {
        let mut config = SimulationConfig::default();
        config.hunger_tolerance = 80.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.hive_seek_health_threshold = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml("movement_cooldown = 2\n").unwrap();
        assert_eq!(config.movement_cooldown, 2);
        assert_eq!(config.bee_life_span, 24 * 150);
    }

    #[test]
    fn test_toml_rejects_bad_noise_chance() {
        assert!(SimulationConfig::from_toml("flight_noise_chance = 1.5\n").is_err());
    }
}
