//! Waggle - Entry Point
//!
//! Runs a scattered demo world for a fixed number of ticks and prints a
//! summary of what the colony got up to.

use ahash::AHashMap;
use clap::Parser;
use serde::Serialize;

use waggle::core::error::Result;
use waggle::simulation::{run_simulation_tick, SimulationEvent};
use waggle::{SimulationConfig, World};

#[derive(Parser, Debug)]
#[command(name = "waggle", about = "Grid-world bee colony simulation")]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 40)]
    width: i32,

    /// Grid height in cells
    #[arg(long, default_value_t = 40)]
    height: i32,

    /// Number of hives to scatter
    #[arg(long, default_value_t = 1)]
    hives: u32,

    /// Bees spawned per hive
    #[arg(long, default_value_t = 8)]
    bees: u32,

    /// Number of flowers to scatter
    #[arg(long, default_value_t = 25)]
    flowers: u32,

    /// Number of dens to scatter
    #[arg(long, default_value_t = 0)]
    dens: u32,

    /// Ticks to simulate
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Optional TOML file overriding simulation constants
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    ticks: u64,
    living_bees: usize,
    deaths: u32,
    scout_promotions: u32,
    recruitment_broadcasts: u32,
    harvests: u32,
    deposits: u32,
    den_collapses: u32,
    hive_food: Vec<f32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waggle=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_toml(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };

    let mut world = World::new(args.width, args.height, config, args.seed)?;
    world.populate_random(args.hives, args.bees, args.flowers, args.dens)?;

    tracing::info!(
        width = args.width,
        height = args.height,
        bees = world.living_bee_count(),
        flowers = args.flowers,
        "world populated"
    );

    let mut tally: AHashMap<&'static str, u32> = AHashMap::new();
    for _ in 0..args.ticks {
        for event in run_simulation_tick(&mut world) {
            let key = match event {
                SimulationEvent::ScoutPromoted { .. } => "scout_promotions",
                SimulationEvent::BeeDied { .. } => "deaths",
                SimulationEvent::RecruitsDispatched { .. } => "recruitment_broadcasts",
                SimulationEvent::NectarHarvested { .. } => "harvests",
                SimulationEvent::NectarDeposited { .. } => "deposits",
                SimulationEvent::DenCollapsed { .. } => "den_collapses",
            };
            *tally.entry(key).or_insert(0) += 1;
        }
    }

    let summary = RunSummary {
        ticks: args.ticks,
        living_bees: world.living_bee_count(),
        deaths: tally.get("deaths").copied().unwrap_or(0),
        scout_promotions: tally.get("scout_promotions").copied().unwrap_or(0),
        recruitment_broadcasts: tally.get("recruitment_broadcasts").copied().unwrap_or(0),
        harvests: tally.get("harvests").copied().unwrap_or(0),
        deposits: tally.get("deposits").copied().unwrap_or(0),
        den_collapses: tally.get("den_collapses").copied().unwrap_or(0),
        hive_food: world.hive_ids().map(|id| world.hive(id).food).collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n=== WAGGLE RUN SUMMARY ===");
        println!("ticks simulated:         {}", summary.ticks);
        println!("living bees:             {}", summary.living_bees);
        println!("deaths:                  {}", summary.deaths);
        println!("scout promotions:        {}", summary.scout_promotions);
        println!("recruitment broadcasts:  {}", summary.recruitment_broadcasts);
        println!("harvests:                {}", summary.harvests);
        println!("deposits:                {}", summary.deposits);
        println!("den collapses:           {}", summary.den_collapses);
        for (i, food) in summary.hive_food.iter().enumerate() {
            println!("hive {} food stock:       {:.2}", i, food);
        }
    }

    Ok(())
}
