use criterion::{criterion_group, criterion_main, Criterion};

use waggle::simulation::run_simulation_tick;
use waggle::{SimulationConfig, World};

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_40x40_30_bees", |b| {
        let mut world = World::new(40, 40, SimulationConfig::default(), 7).unwrap();
        world.populate_random(3, 10, 40, 2).unwrap();
        b.iter(|| run_simulation_tick(&mut world));
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
