use criterion::{black_box, criterion_group, criterion_main, Criterion};
use physics::{PhysicsWorld, RapierEngine, WorldParams};

fn bench_world_step(c: &mut Criterion) {
    let params = WorldParams::new(64, 1.0, 12.0, 8.0).with_seed(7);
    let mut world = match PhysicsWorld::initialize(Box::new(RapierEngine::new()), &params) {
        Ok(world) => world,
        Err(err) => panic!("world init failed: {err}"),
    };
    let mut now = 0.0;
    c.bench_function("world_step_64_tubes", |b| {
        b.iter(|| {
            now += 16.0;
            black_box(world.step(16.0, now))
        });
    });
}

criterion_group!(benches, bench_world_step);
criterion_main!(benches);
