use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flatbvh::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_triangles_in_space(count: usize, space_size: f32, tri_size: f32) -> Vec<Triangle> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let c = Vec3::new(
                rng.gen_range(0.0..space_size),
                rng.gen_range(0.0..space_size),
                rng.gen_range(0.0..space_size),
            );
            Triangle::new(
                c,
                c + Vec3::new(rng.gen_range(0.0..tri_size), 0.0, rng.gen_range(0.0..tri_size)),
                c + Vec3::new(0.0, rng.gen_range(0.0..tri_size), rng.gen_range(0.0..tri_size)),
            )
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sah bvh build");
    for count in [1_000usize, 20_000, 100_000] {
        let triangles = generate_triangles_in_space(count, 1000.0, 1.0);
        group.bench_with_input(BenchmarkId::from_parameter(count), &triangles, |b, tris| {
            b.iter(|| Bvh::build(black_box(tris)))
        });
    }
    group.finish();

    let triangles = generate_triangles_in_space(20_000, 100.0, 1.0);
    let bvh = Bvh::build(&triangles).expect("non-empty scene");
    let rays: Vec<Ray> = (0..1024)
        .map(|i| {
            let a = i as f32 * 0.37;
            Ray::new(Vec3::new(50.0, 50.0, -10.0), Vec3::new(a.sin(), a.cos(), 4.0))
        })
        .collect();

    c.bench_function("stackless closest hit x1024", |b| {
        b.iter(|| {
            rays.iter()
                .filter(|ray| bvh.closest_hit(&triangles, ray, f32::INFINITY).is_some())
                .count()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
