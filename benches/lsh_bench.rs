use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use setsim_lsh::{Index, Sketch};

fn bench_build_query(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 10_000;
    let k = 128usize;

    let sketches: Vec<Sketch> = (0..n)
        .map(|_| {
            let mut s = Sketch::new(k).unwrap();
            for _ in 0..(k * 4) {
                s.update(&rng.r#gen::<u64>().to_le_bytes());
            }
            s
        })
        .collect();

    c.bench_function("build_index_10k", |b| {
        b.iter_batched(
            || sketches.clone(),
            |sketches| {
                let mut idx = Index::<u32>::from_params(0.5, k as u32, 32, 4).unwrap();
                for (i, sketch) in sketches.iter().enumerate() {
                    idx.insert(i as u32, sketch).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("query_1k", |b| {
        let mut idx = Index::<u32>::from_params(0.5, k as u32, 32, 4).unwrap();
        for (i, sketch) in sketches.iter().enumerate() {
            idx.insert(i as u32, sketch).unwrap();
        }

        let q = &sketches[0];
        b.iter(|| {
            let r = idx.query(q).unwrap();
            criterion::black_box(r);
        });
    });
}

criterion_group!(benches, bench_build_query);
criterion_main!(benches);
