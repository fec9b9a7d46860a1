//! Fasten Kernel Benchmarks
//!
//! Host reference kernel throughput across pose counts and work-group sizes,
//! plus the full dispatch path including marshaling.
//!
//! ## Usage
//! ```bash
//! cargo bench --bench fasten
//! ```

use bude_core::{Atom, Deck, FFParams, PoseSet};
use bude_gpu::{
    run_benchmark, Device, DispatchPlan, FastenKernel, HostFasten, InOrderQueue, SharedDeck,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Synthetic deck with `natlig` ligand and `natpro` protein atoms on a lattice.
fn synthetic_deck(natlig: usize, natpro: usize, poses: usize) -> Deck {
    let lattice = |n: usize, spacing: f32| -> Vec<Atom> {
        (0..n)
            .map(|i| {
                let (x, y, z) = (i % 8, (i / 8) % 8, i / 64);
                Atom::new(
                    x as f32 * spacing,
                    y as f32 * spacing,
                    z as f32 * spacing,
                    (i % 3) as i32,
                )
            })
            .collect()
    };
    let forcefield = vec![
        FFParams {
            hbtype: 'F' as i32,
            radius: 1.5,
            hphb: 0.8,
            elsc: 0.3,
        },
        FFParams {
            hbtype: 'E' as i32,
            radius: 1.7,
            hphb: -0.6,
            elsc: -0.4,
        },
        FFParams {
            hbtype: 'N' as i32,
            radius: 1.9,
            hphb: 0.0,
            elsc: 0.0,
        },
    ];
    let flat: Vec<f32> = (0..poses * 6).map(|i| (i as f32 * 0.013).sin()).collect();

    Deck::from_parts(
        "bench",
        lattice(natlig, 1.2),
        lattice(natpro, 3.5),
        forcefield,
        PoseSet::from_flat(&flat, poses).unwrap(),
    )
}

/// Benchmark one kernel launch over marshaled buffers
fn bench_host_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("host_fasten");
    let device = Device::host_parallel();

    for poses in [256, 1024, 4096] {
        let deck = synthetic_deck(26, 512, poses);
        let mut queue = InOrderQueue::new(&device).unwrap();
        let mut shared = SharedDeck::marshal(&mut queue, &deck).unwrap();

        group.throughput(Throughput::Elements((poses * 26 * 512) as u64));
        for wg_size in [0, 4, 64] {
            group.bench_with_input(
                BenchmarkId::new(format!("wg{}", wg_size), poses),
                &wg_size,
                |b, &wg_size| {
                    b.iter(|| {
                        queue
                            .submit(|| HostFasten.launch(shared.args(black_box(wg_size))))
                            .wait()
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the whole warm-up and timed protocol
fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.sample_size(10);

    let deck = synthetic_deck(26, 256, 1024);
    for device in [Device::host_serial(), Device::host_parallel()] {
        group.bench_function(device.name().to_string(), |b| {
            b.iter(|| {
                run_benchmark(
                    &device,
                    black_box(&deck),
                    &HostFasten,
                    DispatchPlan {
                        iterations: 2,
                        wg_size: 4,
                    },
                )
                .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_host_kernel, bench_dispatch);
criterion_main!(benches);
