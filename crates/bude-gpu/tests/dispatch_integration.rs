//! Dispatch Integration Tests
//!
//! Runs the warm-up and timed protocol end to end on host devices, with stub
//! kernels and with the host reference kernel.

use bude_core::validation::compare;
use bude_core::{Atom, BudeError, Deck, FFParams, PoseSet, Result};
use bude_gpu::{run_benchmark, Device, DispatchPlan, FastenArgs, FastenKernel, HostFasten};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Writes the 0-based launch number into every pose.
#[derive(Default)]
struct LaunchCounter {
    launches: AtomicUsize,
}

impl FastenKernel for LaunchCounter {
    fn name(&self) -> &str {
        "launch-counter"
    }

    fn launch(&self, args: FastenArgs<'_>) -> Result<()> {
        args.check()?;
        let n = self.launches.fetch_add(1, Ordering::SeqCst);
        args.etotals.fill(n as f32);
        Ok(())
    }
}

/// Fails every launch after the first `ok` ones.
struct FailingAfter {
    ok: usize,
    launches: AtomicUsize,
}

impl FastenKernel for FailingAfter {
    fn name(&self) -> &str {
        "failing"
    }

    fn launch(&self, args: FastenArgs<'_>) -> Result<()> {
        if self.launches.fetch_add(1, Ordering::SeqCst) >= self.ok {
            return Err(BudeError::device("fasten", "launch failed"));
        }
        args.etotals.fill(1.0);
        Ok(())
    }
}

fn docking_deck(poses: usize) -> Deck {
    let ligand = vec![
        Atom::new(0.0, 0.0, 0.0, 0),
        Atom::new(1.4, 0.0, 0.0, 1),
        Atom::new(0.0, 1.4, 0.0, 2),
    ];
    let protein = vec![
        Atom::new(2.0, 0.5, 0.0, 0),
        Atom::new(-1.5, 1.0, 0.5, 1),
        Atom::new(0.5, -2.0, 1.0, 2),
        Atom::new(3.0, 3.0, -1.0, 1),
    ];
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

    let mut flat = Vec::with_capacity(poses * 6);
    for dim in 0..6 {
        for p in 0..poses {
            let v = (p as f32 * 0.37 + dim as f32).sin();
            flat.push(if dim < 3 { v * std::f32::consts::PI } else { v * 2.0 });
        }
    }

    Deck::from_parts(
        "mem",
        ligand,
        protein,
        forcefield,
        PoseSet::from_flat(&flat, poses).unwrap(),
    )
}

#[test]
fn test_warmup_is_overwritten_by_timed_passes() {
    env_logger::builder().is_test(true).try_init().ok();
    let kernel = LaunchCounter::default();
    let plan = DispatchPlan {
        iterations: 3,
        wg_size: 4,
    };

    let run = run_benchmark(&Device::host_serial(), &docking_deck(10), &kernel, plan).unwrap();

    assert_eq!(run.passes, 4);
    assert_eq!(kernel.launches.load(Ordering::SeqCst), 4);
    // Launch 0 was the warm-up; the final timed pass was launch 3
    assert_eq!(run.energies, vec![3.0; 10]);
    assert_eq!(run.shape.nposes, 10);
}

#[test]
fn test_single_iteration_replaces_warmup_output() {
    let kernel = LaunchCounter::default();
    let plan = DispatchPlan {
        iterations: 1,
        wg_size: 0,
    };

    let run = run_benchmark(&Device::host_parallel(), &docking_deck(5), &kernel, plan).unwrap();
    assert!(run.energies.iter().all(|&e| e == 1.0));
}

#[test]
fn test_phase_timings_are_recorded() {
    let plan = DispatchPlan {
        iterations: 2,
        wg_size: 2,
    };
    let run = run_benchmark(&Device::host_serial(), &docking_deck(16), &HostFasten, plan).unwrap();

    let t = run.timings;
    for phase in [t.context_ms, t.xfer_alloc_ms, t.warmup_ms, t.kernel_ms] {
        assert!(phase.is_finite() && phase >= 0.0);
    }
}

#[test]
fn test_zero_iterations_is_rejected() {
    let plan = DispatchPlan {
        iterations: 0,
        wg_size: 4,
    };
    let err = run_benchmark(&Device::host_serial(), &docking_deck(4), &HostFasten, plan)
        .unwrap_err();
    assert!(matches!(err, BudeError::InvalidArgument(_)));
}

#[test]
fn test_kernel_failure_stops_the_run() {
    let kernel = FailingAfter {
        ok: 2,
        launches: AtomicUsize::new(0),
    };
    let plan = DispatchPlan {
        iterations: 5,
        wg_size: 4,
    };

    let err = run_benchmark(&Device::host_serial(), &docking_deck(4), &kernel, plan).unwrap_err();
    assert!(matches!(err, BudeError::Device { .. }));
    // Warm-up, one timed pass, then the failing one
    assert_eq!(kernel.launches.load(Ordering::SeqCst), 3);
}

#[test]
fn test_shared_capacity_exhaustion() {
    let device = Device::host_serial().with_shared_capacity(64);
    let plan = DispatchPlan {
        iterations: 1,
        wg_size: 4,
    };

    let err = run_benchmark(&device, &docking_deck(64), &HostFasten, plan).unwrap_err();
    assert!(matches!(err, BudeError::SharedMemoryExhausted { capacity: 64, .. }));
}

#[test]
fn test_host_kernel_agrees_across_devices_and_grouping() {
    env_logger::builder().is_test(true).try_init().ok();
    let deck = docking_deck(257);

    let reference = run_benchmark(
        &Device::host_serial(),
        &deck,
        &HostFasten,
        DispatchPlan {
            iterations: 1,
            wg_size: 0,
        },
    )
    .unwrap();

    for wg_size in [1, 4, 64] {
        let run = run_benchmark(
            &Device::host_parallel(),
            &deck,
            &HostFasten,
            DispatchPlan {
                iterations: 2,
                wg_size,
            },
        )
        .unwrap();

        let report = compare(&reference.energies, &run.energies);
        assert!(report.within(1.0), "wg {}: {:?}", wg_size, report);
        assert_eq!(report.compared + report.skipped, 257);
    }

    // The deck has clashing poses, so not every energy is negligible
    assert!(reference.energies.iter().any(|e| e.abs() >= 1.0));
    assert!(reference.energies.iter().all(|e| e.is_finite()));
}

#[test]
fn test_oversized_work_group_covers_every_pose() {
    let deck = docking_deck(1);
    let ungrouped = DispatchPlan {
        iterations: 1,
        wg_size: 0,
    };
    let reference = run_benchmark(&Device::host_serial(), &deck, &HostFasten, ungrouped).unwrap();

    let plan = DispatchPlan {
        iterations: 1,
        wg_size: usize::MAX / 2,
    };
    let run = run_benchmark(&Device::host_serial(), &deck, &HostFasten, plan).unwrap();
    assert_eq!(run.energies, reference.energies);
}
