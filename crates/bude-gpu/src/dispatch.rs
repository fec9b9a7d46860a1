//! Warm-up then timed dispatch of the fasten kernel.
//!
//! A run creates one in-order queue on the selected device, marshals the deck
//! into shared memory, launches the kernel once untimed and then `iterations`
//! times back to back. The timed loop is bounded by a single start/end pair,
//! so only the aggregate kernel time is known. Every submission is waited on
//! before the next one is issued.

use bude_core::{BudeError, Deck, Result, WorkloadShape};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::device::Device;
use crate::kernel::FastenKernel;
use crate::marshal::SharedDeck;
use crate::queue::InOrderQueue;

/// Wall-clock cost of each run phase, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PhaseTimings {
    /// Queue creation on the device
    pub context_ms: f64,
    /// Shared allocation plus host-to-shared copies
    pub xfer_alloc_ms: f64,
    pub warmup_ms: f64,
    /// Total over all timed passes
    pub kernel_ms: f64,
}

/// How the kernel is launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPlan {
    pub iterations: usize,
    /// 0 requests ungrouped dispatch
    pub wg_size: usize,
}

/// Everything a finished run hands back to the host.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub timings: PhaseTimings,
    /// Energies from the final timed pass
    pub energies: Vec<f32>,
    pub shape: WorkloadShape,
    /// Kernel launches including the warm-up
    pub passes: usize,
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Runs the full warm-up and timed protocol for `deck` on `device`.
pub fn run_benchmark(
    device: &Device,
    deck: &Deck,
    kernel: &dyn FastenKernel,
    plan: DispatchPlan,
) -> Result<BenchmarkRun> {
    if plan.iterations == 0 {
        return Err(BudeError::invalid_argument(
            "at least one timed iteration is required",
        ));
    }

    let mut timings = PhaseTimings::default();

    let start = Instant::now();
    let mut queue = InOrderQueue::new(device)?;
    timings.context_ms = millis(start.elapsed());

    let start = Instant::now();
    let mut shared = SharedDeck::marshal(&mut queue, deck)?;
    timings.xfer_alloc_ms = millis(start.elapsed());

    log::info!(
        "Dispatching {} on {}: {} timed passes, wg size {}",
        kernel.name(),
        queue.device().name(),
        plan.iterations,
        plan.wg_size
    );

    let start = Instant::now();
    launch(&mut queue, &mut shared, kernel, plan.wg_size)?;
    timings.warmup_ms = millis(start.elapsed());

    let start = Instant::now();
    let mut device_time = Duration::ZERO;
    for _ in 0..plan.iterations {
        device_time += launch(&mut queue, &mut shared, kernel, plan.wg_size)?;
    }
    timings.kernel_ms = millis(start.elapsed());

    log::debug!(
        "Phase timings: context {:.3} ms, xfer+alloc {:.3} ms, warmup {:.3} ms, kernel {:.3} ms",
        timings.context_ms,
        timings.xfer_alloc_ms,
        timings.warmup_ms,
        timings.kernel_ms
    );
    log::debug!(
        "Commands executed for {:.3} ms of the {:.3} ms timed loop",
        millis(device_time),
        timings.kernel_ms
    );

    Ok(BenchmarkRun {
        timings,
        energies: shared.energies().to_vec(),
        shape: shared.shape(),
        passes: plan.iterations + 1,
    })
}

/// One kernel submission followed by a blocking wait; returns the command's execution time.
fn launch(
    queue: &mut InOrderQueue,
    shared: &mut SharedDeck,
    kernel: &dyn FastenKernel,
    wg_size: usize,
) -> Result<Duration> {
    let event = queue.submit(|| kernel.launch(shared.args(wg_size)));
    let elapsed = event.elapsed();
    event.wait()?;
    Ok(elapsed)
}
