//! Throughput figures derived from the timed passes.
//!
//! Everything here is a pure function of the elapsed time, the pass count and
//! the workload shape; the figures never feed back into scoring.

use serde::Serialize;

use crate::types::{WorkloadShape, POSES_PER_WI};

/// Floating-point operations performed by one work-item (one pose group).
pub fn ops_per_work_item(natlig: usize, natpro: usize) -> f64 {
    let g = POSES_PER_WI as f64;
    let l = natlig as f64;
    let p = natpro as f64;
    g * 27.0 + l * (2.0 + g * 18.0 + p * (10.0 + g * 30.0)) + g
}

/// Derived kernel throughput for one benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KernelMetrics {
    /// Elapsed time across all timed passes
    pub total_ms: f64,
    /// `total_ms / iterations`
    pub average_ms: f64,
    /// Average pass time in seconds
    pub runtime_s: f64,
    pub total_flops: f64,
    pub flops: f64,
    pub total_finsts: f64,
    pub finsts: f64,
    pub interactions: f64,
    pub interactions_per_sec: f64,
}

impl KernelMetrics {
    /// Computes all figures from the aggregate elapsed time of `iterations` passes.
    ///
    /// Rates use the average pass time, not any individual pass.
    pub fn compute(total_ms: f64, iterations: usize, shape: &WorkloadShape) -> Self {
        let average_ms = total_ms / iterations as f64;
        let runtime_s = average_ms * 1e-3;

        let poses = shape.nposes as f64;
        let natlig = shape.natlig as f64;
        let natpro = shape.natpro as f64;

        let total_flops =
            ops_per_work_item(shape.natlig, shape.natpro) * (poses / POSES_PER_WI as f64);
        let total_finsts = 25.0 * natpro * natlig * poses;
        let interactions = poses * natlig * natpro;

        Self {
            total_ms,
            average_ms,
            runtime_s,
            total_flops,
            flops: total_flops / runtime_s,
            total_finsts,
            finsts: total_finsts / runtime_s,
            interactions,
            interactions_per_sec: interactions / runtime_s,
        }
    }

    pub fn gflops(&self) -> f64 {
        self.flops / 1e9
    }

    pub fn gfinsts(&self) -> f64 {
        self.finsts / 1e9
    }

    /// Interaction rate in billions per second.
    pub fn giga_interactions(&self) -> f64 {
        self.interactions_per_sec / 1e9
    }
}
