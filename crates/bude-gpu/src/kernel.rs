//! The fasten kernel call contract.
//!
//! The harness treats the scoring kernel as an opaque collaborator: it hands
//! over the workload counts and the shared buffers and expects exactly one
//! energy per pose back in `etotals`. Any implementation of [`FastenKernel`]
//! can be dispatched, which is how tests substitute deterministic stubs.

use bude_core::types::POSE_DIMENSIONS;
use bude_core::{Atom, BudeError, FFParams, Result};

/// Arguments of one kernel invocation, borrowed from the marshaled deck.
#[derive(Debug)]
pub struct FastenArgs<'a> {
    /// Work-group size; 0 requests ungrouped dispatch
    pub wg_size: usize,
    pub ntypes: usize,
    pub nposes: usize,
    pub natlig: usize,
    pub natpro: usize,
    pub protein: &'a [Atom],
    pub ligand: &'a [Atom],
    pub forcefield: &'a [FFParams],
    /// Pose dimensions in file order: rx, ry, rz, tx, ty, tz
    pub transforms: [&'a [f32]; POSE_DIMENSIONS],
    /// One energy per pose, written by the kernel
    pub etotals: &'a mut [f32],
}

impl FastenArgs<'_> {
    /// Checks that every buffer agrees with the declared counts.
    pub fn check(&self) -> Result<()> {
        let mismatch = |what: &str, got: usize, want: usize| {
            BudeError::invalid_argument(format!(
                "kernel argument {} has {} elements, expected {}",
                what, got, want
            ))
        };

        if self.protein.len() != self.natpro {
            return Err(mismatch("protein", self.protein.len(), self.natpro));
        }
        if self.ligand.len() != self.natlig {
            return Err(mismatch("ligand", self.ligand.len(), self.natlig));
        }
        if self.forcefield.len() != self.ntypes {
            return Err(mismatch("forcefield", self.forcefield.len(), self.ntypes));
        }
        for (dim, transform) in self.transforms.iter().enumerate() {
            if transform.len() != self.nposes {
                return Err(mismatch(
                    &format!("transforms[{}]", dim),
                    transform.len(),
                    self.nposes,
                ));
            }
        }
        if self.etotals.len() != self.nposes {
            return Err(mismatch("etotals", self.etotals.len(), self.nposes));
        }
        Ok(())
    }

    /// Parameters of pose `index`, read at the same index from all six buffers.
    #[inline]
    pub fn pose(&self, index: usize) -> [f32; POSE_DIMENSIONS] {
        let t = &self.transforms;
        [t[0][index], t[1][index], t[2][index], t[3][index], t[4][index], t[5][index]]
    }
}

/// A scoring kernel the dispatch engine can launch.
pub trait FastenKernel: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &str;

    /// Scores every pose, writing `args.nposes` energies into `args.etotals`.
    fn launch(&self, args: FastenArgs<'_>) -> Result<()>;
}
