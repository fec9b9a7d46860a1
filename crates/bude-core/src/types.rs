//! Deck records and run-wide constants.
//!
//! `Atom` and `FFParams` are `#[repr(C)]` so a deck file can be reinterpreted
//! directly as a record slice and handed to a device unchanged.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::errors::{BudeError, Result};

/// Poses scored by one work-item; the scheduling unit used by the FLOP model.
pub const POSES_PER_WI: usize = 4;

/// Default number of timed passes.
pub const DEFAULT_ITERATIONS: usize = 8;

/// Default pose count (matches the bm1 deck).
pub const DEFAULT_POSES: usize = 65536;

/// Default work-group size; 0 selects ungrouped dispatch.
pub const DEFAULT_WG_SIZE: usize = 4;

/// Upper bound on the number of poses checked against the reference file.
pub const REF_POSES: usize = 65536;

/// Default deck directory, relative to the working directory.
pub const DEFAULT_DECK_DIR: &str = "../data/bm1";

pub const FILE_LIGAND: &str = "ligand.in";
pub const FILE_PROTEIN: &str = "protein.in";
pub const FILE_FORCEFIELD: &str = "forcefield.in";
pub const FILE_POSES: &str = "poses.in";
pub const FILE_REF_ENERGIES: &str = "ref_energies.out";

/// Number of degrees of freedom per pose (3 rotations + 3 translations).
pub const POSE_DIMENSIONS: usize = 6;

/// One atom of the protein or the ligand.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Atom {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Index into the force-field table
    pub atom_type: i32,
}

impl Atom {
    pub const fn new(x: f32, y: f32, z: f32, atom_type: i32) -> Self {
        Self { x, y, z, atom_type }
    }
}

/// Per-type interaction parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct FFParams {
    /// Hydrogen-bond kind flag (`'F'`, `'E'` or other)
    pub hbtype: i32,
    pub radius: f32,
    /// Hydrophobic/hydrophilic well depth; the sign selects the class
    pub hphb: f32,
    /// Electrostatic charge
    pub elsc: f32,
}

/// Struct-of-arrays pose storage, one flat sequence per degree of freedom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseSet {
    pub rx: Vec<f32>,
    pub ry: Vec<f32>,
    pub rz: Vec<f32>,
    pub tx: Vec<f32>,
    pub ty: Vec<f32>,
    pub tz: Vec<f32>,
}

impl PoseSet {
    /// Splits a dimension-major pose file (six contiguous blocks) into a `PoseSet`.
    ///
    /// Fails with `InvalidArgument` unless `flat.len() == 6 * poses`.
    pub fn from_flat(flat: &[f32], poses: usize) -> Result<Self> {
        if flat.len() % POSE_DIMENSIONS != 0 || flat.len() / POSE_DIMENSIONS != poses {
            return Err(BudeError::pose_mismatch(flat.len(), POSE_DIMENSIONS, poses));
        }

        let block = |i: usize| flat[i * poses..(i + 1) * poses].to_vec();
        Ok(Self {
            rx: block(0),
            ry: block(1),
            rz: block(2),
            tx: block(3),
            ty: block(4),
            tz: block(5),
        })
    }

    /// Number of poses (every dimension has this length).
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// The six dimensions in file order.
    pub fn dimensions(&self) -> [&[f32]; POSE_DIMENSIONS] {
        [
            self.rx.as_slice(),
            self.ry.as_slice(),
            self.rz.as_slice(),
            self.tx.as_slice(),
            self.ty.as_slice(),
            self.tz.as_slice(),
        ]
    }
}

/// Shape of the scoring workload, derived from the loaded deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadShape {
    pub natlig: usize,
    pub natpro: usize,
    pub ntypes: usize,
    pub nposes: usize,
}
