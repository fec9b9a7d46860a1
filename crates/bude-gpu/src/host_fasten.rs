//! Host reference implementation of the fasten kernel.
//!
//! Scores each pose with BUDE's empirical free-energy terms (steric clash,
//! distance-damped electrostatics, desolvation) summed over every
//! ligand/protein atom pair. Pose groups are spread over the current rayon
//! pool, which is the queue's device pool when launched through a queue.

use bude_core::types::POSES_PER_WI;
use bude_core::{Atom, BudeError, FFParams, Result};
use rayon::prelude::*;

use crate::kernel::{FastenArgs, FastenKernel};

const ZERO: f32 = 0.0;
const QUARTER: f32 = 0.25;
const HALF: f32 = 0.5;
const ONE: f32 = 1.0;
const TWO: f32 = 2.0;
const FOUR: f32 = 4.0;
const CNSTNT: f32 = 45.0;

const HARDNESS: f32 = 38.0;
const NPNPDIST: f32 = 5.5;
const NPPDIST: f32 = 1.0;

/// Hydrogen-bond kind flags as stored in `FFParams::hbtype`.
pub const HBTYPE_F: i32 = 70;
pub const HBTYPE_E: i32 = 69;

/// CPU fasten kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFasten;

impl FastenKernel for HostFasten {
    fn name(&self) -> &str {
        "host-fasten"
    }

    fn launch(&self, args: FastenArgs<'_>) -> Result<()> {
        args.check()?;
        check_types(args.protein, args.ntypes, "protein")?;
        check_types(args.ligand, args.ntypes, "ligand")?;

        // One task per work-group; ungrouped dispatch gives each work-item its own task.
        let group = args.wg_size.max(1).saturating_mul(POSES_PER_WI);

        let FastenArgs {
            protein,
            ligand,
            forcefield,
            transforms,
            etotals,
            ..
        } = args;
        let scene = Scene {
            protein,
            ligand,
            forcefield,
        };

        etotals
            .par_chunks_mut(group)
            .enumerate()
            .for_each(|(g, chunk)| {
                let base = g * group;
                for (offset, etot) in chunk.iter_mut().enumerate() {
                    let i = base + offset;
                    let pose = [
                        transforms[0][i],
                        transforms[1][i],
                        transforms[2][i],
                        transforms[3][i],
                        transforms[4][i],
                        transforms[5][i],
                    ];
                    *etot = scene.pose_energy(&pose);
                }
            });

        Ok(())
    }
}

fn check_types(atoms: &[Atom], ntypes: usize, what: &str) -> Result<()> {
    match atoms
        .iter()
        .position(|a| a.atom_type < 0 || a.atom_type as usize >= ntypes)
    {
        Some(i) => Err(BudeError::invalid_argument(format!(
            "{} atom {} has type {} outside the {}-entry force field",
            what, i, atoms[i].atom_type, ntypes
        ))),
        None => Ok(()),
    }
}

struct Scene<'a> {
    protein: &'a [Atom],
    ligand: &'a [Atom],
    forcefield: &'a [FFParams],
}

impl Scene<'_> {
    /// Rotation (rx, ry, rz) followed by translation (tx, ty, tz), as a 3x4 matrix.
    fn transform(pose: &[f32; 6]) -> [[f32; 4]; 3] {
        let (sx, cx) = pose[0].sin_cos();
        let (sy, cy) = pose[1].sin_cos();
        let (sz, cz) = pose[2].sin_cos();

        [
            [cy * cz, sx * sy * cz - cx * sz, cx * sy * cz + sx * sz, pose[3]],
            [cy * sz, sx * sy * sz + cx * cz, cx * sy * sz - sx * cz, pose[4]],
            [-sy, sx * cy, cx * cy, pose[5]],
        ]
    }

    fn pose_energy(&self, pose: &[f32; 6]) -> f32 {
        let m = Self::transform(pose);
        let mut etot = ZERO;

        for l_atom in self.ligand {
            let l_params = self.forcefield[l_atom.atom_type as usize];
            let lhphb_ltz = l_params.hphb < ZERO;
            let lhphb_gtz = l_params.hphb > ZERO;

            let lpos = [
                m[0][3] + l_atom.x * m[0][0] + l_atom.y * m[0][1] + l_atom.z * m[0][2],
                m[1][3] + l_atom.x * m[1][0] + l_atom.y * m[1][1] + l_atom.z * m[1][2],
                m[2][3] + l_atom.x * m[2][0] + l_atom.y * m[2][1] + l_atom.z * m[2][2],
            ];

            for p_atom in self.protein {
                let p_params = self.forcefield[p_atom.atom_type as usize];

                let radij = p_params.radius + l_params.radius;
                let r_radij = ONE / radij;

                let both_f = p_params.hbtype == HBTYPE_F && l_params.hbtype == HBTYPE_F;
                let elcdst = if both_f { FOUR } else { TWO };
                let elcdst1 = if both_f { QUARTER } else { HALF };
                let type_e = p_params.hbtype == HBTYPE_E || l_params.hbtype == HBTYPE_E;

                let phphb_ltz = p_params.hphb < ZERO;
                let phphb_gtz = p_params.hphb > ZERO;
                let phphb_nz = p_params.hphb != ZERO;
                let p_hphb = p_params.hphb * if phphb_ltz && lhphb_gtz { -ONE } else { ONE };
                let l_hphb = l_params.hphb * if phphb_gtz && lhphb_ltz { -ONE } else { ONE };
                let distdslv = match (phphb_ltz, lhphb_ltz) {
                    (true, true) => NPNPDIST,
                    (true, false) | (false, true) => NPPDIST,
                    (false, false) => -f32::MAX,
                };
                let r_distdslv = ONE / distdslv;

                let chrg_init = l_params.elsc * p_params.elsc;
                let dslv_init = p_hphb + l_hphb;

                let x = lpos[0] - p_atom.x;
                let y = lpos[1] - p_atom.y;
                let z = lpos[2] - p_atom.z;
                let distij = (x * x + y * y + z * z).sqrt();

                // Steric: only inside the summed radii.
                let distbb = distij - radij;
                let zone1 = distbb < ZERO;
                etot += (ONE - distij * r_radij) * if zone1 { 2.0 * HARDNESS } else { ZERO };

                // Electrostatics, attractive-only for E-type pairs.
                let damping = if zone1 { ONE } else { ONE - distbb * elcdst1 };
                let cutoff = if distbb < elcdst { ONE } else { ZERO };
                let mut chrg_e = chrg_init * damping * cutoff;
                if type_e {
                    chrg_e = -chrg_e.abs();
                }
                etot += chrg_e * CNSTNT;

                // Desolvation.
                let coeff = ONE - distbb * r_distdslv;
                let mut dslv_e = dslv_init * if distbb < distdslv && phphb_nz { ONE } else { ZERO };
                if !zone1 {
                    dslv_e *= coeff;
                }
                etot += dslv_e;
            }
        }

        etot * HALF
    }
}
