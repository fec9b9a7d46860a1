//! Marshaling a loaded deck into shared memory.

use bude_core::types::POSE_DIMENSIONS;
use bude_core::{Atom, Deck, FFParams, Result, WorkloadShape};

use crate::kernel::FastenArgs;
use crate::queue::InOrderQueue;
use crate::usm::SharedBuffer;

/// The six pose dimensions, one flat shared buffer each.
#[derive(Debug)]
pub struct PoseBuffers {
    pub rx: SharedBuffer<f32>,
    pub ry: SharedBuffer<f32>,
    pub rz: SharedBuffer<f32>,
    pub tx: SharedBuffer<f32>,
    pub ty: SharedBuffer<f32>,
    pub tz: SharedBuffer<f32>,
}

impl PoseBuffers {
    /// Buffers in file order: rx, ry, rz, tx, ty, tz.
    pub fn as_slices(&self) -> [&[f32]; POSE_DIMENSIONS] {
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

/// Every buffer one run of the kernel reads or writes.
#[derive(Debug)]
pub struct SharedDeck {
    pub protein: SharedBuffer<Atom>,
    pub ligand: SharedBuffer<Atom>,
    pub forcefield: SharedBuffer<FFParams>,
    pub poses: PoseBuffers,
    energies: SharedBuffer<f32>,
    shape: WorkloadShape,
}

impl SharedDeck {
    /// Allocates shared buffers on the queue's device and copies `deck` into
    /// them. Returns once every copy has completed.
    pub fn marshal(queue: &mut InOrderQueue, deck: &Deck) -> Result<Self> {
        let shape = deck.shape();
        let alloc = queue.allocator().clone();

        let mut protein = alloc.alloc_zeroed::<Atom>(shape.natpro)?;
        let mut ligand = alloc.alloc_zeroed::<Atom>(shape.natlig)?;
        let mut forcefield = alloc.alloc_zeroed::<FFParams>(shape.ntypes)?;

        let [rx, ry, rz, tx, ty, tz] = deck.poses.dimensions();
        let mut poses = PoseBuffers {
            rx: alloc.alloc_zeroed(shape.nposes)?,
            ry: alloc.alloc_zeroed(shape.nposes)?,
            rz: alloc.alloc_zeroed(shape.nposes)?,
            tx: alloc.alloc_zeroed(shape.nposes)?,
            ty: alloc.alloc_zeroed(shape.nposes)?,
            tz: alloc.alloc_zeroed(shape.nposes)?,
        };
        let mut energies = alloc.alloc_zeroed::<f32>(shape.nposes)?;

        let copies = [
            queue.copy(&deck.protein, &mut protein),
            queue.copy(&deck.ligand, &mut ligand),
            queue.copy(&deck.forcefield, &mut forcefield),
            queue.copy(rx, &mut poses.rx),
            queue.copy(ry, &mut poses.ry),
            queue.copy(rz, &mut poses.rz),
            queue.copy(tx, &mut poses.tx),
            queue.copy(ty, &mut poses.ty),
            queue.copy(tz, &mut poses.tz),
            queue.fill(&mut energies, 0.0),
        ];
        for event in copies {
            queue.defer(event);
        }
        queue.wait()?;

        let stats = alloc.stats();
        log::debug!(
            "Marshaled deck into {} shared allocations ({} bytes live)",
            stats.allocations,
            stats.live_bytes
        );

        Ok(Self {
            protein,
            ligand,
            forcefield,
            poses,
            energies,
            shape,
        })
    }

    pub fn shape(&self) -> WorkloadShape {
        self.shape
    }

    /// Energies written by the most recent kernel pass.
    pub fn energies(&self) -> &[f32] {
        &self.energies
    }

    /// Kernel arguments borrowing every buffer, the result buffer mutably.
    pub fn args(&mut self, wg_size: usize) -> FastenArgs<'_> {
        FastenArgs {
            wg_size,
            ntypes: self.shape.ntypes,
            nposes: self.shape.nposes,
            natlig: self.shape.natlig,
            natpro: self.shape.natpro,
            protein: &self.protein,
            ligand: &self.ligand,
            forcefield: &self.forcefield,
            transforms: self.poses.as_slices(),
            etotals: &mut self.energies,
        }
    }
}
