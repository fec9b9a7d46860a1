//! Deck loading: fixed-layout binary files decoded into typed records.
//!
//! A deck directory holds the ligand and protein atoms, the force-field table,
//! the flat pose file and the text reference energies. Binary files are
//! native-endian `#[repr(C)]` records with no header.

use bytemuck::Pod;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{BudeError, Result};
use crate::types::{
    Atom, FFParams, PoseSet, WorkloadShape, FILE_FORCEFIELD, FILE_LIGAND, FILE_POSES,
    FILE_PROTEIN, FILE_REF_ENERGIES,
};

/// Reads a whole file and reinterprets it as a sequence of `T`.
///
/// The record count is `file_size / size_of::<T>()`; a partial trailing record
/// is dropped without error.
pub fn read_records<T: Pod>(path: &Path) -> Result<Vec<T>> {
    let record_size = std::mem::size_of::<T>();
    debug_assert!(record_size > 0, "zero-sized deck records are not supported");

    let bytes = fs::read(path).map_err(|source| BudeError::io(path, source))?;
    let whole = bytes.len() / record_size * record_size;
    if whole != bytes.len() {
        log::debug!(
            "{}: dropping {} trailing bytes (record size {})",
            path.display(),
            bytes.len() - whole,
            record_size
        );
    }

    Ok(bytemuck::pod_collect_to_vec(&bytes[..whole]))
}

/// Writes records in the deck layout read back by [`read_records`].
pub fn write_records<T: Pod>(path: &Path, records: &[T]) -> Result<()> {
    fs::write(path, bytemuck::cast_slice::<T, u8>(records))
        .map_err(|source| BudeError::io(path, source))
}

/// All input records of one benchmark deck.
#[derive(Debug, Clone)]
pub struct Deck {
    dir: PathBuf,
    pub ligand: Vec<Atom>,
    pub protein: Vec<Atom>,
    pub forcefield: Vec<FFParams>,
    pub poses: PoseSet,
}

impl Deck {
    /// Loads every binary file of the deck in `dir`.
    ///
    /// `poses` is the configured pose count; the pose file must hold exactly
    /// six blocks of that length or loading fails with `InvalidArgument`.
    pub fn load(dir: &Path, poses: usize) -> Result<Self> {
        log::info!("Loading deck from {}", dir.display());

        let ligand = read_records::<Atom>(&dir.join(FILE_LIGAND))?;
        let protein = read_records::<Atom>(&dir.join(FILE_PROTEIN))?;
        let forcefield = read_records::<FFParams>(&dir.join(FILE_FORCEFIELD))?;
        let flat = read_records::<f32>(&dir.join(FILE_POSES))?;
        let poses = PoseSet::from_flat(&flat, poses)?;

        log::debug!(
            "Deck loaded: {} ligand atoms, {} protein atoms, {} types, {} poses",
            ligand.len(),
            protein.len(),
            forcefield.len(),
            poses.len()
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            ligand,
            protein,
            forcefield,
            poses,
        })
    }

    /// Writes this deck's binary files into `dir` (the reference file is not touched).
    pub fn save(&self, dir: &Path) -> Result<()> {
        write_records(&dir.join(FILE_LIGAND), &self.ligand)?;
        write_records(&dir.join(FILE_PROTEIN), &self.protein)?;
        write_records(&dir.join(FILE_FORCEFIELD), &self.forcefield)?;

        let mut flat = Vec::with_capacity(self.poses.len() * 6);
        for dim in self.poses.dimensions() {
            flat.extend_from_slice(dim);
        }
        write_records(&dir.join(FILE_POSES), &flat)
    }

    /// Assembles a deck from records already in memory.
    pub fn from_parts(
        dir: impl Into<PathBuf>,
        ligand: Vec<Atom>,
        protein: Vec<Atom>,
        forcefield: Vec<FFParams>,
        poses: PoseSet,
    ) -> Self {
        Self {
            dir: dir.into(),
            ligand,
            protein,
            forcefield,
            poses,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the text reference energies for this deck.
    pub fn reference_path(&self) -> PathBuf {
        self.dir.join(FILE_REF_ENERGIES)
    }

    pub fn shape(&self) -> WorkloadShape {
        WorkloadShape {
            natlig: self.ligand.len(),
            natpro: self.protein.len(),
            ntypes: self.forcefield.len(),
            nposes: self.poses.len(),
        }
    }
}
