//! Deck Loading Integration Tests
//!
//! Exercises the on-disk deck layout: record truncation, pose-count checks
//! and reference-file handling.

use bude_core::types::{FILE_LIGAND, FILE_POSES, FILE_REF_ENERGIES};
use bude_core::{read_records, Atom, BudeError, Deck, FFParams, PoseSet, ReferenceEnergies};
use std::fs;
use std::path::Path;

fn sample_deck(dir: &Path, poses: usize) -> Deck {
    let ligand = vec![Atom::new(0.0, 0.0, 0.0, 0), Atom::new(1.5, 0.0, 0.0, 1)];
    let protein = vec![
        Atom::new(3.0, 0.0, 0.0, 0),
        Atom::new(0.0, 3.0, 0.0, 1),
        Atom::new(0.0, 0.0, 3.0, 1),
    ];
    let forcefield = vec![
        FFParams {
            hbtype: 'F' as i32,
            radius: 1.2,
            hphb: 0.5,
            elsc: 0.1,
        },
        FFParams {
            hbtype: 'E' as i32,
            radius: 1.6,
            hphb: -0.3,
            elsc: -0.2,
        },
    ];
    let flat: Vec<f32> = (0..poses * 6).map(|v| v as f32 * 0.01).collect();
    let poses = PoseSet::from_flat(&flat, poses).unwrap();

    Deck::from_parts(dir, ligand, protein, forcefield, poses)
}

#[test]
fn test_record_count_is_floor_of_byte_length() {
    env_logger::builder().is_test(true).try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.bin");
    let record = std::mem::size_of::<FFParams>();

    for n_bytes in [0, 1, record - 1, record, record + 1, 3 * record, 3 * record + 9] {
        fs::write(&path, vec![0u8; n_bytes]).unwrap();
        let records = read_records::<FFParams>(&path).unwrap();
        assert_eq!(records.len(), n_bytes / record, "for {} bytes", n_bytes);
    }
}

#[test]
fn test_deck_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let deck = sample_deck(dir.path(), 8);
    deck.save(dir.path()).unwrap();

    let loaded = Deck::load(dir.path(), 8).unwrap();
    assert_eq!(loaded.ligand, deck.ligand);
    assert_eq!(loaded.protein, deck.protein);
    assert_eq!(loaded.forcefield, deck.forcefield);
    assert_eq!(loaded.poses, deck.poses);

    let shape = loaded.shape();
    assert_eq!((shape.natlig, shape.natpro, shape.ntypes, shape.nposes), (2, 3, 2, 8));
    assert_eq!(loaded.reference_path(), dir.path().join(FILE_REF_ENERGIES));
}

#[test]
fn test_pose_count_mismatch_is_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    sample_deck(dir.path(), 8).save(dir.path()).unwrap();

    for configured in [7, 9, 0] {
        let err = Deck::load(dir.path(), configured).unwrap_err();
        assert!(
            matches!(err, BudeError::InvalidArgument(_)),
            "configured {} poses: {}",
            configured,
            err
        );
    }
}

#[test]
fn test_trailing_partial_pose_value_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    sample_deck(dir.path(), 4).save(dir.path()).unwrap();

    let poses_path = dir.path().join(FILE_POSES);
    let mut bytes = fs::read(&poses_path).unwrap();
    bytes.extend_from_slice(&[1, 2, 3]);
    fs::write(&poses_path, bytes).unwrap();

    let deck = Deck::load(dir.path(), 4).unwrap();
    assert_eq!(deck.poses.len(), 4);
}

#[test]
fn test_missing_ligand_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    sample_deck(dir.path(), 2).save(dir.path()).unwrap();
    fs::remove_file(dir.path().join(FILE_LIGAND)).unwrap();

    let err = Deck::load(dir.path(), 2).unwrap_err();
    match err {
        BudeError::Io { path, .. } => assert!(path.ends_with(FILE_LIGAND)),
        other => panic!("expected Io error, got {other}"),
    }
}

#[test]
fn test_reference_file_round_trip_through_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(FILE_REF_ENERGIES);
    fs::write(&path, "  -12.50\n 830.25\n0.10\n").unwrap();

    let refs = ReferenceEnergies::read(&path, 3).unwrap();
    let report = refs.compare(&[-12.5, 830.25, 0.4]);
    assert_eq!(report.compared, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.max_difference_percent(), 0.0);

    let err = ReferenceEnergies::read(&path, 4).unwrap_err();
    assert!(matches!(err, BudeError::Logic(_)));

    let err = ReferenceEnergies::read(&dir.path().join("missing"), 1).unwrap_err();
    assert!(matches!(err, BudeError::Io { .. }));
}
