mod common;

use common::{sample_table, SAMPLE_VECTORS};
use gm_seedkey::driver::verify_vectors;
use gm_seedkey::{derive_key, trace_key, Grid, Vector};

#[test]
fn sample_vectors_match() {
    let table = sample_table();
    for &(algo, seed, key) in SAMPLE_VECTORS {
        assert_eq!(
            derive_key(seed, algo, &table),
            key,
            "key({algo:02x}, {seed:04x}) != {key:04x}"
        );
    }
}

#[test]
fn vector_file_agrees_with_table() {
    let text = include_str!("data/sample.vectors");
    let vectors = Vector::parse_list(text).unwrap();
    assert_eq!(vectors.len(), SAMPLE_VECTORS.len());
    assert!(verify_vectors(&vectors, &sample_table()).is_empty());
}

#[test]
fn default_algo_is_complement() {
    let table = sample_table();
    assert_eq!(derive_key(0x1234, 0x00, &table), 0xEDCB);
    assert_eq!(derive_key(0x0000, 0x00, &table), 0xFFFF);
}

#[test]
fn unprogrammed_algorithms_return_seed() {
    let table = sample_table();
    assert_eq!(derive_key(0x1234, 0x42, &table), 0x1234);
}

#[test]
fn derivation_is_deterministic() {
    let table = sample_table();
    let first: Vec<_> = Grid::new(0x1200..=0x12FF, 0..=3).records(&table).collect();
    let second: Vec<_> = Grid::new(0x1200..=0x12FF, 0..=3).records(&table).collect();
    assert_eq!(first, second);
}

#[test]
fn traces_agree_with_vectors() {
    let table = sample_table();
    for &(algo, seed, key) in SAMPLE_VECTORS {
        let trace = trace_key(seed, algo, &table);
        assert_eq!(trace.key, key);
        assert_eq!(trace.steps.first().map(|s| s.before), Some(seed));
    }
}

#[test]
fn full_seed_sweep_for_one_algorithm() {
    let table = sample_table();
    let records: Vec<_> = Grid::new(0..=u16::MAX, 0x03..=0x03).records(&table).collect();
    assert_eq!(records.len(), 65536);
    assert!(records.iter().all(|r| r.algo == 0x03));
    assert!(records.windows(2).all(|w| w[0].seed < w[1].seed));
    assert_eq!(records[0].seed, 0);
    assert_eq!(records[65535].seed, 0xFFFF);
}
