use hnco::maps::{
    self, AffineMap, Injection, LinearMap, MapComposition, Permutation, Projection, SamplingMode,
    Translation, TransvectionSequence, TsAffineMap,
};
use hnco::{generator, BitMatrix, BitVector, Map};
use std::collections::HashSet;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("hnco-{}-{name}", std::process::id()))
}

#[test]
fn translation_is_an_involution() {
    let mut rng = generator(Some(1));
    let map = Translation::random(16, &mut rng);
    for _ in 0..10 {
        let x = BitVector::random(16, &mut rng);
        assert_eq!(map.map(&map.map(&x)), x);
    }
    assert!(map.is_surjective());
}

#[test]
fn permutation_inverse_restores_input() {
    let mut rng = generator(Some(2));
    let map = Permutation::random(12, &mut rng);
    let inverse = map.inverse();
    for _ in 0..10 {
        let x = BitVector::random(12, &mut rng);
        assert_eq!(inverse.map(&map.map(&x)), x);
    }
}

#[test]
fn permutation_moves_bits() {
    let map = Permutation::new(vec![2, 0, 1]);
    let x: BitVector = "100".parse().unwrap();
    assert_eq!(map.map(&x).to_string(), "010");
}

#[test]
fn surjective_linear_map_has_full_row_rank() {
    let mut rng = generator(Some(3));
    for _ in 0..5 {
        let map = LinearMap::random(6, 10, true, &mut rng).unwrap();
        assert_eq!(map.matrix().compute_rank(), 6);
        assert!(map.is_surjective());
        assert_eq!(map.input_size(), 10);
        assert_eq!(map.output_size(), 6);
    }
}

#[test]
fn surjective_linear_map_needs_enough_columns() {
    let mut rng = generator(Some(4));
    assert!(LinearMap::random(10, 6, true, &mut rng).is_err());
    assert!(LinearMap::random(10, 6, false, &mut rng).is_ok());
}

#[test]
fn surjective_affine_map() {
    let mut rng = generator(Some(5));
    for _ in 0..1000 {
        let map = AffineMap::random(4, 8, true, &mut rng).unwrap();
        assert_eq!(map.matrix().compute_rank(), 4);
        assert!(map.is_surjective());
        // A·0 + b = b
        assert_eq!(&map.map(&BitVector::zeros(8)), map.vector());
    }
}

#[test]
fn transvection_sequence_agrees_with_its_matrix() {
    let mut rng = generator(Some(6));
    let modes = [
        SamplingMode::Unconstrained,
        SamplingMode::Commuting,
        SamplingMode::UniqueSource,
        SamplingMode::UniqueDestination,
        SamplingMode::Disjoint,
        SamplingMode::NonCommuting,
    ];
    for mode in modes {
        let sequence = TransvectionSequence::random(10, 6, mode, &mut rng);
        assert!(sequence.is_valid(10));
        let matrix = sequence.to_matrix(10);
        assert_eq!(matrix.compute_rank(), 10);
        for _ in 0..5 {
            let x = BitVector::random(10, &mut rng);
            let mut y = x.clone();
            sequence.multiply(&mut y);
            let mut z = BitVector::zeros(10);
            matrix.multiply(&x, &mut z);
            assert_eq!(y, z);
        }
    }
}

#[test]
fn commuting_transvections_commute() {
    let mut rng = generator(Some(7));
    let sequence = TransvectionSequence::random(8, 12, SamplingMode::Commuting, &mut rng);
    let transvections: Vec<_> = sequence.iter().copied().collect();
    for a in &transvections {
        for b in &transvections {
            assert!(a.commutes_with(b));
        }
    }
}

#[test]
fn disjoint_sampling_is_truncated() {
    let mut rng = generator(Some(8));
    let sequence = TransvectionSequence::random(7, 10, SamplingMode::Disjoint, &mut rng);
    assert_eq!(sequence.len(), 3);
}

#[test]
fn unique_modes_have_distinct_indices() {
    let mut rng = generator(Some(15));
    for _ in 0..50 {
        let sequence = TransvectionSequence::random(9, 6, SamplingMode::UniqueSource, &mut rng);
        assert_eq!(sequence.len(), 6);
        let rows: HashSet<_> = sequence.iter().map(|t| t.row_index).collect();
        assert_eq!(rows.len(), 6);
        let sequence =
            TransvectionSequence::random(9, 6, SamplingMode::UniqueDestination, &mut rng);
        assert_eq!(sequence.len(), 6);
        let columns: HashSet<_> = sequence.iter().map(|t| t.column_index).collect();
        assert_eq!(columns.len(), 6);
    }
}

#[test]
fn unique_modes_are_truncated() {
    let mut rng = generator(Some(16));
    for mode in [SamplingMode::UniqueSource, SamplingMode::UniqueDestination] {
        let sequence = TransvectionSequence::random(9, 20, mode, &mut rng);
        assert_eq!(sequence.len(), 8);
        assert!(sequence.is_valid(9));
    }
}

#[test]
fn non_commuting_neighbors_do_not_commute() {
    let mut rng = generator(Some(17));
    for _ in 0..50 {
        let sequence = TransvectionSequence::random(6, 15, SamplingMode::NonCommuting, &mut rng);
        let transvections: Vec<_> = sequence.iter().copied().collect();
        assert_eq!(transvections.len(), 15);
        for pair in transvections.windows(2) {
            assert!(!pair[0].commutes_with(&pair[1]));
        }
    }
}

#[test]
fn disjoint_transvections_share_no_index() {
    let mut rng = generator(Some(18));
    let sequence = TransvectionSequence::random(10, 5, SamplingMode::Disjoint, &mut rng);
    let indices: HashSet<_> = sequence
        .iter()
        .flat_map(|t| vec![t.row_index, t.column_index])
        .collect();
    assert_eq!(indices.len(), 10);
}

#[test]
fn ts_affine_map_inverse() {
    let mut rng = generator(Some(9));
    let map = TsAffineMap::random(12, 20, SamplingMode::Unconstrained, &mut rng);
    let inverse = map.inverse();
    for _ in 0..10 {
        let x = BitVector::random(12, &mut rng);
        assert_eq!(inverse.map(&map.map(&x)), x);
    }
}

#[test]
fn composition_is_surjective_when_both_parts_are() {
    let mut rng = generator(Some(10));
    let outer = LinearMap::random(4, 6, true, &mut rng).unwrap();
    let inner = Permutation::random(6, &mut rng);
    let composition = MapComposition::new(Box::new(outer), Box::new(inner));
    assert!(composition.is_surjective());
    assert_eq!(composition.input_size(), 6);
    assert_eq!(composition.output_size(), 4);

    let outer = LinearMap::new(BitMatrix::zeros(4, 6));
    let inner = Permutation::random(6, &mut rng);
    let composition = MapComposition::new(Box::new(outer), Box::new(inner));
    assert!(!composition.is_surjective());
}

#[test]
#[should_panic]
fn composition_rejects_mismatched_sizes() {
    let mut rng = generator(Some(11));
    MapComposition::new(
        Box::new(Translation::random(5, &mut rng)),
        Box::new(Translation::random(6, &mut rng)),
    );
}

#[test]
fn injection_and_projection() {
    let injection = Injection::new(vec![3, 0], 4).unwrap();
    let x: BitVector = "11".parse().unwrap();
    assert_eq!(injection.map(&x).to_string(), "1001");
    assert!(!injection.is_surjective());

    let projection = Projection::new(vec![3, 0], 4).unwrap();
    let y: BitVector = "0001".parse().unwrap();
    assert_eq!(projection.map(&y).to_string(), "10");
    assert!(projection.is_surjective());

    assert!(Injection::new(vec![0, 0], 4).is_err());
    assert!(Projection::new(vec![4], 4).is_err());
}

#[test]
fn saved_maps_load_with_the_same_images() {
    let mut rng = generator(Some(12));
    let map = MapComposition::new(
        Box::new(AffineMap::random(8, 8, true, &mut rng).unwrap()),
        Box::new(TsAffineMap::random(8, 5, SamplingMode::Disjoint, &mut rng)),
    );
    let path = temp_path("map.json");
    maps::save(&map, &path).unwrap();
    let loaded = maps::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.input_size(), 8);
    assert_eq!(loaded.output_size(), 8);
    for _ in 0..10 {
        let x = BitVector::random(8, &mut rng);
        assert_eq!(loaded.map(&x), map.map(&x));
    }
}

#[test]
fn loading_rejects_other_formats() {
    let path = temp_path("bad-map.json");
    std::fs::write(&path, r#"{"name":"something","version":1,"payload":{"type":"translation","bv":"01"}}"#).unwrap();
    let result = maps::load(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}

#[test]
fn loading_rejects_ragged_matrices() {
    let payloads = [
        r#"{"type":"linear","matrix":{"rows":["101","1"],"num_columns":3}}"#,
        r#"{"type":"affine","matrix":{"rows":["10","011"],"num_columns":2},"bv":"01"}"#,
    ];
    for (i, payload) in payloads.iter().enumerate() {
        let path = temp_path(&format!("ragged-{i}.json"));
        let content = format!(r#"{{"name":"hnco::map","version":1,"payload":{payload}}}"#);
        std::fs::write(&path, content).unwrap();
        let result = maps::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}

#[test]
fn matrix_inverse() {
    let mut rng = generator(Some(13));
    let sequence = TransvectionSequence::random(6, 10, SamplingMode::Unconstrained, &mut rng);
    let matrix = sequence.to_matrix(6);
    let inverse = matrix.inverse().unwrap();
    assert!(matrix.product(&inverse).is_identity());
    assert!(BitMatrix::zeros(3, 3).inverse().is_none());
}
