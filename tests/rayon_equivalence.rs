#![cfg(feature = "rayon")]

use detnms::{suppress_with, Candidate, SuppressConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_candidates(seed: u64, count: usize, num_classes: usize) -> Vec<Candidate> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            // Cluster boxes so that suppression has real work to do.
            let cx = rng.random_range(0..8u32) as f32 * 80.0 + rng.random_range(-6.0..6.0);
            let cy = rng.random_range(0..6u32) as f32 * 80.0 + rng.random_range(-6.0..6.0);
            let w = rng.random_range(30.0..60.0);
            let h = rng.random_range(30.0..60.0);
            let scores = (0..num_classes).map(|_| rng.random::<f32>()).collect();
            Candidate::new(cx, cy, w, h, scores)
        })
        .collect()
}

#[test]
fn parallel_matches_sequential() {
    let candidates = make_candidates(7, 2_000, 12);

    let seq_cfg = SuppressConfig {
        iou_threshold: 0.45,
        score_threshold: 0.2,
        parallel: false,
    };
    let par_cfg = SuppressConfig {
        parallel: true,
        ..seq_cfg.clone()
    };

    let seq = suppress_with(&candidates, &seq_cfg).unwrap();
    let par = suppress_with(&candidates, &par_cfg).unwrap();
    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}

#[test]
fn parallel_handles_single_class() {
    let candidates = make_candidates(11, 500, 1);
    let cfg = SuppressConfig {
        parallel: true,
        ..SuppressConfig::default()
    };
    let par = suppress_with(&candidates, &cfg).unwrap();
    let seq = suppress_with(
        &candidates,
        &SuppressConfig {
            parallel: false,
            ..cfg
        },
    )
    .unwrap();
    assert_eq!(seq, par);
}
