use detnms::lowlevel::{iou, BoxGeometry};
use detnms::{suppress, Candidate, Detection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_candidates(rng: &mut StdRng, count: usize, num_classes: usize) -> Vec<Candidate> {
    (0..count)
        .map(|_| {
            let cx = rng.random_range(0.0..640.0);
            let cy = rng.random_range(0.0..640.0);
            let w = rng.random_range(4.0..120.0);
            let h = rng.random_range(4.0..120.0);
            // Quantized scores produce plenty of ties.
            let scores = (0..num_classes)
                .map(|_| rng.random_range(0..20u32) as f32 / 20.0)
                .collect();
            Candidate::new(cx, cy, w, h, scores)
        })
        .collect()
}

fn geometry(det: &Detection) -> BoxGeometry {
    BoxGeometry::new(
        det.x + det.width / 2.0,
        det.y + det.height / 2.0,
        det.width,
        det.height,
    )
}

#[test]
fn repeated_runs_are_identical() {
    let mut rng = StdRng::seed_from_u64(42);
    let candidates = random_candidates(&mut rng, 400, 5);
    let first = suppress(&candidates, 0.5, 0.3).unwrap();
    for _ in 0..5 {
        assert_eq!(suppress(&candidates, 0.5, 0.3).unwrap(), first);
    }
}

#[test]
fn output_respects_ordering_and_thresholds() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..20 {
        let num_classes = rng.random_range(1..6);
        let count = rng.random_range(0..300);
        let candidates = random_candidates(&mut rng, count, num_classes);
        let iou_threshold = rng.random_range(0.1..0.9);
        let score_threshold = rng.random_range(0.0..0.6);

        let out = suppress(&candidates, iou_threshold, score_threshold).unwrap();

        for pair in out.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.class_index <= b.class_index);
            if a.class_index == b.class_index {
                assert!(a.score >= b.score);
            }
        }

        for (i, a) in out.iter().enumerate() {
            assert!(a.score >= score_threshold as f32);
            assert!(a.class_index < num_classes);
            for b in out.iter().skip(i + 1) {
                if a.class_index == b.class_index {
                    // Reconstructed centers may differ by rounding.
                    assert!(iou(&geometry(a), &geometry(b)) <= iou_threshold + 1e-4);
                }
            }
        }
    }
}

#[test]
fn every_surviving_candidate_is_covered() {
    // Each candidate passing the score filter is either kept or overlaps a
    // kept box of its class with a score at least as high.
    let mut rng = StdRng::seed_from_u64(99);
    let candidates = random_candidates(&mut rng, 250, 3);
    let iou_threshold = 0.4;
    let score_threshold = 0.25;
    let out = suppress(&candidates, iou_threshold, score_threshold).unwrap();

    for candidate in &candidates {
        let (class_index, score) = candidate.best_class().unwrap();
        if score < score_threshold as f32 {
            continue;
        }
        let covered = out.iter().any(|det| {
            det.class_index == class_index
                && det.score >= score
                && iou(&geometry(det), &candidate.geometry) > iou_threshold - 1e-4
        });
        assert!(covered);
    }
}
