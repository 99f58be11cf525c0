//! Score ordering for suppression candidates.

use crate::geometry::BoxGeometry;
use std::cmp::Ordering;

/// Candidate resolved to a single class, ready for suppression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredBox {
    /// Row index of the candidate in the decoded input.
    pub index: usize,
    /// Winning class index.
    pub class_index: usize,
    /// Score of the winning class.
    pub score: f32,
    /// Box geometry in center/size form.
    pub geometry: BoxGeometry,
}

fn scored_cmp_desc(a: &ScoredBox, b: &ScoredBox) -> Ordering {
    // Scores reaching this point are never NaN; signed zeros compare equal.
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.index.cmp(&b.index))
}

/// Sorts boxes by descending score; equal scores keep input row order.
pub fn sort_by_score_desc(boxes: &mut [ScoredBox]) {
    boxes.sort_by(scored_cmp_desc);
}

#[cfg(test)]
mod tests {
    use super::{sort_by_score_desc, ScoredBox};
    use crate::geometry::BoxGeometry;

    fn scored(index: usize, score: f32) -> ScoredBox {
        ScoredBox {
            index,
            class_index: 0,
            score,
            geometry: BoxGeometry::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    #[test]
    fn ties_fall_back_to_row_order() {
        let mut boxes = vec![scored(4, 0.5), scored(1, 0.9), scored(2, 0.5), scored(0, 0.5)];
        sort_by_score_desc(&mut boxes);
        let order: Vec<usize> = boxes.iter().map(|b| b.index).collect();
        assert_eq!(order, vec![1, 0, 2, 4]);
    }

    #[test]
    fn signed_zero_scores_tie() {
        let mut boxes = vec![scored(3, 0.0), scored(1, -0.0)];
        sort_by_score_desc(&mut boxes);
        assert_eq!(boxes[0].index, 1);
    }
}
