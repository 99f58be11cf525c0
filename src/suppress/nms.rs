//! Greedy IoU-based non-maximum suppression for a single class.

use crate::geometry::iou;
use crate::suppress::order::{sort_by_score_desc, ScoredBox};

/// Applies greedy NMS to boxes of one class.
///
/// Boxes are sorted by descending score (row order on ties) and kept unless
/// their IoU with an already kept box is strictly greater than
/// `iou_threshold`. The result is in descending score order.
pub fn greedy_nms(boxes: &mut [ScoredBox], iou_threshold: f64) -> Vec<ScoredBox> {
    sort_by_score_desc(boxes);
    let mut kept: Vec<ScoredBox> = Vec::new();

    'outer: for candidate in boxes.iter().copied() {
        for kept_box in kept.iter() {
            if iou(&candidate.geometry, &kept_box.geometry) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::greedy_nms;
    use crate::geometry::BoxGeometry;
    use crate::suppress::order::ScoredBox;

    fn scored(index: usize, score: f32, cx: f32) -> ScoredBox {
        ScoredBox {
            index,
            class_index: 0,
            score,
            geometry: BoxGeometry::new(cx, 5.0, 10.0, 10.0),
        }
    }

    #[test]
    fn lower_score_overlap_is_dropped() {
        let mut boxes = vec![scored(0, 0.6, 6.0), scored(1, 0.9, 5.0)];
        let kept = greedy_nms(&mut boxes, 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index, 1);
    }

    #[test]
    fn suppressed_box_does_not_suppress_others() {
        // b overlaps a and c; a and c do not overlap. b is removed by a, so c survives.
        let mut boxes = vec![scored(0, 0.9, 0.0), scored(1, 0.8, 6.0), scored(2, 0.7, 12.0)];
        let kept = greedy_nms(&mut boxes, 0.2);
        let indices: Vec<usize> = kept.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn threshold_one_keeps_everything() {
        let mut boxes = vec![scored(0, 0.9, 5.0), scored(1, 0.8, 5.0)];
        let kept = greedy_nms(&mut boxes, 1.0);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn threshold_zero_drops_any_overlap() {
        let mut boxes = vec![scored(0, 0.9, 0.0), scored(1, 0.8, 9.0), scored(2, 0.7, 30.0)];
        let kept = greedy_nms(&mut boxes, 0.0);
        let indices: Vec<usize> = kept.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
