//! Confidence filtering and per-class non-maximum suppression.
//!
//! Each candidate is resolved to its best class, filtered against
//! `score_threshold`, and grouped by class. Greedy NMS runs independently
//! per group, so boxes of different classes never suppress each other. The
//! output concatenates groups in ascending class order, each group sorted by
//! descending score.

pub(crate) mod nms;
pub(crate) mod order;

use crate::decode::Candidate;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::error::check_unit_interval;
use crate::util::DetNmsResult;
use nms::greedy_nms;
use order::ScoredBox;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Default IoU cutoff for suppression.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.45;
/// Default candidate score cutoff applied before suppression.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.25;

/// Suppressed detection with a resolved class and top-left geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Left edge (`center_x - width / 2`).
    pub x: f32,
    /// Top edge (`center_y - height / 2`).
    pub y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Winning class index.
    pub class_index: usize,
    /// Score of the winning class.
    pub score: f32,
}

impl From<ScoredBox> for Detection {
    fn from(value: ScoredBox) -> Self {
        let (x, y) = value.geometry.top_left();
        Self {
            x,
            y,
            width: value.geometry.width,
            height: value.geometry.height,
            class_index: value.class_index,
            score: value.score,
        }
    }
}

/// Configuration for the suppression pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SuppressConfig {
    /// Boxes whose IoU with a kept box exceeds this value are removed.
    pub iou_threshold: f64,
    /// Candidates scoring below this value are discarded before NMS.
    pub score_threshold: f64,
    /// Suppress class groups in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            parallel: false,
        }
    }
}

impl SuppressConfig {
    /// Checks that both thresholds lie in `[0, 1]`.
    pub fn validate(&self) -> DetNmsResult<()> {
        check_unit_interval("iou_threshold", self.iou_threshold)?;
        check_unit_interval("score_threshold", self.score_threshold)?;
        Ok(())
    }
}

/// Filters, groups, and suppresses candidates.
///
/// Thresholds outside `[0, 1]` fail with `InvalidParameter` before any work.
/// An empty candidate list yields an empty result.
pub fn suppress(
    candidates: &[Candidate],
    iou_threshold: f64,
    score_threshold: f64,
) -> DetNmsResult<Vec<Detection>> {
    suppress_with(
        candidates,
        &SuppressConfig {
            iou_threshold,
            score_threshold,
            parallel: false,
        },
    )
}

/// Runs suppression with an explicit configuration.
pub fn suppress_with(
    candidates: &[Candidate],
    cfg: &SuppressConfig,
) -> DetNmsResult<Vec<Detection>> {
    cfg.validate()?;
    let _span = trace_span!(
        "suppress",
        candidates = candidates.len(),
        iou_threshold = cfg.iou_threshold,
        score_threshold = cfg.score_threshold
    )
    .entered();

    let groups = group_by_class(candidates, cfg.score_threshold);
    if groups.is_empty() {
        trace_event!("suppress_kept", count = 0usize);
        return Ok(Vec::new());
    }
    trace_event!("suppress_groups", classes = groups.len());

    #[cfg(feature = "rayon")]
    let kept = if cfg.parallel {
        suppress_groups_par(groups, cfg.iou_threshold)
    } else {
        suppress_groups(groups, cfg.iou_threshold)
    };
    #[cfg(not(feature = "rayon"))]
    let kept = suppress_groups(groups, cfg.iou_threshold);

    let detections: Vec<Detection> = kept.into_iter().flatten().map(Detection::from).collect();
    trace_event!("suppress_kept", count = detections.len());
    Ok(detections)
}

/// Resolves each candidate to its best class and buckets the survivors of
/// the score filter by class, ascending.
fn group_by_class(candidates: &[Candidate], score_threshold: f64) -> Vec<Vec<ScoredBox>> {
    // Compare at score precision so decimal thresholds stay inclusive.
    let score_threshold = score_threshold as f32;
    let mut groups: BTreeMap<usize, Vec<ScoredBox>> = BTreeMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        let Some((class_index, score)) = candidate.best_class() else {
            continue;
        };
        if score.is_nan() || score < score_threshold {
            continue;
        }
        groups.entry(class_index).or_default().push(ScoredBox {
            index,
            class_index,
            score,
            geometry: candidate.geometry,
        });
    }
    groups.into_values().collect()
}

fn suppress_groups(groups: Vec<Vec<ScoredBox>>, iou_threshold: f64) -> Vec<Vec<ScoredBox>> {
    groups
        .into_iter()
        .map(|mut boxes| suppress_group(&mut boxes, iou_threshold))
        .collect()
}

/// Class groups are independent, so each runs on its own rayon task.
/// Collecting an indexed parallel iterator preserves class order.
#[cfg(feature = "rayon")]
fn suppress_groups_par(groups: Vec<Vec<ScoredBox>>, iou_threshold: f64) -> Vec<Vec<ScoredBox>> {
    let _span = trace_span!("suppress_par", classes = groups.len(), parallel = true).entered();
    groups
        .into_par_iter()
        .map(|mut boxes| suppress_group(&mut boxes, iou_threshold))
        .collect()
}

fn suppress_group(boxes: &mut [ScoredBox], iou_threshold: f64) -> Vec<ScoredBox> {
    let class_index = boxes.first().map_or(0, |b| b.class_index);
    let kept = greedy_nms(boxes, iou_threshold);
    trace_debug!(
        "class_suppressed",
        class_index = class_index,
        before = boxes.len(),
        kept = kept.len()
    );
    kept
}
