//! Decoding of raw network output into candidate detections.
//!
//! `RawPrediction` owns a dense row-major `[num_predictions, 4 + K]` buffer
//! whose shape is validated once at construction. Each row holds
//! `[center_x, center_y, width, height, score_0, .., score_{K-1}]`. Decoding
//! is a pure reinterpretation: one `Candidate` per row, in row order.

use crate::geometry::BoxGeometry;
use crate::trace::{trace_event, trace_span};
use crate::util::{DetNmsError, DetNmsResult};

/// Number of geometry columns leading each prediction row.
pub const BOX_COLUMNS: usize = 4;

/// Validated dense prediction matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPrediction {
    data: Vec<f32>,
    num_classes: usize,
}

impl RawPrediction {
    /// Wraps a flat row-major buffer with rows of width `4 + num_classes`.
    ///
    /// A trailing partial row is reported as `MalformedPrediction` carrying
    /// its index and actual length.
    pub fn new(data: Vec<f32>, num_classes: usize) -> DetNmsResult<Self> {
        let width = row_width(num_classes)?;
        let remainder = data.len() % width;
        if remainder != 0 {
            return Err(DetNmsError::MalformedPrediction {
                row: data.len() / width,
                expected: width,
                got: remainder,
            });
        }
        Ok(Self { data, num_classes })
    }

    /// Builds a prediction from individual rows, checking each row width.
    pub fn from_rows<R>(rows: &[R], num_classes: usize) -> DetNmsResult<Self>
    where
        R: AsRef<[f32]>,
    {
        let width = row_width(num_classes)?;
        let mut data = Vec::with_capacity(rows.len() * width);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != width {
                return Err(DetNmsError::MalformedPrediction {
                    row,
                    expected: width,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self { data, num_classes })
    }

    /// Builds a prediction from a `[4 + num_classes, num_predictions]`
    /// feature-major buffer, as emitted by exporters that keep the
    /// prediction axis last.
    pub fn from_transposed(
        data: &[f32],
        num_classes: usize,
        num_predictions: usize,
    ) -> DetNmsResult<Self> {
        let width = row_width(num_classes)?;
        let expected_len = width * num_predictions;
        if data.len() != expected_len {
            // Every prediction row is affected, so report the first one
            // with the per-row width the buffer implies.
            let got = if num_predictions == 0 {
                data.len()
            } else {
                data.len() / num_predictions
            };
            return Err(DetNmsError::MalformedPrediction {
                row: 0,
                expected: width,
                got,
            });
        }

        let mut out = vec![0.0f32; expected_len];
        for feature in 0..width {
            let src = &data[feature * num_predictions..(feature + 1) * num_predictions];
            for (pred, &value) in src.iter().enumerate() {
                out[pred * width + feature] = value;
            }
        }
        Ok(Self {
            data: out,
            num_classes,
        })
    }

    /// Returns the number of class score columns (`K`).
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the row width (`4 + K`).
    pub fn row_width(&self) -> usize {
        BOX_COLUMNS + self.num_classes
    }

    /// Returns the number of prediction rows.
    pub fn len(&self) -> usize {
        self.data.len() / self.row_width()
    }

    /// Returns `true` when the prediction has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the backing row-major buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns row `index` if it exists.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let width = self.row_width();
        let start = index.checked_mul(width)?;
        self.data.get(start..start.checked_add(width)?)
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.row_width())
    }
}

fn row_width(num_classes: usize) -> DetNmsResult<usize> {
    if num_classes == 0 {
        return Err(DetNmsError::InvalidParameter {
            name: "num_classes",
            value: 0.0,
            reason: "must be at least 1",
        });
    }
    Ok(BOX_COLUMNS + num_classes)
}

/// Candidate detection decoded from one prediction row.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Box geometry in model input space.
    pub geometry: BoxGeometry,
    /// Per-class confidences, one per label, as emitted by the network.
    pub class_scores: Vec<f32>,
}

impl Candidate {
    /// Creates a candidate from center/size geometry and class scores.
    pub fn new(
        center_x: f32,
        center_y: f32,
        width: f32,
        height: f32,
        class_scores: Vec<f32>,
    ) -> Self {
        Self {
            geometry: BoxGeometry::new(center_x, center_y, width, height),
            class_scores,
        }
    }

    fn from_row(row: &[f32]) -> Self {
        let (geom, scores) = row.split_at(BOX_COLUMNS);
        Self::new(geom[0], geom[1], geom[2], geom[3], scores.to_vec())
    }

    /// Returns the winning class and its score, or `None` with no scores.
    pub fn best_class(&self) -> Option<(usize, f32)> {
        argmax_stable(&self.class_scores)
    }

    /// Index of the highest class score (lowest index on ties).
    pub fn best_class_index(&self) -> Option<usize> {
        self.best_class().map(|(idx, _)| idx)
    }

    /// Highest class score.
    pub fn best_score(&self) -> Option<f32> {
        self.best_class().map(|(_, score)| score)
    }
}

/// Returns `(index, value)` of the maximum, keeping the first on ties.
///
/// NaN entries are skipped; an all-NaN slice yields index 0.
pub fn argmax_stable(values: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = values.split_first()?;
    let mut best = (0usize, first);
    for (offset, &value) in rest.iter().enumerate() {
        if value > best.1 || (best.1.is_nan() && !value.is_nan()) {
            best = (offset + 1, value);
        }
    }
    Some(best)
}

/// Decodes every prediction row into a candidate, preserving order.
pub fn decode(raw: &RawPrediction) -> Vec<Candidate> {
    let _span = trace_span!(
        "decode",
        rows = raw.len(),
        num_classes = raw.num_classes()
    )
    .entered();

    let candidates: Vec<Candidate> = raw.rows().map(Candidate::from_row).collect();
    trace_event!("decoded_candidates", count = candidates.len());
    candidates
}

/// Validates `rows` against `4 + num_classes` and decodes them.
pub fn decode_rows<R>(rows: &[R], num_classes: usize) -> DetNmsResult<Vec<Candidate>>
where
    R: AsRef<[f32]>,
{
    let raw = RawPrediction::from_rows(rows, num_classes)?;
    Ok(decode(&raw))
}
