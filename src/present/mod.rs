//! Caller-side presentation: labels, colors, and the display threshold.
//!
//! These helpers run after suppression and never feed back into it. The
//! display threshold is separate from the suppression score threshold and is
//! inclusive (`score >= display_threshold`).

use crate::suppress::Detection;
use crate::util::error::check_unit_interval;
use crate::util::{DetNmsError, DetNmsResult};
use std::fmt;

/// Default threshold for boxes shown to the user.
pub const DEFAULT_DISPLAY_THRESHOLD: f64 = 0.8;

/// Hue increment in degrees between consecutive class indices.
const HUE_STEP_DEG: f64 = 0.41;

/// Ordered class-name table indexed by class index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Creates a table from label names in class order.
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parses one label per line, trimming whitespace and skipping blanks.
    pub fn from_lines(text: &str) -> Self {
        let labels = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        Self { labels }
    }

    /// Number of labels (`K`).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when the table has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the label for `class_index` if present.
    pub fn get(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(String::as_str)
    }

    /// Returns the label for `class_index` or `UnknownClass`.
    pub fn label(&self, class_index: usize) -> DetNmsResult<&str> {
        self.get(class_index).ok_or(DetNmsError::UnknownClass {
            class_index,
            num_labels: self.labels.len(),
        })
    }

    /// Iterates over labels in class order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// HSL display color assigned per class.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HslColor {
    /// Hue in degrees.
    pub hue: f64,
    /// Saturation in percent.
    pub saturation: f64,
    /// Lightness in percent.
    pub lightness: f64,
}

impl HslColor {
    /// Color for a class: hue grows by a fixed step per class index.
    pub fn for_class(class_index: usize) -> Self {
        Self {
            hue: class_index as f64 * HUE_STEP_DEG,
            saturation: 100.0,
            lightness: 50.0,
        }
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Detection with presentation attributes attached.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub class_index: usize,
    pub label: String,
    pub color: HslColor,
    pub score: f32,
}

impl LabeledBox {
    fn from_detection(det: &Detection, label: &str) -> Self {
        Self {
            x: det.x,
            y: det.y,
            width: det.width,
            height: det.height,
            class_index: det.class_index,
            label: label.to_owned(),
            color: HslColor::for_class(det.class_index),
            score: det.score,
        }
    }
}

/// Attaches labels and colors, keeping detections with
/// `score >= display_threshold` in their original order.
///
/// Fails with `InvalidParameter` for a threshold outside `[0, 1]` and with
/// `UnknownClass` when a kept detection has no label.
pub fn annotate(
    detections: &[Detection],
    labels: &LabelTable,
    display_threshold: f64,
) -> DetNmsResult<Vec<LabeledBox>> {
    check_unit_interval("display_threshold", display_threshold)?;
    let display_threshold = display_threshold as f32;
    detections
        .iter()
        .filter(|det| det.score >= display_threshold)
        .map(|det| {
            labels
                .label(det.class_index)
                .map(|label| LabeledBox::from_detection(det, label))
        })
        .collect()
}
