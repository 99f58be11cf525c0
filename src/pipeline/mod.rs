//! End-to-end post-processing for one inference result.
//!
//! `Detector` ties a label table to suppression and display settings. It
//! does not own or call the network: the caller runs its own inference
//! engine and hands the materialized output to `Detector::detect`.

use crate::decode::{decode, RawPrediction, BOX_COLUMNS};
use crate::present::{annotate, LabelTable, LabeledBox, DEFAULT_DISPLAY_THRESHOLD};
use crate::suppress::{suppress_with, Detection, SuppressConfig};
use crate::trace::trace_span;
use crate::util::error::check_unit_interval;
use crate::util::{DetNmsError, DetNmsResult};

/// Configuration for a `Detector`.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Suppression thresholds and parallelism.
    pub suppress: SuppressConfig,
    /// Minimum score for a box to be returned by `detect`.
    pub display_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            suppress: SuppressConfig::default(),
            display_threshold: DEFAULT_DISPLAY_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    /// Validates all thresholds.
    pub fn validate(&self) -> DetNmsResult<()> {
        self.suppress.validate()?;
        check_unit_interval("display_threshold", self.display_threshold)
    }
}

/// Decode, suppress, and annotate predictions for a fixed label table.
#[derive(Clone, Debug)]
pub struct Detector {
    labels: LabelTable,
    cfg: DetectorConfig,
}

impl Detector {
    /// Creates a detector with the default configuration.
    ///
    /// The label table must be non-empty since it fixes the row width.
    pub fn new(labels: LabelTable) -> DetNmsResult<Self> {
        Self::with_config(labels, DetectorConfig::default())
    }

    /// Creates a detector with an explicit configuration.
    pub fn with_config(labels: LabelTable, cfg: DetectorConfig) -> DetNmsResult<Self> {
        if labels.is_empty() {
            return Err(DetNmsError::InvalidParameter {
                name: "num_classes",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        cfg.validate()?;
        Ok(Self { labels, cfg })
    }

    /// Returns a copy with a different display threshold.
    pub fn with_display_threshold(mut self, display_threshold: f64) -> DetNmsResult<Self> {
        check_unit_interval("display_threshold", display_threshold)?;
        self.cfg.display_threshold = display_threshold;
        Ok(self)
    }

    /// Returns the label table.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.cfg
    }

    /// Wraps a flat row-major buffer using this detector's class count.
    pub fn prediction(&self, data: Vec<f32>) -> DetNmsResult<RawPrediction> {
        RawPrediction::new(data, self.labels.len())
    }

    /// Decodes and suppresses, without the display threshold.
    pub fn detections(&self, raw: &RawPrediction) -> DetNmsResult<Vec<Detection>> {
        let expected = BOX_COLUMNS + self.labels.len();
        if raw.row_width() != expected {
            return Err(DetNmsError::MalformedPrediction {
                row: 0,
                expected,
                got: raw.row_width(),
            });
        }
        let candidates = decode(raw);
        suppress_with(&candidates, &self.cfg.suppress)
    }

    /// Full post-processing: decode, suppress, label, and apply the display
    /// threshold.
    pub fn detect(&self, raw: &RawPrediction) -> DetNmsResult<Vec<LabeledBox>> {
        let _span = trace_span!("detect", rows = raw.len()).entered();
        let detections = self.detections(raw)?;
        annotate(&detections, &self.labels, self.cfg.display_threshold)
    }
}
