//! detnms turns dense object-detection network output into labeled boxes.
//!
//! The crate decodes a `[num_predictions, 4 + K]` prediction matrix into
//! candidates, filters them by score, and runs greedy per-class IoU
//! non-maximum suppression. A presentation step attaches labels and colors
//! and applies a separate display threshold. Class groups can be suppressed
//! in parallel via the `rayon` feature.

pub mod decode;
pub mod geometry;
pub mod lowlevel;
pub mod pipeline;
pub mod present;
pub mod suppress;
mod trace;
pub mod util;

pub use decode::{decode, decode_rows, Candidate, RawPrediction};
pub use geometry::BoxGeometry;
pub use pipeline::{Detector, DetectorConfig};
pub use present::{annotate, HslColor, LabelTable, LabeledBox, DEFAULT_DISPLAY_THRESHOLD};
pub use suppress::{
    suppress, suppress_with, Detection, SuppressConfig, DEFAULT_IOU_THRESHOLD,
    DEFAULT_SCORE_THRESHOLD,
};
pub use util::{DetNmsError, DetNmsResult};
