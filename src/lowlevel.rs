//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the geometry, ordering, and single-class NMS pieces used by
//! `suppress`. Most users should prefer `decode`, `suppress`, and `Detector`.

pub use crate::decode::{argmax_stable, BOX_COLUMNS};
pub use crate::geometry::{iou, BoxGeometry};
pub use crate::suppress::nms::greedy_nms;
pub use crate::suppress::order::{sort_by_score_desc, ScoredBox};
