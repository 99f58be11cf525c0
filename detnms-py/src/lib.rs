//! Python bindings for detnms.
//!
//! Predictions are passed as 2D `float32` numpy arrays, either
//! `[num_predictions, 4 + K]` or, with `transposed=True`,
//! `[4 + K, num_predictions]`.

use numpy::{PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use detnms::{
    Candidate as RustCandidate, DetNmsError, Detection as RustDetection, Detector, DetectorConfig,
    LabelTable, LabeledBox as RustLabeledBox, RawPrediction, SuppressConfig,
};

/// Map invalid arguments to `ValueError`, everything else to `RuntimeError`.
fn to_py_err(err: DetNmsError) -> PyErr {
    match err {
        DetNmsError::InvalidParameter { .. } | DetNmsError::MalformedPrediction { .. } => {
            PyValueError::new_err(err.to_string())
        }
        DetNmsError::UnknownClass { .. } => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Copy a 2D array into a `RawPrediction`; width and `K` checks happen there.
fn raw_from_array(
    predictions: &PyReadonlyArray2<'_, f32>,
    num_classes: usize,
    transposed: bool,
) -> PyResult<RawPrediction> {
    let (outer, inner) = (predictions.shape()[0], predictions.shape()[1]);
    let data = predictions.as_slice()?;
    let raw = if transposed {
        RawPrediction::from_transposed(data, num_classes, inner)
    } else {
        let rows: Vec<&[f32]> = (0..outer).map(|r| &data[r * inner..(r + 1) * inner]).collect();
        RawPrediction::from_rows(&rows, num_classes)
    };
    raw.map_err(to_py_err)
}

/// Decoded prediction row before any filtering.
#[pyclass]
#[derive(Clone)]
pub struct Candidate {
    #[pyo3(get)]
    pub center_x: f32,
    #[pyo3(get)]
    pub center_y: f32,
    #[pyo3(get)]
    pub width: f32,
    #[pyo3(get)]
    pub height: f32,
    /// Per-class scores, one per class column.
    #[pyo3(get)]
    pub class_scores: Vec<f32>,
}

#[pymethods]
impl Candidate {
    /// Index of the highest score, lowest index on ties; `None` without scores.
    #[getter]
    fn best_class_index(&self) -> Option<usize> {
        detnms::lowlevel::argmax_stable(&self.class_scores).map(|(index, _)| index)
    }

    #[getter]
    fn best_score(&self) -> Option<f32> {
        detnms::lowlevel::argmax_stable(&self.class_scores).map(|(_, score)| score)
    }

    fn __repr__(&self) -> String {
        format!(
            "Candidate(center_x={:.2}, center_y={:.2}, width={:.2}, height={:.2}, num_classes={})",
            self.center_x,
            self.center_y,
            self.width,
            self.height,
            self.class_scores.len()
        )
    }
}

impl From<RustCandidate> for Candidate {
    fn from(c: RustCandidate) -> Self {
        Self {
            center_x: c.geometry.center_x,
            center_y: c.geometry.center_y,
            width: c.geometry.width,
            height: c.geometry.height,
            class_scores: c.class_scores,
        }
    }
}

/// Suppressed box with a resolved class.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Left edge in model input pixels.
    #[pyo3(get)]
    pub x: f32,
    /// Top edge in model input pixels.
    #[pyo3(get)]
    pub y: f32,
    #[pyo3(get)]
    pub width: f32,
    #[pyo3(get)]
    pub height: f32,
    #[pyo3(get)]
    pub class_index: usize,
    #[pyo3(get)]
    pub score: f32,
}

#[pymethods]
impl Detection {
    fn __repr__(&self) -> String {
        format!(
            "Detection(x={:.2}, y={:.2}, width={:.2}, height={:.2}, class_index={}, score={:.4})",
            self.x, self.y, self.width, self.height, self.class_index, self.score
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        Self {
            x: d.x,
            y: d.y,
            width: d.width,
            height: d.height,
            class_index: d.class_index,
            score: d.score,
        }
    }
}

/// Detection with its label and display color.
#[pyclass]
#[derive(Clone)]
pub struct LabeledBox {
    #[pyo3(get)]
    pub x: f32,
    #[pyo3(get)]
    pub y: f32,
    #[pyo3(get)]
    pub width: f32,
    #[pyo3(get)]
    pub height: f32,
    #[pyo3(get)]
    pub class_index: usize,
    #[pyo3(get)]
    pub label: String,
    /// CSS color string, e.g. `hsl(0.82, 100%, 50%)`.
    #[pyo3(get)]
    pub color: String,
    #[pyo3(get)]
    pub score: f32,
}

#[pymethods]
impl LabeledBox {
    fn __repr__(&self) -> String {
        format!(
            "LabeledBox(label='{}', x={:.2}, y={:.2}, width={:.2}, height={:.2}, score={:.4})",
            self.label, self.x, self.y, self.width, self.height, self.score
        )
    }
}

impl From<RustLabeledBox> for LabeledBox {
    fn from(b: RustLabeledBox) -> Self {
        Self {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            class_index: b.class_index,
            color: b.color.to_string(),
            label: b.label,
            score: b.score,
        }
    }
}

/// Decode a prediction array into one candidate per row, unfiltered.
///
/// Args:
///     predictions: float32 array of shape [N, 4 + num_classes]
///     num_classes: number of class score columns
///     transposed: input is [4 + num_classes, N] (default: False)
#[pyfunction]
#[pyo3(signature = (predictions, num_classes, transposed = false))]
fn decode(
    predictions: PyReadonlyArray2<'_, f32>,
    num_classes: usize,
    transposed: bool,
) -> PyResult<Vec<Candidate>> {
    let raw = raw_from_array(&predictions, num_classes, transposed)?;
    Ok(detnms::decode(&raw).into_iter().map(Candidate::from).collect())
}

/// Decode and suppress a prediction array.
///
/// Args:
///     predictions: float32 array of shape [N, 4 + num_classes]
///     num_classes: number of class score columns
///     iou_threshold: IoU above which lower-scored boxes are removed (default: 0.45)
///     score_threshold: minimum candidate score (default: 0.25)
///     transposed: input is [4 + num_classes, N] (default: False)
///     parallel: suppress class groups in parallel (default: False)
#[pyfunction]
#[pyo3(signature = (
    predictions,
    num_classes,
    iou_threshold = detnms::DEFAULT_IOU_THRESHOLD,
    score_threshold = detnms::DEFAULT_SCORE_THRESHOLD,
    transposed = false,
    parallel = false
))]
fn suppress(
    predictions: PyReadonlyArray2<'_, f32>,
    num_classes: usize,
    iou_threshold: f64,
    score_threshold: f64,
    transposed: bool,
    parallel: bool,
) -> PyResult<Vec<Detection>> {
    let cfg = SuppressConfig {
        iou_threshold,
        score_threshold,
        parallel,
    };
    cfg.validate().map_err(to_py_err)?;

    let raw = raw_from_array(&predictions, num_classes, transposed)?;
    let candidates = detnms::decode(&raw);
    let detections = detnms::suppress_with(&candidates, &cfg).map_err(to_py_err)?;
    Ok(detections.into_iter().map(Detection::from).collect())
}

/// Full post-processing with labels, colors, and a display threshold.
///
/// Args:
///     predictions: float32 array of shape [N, 4 + len(labels)]
///     labels: class names in class index order
///     iou_threshold: IoU above which lower-scored boxes are removed (default: 0.45)
///     score_threshold: minimum candidate score before NMS (default: 0.25)
///     display_threshold: minimum score of returned boxes (default: 0.8)
///     transposed: input is [4 + len(labels), N] (default: False)
#[pyfunction]
#[pyo3(signature = (
    predictions,
    labels,
    iou_threshold = detnms::DEFAULT_IOU_THRESHOLD,
    score_threshold = detnms::DEFAULT_SCORE_THRESHOLD,
    display_threshold = detnms::DEFAULT_DISPLAY_THRESHOLD,
    transposed = false
))]
fn detect(
    predictions: PyReadonlyArray2<'_, f32>,
    labels: Vec<String>,
    iou_threshold: f64,
    score_threshold: f64,
    display_threshold: f64,
    transposed: bool,
) -> PyResult<Vec<LabeledBox>> {
    let detector = Detector::with_config(
        LabelTable::new(labels),
        DetectorConfig {
            suppress: SuppressConfig {
                iou_threshold,
                score_threshold,
                parallel: false,
            },
            display_threshold,
        },
    )
    .map_err(to_py_err)?;

    let raw = raw_from_array(&predictions, detector.labels().len(), transposed)?;
    let boxes = detector.detect(&raw).map_err(to_py_err)?;
    Ok(boxes.into_iter().map(LabeledBox::from).collect())
}

#[pymodule]
fn _detnms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Candidate>()?;
    m.add_class::<Detection>()?;
    m.add_class::<LabeledBox>()?;
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add_function(wrap_pyfunction!(suppress, m)?)?;
    m.add_function(wrap_pyfunction!(detect, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
