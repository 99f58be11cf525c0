use clap::Parser;
use detnms::{Detector, DetectorConfig, LabelTable, LabeledBox, RawPrediction, SuppressConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "detnms CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the decode and suppression passes.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SuppressConfigJson {
    iou_threshold: f64,
    score_threshold: f64,
    parallel: bool,
}

impl Default for SuppressConfigJson {
    fn default() -> Self {
        let cfg = SuppressConfig::default();
        Self {
            iou_threshold: cfg.iou_threshold,
            score_threshold: cfg.score_threshold,
            parallel: cfg.parallel,
        }
    }
}

impl From<SuppressConfigJson> for SuppressConfig {
    fn from(value: SuppressConfigJson) -> Self {
        Self {
            iou_threshold: value.iou_threshold,
            score_threshold: value.score_threshold,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    predictions_path: String,
    labels_path: Option<String>,
    labels: Vec<String>,
    output_path: Option<String>,
    display_threshold: f64,
    suppress: SuppressConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            predictions_path: String::new(),
            labels_path: None,
            labels: Vec::new(),
            output_path: None,
            display_threshold: DetectorConfig::default().display_threshold,
            suppress: SuppressConfigJson::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayoutConfig {
    RowMajor,
    Transposed,
}

/// Predictions file: a bare array of prediction rows, or an object whose
/// `rows` are prediction rows (`row_major`) or feature rows (`transposed`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionFile {
    Rows(Vec<Vec<f32>>),
    Tensor {
        layout: LayoutConfig,
        rows: Vec<Vec<f32>>,
    },
}

impl PredictionFile {
    fn into_raw(self, num_classes: usize) -> Result<RawPrediction, Box<dyn std::error::Error>> {
        let raw = match self {
            PredictionFile::Rows(rows)
            | PredictionFile::Tensor {
                layout: LayoutConfig::RowMajor,
                rows,
            } => RawPrediction::from_rows(&rows, num_classes)?,
            PredictionFile::Tensor {
                layout: LayoutConfig::Transposed,
                rows,
            } => {
                let num_predictions = rows.first().map_or(0, Vec::len);
                if let Some(feature) = rows.iter().position(|r| r.len() != num_predictions) {
                    let got = rows[feature].len();
                    return Err(format!(
                        "feature row {feature} has {got} values, expected {num_predictions}"
                    )
                    .into());
                }
                let data: Vec<f32> = rows.into_iter().flatten().collect();
                RawPrediction::from_transposed(&data, num_classes, num_predictions)?
            }
        };
        Ok(raw)
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    class_index: usize,
    label: String,
    color: String,
    score: f32,
}

impl From<LabeledBox> for DetectionRecord {
    fn from(value: LabeledBox) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
            class_index: value.class_index,
            color: value.color.to_string(),
            label: value.label,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    candidates: usize,
    detections: Vec<DetectionRecord>,
}

fn load_labels(config: &Config) -> Result<LabelTable, Box<dyn std::error::Error>> {
    match &config.labels_path {
        Some(path) => Ok(LabelTable::from_lines(&fs::read_to_string(path)?)),
        None => Ok(LabelTable::new(config.labels.clone())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detnms=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.predictions_path.is_empty() {
        return Err("predictions_path must be set in the config".into());
    }

    let labels = load_labels(&config)?;
    if labels.is_empty() {
        return Err("labels_path or labels must provide at least one label".into());
    }

    let predictions_text = fs::read_to_string(&config.predictions_path)?;
    let predictions: PredictionFile = serde_json::from_str(&predictions_text)?;
    let raw = predictions.into_raw(labels.len())?;

    let detector = Detector::with_config(
        labels,
        DetectorConfig {
            suppress: config.suppress.into(),
            display_threshold: config.display_threshold,
        },
    )?;
    let boxes = detector.detect(&raw)?;
    tracing::info!(candidates = raw.len(), kept = boxes.len(), "frame processed");

    let output = Output {
        candidates: raw.len(),
        detections: boxes.into_iter().map(DetectionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
