//! Write a small set of demo datasets for trying out `trainpredict create`.
//!
//! Usage: `generate_sample [OUT_DIR]` (default `sample_data`).

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, Int64Array, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_SAMPLES: usize = 12;
const N_CHANNELS: usize = 64;

/// Smooth deterministic signal, different per sample.
fn signal(sample: usize, channel: usize) -> f64 {
    let t = channel as f64 / N_CHANNELS as f64;
    let phase = sample as f64 * 0.37;
    (2.0 * std::f64::consts::PI * (t + phase)).sin() * (1.0 + 0.1 * sample as f64)
}

fn label(sample: usize) -> i64 {
    (sample % 3) as i64
}

/// Parquet with a single `spectra` list column: one internal key.
fn write_raw(path: &Path, offset: usize) -> Result<()> {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for sample in 0..N_SAMPLES {
        let values = builder.values();
        for channel in 0..N_CHANNELS {
            values.append_value(signal(sample + offset, channel));
        }
        builder.append(true);
    }
    let spectra = builder.finish();

    let schema = Arc::new(Schema::new(vec![Field::new(
        "spectra",
        DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
        false,
    )]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(spectra)])
        .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Parquet with a single `label` column.
fn write_gt(path: &Path, offset: usize) -> Result<()> {
    let labels = Int64Array::from((0..N_SAMPLES).map(|s| label(s + offset)).collect::<Vec<_>>());
    let schema = Arc::new(Schema::new(vec![Field::new("label", DataType::Int64, false)]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(labels)])
        .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// JSON with two keys, so the key has to be chosen.
fn write_features(path: &Path, offset: usize) -> Result<()> {
    let mean: Vec<f64> = (0..N_SAMPLES)
        .map(|s| (0..N_CHANNELS).map(|c| signal(s + offset, c)).sum::<f64>() / N_CHANNELS as f64)
        .collect();
    let peak: Vec<f64> = (0..N_SAMPLES)
        .map(|s| {
            (0..N_CHANNELS)
                .map(|c| signal(s + offset, c))
                .fold(f64::MIN, f64::max)
        })
        .collect();

    let doc = serde_json::json!({ "mean": mean, "peak": peak });
    let text = serde_json::to_string_pretty(&doc).context("serialising features")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// CSV with one header column.
fn write_pred(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["prediction"])?;
    for sample in 0..N_SAMPLES {
        writer.write_record([label(sample + 1).to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data".to_string());
    let out_dir = Path::new(&out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    write_raw(&out_dir.join("train_raw.parquet"), 0)?;
    write_gt(&out_dir.join("train_gt.parquet"), 0)?;
    write_features(&out_dir.join("train_features.json"), 0)?;
    write_raw(&out_dir.join("predict_raw.parquet"), N_SAMPLES)?;
    write_gt(&out_dir.join("predict_gt.parquet"), N_SAMPLES)?;
    write_features(&out_dir.join("predict_features.json"), N_SAMPLES)?;
    write_pred(&out_dir.join("predict_pred.csv"))?;

    log::info!("sample datasets written to {}", out_dir.display());
    println!(
        "Wrote 7 datasets ({N_SAMPLES} samples, {N_CHANNELS} channels) to {}",
        out_dir.display()
    );
    Ok(())
}
