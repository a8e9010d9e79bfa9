//! A/B metrics table written at the end of a training run.
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::metrics::Metrics;

pub const MODEL_COLUMN: &str = "Model";

/// Write one row per model: `Model,Accuracy,Precision,Recall,F1-score,ROC-AUC`.
pub fn write_metrics_csv<P: AsRef<Path>>(path: P, rows: &[(String, Metrics)]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create metrics file: {}", path.display()))?;

    let mut header = vec![MODEL_COLUMN.to_string()];
    header.extend(Metrics::HEADERS.iter().map(|h| h.to_string()));
    wtr.write_record(&header)?;

    for (label, metrics) in rows {
        let mut record = vec![label.clone()];
        record.extend(metrics.values().iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;

    log::info!("Wrote metrics for {} model(s) to {}", rows.len(), path.display());
    Ok(())
}

/// Read back a metrics table written by [`write_metrics_csv`].
pub fn read_metrics_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Metrics)>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open metrics file: {}", path.display()))?;

    let headers = reader.headers().context("Failed to read metrics header row")?.clone();
    let expected: Vec<&str> = std::iter::once(MODEL_COLUMN)
        .chain(Metrics::HEADERS.iter().copied())
        .collect();
    if headers.iter().collect::<Vec<_>>() != expected {
        return Err(anyhow!(
            "Unexpected metrics header {:?}, expected {:?}",
            headers,
            expected
        ));
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read metrics row {}", idx + 2))?;
        let mut values = [0.0f64; 5];
        for (slot, field) in values.iter_mut().zip(record.iter().skip(1)) {
            *slot = field
                .parse()
                .with_context(|| format!("Invalid metric value '{}' on row {}", field, idx + 2))?;
        }
        rows.push((
            record.get(0).unwrap_or_default().to_string(),
            Metrics {
                accuracy: values[0],
                precision: values[1],
                recall: values[2],
                f1: values[3],
                roc_auc: values[4],
            },
        ));
    }
    Ok(rows)
}
