//! Query helpers for loaded runs.

use stc_results::TimeseriesRecord;

use crate::error::{AppError, AppResult};

/// Time range and sampling statistics of a stored run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub record_count: usize,
    pub state_dim: usize,
    pub min_interval_s: Option<f64>,
    pub mean_interval_s: Option<f64>,
}

pub fn get_run_summary(records: &[TimeseriesRecord]) -> AppResult<RunSummary> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(AppError::InvalidInput("No records in run".to_string())),
    };

    let gaps: Vec<f64> = records.windows(2).map(|w| w[1].time_s - w[0].time_s).collect();
    let min_interval_s = gaps.iter().copied().reduce(f64::min);
    let mean_interval_s = if gaps.is_empty() {
        None
    } else {
        Some(gaps.iter().sum::<f64>() / gaps.len() as f64)
    };

    Ok(RunSummary {
        time_range: (first.time_s, last.time_s),
        record_count: records.len(),
        state_dim: first.state.len(),
        min_interval_s,
        mean_interval_s,
    })
}

/// Times and values of one state component.
pub fn extract_state_series(
    records: &[TimeseriesRecord],
    component: usize,
) -> AppResult<(Vec<f64>, Vec<f64>)> {
    let mut times = Vec::with_capacity(records.len());
    let mut values = Vec::with_capacity(records.len());
    for r in records {
        let v = r.state.get(component).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "state component {component} out of range (dimension {})",
                r.state.len()
            ))
        })?;
        times.push(r.time_s);
        values.push(*v);
    }
    Ok((times, values))
}
