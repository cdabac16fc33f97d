use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{ClassifiedRecord, Continent, EnrichedRecord, Metric, Metrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerConfig {
    pub remove_cruise: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            remove_cruise: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeSummary {
    pub records_in: usize,
    pub cruise_removed: usize,
    pub cells_clamped: usize,
    pub cells_filled: usize,
}

/// Negative counts are reporting corrections; they become zero.
pub fn clamp_negative(value: i64) -> i64 {
    value.max(0)
}

pub fn fill_missing(value: Option<i64>) -> i64 {
    value.unwrap_or(0)
}

/// Drops cruise records (when configured), clamps negatives and fills gaps per metric.
pub fn sanitize(
    records: Vec<ClassifiedRecord>,
    config: &SanitizerConfig,
) -> (Vec<EnrichedRecord>, SanitizeSummary) {
    let mut summary = SanitizeSummary {
        records_in: records.len(),
        ..Default::default()
    };
    let mut cleaned = Vec::with_capacity(records.len());

    for ClassifiedRecord { record, continent } in records {
        if config.remove_cruise && continent == Continent::Cruise {
            summary.cruise_removed += 1;
            continue;
        }

        let mut metrics = Metrics::<i64>::default();
        for metric in Metric::ALL {
            let raw = *record.metrics.get(metric);
            let value = match raw {
                Some(value) => {
                    if value < 0 {
                        summary.cells_clamped += 1;
                    }
                    clamp_negative(value)
                }
                None => {
                    summary.cells_filled += 1;
                    fill_missing(raw)
                }
            };
            *metrics.get_mut(metric) = value;
        }

        cleaned.push(EnrichedRecord {
            country: record.country,
            date: record.date,
            continent,
            latitude: record.latitude,
            longitude: record.longitude,
            metrics,
        });
    }

    info!(
        records_in = summary.records_in,
        cruise_removed = summary.cruise_removed,
        cells_clamped = summary.cells_clamped,
        cells_filled = summary.cells_filled,
        "sanitized records"
    );
    (cleaned, summary)
}
