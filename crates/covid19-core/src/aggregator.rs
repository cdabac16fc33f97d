use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::table::{group_sorted, PivotTable};
use crate::types::{GlobalAggregate, Metric, Metrics, StandardizedRecord};

pub const LABEL_DATE_FORMAT: &str = "%d %b %Y";

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("cannot aggregate an empty dataset")]
    EmptyDataset,
}

fn rollup<F>(records: &[StandardizedRecord], mut label: F) -> Vec<((NaiveDate, String), Metrics<i64>)>
where
    F: FnMut(&StandardizedRecord) -> String,
{
    let rows = records
        .iter()
        .map(|record| ((record.date, label(record)), record.metrics))
        .collect();
    group_sorted(rows, |acc, metrics| acc.add(&metrics))
}

fn pivot(rows: &[((NaiveDate, String), Metrics<i64>)], metric: Metric) -> PivotTable {
    PivotTable::from_cells(
        rows.iter()
            .map(|(key, metrics)| (key.clone(), *metrics.get(metric))),
    )
}

/// Date x continent table of one metric.
pub fn continent_series(records: &[StandardizedRecord], metric: Metric) -> PivotTable {
    let rows = rollup(records, |record| record.continent.as_str().to_string());
    let table = pivot(&rows, metric);
    info!(
        metric = metric.as_str(),
        dates = table.height(),
        continents = table.width(),
        "built continent rollup"
    );
    table
}

/// Date x country table of one metric.
pub fn country_series(records: &[StandardizedRecord], metric: Metric) -> PivotTable {
    let rows = rollup(records, |record| record.country.clone());
    pivot(&rows, metric)
}

/// Confirmed, recovered and deaths country tables side by side, labelled
/// `<country>_<metric>`.
pub fn country_breakdown(records: &[StandardizedRecord]) -> PivotTable {
    let rows = rollup(records, |record| record.country.clone());
    let parts = Metric::ALL
        .iter()
        .map(|metric| (metric.as_str().to_string(), pivot(&rows, *metric)))
        .collect();
    let table = PivotTable::hconcat(parts);
    info!(
        dates = table.height(),
        columns = table.width(),
        "built country rollup"
    );
    table
}

/// Totals for the most recent date in the dataset.
pub fn global_aggregate(records: &[StandardizedRecord]) -> Result<GlobalAggregate, AggregateError> {
    let latest = records
        .iter()
        .map(|record| record.date)
        .max()
        .ok_or(AggregateError::EmptyDataset)?;

    let mut totals = Metrics::<i64>::default();
    for record in records.iter().filter(|record| record.date == latest) {
        totals.add(&record.metrics);
    }

    let aggregate = GlobalAggregate {
        label_date: latest.format(LABEL_DATE_FORMAT).to_string(),
        total_confirmed: totals.confirmed,
        total_recovered: totals.recovered,
        total_deaths: totals.deaths,
    };
    info!(
        label_date = %aggregate.label_date,
        total_confirmed = aggregate.total_confirmed,
        "computed global aggregate"
    );
    Ok(aggregate)
}
