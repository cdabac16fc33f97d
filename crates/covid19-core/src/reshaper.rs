use std::collections::HashMap;

use chrono::NaiveDate;
use covid19_parser::TimeSeriesTable;
use thiserror::Error;
use tracing::info;

use crate::loader::SourceTables;
use crate::table::outer_join;
use crate::types::{LongFormRecord, Metric, Metrics};

#[derive(Debug, Error)]
pub enum ReshapeError {
    #[error("{metric} table has unparseable date column '{column}'")]
    InvalidDateHeader { metric: Metric, column: String },
}

const DATE_HEADER_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

/// Parses a wide-table date header such as `1/22/20` or `2020-01-22`.
pub fn parse_date_header(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_HEADER_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Coordinates are compared bit-for-bit, with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordinateKey(Option<u64>);

impl CoordinateKey {
    fn new(value: Option<f64>) -> Self {
        CoordinateKey(value.map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }))
    }

    fn value(self) -> Option<f64> {
        self.0.map(f64::from_bits)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    pub country: String,
    pub date: NaiveDate,
    latitude: CoordinateKey,
    longitude: CoordinateKey,
}

impl JoinKey {
    pub fn latitude(&self) -> Option<f64> {
        self.latitude.value()
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude.value()
    }
}

pub type Coordinates = (Option<f64>, Option<f64>);

/// Picks one coordinate pair per country for all three tables.
///
/// A country-level row from any table wins; otherwise the first row seen, scanning
/// confirmed, recovered, then deaths.
pub fn shared_coordinates(tables: &SourceTables) -> HashMap<String, Coordinates> {
    let mut chosen: HashMap<String, (bool, Coordinates)> = HashMap::new();

    for metric in Metric::ALL {
        for row in &tables.metric(metric).rows {
            let candidate = (row.latitude, row.longitude);
            match chosen.get_mut(&row.country) {
                Some(entry) => {
                    if row.country_level && !entry.0 {
                        *entry = (true, candidate);
                    }
                }
                None => {
                    chosen.insert(row.country.clone(), (row.country_level, candidate));
                }
            }
        }
    }

    chosen
        .into_iter()
        .map(|(country, (_, coordinates))| (country, coordinates))
        .collect()
}

/// Melts one wide table into `(country, date, coordinates) -> value` rows.
///
/// Countries present in `coordinates` take that pair instead of their own.
pub fn melt(
    table: &TimeSeriesTable,
    metric: Metric,
    coordinates: &HashMap<String, Coordinates>,
) -> Result<Vec<(JoinKey, Option<i64>)>, ReshapeError> {
    let dates = table
        .date_columns
        .iter()
        .map(|column| {
            parse_date_header(column).ok_or_else(|| ReshapeError::InvalidDateHeader {
                metric,
                column: column.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut melted = Vec::with_capacity(table.cell_count());
    for row in &table.rows {
        let (latitude, longitude) = coordinates
            .get(&row.country)
            .copied()
            .unwrap_or((row.latitude, row.longitude));
        let latitude = CoordinateKey::new(latitude);
        let longitude = CoordinateKey::new(longitude);
        for (col, date) in dates.iter().enumerate() {
            let key = JoinKey {
                country: row.country.clone(),
                date: *date,
                latitude,
                longitude,
            };
            melted.push((key, row.value_at(col)));
        }
    }

    Ok(melted)
}

/// Melts the three metric tables and outer-joins them on (country, date, coordinates).
///
/// Coordinates are unified per country first, so a country yields one row per date even
/// when one table lists provinces and another lists the whole country.
/// A metric that no source provides for a key stays `None`; filling happens downstream.
pub fn reshape(tables: &SourceTables) -> Result<Vec<LongFormRecord>, ReshapeError> {
    let coordinates = shared_coordinates(tables);
    let confirmed = melt(&tables.confirmed, Metric::Confirmed, &coordinates)?;
    let recovered = melt(&tables.recovered, Metric::Recovered, &coordinates)?;
    let deaths = melt(&tables.deaths, Metric::Deaths, &coordinates)?;

    let confirmed_recovered: Vec<(JoinKey, (Option<i64>, Option<i64>))> =
        outer_join(confirmed, recovered)
            .into_iter()
            .map(|(key, c, r)| (key, (c.flatten(), r.flatten())))
            .collect();

    let records: Vec<LongFormRecord> = outer_join(confirmed_recovered, deaths)
        .into_iter()
        .map(|(key, cr, d)| {
            let (confirmed, recovered) = cr.unwrap_or((None, None));
            LongFormRecord {
                latitude: key.latitude(),
                longitude: key.longitude(),
                country: key.country,
                date: key.date,
                metrics: Metrics::new(confirmed, recovered, d.flatten()),
            }
        })
        .collect();

    info!(rows = records.len(), "reshaped metric tables into long form");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_headers_in_all_layouts() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
        assert_eq!(parse_date_header("1/22/20"), Some(expected));
        assert_eq!(parse_date_header("01/22/2020"), Some(expected));
        assert_eq!(parse_date_header(" 2020-01-22 "), Some(expected));
        assert_eq!(parse_date_header("Jan 22"), None);
    }

    #[test]
    fn negative_zero_coordinates_join_with_zero() {
        assert_eq!(CoordinateKey::new(Some(-0.0)), CoordinateKey::new(Some(0.0)));
        assert_ne!(CoordinateKey::new(None), CoordinateKey::new(Some(0.0)));
    }
}
