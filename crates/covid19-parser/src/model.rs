use serde::{Deserialize, Serialize};

/// One country's cumulative counts, aligned with [`TimeSeriesTable::date_columns`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRow {
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// True when the coordinates came from a country-level row rather than a province.
    #[serde(default)]
    pub country_level: bool,
    pub values: Vec<Option<i64>>,
}

impl CountryRow {
    pub fn value_at(&self, column: usize) -> Option<i64> {
        self.values.get(column).copied().flatten()
    }
}

/// A wide time-series table: one row per country, one column per date.
///
/// Date headers are kept verbatim; turning them into calendar dates is left to the
/// consumer. Sub-national rows have already been folded into their country.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    pub format: &'static str,
    pub date_columns: Vec<String>,
    pub rows: Vec<CountryRow>,
}

impl TimeSeriesTable {
    pub fn row(&self, country: &str) -> Option<&CountryRow> {
        self.rows.iter().find(|row| row.country == country)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.date_columns.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub iso3: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: u64,
}

/// Country-level reference rows (population and coordinates).
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    pub format: &'static str,
    pub records: Vec<ReferenceRecord>,
}

impl ReferenceTable {
    pub fn record(&self, country: &str) -> Option<&ReferenceRecord> {
        self.records.iter().find(|record| record.country == country)
    }
}
