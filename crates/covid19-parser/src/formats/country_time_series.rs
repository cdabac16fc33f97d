use crate::errors::ParserError;
use crate::model::TimeSeriesTable;
use crate::registry::TableParser;

use super::{
    date_columns, expect_leading_columns, open_reader, parse_coordinate, parse_values,
    read_header, required_name, CountryFolder,
};

/// Plain country layout: `country, latitude, longitude, <date>...`.
///
/// Repeated country rows are folded the same way province rows are.
pub struct CountryTimeSeriesParser;

impl Default for CountryTimeSeriesParser {
    fn default() -> Self {
        Self
    }
}

impl CountryTimeSeriesParser {
    const NAME: &'static str = "COUNTRY_TIME_SERIES";
    const LEADING: [&'static str; 3] = ["country", "latitude", "longitude"];
}

impl TableParser for CountryTimeSeriesParser {
    type Output = TimeSeriesTable;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<TimeSeriesTable, ParserError> {
        let mut reader = open_reader(content);
        let header = read_header(Self::NAME, &mut reader)?;
        expect_leading_columns(Self::NAME, &header, &Self::LEADING)?;

        let first_date = Self::LEADING.len();
        let dates = date_columns(Self::NAME, &header, first_date)?;
        let mut folder = CountryFolder::new(dates.len());
        let mut row_count = 0usize;

        for (offset, record) in reader.records().enumerate() {
            let line_index = offset + 1;
            let record = record.map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let country = required_name(Self::NAME, record.get(0), line_index, "country")?;
            let latitude = record.get(1).and_then(parse_coordinate);
            let longitude = record.get(2).and_then(parse_coordinate);
            let values = parse_values(&record, first_date, dates.len());

            folder.push(country, None, latitude, longitude, values);
            row_count += 1;
        }

        if row_count == 0 {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        Ok(TimeSeriesTable {
            format: Self::NAME,
            date_columns: dates,
            rows: folder.finish(),
        })
    }
}
