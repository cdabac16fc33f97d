use crate::errors::ParserError;
use crate::model::{ReferenceRecord, ReferenceTable};
use crate::registry::TableParser;

use super::{
    clean_optional, column_index, open_reader, parse_coordinate, parse_population, read_header,
    require_columns, required_name,
};

/// Plain reference layout: `iso3, country, latitude, longitude, population`, in any order.
///
/// If the file carries a province column, rows with a province are skipped.
pub struct CountryReferenceParser;

impl Default for CountryReferenceParser {
    fn default() -> Self {
        Self
    }
}

impl CountryReferenceParser {
    const NAME: &'static str = "COUNTRY_REFERENCE";
}

impl TableParser for CountryReferenceParser {
    type Output = ReferenceTable;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<ReferenceTable, ParserError> {
        let mut reader = open_reader(content);
        let header = read_header(Self::NAME, &mut reader)?;
        let [iso3, country, latitude, longitude, population] = require_columns(
            Self::NAME,
            &header,
            ["iso3", "country", "latitude", "longitude", "population"],
        )?;
        let province = column_index(&header, "province");

        let mut records = Vec::new();
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
            row_count += 1;

            if province.is_some_and(|idx| clean_optional(record.get(idx)).is_some()) {
                continue;
            }

            records.push(ReferenceRecord {
                iso3: clean_optional(record.get(iso3)).unwrap_or_default(),
                country: required_name(Self::NAME, record.get(country), line_index, "country")?,
                latitude: record.get(latitude).and_then(parse_coordinate),
                longitude: record.get(longitude).and_then(parse_coordinate),
                population: record.get(population).map(parse_population).unwrap_or(0),
            });
        }

        if row_count == 0 {
            return Err(ParserError::EmptyData { parser: Self::NAME });
        }

        Ok(ReferenceTable {
            format: Self::NAME,
            records,
        })
    }
}
