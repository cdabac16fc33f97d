use crate::errors::ParserError;
use crate::model::{ReferenceRecord, ReferenceTable};
use crate::registry::TableParser;

use super::{
    clean_optional, open_reader, parse_coordinate, parse_population, read_header,
    require_columns,
};

/// The published UID/ISO/FIPS lookup table.
///
/// Only country-level rows (no `Province_State`) are kept. The country name is the
/// `Combined_Key`, which for those rows equals the time-series `Country/Region`.
pub struct JhuLookupParser;

impl Default for JhuLookupParser {
    fn default() -> Self {
        Self
    }
}

impl JhuLookupParser {
    const NAME: &'static str = "JHU_UID_LOOKUP";
}

impl TableParser for JhuLookupParser {
    type Output = ReferenceTable;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(&self, content: &str) -> Result<ReferenceTable, ParserError> {
        let mut reader = open_reader(content);
        let header = read_header(Self::NAME, &mut reader)?;
        let [_, iso3, province, country_region, lat, long, combined_key, population] =
            require_columns(
                Self::NAME,
                &header,
                [
                    "UID",
                    "iso3",
                    "Province_State",
                    "Country_Region",
                    "Lat",
                    "Long_",
                    "Combined_Key",
                    "Population",
                ],
            )?;

        let mut records = Vec::new();
        let mut row_count = 0usize;

        for record in reader.records() {
            let record = record.map_err(|source| ParserError::Csv {
                parser: Self::NAME,
                source,
            })?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            row_count += 1;

            if clean_optional(record.get(province)).is_some() {
                continue;
            }

            let country = match record.get(combined_key).filter(|v| !v.trim().is_empty()) {
                Some(name) => name.to_string(),
                None => match record.get(country_region).filter(|v| !v.trim().is_empty()) {
                    Some(name) => name.to_string(),
                    None => continue,
                },
            };

            records.push(ReferenceRecord {
                iso3: clean_optional(record.get(iso3)).unwrap_or_default(),
                country,
                latitude: record.get(lat).and_then(parse_coordinate),
                longitude: record.get(long).and_then(parse_coordinate),
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
