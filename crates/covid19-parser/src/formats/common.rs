use std::collections::HashMap;

use csv::StringRecord;

use crate::errors::ParserError;
use crate::model::CountryRow;

pub(crate) fn open_reader(content: &str) -> csv::Reader<&[u8]> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
}

pub(crate) fn read_header(
    parser: &'static str,
    reader: &mut csv::Reader<&[u8]>,
) -> Result<StringRecord, ParserError> {
    reader
        .records()
        .next()
        .ok_or(ParserError::FormatMismatch {
            parser,
            reason: "file missing header row".to_string(),
        })?
        .map_err(|source| ParserError::Csv { parser, source })
}

/// Checks that the header begins with `expected`, compared case-insensitively.
pub(crate) fn expect_leading_columns(
    parser: &'static str,
    header: &StringRecord,
    expected: &[&str],
) -> Result<(), ParserError> {
    if header.len() < expected.len() {
        return Err(ParserError::FormatMismatch {
            parser,
            reason: format!(
                "expected at least {} header fields, found {}",
                expected.len(),
                header.len()
            ),
        });
    }

    for (idx, (found, wanted)) in header.iter().zip(expected.iter()).enumerate() {
        if !found.trim().eq_ignore_ascii_case(wanted) {
            return Err(ParserError::FormatMismatch {
                parser,
                reason: format!("column {idx} is '{}', expected '{wanted}'", found.trim()),
            });
        }
    }

    Ok(())
}

pub(crate) fn column_index(header: &StringRecord, name: &str) -> Option<usize> {
    header
        .iter()
        .position(|field| field.trim().eq_ignore_ascii_case(name))
}

/// Resolves every named column or reports the first one that is missing.
pub(crate) fn require_columns<const N: usize>(
    parser: &'static str,
    header: &StringRecord,
    names: [&str; N],
) -> Result<[usize; N], ParserError> {
    let mut indices = [0usize; N];
    for (slot, name) in indices.iter_mut().zip(names.iter()) {
        *slot = column_index(header, name).ok_or_else(|| ParserError::FormatMismatch {
            parser,
            reason: format!("missing column '{name}'"),
        })?;
    }
    Ok(indices)
}

pub(crate) fn date_columns(
    parser: &'static str,
    header: &StringRecord,
    first: usize,
) -> Result<Vec<String>, ParserError> {
    let columns: Vec<String> = header
        .iter()
        .skip(first)
        .map(|field| field.trim().to_string())
        .collect();

    if let Some(offset) = columns.iter().position(|column| column.is_empty()) {
        return Err(ParserError::InvalidHeader {
            parser,
            column_index: first + offset,
            message: "date column header is empty".to_string(),
        });
    }

    Ok(columns)
}

pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

pub(crate) fn required_name(
    parser: &'static str,
    value: Option<&str>,
    line_index: usize,
    column: &str,
) -> Result<String, ParserError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => Ok(raw.to_string()),
        _ => Err(ParserError::DataRow {
            parser,
            line_index,
            message: format!("column '{column}' is empty"),
        }),
    }
}

fn is_missing(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Parses a cumulative count. Blank, `NaN` and unparseable cells are missing;
/// fractional values are rounded to the nearest integer.
pub fn parse_count(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if is_missing(trimmed) {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .map(|parsed| parsed.round() as i64)
}

pub fn parse_coordinate(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if is_missing(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

/// Unknown or negative populations are reported as zero.
pub fn parse_population(value: &str) -> u64 {
    match parse_count(value) {
        Some(parsed) if parsed > 0 => parsed as u64,
        _ => 0,
    }
}

pub(crate) fn parse_values(record: &StringRecord, first: usize, width: usize) -> Vec<Option<i64>> {
    (0..width)
        .map(|offset| record.get(first + offset).and_then(parse_count))
        .collect()
}

fn add_counts(left: Option<i64>, right: Option<i64>) -> Option<i64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

struct FoldedCountry {
    country_level: Option<(Option<f64>, Option<f64>)>,
    first_seen: (Option<f64>, Option<f64>),
    values: Vec<Option<i64>>,
}

/// Collapses province/state rows into one row per country.
///
/// Counts are summed per date. Coordinates come from the country-level row when the table
/// has one, otherwise from the first row seen for that country.
pub(crate) struct CountryFolder {
    width: usize,
    order: Vec<String>,
    countries: HashMap<String, FoldedCountry>,
}

impl CountryFolder {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            order: Vec::new(),
            countries: HashMap::new(),
        }
    }

    pub fn push(
        &mut self,
        country: String,
        province: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        values: Vec<Option<i64>>,
    ) {
        let coordinates = (latitude, longitude);
        let width = self.width;

        if !self.countries.contains_key(&country) {
            self.order.push(country.clone());
        }
        let entry = self
            .countries
            .entry(country)
            .or_insert_with(|| FoldedCountry {
                country_level: None,
                first_seen: coordinates,
                values: vec![None; width],
            });

        if province.is_none() && entry.country_level.is_none() {
            entry.country_level = Some(coordinates);
        }

        for (slot, value) in entry.values.iter_mut().zip(values) {
            *slot = add_counts(*slot, value);
        }
    }

    pub fn finish(mut self) -> Vec<CountryRow> {
        self.order
            .into_iter()
            .filter_map(|country| {
                let folded = self.countries.remove(&country)?;
                let country_level = folded.country_level.is_some();
                let (latitude, longitude) = folded.country_level.unwrap_or(folded.first_seen);
                Some(CountryRow {
                    country,
                    latitude,
                    longitude,
                    country_level,
                    values: folded.values,
                })
            })
            .collect()
    }
}
