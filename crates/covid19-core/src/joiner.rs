use std::collections::{BTreeSet, HashMap};

use covid19_parser::{ReferenceRecord, ReferenceTable};
use serde::Serialize;
use tracing::{info, warn};

use crate::types::{EnrichedRecord, StandardizedRecord};

const PER_CAPITA: f64 = 100_000.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub matched: usize,
    pub dropped: usize,
    pub unmatched_countries: Vec<String>,
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Cases per 100,000 population.
pub fn standardize(value: i64, population: u64) -> f64 {
    finite_or_zero(value as f64 / population as f64 * PER_CAPITA)
}

/// Inner join on the exact country name. Records without a reference row are dropped and
/// reported in the summary. Output is ordered by date, continent name, country, then input
/// position.
pub fn join_population(
    records: Vec<EnrichedRecord>,
    reference: &ReferenceTable,
) -> (Vec<StandardizedRecord>, JoinSummary) {
    let mut by_country: HashMap<&str, Vec<&ReferenceRecord>> = HashMap::new();
    for entry in &reference.records {
        by_country.entry(entry.country.as_str()).or_default().push(entry);
    }

    let mut unmatched = BTreeSet::new();
    let mut dropped = 0usize;
    let mut joined: Vec<(usize, StandardizedRecord)> = Vec::with_capacity(records.len());

    for (position, record) in records.into_iter().enumerate() {
        let Some(matches) = by_country.get(record.country.as_str()) else {
            dropped += 1;
            unmatched.insert(record.country);
            continue;
        };

        for entry in matches {
            joined.push((
                position,
                StandardizedRecord {
                    date: record.date,
                    country: record.country.clone(),
                    iso3: entry.iso3.clone(),
                    continent: record.continent,
                    metrics: record.metrics,
                    latitude: entry.latitude.unwrap_or(0.0),
                    longitude: entry.longitude.unwrap_or(0.0),
                    population: entry.population,
                    standardized: record
                        .metrics
                        .map(|value| standardize(value, entry.population)),
                },
            ));
        }
    }

    joined.sort_by(|(a_pos, a), (b_pos, b)| {
        (a.date, a.continent.as_str(), &a.country, a_pos)
            .cmp(&(b.date, b.continent.as_str(), &b.country, b_pos))
    });

    for country in &unmatched {
        warn!(country = %country, "no reference row for country; dropping its records");
    }

    let summary = JoinSummary {
        matched: joined.len(),
        dropped,
        unmatched_countries: unmatched.into_iter().collect(),
    };
    info!(
        matched = summary.matched,
        dropped = summary.dropped,
        unmatched = summary.unmatched_countries.len(),
        "joined population reference"
    );

    (joined.into_iter().map(|(_, record)| record).collect(), summary)
}
