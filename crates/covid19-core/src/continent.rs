//! Country name to continent classification.
//!
//! Names are checked against [`CONTINENT_OVERRIDES`] first, in order, and only then handed
//! to a [`ContinentResolver`]. New exceptions belong in the override table.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{ClassifiedRecord, Continent, LongFormRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinentOverride {
    pub pattern: &'static str,
    pub continent: Continent,
}

const fn rule(pattern: &'static str, continent: Continent) -> ContinentOverride {
    ContinentOverride { pattern, continent }
}

/// Names the generic resolver misclassifies or cannot resolve. Cruise vessels come first.
pub static CONTINENT_OVERRIDES: &[ContinentOverride] = &[
    rule("Diamond Princess", Continent::Cruise),
    rule("MS Zaandam", Continent::Cruise),
    rule("Congo (Brazzaville)", Continent::Africa),
    rule("Congo (Kinshasa)", Continent::Africa),
    rule("Cote d'Ivoire", Continent::Africa),
    rule("Western Sahara", Continent::Africa),
    rule("Korea, South", Continent::Asia),
    rule("Taiwan*", Continent::Asia),
    rule("Timor-Leste", Continent::Asia),
    rule("West Bank and Gaza", Continent::Asia),
    rule("Burma", Continent::Asia),
    rule("Holy See", Continent::Europe),
    rule("Kosovo", Continent::Europe),
    rule("US", Continent::NorthAmerica),
];

/// Fallback lookup consulted when no override matches. `None` means "don't know".
pub trait ContinentResolver {
    fn resolve(&self, country: &str) -> Option<Continent>;
}

#[derive(Debug, Deserialize)]
struct CountryData {
    alpha2: String,
    continent: String,
    name: String,
}

#[derive(Debug)]
struct CountryEntry {
    alpha2: String,
    continent_code: String,
}

#[derive(Debug, Default)]
struct CountryIndex {
    entries: Vec<CountryEntry>,
    by_name: HashMap<String, usize>,
    by_folded_name: HashMap<String, usize>,
}

static COUNTRY_INDEX: Lazy<CountryIndex> = Lazy::new(|| {
    let mut reader = csv::Reader::from_reader(include_str!("../data/country_continents.csv").as_bytes());
    let mut index = CountryIndex::default();

    for row in reader.deserialize::<CountryData>() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!(error = %err, "skipping malformed country reference row");
                continue;
            }
        };
        let position = index.entries.len();
        index
            .by_folded_name
            .entry(row.name.to_ascii_lowercase())
            .or_insert(position);
        index.by_name.entry(row.name).or_insert(position);
        index.entries.push(CountryEntry {
            alpha2: row.alpha2,
            continent_code: row.continent,
        });
    }

    debug!(names = index.by_name.len(), "country reference data loaded");
    index
});

/// Resolves names through embedded ISO 3166 data: name (or common alias) to alpha-2 code,
/// alpha-2 code to continent code. Matching is exact, then ASCII case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountryCodeResolver;

impl CountryCodeResolver {
    fn entry(&self, country: &str) -> Option<&'static CountryEntry> {
        let index: &'static CountryIndex = &COUNTRY_INDEX;
        let position = index
            .by_name
            .get(country)
            .or_else(|| index.by_folded_name.get(&country.to_ascii_lowercase()))?;
        index.entries.get(*position)
    }

    pub fn alpha2(&self, country: &str) -> Option<&'static str> {
        self.entry(country.trim()).map(|entry| entry.alpha2.as_str())
    }

    pub fn continent_code(&self, country: &str) -> Option<&'static str> {
        self.entry(country.trim())
            .map(|entry| entry.continent_code.as_str())
    }

    pub fn known_names(&self) -> usize {
        COUNTRY_INDEX.by_name.len()
    }
}

impl ContinentResolver for CountryCodeResolver {
    fn resolve(&self, country: &str) -> Option<Continent> {
        self.continent_code(country).map(Continent::from_code)
    }
}

pub struct ContinentClassifier<R = CountryCodeResolver> {
    extra_overrides: Vec<(String, Continent)>,
    resolver: R,
}

impl Default for ContinentClassifier<CountryCodeResolver> {
    fn default() -> Self {
        Self::with_resolver(CountryCodeResolver)
    }
}

impl ContinentClassifier<CountryCodeResolver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: ContinentResolver> ContinentClassifier<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            extra_overrides: Vec::new(),
            resolver,
        }
    }

    /// Adds a local exception, checked after the built-in overrides.
    pub fn with_override(mut self, pattern: impl Into<String>, continent: Continent) -> Self {
        self.extra_overrides.push((pattern.into(), continent));
        self
    }

    pub fn classify(&self, country: &str) -> Continent {
        let name = country.trim();

        if let Some(rule) = CONTINENT_OVERRIDES.iter().find(|rule| rule.pattern == name) {
            return rule.continent;
        }
        if let Some((_, continent)) = self
            .extra_overrides
            .iter()
            .find(|(pattern, _)| pattern == name)
        {
            return *continent;
        }

        self.resolver.resolve(name).unwrap_or(Continent::Unknown)
    }

    /// Tags every record with its continent. Each distinct name is classified once.
    pub fn classify_records(&self, records: Vec<LongFormRecord>) -> Vec<ClassifiedRecord> {
        let mut seen: HashMap<String, Continent> = HashMap::new();
        let mut classified = Vec::with_capacity(records.len());

        for record in records {
            let continent = match seen.get(&record.country) {
                Some(continent) => *continent,
                None => {
                    let continent = self.classify(&record.country);
                    if continent == Continent::Unknown {
                        warn!(country = %record.country, "no continent for country");
                    }
                    seen.insert(record.country.clone(), continent);
                    continent
                }
            };
            classified.push(ClassifiedRecord { record, continent });
        }

        classified
    }
}

/// Classifies with the built-in overrides and the embedded reference data.
pub fn classify_country(country: &str) -> Continent {
    ContinentClassifier::new().classify(country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_unique() {
        let mut patterns: Vec<&str> = CONTINENT_OVERRIDES.iter().map(|rule| rule.pattern).collect();
        patterns.sort_unstable();
        patterns.dedup();
        assert_eq!(patterns.len(), CONTINENT_OVERRIDES.len());
    }

    #[test]
    fn embedded_reference_data_loads() {
        let resolver = CountryCodeResolver;
        assert!(resolver.known_names() > 250);
        assert_eq!(resolver.alpha2("Namibia"), Some("NA"));
        assert_eq!(resolver.continent_code("Namibia"), Some("AF"));
    }
}
