// crates/covid19-core/src/types.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical string form of a calendar date, used as the sort/animation key downstream.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Confirmed,
    Recovered,
    Deaths,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Confirmed, Metric::Recovered, Metric::Deaths];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Confirmed => "confirmed",
            Metric::Recovered => "recovered",
            Metric::Deaths => "deaths",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Metric::Confirmed),
            "recovered" => Ok(Metric::Recovered),
            "deaths" => Ok(Metric::Deaths),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

/// A confirmed/recovered/deaths triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics<T> {
    pub confirmed: T,
    pub recovered: T,
    pub deaths: T,
}

impl<T> Metrics<T> {
    pub fn new(confirmed: T, recovered: T, deaths: T) -> Self {
        Self {
            confirmed,
            recovered,
            deaths,
        }
    }

    pub fn get(&self, metric: Metric) -> &T {
        match metric {
            Metric::Confirmed => &self.confirmed,
            Metric::Recovered => &self.recovered,
            Metric::Deaths => &self.deaths,
        }
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut T {
        match metric {
            Metric::Confirmed => &mut self.confirmed,
            Metric::Recovered => &mut self.recovered,
            Metric::Deaths => &mut self.deaths,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> Metrics<U>
    where
        F: FnMut(T) -> U,
    {
        Metrics {
            confirmed: f(self.confirmed),
            recovered: f(self.recovered),
            deaths: f(self.deaths),
        }
    }
}

impl Metrics<i64> {
    /// Component-wise sum, saturating at `i64::MAX`.
    pub fn add(&mut self, other: &Metrics<i64>) {
        self.confirmed = self.confirmed.saturating_add(other.confirmed);
        self.recovered = self.recovered.saturating_add(other.recovered);
        self.deaths = self.deaths.saturating_add(other.deaths);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
    Cruise,
    Unknown,
}

impl Continent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
            Continent::Cruise => "Cruise",
            Continent::Unknown => "Unknown",
        }
    }

    /// Maps a two-letter continent code (`AF`, `AS`, `EU`, `NA`, `SA`, `OC`).
    /// Antarctica and anything else is [`Continent::Unknown`].
    pub fn from_code(code: &str) -> Continent {
        match code.trim().to_ascii_uppercase().as_str() {
            "AF" => Continent::Africa,
            "AS" => Continent::Asia,
            "EU" => Continent::Europe,
            "NA" => Continent::NorthAmerica,
            "SA" => Continent::SouthAmerica,
            "OC" => Continent::Oceania,
            _ => Continent::Unknown,
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outer-joined long-form row; metric cells are `None` where no source had a value.
#[derive(Debug, Clone, PartialEq)]
pub struct LongFormRecord {
    pub country: String,
    pub date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metrics: Metrics<Option<i64>>,
}

impl LongFormRecord {
    pub fn date_key(&self) -> String {
        self.date.format(DATE_KEY_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: LongFormRecord,
    pub continent: Continent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub country: String,
    pub date: NaiveDate,
    pub continent: Continent,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metrics: Metrics<i64>,
}

/// Final per-row output: an enriched record joined to its reference row.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedRecord {
    pub date: NaiveDate,
    pub country: String,
    pub iso3: String,
    pub continent: Continent,
    pub metrics: Metrics<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u64,
    pub standardized: Metrics<f64>,
}

impl StandardizedRecord {
    pub fn date_key(&self) -> String {
        self.date.format(DATE_KEY_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAggregate {
    pub label_date: String,
    pub total_confirmed: i64,
    pub total_recovered: i64,
    pub total_deaths: i64,
}
