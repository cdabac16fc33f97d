use chrono::NaiveDate;
use covid19_core::sanitizer::{clamp_negative, fill_missing, sanitize, SanitizerConfig};
use covid19_core::types::{ClassifiedRecord, Continent, LongFormRecord, Metrics};

fn classified(
    country: &str,
    continent: Continent,
    metrics: Metrics<Option<i64>>,
) -> ClassifiedRecord {
    ClassifiedRecord {
        record: LongFormRecord {
            country: country.to_string(),
            date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
            latitude: Some(1.0),
            longitude: Some(2.0),
            metrics,
        },
        continent,
    }
}

#[test]
fn policies() {
    assert_eq!(clamp_negative(-5), 0);
    assert_eq!(clamp_negative(0), 0);
    assert_eq!(clamp_negative(7), 7);
    assert_eq!(fill_missing(None), 0);
    assert_eq!(fill_missing(Some(-3)), -3);
}

#[test]
fn clamping_is_column_local() {
    let records = vec![classified(
        "France",
        Continent::Europe,
        Metrics::new(Some(-2), Some(5), Some(1)),
    )];
    let (cleaned, summary) = sanitize(records, &SanitizerConfig::default());

    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].metrics, Metrics::new(0, 5, 1));
    assert_eq!(summary.cells_clamped, 1);
    assert_eq!(summary.cells_filled, 0);
}

#[test]
fn missing_cells_become_zero() {
    let records = vec![classified(
        "US",
        Continent::NorthAmerica,
        Metrics::new(Some(4), None, None),
    )];
    let (cleaned, summary) = sanitize(records, &SanitizerConfig::default());

    assert_eq!(cleaned[0].metrics, Metrics::new(4, 0, 0));
    assert_eq!(cleaned[0].continent, Continent::NorthAmerica);
    assert_eq!(cleaned[0].latitude, Some(1.0));
    assert_eq!(summary.cells_filled, 2);
}

#[test]
fn cruise_records_follow_config() {
    let records = vec![
        classified("Diamond Princess", Continent::Cruise, Metrics::new(Some(10), None, None)),
        classified("France", Continent::Europe, Metrics::new(Some(1), Some(0), Some(0))),
    ];

    let (removed, summary) = sanitize(records.clone(), &SanitizerConfig::default());
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].country, "France");
    assert_eq!(summary.records_in, 2);
    assert_eq!(summary.cruise_removed, 1);

    let (kept, summary) = sanitize(records, &SanitizerConfig { remove_cruise: false });
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].continent, Continent::Cruise);
    assert_eq!(summary.cruise_removed, 0);
}
