use std::fs;
use std::path::PathBuf;

use crate::errors::ParserError;
use crate::formats::{
    parse_count, parse_population, CountryReferenceParser, CountryTimeSeriesParser,
    JhuLookupParser, JhuTimeSeriesParser,
};
use crate::registry::TableParser;
use crate::{parse_reference_table, parse_time_series};

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data/jhu").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

#[test]
fn parses_published_confirmed_table() {
    let content = fixture("csse_covid_19_time_series/time_series_covid19_confirmed_global.csv");
    let table = parse_time_series(&content).expect("confirmed parse failed");

    assert_eq!(table.format, "JHU_TIME_SERIES");
    assert_eq!(table.date_columns, vec!["1/22/20", "1/23/20", "1/24/20"]);
    assert_eq!(table.rows.len(), 8);

    let korea = table.row("Korea, South").expect("quoted country name missing");
    assert_eq!(korea.values, vec![Some(1), Some(1), Some(2)]);

    let france = table.row("France").unwrap();
    assert_eq!(france.value_at(1), Some(-2));
}

#[test]
fn folds_province_rows_into_country() {
    let content = fixture("csse_covid_19_time_series/time_series_covid19_confirmed_global.csv");
    let table = parse_time_series(&content).unwrap();

    let australia = table.row("Australia").expect("Australia missing");
    assert_eq!(australia.values, vec![Some(3), Some(5), Some(9)]);
    assert_eq!(australia.latitude, Some(-35.4735));
    assert_eq!(australia.longitude, Some(149.0124));
    assert!(!australia.country_level);

    let order: Vec<&str> = table.rows.iter().map(|row| row.country.as_str()).collect();
    assert_eq!(order[0], "Afghanistan");
    assert_eq!(order[1], "Australia");
}

#[test]
fn country_level_row_wins_coordinates() {
    let content = "\
Province/State,Country/Region,Lat,Long,1/22/20
Bermuda,United Kingdom,32.3078,-64.7505,2
,United Kingdom,55.3781,-3.436,10
";
    let table = parse_time_series(content).unwrap();
    let uk = table.row("United Kingdom").unwrap();
    assert_eq!(uk.values, vec![Some(12)]);
    assert_eq!(uk.latitude, Some(55.3781));
    assert_eq!(uk.longitude, Some(-3.436));
    assert!(uk.country_level);
}

#[test]
fn blank_cells_are_missing_not_zero() {
    let content = fixture("csse_covid_19_time_series/time_series_covid19_recovered_global.csv");
    let table = parse_time_series(&content).unwrap();

    let us = table.row("US").unwrap();
    assert_eq!(us.values, vec![Some(0), None]);
}

#[test]
fn short_rows_pad_with_missing_cells() {
    let content = "\
Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,1/24/20
,Chad,15.45,18.73,1
";
    let table = parse_time_series(content).unwrap();
    assert_eq!(table.rows[0].values, vec![Some(1), None, None]);
}

#[test]
fn parses_plain_country_layout() {
    let content = "\
country,latitude,longitude,2020-01-22,2020-01-23
Chad,15.45,18.73,1,2
Chad,15.45,18.73,3,nan
Peru,,-75.0,0,4
";
    let table = parse_time_series(content).expect("plain layout parse failed");

    assert_eq!(table.format, "COUNTRY_TIME_SERIES");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.row("Chad").unwrap().values, vec![Some(4), Some(2)]);

    let peru = table.row("Peru").unwrap();
    assert_eq!(peru.latitude, None);
    assert_eq!(peru.longitude, Some(-75.0));
}

#[test]
fn unknown_layout_lists_every_attempt() {
    let err = parse_time_series("region,lat,lon,1/22/20\nX,0,0,1\n").unwrap_err();
    match err {
        ParserError::NoMatchingParser { attempts } => {
            let names: Vec<&str> = attempts.iter().map(|attempt| attempt.parser).collect();
            assert_eq!(names, vec!["JHU_TIME_SERIES", "COUNTRY_TIME_SERIES"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn header_only_table_is_empty_data() {
    let err = JhuTimeSeriesParser
        .parse("Province/State,Country/Region,Lat,Long,1/22/20\n")
        .unwrap_err();
    assert!(matches!(err, ParserError::EmptyData { .. }));
}

#[test]
fn empty_date_header_is_rejected() {
    let err = CountryTimeSeriesParser
        .parse("country,latitude,longitude,2020-01-22,\nChad,1,1,1,1\n")
        .unwrap_err();
    assert!(matches!(
        err,
        ParserError::InvalidHeader {
            column_index: 4,
            ..
        }
    ));
}

#[test]
fn row_without_country_is_rejected() {
    let err = JhuTimeSeriesParser
        .parse("Province/State,Country/Region,Lat,Long,1/22/20\nSomewhere,,1,1,1\n")
        .unwrap_err();
    assert!(matches!(err, ParserError::DataRow { line_index: 1, .. }));
}

#[test]
fn lookup_table_keeps_country_level_rows() {
    let content = fixture("UID_ISO_FIPS_LookUp_Table.csv");
    let table = parse_reference_table(&content).expect("lookup parse failed");

    assert_eq!(table.format, "JHU_UID_LOOKUP");
    assert_eq!(table.records.len(), 8);
    assert!(table
        .records
        .iter()
        .all(|record| record.country != "Australian Capital Territory, Australia"));

    let korea = table.record("Korea, South").unwrap();
    assert_eq!(korea.iso3, "KOR");
    assert_eq!(korea.population, 51_269_183);

    let holy_see = table.record("Holy See").unwrap();
    assert_eq!(holy_see.population, 0);

    let cruise = table.record("Diamond Princess").unwrap();
    assert_eq!(cruise.iso3, "");
    assert_eq!(cruise.latitude, None);
}

#[test]
fn plain_reference_layout_in_any_column_order() {
    let content = "\
country,population,iso3,longitude,latitude
Chad,16425859,TCD,18.73,15.45
Nowhere,,,,
";
    let table = CountryReferenceParser.parse(content).unwrap();
    assert_eq!(table.records.len(), 2);

    let chad = &table.records[0];
    assert_eq!(chad.iso3, "TCD");
    assert_eq!(chad.population, 16_425_859);
    assert_eq!(chad.latitude, Some(15.45));
    assert_eq!(chad.longitude, Some(18.73));

    assert_eq!(table.records[1].population, 0);
}

#[test]
fn lookup_parser_rejects_plain_reference() {
    let err = JhuLookupParser
        .parse("iso3,country,latitude,longitude,population\nTCD,Chad,1,1,1\n")
        .unwrap_err();
    assert!(matches!(err, ParserError::FormatMismatch { .. }));
}

#[test]
fn count_cells_tolerate_float_and_garbage() {
    assert_eq!(parse_count("12"), Some(12));
    assert_eq!(parse_count(" 12.0 "), Some(12));
    assert_eq!(parse_count("-4"), Some(-4));
    assert_eq!(parse_count("NaN"), None);
    assert_eq!(parse_count(""), None);
    assert_eq!(parse_count("n/a"), None);
    assert_eq!(parse_count("inf"), None);
}

#[test]
fn population_cells_never_go_negative() {
    assert_eq!(parse_population("-10"), 0);
    assert_eq!(parse_population("1000.0"), 1000);
    assert_eq!(parse_population(""), 0);
}
