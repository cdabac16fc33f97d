use chrono::NaiveDate;
use covid19_core::outputs::{aggregate_json, csv_bytes, enriched_frame, pivot_frame, write_artifacts, Artifact};
use covid19_core::table::PivotTable;
use covid19_core::types::{Continent, GlobalAggregate, Metrics, StandardizedRecord};
use polars::prelude::*;

fn record() -> StandardizedRecord {
    StandardizedRecord {
        date: NaiveDate::from_ymd_opt(2020, 1, 22).unwrap(),
        country: "Korea, South".to_string(),
        iso3: "KOR".to_string(),
        continent: Continent::Asia,
        metrics: Metrics::new(100, 1, 2),
        latitude: 35.9,
        longitude: 127.8,
        population: 200_000,
        standardized: Metrics::new(50.0, 0.5, 1.0),
    }
}

#[test]
fn enriched_frame_columns_and_types() {
    let df = enriched_frame(&[record()]).unwrap();
    let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "date", "country", "continent", "confirmed", "recovered", "deaths", "latitude",
            "longitude", "population", "std_confirmed", "std_recovered", "std_deaths",
            "date_string",
        ]
    );
    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    assert_eq!(df.column("confirmed").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("std_confirmed").unwrap().dtype(), &DataType::Float64);

    let dates = df.column("date_string").unwrap().str().unwrap();
    assert_eq!(dates.get(0), Some("2020-01-22"));
    let continent = df.column("continent").unwrap().str().unwrap();
    assert_eq!(continent.get(0), Some("Asia"));
}

#[test]
fn csv_quotes_names_with_commas() {
    let bytes = csv_bytes(&enriched_frame(&[record()]).unwrap()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("date,country,continent,"));
    assert!(lines.next().unwrap().starts_with("2020-01-22,\"Korea, South\",Asia,100,1,2,"));
}

#[test]
fn pivot_frame_leads_with_date() {
    let day = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap();
    let table = PivotTable::from_cells(vec![
        ((day, "North America".to_string()), 7),
        ((day, "Asia".to_string()), 3),
    ]);
    let df = pivot_frame(&table).unwrap();
    assert_eq!(df.shape(), (1, 3));

    let text = String::from_utf8(csv_bytes(&df).unwrap()).unwrap();
    assert_eq!(text, "date,Asia,North America\n2020-01-22,3,7\n");
}

#[test]
fn aggregate_is_a_single_element_array() {
    let aggregate = GlobalAggregate {
        label_date: "22 Jan 2020".to_string(),
        total_confirmed: 1,
        total_recovered: 2,
        total_deaths: 3,
    };
    let value: serde_json::Value = serde_json::from_slice(&aggregate_json(&aggregate).unwrap()).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["label_date"], "22 Jan 2020");
    assert_eq!(items[0]["total_deaths"], 3);
}

#[test]
fn written_artifacts_hash_their_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("out/nested");
    let digests = write_artifacts(&nested, &[Artifact::new("a.txt", b"hello".to_vec())]).unwrap();

    assert_eq!(std::fs::read(nested.join("a.txt")).unwrap(), b"hello");
    assert_eq!(digests[0].path, "a.txt");
    assert_eq!(digests[0].bytes, 5);
    assert_eq!(digests[0].blake3, blake3::hash(b"hello").to_hex().to_string());
}

#[test]
fn failed_write_leaves_no_partial_outputs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".b.txt.partial")).unwrap();

    let result = write_artifacts(
        dir.path(),
        &[
            Artifact::new("a.txt", b"first".to_vec()),
            Artifact::new("b.txt", b"second".to_vec()),
        ],
    );

    assert!(result.is_err());
    assert!(!dir.path().join("a.txt").exists());
    assert!(!dir.path().join(".a.txt.partial").exists());
    assert!(!dir.path().join("b.txt").exists());
}
