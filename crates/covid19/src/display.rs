use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use covid19_core::PipelineRun;

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold))
        .collect()
}

pub fn print_run(run: &PipelineRun) {
    let aggregate = &run.aggregate;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Date", "Confirmed", "Recovered", "Deaths"]))
        .add_row(vec![
            aggregate.label_date.clone(),
            aggregate.total_confirmed.to_string(),
            aggregate.total_recovered.to_string(),
            aggregate.total_deaths.to_string(),
        ]);
    println!("{table}");

    let summary = &run.manifest.summary;
    println!(
        "{} rows written to {}; {} cruise rows removed",
        summary.output_rows,
        run.output_dir.display(),
        summary.sanitize.cruise_removed
    );
    if !summary.join.unmatched_countries.is_empty() {
        println!(
            "dropped (no reference row): {}",
            summary.join.unmatched_countries.join(", ")
        );
    }
}

pub fn print_classification(rows: &[(String, String)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(header(&["Country", "Continent"]));
    for (country, continent) in rows {
        table.add_row(vec![country.as_str(), continent.as_str()]);
    }
    println!("{table}");
}
