mod common;
mod country_reference;
mod country_time_series;
mod jhu_lookup;
mod jhu_time_series;

pub use common::{parse_coordinate, parse_count, parse_population};
pub use country_reference::CountryReferenceParser;
pub use country_time_series::CountryTimeSeriesParser;
pub use jhu_lookup::JhuLookupParser;
pub use jhu_time_series::JhuTimeSeriesParser;

pub(crate) use common::{
    clean_optional, column_index, date_columns, expect_leading_columns, open_reader,
    parse_values, read_header, require_columns, required_name, CountryFolder,
};
