pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use model::{CountryRow, ReferenceRecord, ReferenceTable, TimeSeriesTable};
pub use registry::{parse_reference_table, parse_time_series, parse_with_parsers, TableParser};

#[cfg(test)]
mod tests;
