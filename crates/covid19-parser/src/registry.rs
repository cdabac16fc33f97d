use crate::errors::{ParserAttempt, ParserError};
use crate::formats::{
    CountryReferenceParser, CountryTimeSeriesParser, JhuLookupParser, JhuTimeSeriesParser,
};
use crate::model::{ReferenceTable, TimeSeriesTable};

pub trait TableParser {
    type Output;

    fn name(&self) -> &'static str;
    fn parse(&self, content: &str) -> Result<Self::Output, ParserError>;
}

/// Parses a wide confirmed/recovered/deaths table in any known layout.
pub fn parse_time_series(content: &str) -> Result<TimeSeriesTable, ParserError> {
    let jhu = JhuTimeSeriesParser;
    let country = CountryTimeSeriesParser;
    let parsers: [&dyn TableParser<Output = TimeSeriesTable>; 2] = [&jhu, &country];
    parse_with_parsers(content, &parsers)
}

/// Parses the population/coordinate reference table in any known layout.
pub fn parse_reference_table(content: &str) -> Result<ReferenceTable, ParserError> {
    let jhu = JhuLookupParser;
    let country = CountryReferenceParser;
    let parsers: [&dyn TableParser<Output = ReferenceTable>; 2] = [&jhu, &country];
    parse_with_parsers(content, &parsers)
}

pub fn parse_with_parsers<T>(
    content: &str,
    parsers: &[&dyn TableParser<Output = T>],
) -> Result<T, ParserError> {
    let mut attempts = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(parsed) => return Ok(parsed),
            Err(ParserError::FormatMismatch { reason, .. }) => {
                attempts.push(ParserAttempt::new(parser.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ParserError::NoMatchingParser { attempts })
}
