//! CSV rendering of the collated table.

use super::OutputError;
use crate::domain::CollatedTable;
use csv::{QuoteStyle, Terminator, WriterBuilder};

/// Render the table as comma-separated rows joined by CRLF, header first.
///
/// Fields are never quoted: every field is a date, a ticker, or a number.
/// There is no line terminator after the last row.
pub fn to_csv(table: &CollatedTable) -> Result<String, OutputError> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Never)
        .from_writer(vec![]);

    for record in table.records() {
        wtr.write_record(&record)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| OutputError::Csv(format!("failed to flush CSV writer: {e}")))?;
    let mut text =
        String::from_utf8(data).map_err(|e| OutputError::Csv(format!("CSV output is not valid UTF-8: {e}")))?;
    if text.ends_with("\r\n") {
        text.truncate(text.len() - 2);
    }
    Ok(text)
}
