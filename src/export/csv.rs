use crate::export::{ExportError, ExportFormat};
use crate::flatten::ConversionResult;
use std::io::Write;

/// Writes the header of `summary.columns` and one record per row.
///
/// Fields holding a comma, quote or newline are quoted with inner quotes doubled.
pub fn write_csv<W: Write>(result: &ConversionResult, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(&result.summary.columns)?;
    for row in &result.rows {
        csv_writer.write_record(result.summary.columns.iter().map(|column| row.field(column)))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(result: &ConversionResult) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();
    write_csv(result, &mut buffer).map_err(|error| ExportError::new(ExportFormat::Csv, error))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::row::tests::sample_row;
    use crate::flatten::summarize;

    #[test]
    fn quotes_fields() -> Result<(), ExportError> {
        let mut row = sample_row();
        row.product = "Cars, \"EV\"".into();
        let result = ConversionResult { summary: summarize(&[row.clone()]), rows: vec![row], log: vec![] };
        let text = String::from_utf8_lossy(&to_csv_bytes(&result)?).into_owned();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Title,Regions,Country,Segments,Units,Product,2021,2024,CAGR"));
        assert_eq!(
            lines.next(),
            Some("\"EV Market, By Region\",North America,,Region,(USD Billion),\"Cars, \"\"EV\"\"\",120.50,210.75,20.48")
        );
        Ok(())
    }
}
