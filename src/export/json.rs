use crate::export::{ExportError, ExportFormat};
use crate::flatten::ConversionResult;

/// The full result, pretty-printed.
pub fn to_json_bytes(result: &ConversionResult) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(result).map_err(|error| ExportError::new(ExportFormat::Json, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::row::tests::sample_row;
    use crate::flatten::{summarize, ProcessingEvent};

    #[test]
    fn full_result() -> Result<(), Box<dyn std::error::Error>> {
        let row = sample_row();
        let result = ConversionResult {
            summary: summarize(&[row.clone()]),
            rows: vec![row],
            log: vec![ProcessingEvent::Completed { total_rows: 1 }],
        };
        let value: serde_json::Value = serde_json::from_slice(&to_json_bytes(&result)?)?;
        assert_eq!(value["summary"]["totalRows"], 1);
        assert_eq!(value["summary"]["countPerLevel"]["regional"], 1);
        assert_eq!(value["rows"][0]["Product"], "North America");
        assert_eq!(value["log"][0]["event"], "completed");
        Ok(())
    }
}
