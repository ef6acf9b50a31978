use thiserror::Error;

/// Main error type for the sheet flattener.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum FlattenerError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    ParseFloatError(#[from] std::num::ParseFloatError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    OdsError(#[from] crate::spreadsheet::ods::OdsError),
}

/// Fatal failure of a conversion run.
///
/// Everything that can go wrong while decoding the input workbook collapses
/// into [`ConversionError::Parse`]; the decoder message is kept verbatim.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Parse '{file_name}' failed: {message}")]
    Parse { file_name: String, message: String },
}

impl ConversionError {
    pub(crate) fn parse(file_name: &str, error: FlattenerError) -> Self {
        ConversionError::Parse {
            file_name: file_name.to_owned(),
            message: error.to_string(),
        }
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, FlattenerError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| FlattenerError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_keeps_inner_message() {
        let result: Result<(), FlattenerError> =
            Err(crate::spreadsheet::SpreadsheetError::FileError("xl/workbook.xml".to_owned()).into());
        let message = result.with_prefix("Sheet 'Data'").unwrap_err().to_string();
        assert_eq!(message, "Sheet 'Data': Missing archive entry 'xl/workbook.xml'");
    }

    #[test]
    fn parse_error_carries_decoder_message() {
        let error = ConversionError::parse("notes.txt", FlattenerError::WithContextError("invalid Zip archive".to_owned()));
        assert_eq!(error.to_string(), "Parse 'notes.txt' failed: invalid Zip archive");
    }
}
