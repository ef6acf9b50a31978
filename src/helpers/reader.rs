//! Container sniffing for uploaded workbook bytes.
//!
//! The declared file name of an upload is metadata only, so the reader picks
//! a decoder from the leading signature bytes instead of the extension.

/// Local file header signature of a ZIP archive (`PK\x03\x04`)
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
/// Signature of an empty ZIP archive (`PK\x05\x06`)
const EMPTY_ZIP_SIGNATURE: &[u8] = b"PK\x05\x06";
/// OLE2 compound file signature used by legacy .xls and encrypted OOXML files
const COMPOUND_FILE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Container {
    /// ZIP package: Office Open XML or OpenDocument
    Zip,
    /// OLE2 compound file: legacy BIFF workbook or password protected package
    CompoundFile,
    /// Anything else; handed to the ZIP decoder so its message surfaces
    Unknown,
}

impl Container {
    pub(crate) fn sniff(bytes: &[u8]) -> Container {
        if bytes.starts_with(ZIP_SIGNATURE) || bytes.starts_with(EMPTY_ZIP_SIGNATURE) {
            Container::Zip
        } else if bytes.starts_with(COMPOUND_FILE_SIGNATURE) {
            Container::CompoundFile
        } else {
            Container::Unknown
        }
    }
}
