use crate::error::FlattenerError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::RawCell;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Archive;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::io::BufRead;
use thiserror::Error;

/// ODS file MIME type identifier
pub(crate) const MIME_TYPE: &[u8] = b"application/vnd.oasis.opendocument.spreadsheet";
/// XML element name for spreadsheet root
const SPREADSHEET: QName = QName(b"office:spreadsheet");
/// XML element name for table (sheet)
const TABLE: QName = QName(b"table:table");
/// XML element name for table row
const TABLE_ROW: QName = QName(b"table:table-row");
/// XML element name for table cell
const TABLE_CELL: QName = QName(b"table:table-cell");
/// XML element name for covered table cell (merged cells)
const TABLE_COVERED_CELL: QName = QName(b"table:covered-table-cell");
/// XML element name for annotations (comments)
const ANNOTATION: QName = QName(b"office:annotation");
/// XML element name for paragraph text
const PARAGRAPH: QName = QName(b"text:p");
/// XML element name for string (space) text
const STRING: QName = QName(b"text:s");

#[derive(Error, Debug)]
pub enum OdsError {
    #[error("Invalid ODS MIME type")]
    MimeTypeError,

    #[error("Password protected ODS file")]
    PasswordProtectedError,
}

/// OpenDocument spreadsheet (.ods)
pub(crate) struct OdsSpreadsheet {
    /// Declared file name of the upload
    pub(crate) name: String,
    zip: Archive,
}

impl OdsSpreadsheet {
    /// Validates the MIME type and encryption manifest of an ODS package.
    pub(crate) fn open(file_name: &str, mut zip: Archive) -> Result<Self, FlattenerError> {
        if !is_ods(&mut zip)? {
            Err(OdsError::MimeTypeError)?;
        }
        if is_password_protected(&mut zip)? {
            Err(OdsError::PasswordProtectedError)?;
        }
        Ok(OdsSpreadsheet {
            name: file_name.to_owned(),
            zip,
        })
    }
}

impl Spreadsheet for OdsSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    /// ODS stores strings inline, so there is no shared string table.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, FlattenerError> {
        Ok(Vec::new())
    }

    fn read_sheets(&mut self, criteria: &Criteria) -> Result<Vec<Sheet>, FlattenerError> {
        let mut sheets = Vec::<Sheet>::new();
        let mut reader = self.zip
            .xml_reader("content.xml")?
            .ok_or_else(|| SpreadsheetError::FileError("content.xml".to_owned()))?;
        'sheets: loop {
            let mut sheet_name = None::<String>;
            match_xml_events!(reader => {
                Event::End(event) if event.name() == SPREADSHEET => break 'sheets,
                Event::Start(event) if event.name() == TABLE => {
                    let name = event.get_attribute_value("table:name")?
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| format!("Sheet{}", sheets.len() + 1));
                    if criteria.reached_sheet_limit(sheets.len()) {
                        break 'sheets;
                    } else if criteria.accept(&name) {
                        sheet_name = Some(name);
                        break;
                    }
                }
            });
            let Some(sheet_name) = sheet_name else {
                break;
            };
            let mut sheet = Sheet::new(&sheet_name, criteria.rows_limit);
            read_table(&mut reader, &mut sheet)
                .with_prefix(&format!("Read sheet '{}'", sheet_name))?;
            sheets.push(sheet);
        }

        Ok(sheets)
    }
}

/// Streams one `table:table` element into `sheet`, expanding repeated rows and columns.
fn read_table<R: BufRead>(reader: &mut XmlReader<R>, sheet: &mut Sheet) -> Result<(), FlattenerError> {
    let mut row = 0usize;
    let mut col = 0usize;
    let mut row_count = 1usize;
    let mut col_count = 1usize;
    let mut kind = CellType::default();
    let mut value = String::new();
    let mut element_context = false; // reading text children of a string cell
    let mut comment_context = false; // inside an annotation
    let mut is_past_limit = false;
    match_xml_events!(reader => {
        Event::End(event) if event.name() == TABLE => break,
        Event::Start(event) if event.name() == TABLE_ROW => {
            row_count = event.parse_attribute_value("table:number-rows-repeated")?.unwrap_or(1);
            col = 0;
        }
        Event::End(event) if event.name() == TABLE_ROW => {
            row = row.saturating_add(row_count);
            is_past_limit = is_past_limit || sheet.after_row_upper_bound(row);
        }
        Event::Start(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
            value.clear();
            col_count = event.parse_attribute_value::<usize>("table:number-columns-repeated")?.unwrap_or(1);
            kind = CellType::Empty;
            if let Some(value_type) = event.get_attribute_value("office:value-type")? {
                match value_type.as_ref() {
                    "boolean" => {
                        kind = CellType::Boolean;
                        let is_true = event.get_attribute_value("office:boolean-value")?
                            .map(|flag| flag != "false" && flag != "0")
                            .unwrap_or(false);
                        value.push(if is_true { '1' } else { '0' });
                    }
                    "date" => {
                        kind = CellType::IsoDateTime;
                        if let Some(data) = event.get_attribute_value("office:date-value")? {
                            value.push_str(&data);
                        }
                    }
                    "time" => {
                        kind = CellType::IsoDuration;
                        if let Some(data) = event.get_attribute_value("office:time-value")? {
                            value.push_str(&data);
                        }
                    }
                    "string" => {
                        let is_error = event.get_attribute_value("calcext:value-type")?
                            .map(|cow| cow == "error")
                            .unwrap_or(false);
                        kind = if is_error { CellType::Error } else { CellType::InlineString };
                        element_context = !is_error;
                    }
                    _ => {
                        kind = CellType::Number;
                        if let Some(data) = event.get_attribute_value("office:value")? {
                            value.push_str(&data);
                        }
                    }
                }
            }
        }
        Event::End(event) if event.name() == TABLE_CELL || event.name() == TABLE_COVERED_CELL => {
            if !is_past_limit && kind != CellType::Empty && kind != CellType::Error && !value.is_empty() {
                let last_row = row.saturating_add(row_count.max(1) - 1);
                let last_row = sheet.limit().map_or(last_row, |limit| last_row.min(limit.saturating_sub(1)));
                sheet.ensure_fits(last_row, col.saturating_add(col_count.max(1) - 1))?;
                for row_number in row..row.saturating_add(row_count) {
                    if sheet.after_row_upper_bound(row_number) {
                        break;
                    }
                    for col_number in col..col.saturating_add(col_count) {
                        sheet.push(RawCell {
                            row: row_number,
                            col: col_number,
                            kind,
                            value: value.to_owned(),
                        })?;
                    }
                }
            }
            col = col.saturating_add(col_count);
            element_context = false;
            comment_context = false;
        }
        Event::Start(event) if element_context && event.name() == ANNOTATION => comment_context = true,
        Event::End(event) if element_context && comment_context && event.name() == ANNOTATION => comment_context = false,
        Event::Start(event) if element_context && !comment_context && event.name() == PARAGRAPH => {
            if !value.is_empty() {
                value.push('\n');
            }
        }
        Event::Start(event) if element_context && !comment_context && event.name() == STRING => {
            let count = event.parse_attribute_value("text:c")?.unwrap_or(1);
            for _ in 0..count {
                value.push(' ');
            }
        }
        Event::Text(event) if element_context && !comment_context => value.push_bytes_text(&event)?,
        Event::GeneralRef(event) if element_context && !comment_context => value.push_bytes_ref(&event)?,
    });
    Ok(())
}

/// Checks the `mimetype` entry; packages without it are accepted when they carry content.xml.
pub(crate) fn is_ods(zip: &mut Archive) -> Result<bool, FlattenerError> {
    match zip.read_bytes("mimetype")? {
        Some(bytes) => Ok(bytes.starts_with(MIME_TYPE)),
        None => Ok(zip.contains("content.xml")),
    }
}

/// Checks the manifest for encryption data on any file entry.
fn is_password_protected(zip: &mut Archive) -> Result<bool, FlattenerError> {
    let mut reader = match zip.xml_reader("META-INF/manifest.xml")? {
        Some(reader) => reader,
        None => return Ok(false),
    };
    let mut in_file_entry = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == QName(b"manifest:file-entry") => in_file_entry = true,
        Event::End(event) if event.name() == QName(b"manifest:file-entry") => in_file_entry = false,
        Event::Start(event) if in_file_entry && event.name() == QName(b"manifest:encryption-data") => {
            return Ok(true);
        }
    });
    Ok(false)
}
