//! ZIP archive helpers for the zip-based workbook containers (.xlsx, .ods).

use crate::error::FlattenerError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Gets a file from the archive by name (case-insensitive, path separator agnostic)
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, FlattenerError>;

    /// Returns true when the archive holds an entry with this name
    fn contains(&self, name: &str) -> bool;

    /// Reads a whole entry into memory
    fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>, FlattenerError>;

    /// Creates an XML reader over an entry
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, FlattenerError>;
}

fn normalize(name: &str) -> String {
    name.replace('\\', "/")
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, FlattenerError> {
        let pattern = normalize(name);
        let path = self.file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(file_name))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn contains(&self, name: &str) -> bool {
        let pattern = normalize(name);
        self.file_names().any(|file_name| pattern.eq_ignore_ascii_case(file_name))
    }

    fn read_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>, FlattenerError> {
        match self.file(name)? {
            Some(mut file) => {
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, FlattenerError> {
        let reader = self
            .file(name)?
            .map(|file| XmlReader::new(BufReader::new(file)));
        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive() -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("xl/Workbook.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<workbook/>").unwrap();
        let cursor = writer.finish().unwrap();
        ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap()
    }

    #[test]
    fn lookup_ignores_case_and_separator() {
        let mut zip = archive();
        assert!(zip.contains("xl\\workbook.xml"));
        assert_eq!(zip.read_bytes("XL/WORKBOOK.XML").unwrap().unwrap(), b"<workbook/>");
    }

    #[test]
    fn missing_entry_is_none() {
        let mut zip = archive();
        assert!(!zip.contains("content.xml"));
        assert!(zip.read_bytes("content.xml").unwrap().is_none());
        assert!(zip.xml_reader("content.xml").unwrap().is_none());
    }
}
