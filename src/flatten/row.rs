use crate::metric::YearValues;
use crate::semantic::Level;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Dimension columns leading every output table
pub const DIMENSION_COLUMNS: [&str; 6] = ["Title", "Regions", "Country", "Segments", "Units", "Product"];
pub const CAGR_COLUMN: &str = "CAGR";

/// One normalized output record.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRow {
    pub id: String,
    pub title: String,
    pub regions: String,
    pub country: String,
    pub segments: String,
    pub units: String,
    pub product: String,
    /// Canonical axis years plus any other year found in the source
    pub years: YearValues,
    pub cagr: String,
    pub source_sheet: String,
    /// 0-based row index in the source sheet
    pub source_row: usize,
    pub level: Level,
}

impl FlatRow {
    /// Value of an output column; unknown columns read as empty.
    pub fn field(&self, column: &str) -> &str {
        match column {
            "Title" => &self.title,
            "Regions" => &self.regions,
            "Country" => &self.country,
            "Segments" => &self.segments,
            "Units" => &self.units,
            "Product" => &self.product,
            CAGR_COLUMN => &self.cagr,
            year => year
                .parse::<u16>()
                .ok()
                .and_then(|year| self.years.get(&year))
                .map_or("", String::as_str),
        }
    }

    pub fn has_values(&self) -> bool {
        self.years.values().any(|value| !value.is_empty())
    }

    /// Key of the duplicate check.
    pub(crate) fn identity(&self) -> (String, String, String, Level) {
        (self.segments.clone(), self.product.clone(), self.source_sheet.clone(), self.level)
    }
}

impl Serialize for FlatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.years.len() + 11))?;
        map.serialize_entry("id", &self.id)?;
        for column in DIMENSION_COLUMNS {
            map.serialize_entry(column, self.field(column))?;
        }
        for (year, value) in &self.years {
            map.serialize_entry(&year.to_string(), value)?;
        }
        map.serialize_entry(CAGR_COLUMN, &self.cagr)?;
        map.serialize_entry("sourceSheet", &self.source_sheet)?;
        map.serialize_entry("sourceRow", &self.source_row)?;
        map.serialize_entry("level", &self.level)?;
        map.end()
    }
}
