//! Geographic classification of rows.
use crate::semantic::rules::{Place, GEOGRAPHY, PRODUCT_AXIS};
use serde::Serialize;
use std::fmt::Display;

/// Granularity of a flattened row; exactly one per row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Global,
    Regional,
    Country,
    Product,
    Segment,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Global => "global",
            Level::Regional => "regional",
            Level::Country => "country",
            Level::Product => "product",
            Level::Segment => "segment",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geography {
    pub level: Level,
    pub regions: String,
    pub country: String,
}

impl Geography {
    fn from_place(place: Place) -> Self {
        match place {
            Place::Global => Geography { level: Level::Global, regions: "Global".to_string(), country: String::new() },
            Place::Country { name, region } => {
                Geography { level: Level::Country, regions: region.to_string(), country: name.to_string() }
            }
            Place::Region { name } => {
                Geography { level: Level::Regional, regions: name.to_string(), country: String::new() }
            }
        }
    }
}

/// Classifies a row by its sheet name and label.
///
/// Both are matched together against the geography rules in their order,
/// so a "global" sheet makes every row global and a country beats a region.
/// Rows matching no rule are segment rows, or product rows when their axis
/// names a product.
pub fn classify(label: &str, sheet_name: &str, segments: &str) -> Geography {
    let combined = format!("{} {}", sheet_name, label);
    match GEOGRAPHY.first_match(&combined) {
        Some(rule) => Geography::from_place(rule.outcome),
        None => {
            let level = match PRODUCT_AXIS.first_match(segments) {
                Some(_) => Level::Product,
                None => Level::Segment,
            };
            Geography { level, regions: String::new(), country: String::new() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::rules::{ASIA_PACIFIC, NORTH_AMERICA};

    #[test]
    fn regional_row() {
        let geography = classify("North America", "EV Market, By Region, 2021-2034 (USD Billion)", "Region");
        assert_eq!(geography.level, Level::Regional);
        assert_eq!(geography.regions, NORTH_AMERICA);
        assert_eq!(geography.country, "");
    }

    #[test]
    fn country_row_carries_region() {
        let geography = classify("Japan", "Battery Market by Country", "Country");
        assert_eq!(geography, Geography { level: Level::Country, regions: ASIA_PACIFIC.into(), country: "Japan".into() });
    }

    #[test]
    fn global_sheet_overrides_label() {
        let geography = classify("Europe", "Global EV Market", "");
        assert_eq!(geography.level, Level::Global);
        assert_eq!(geography.regions, "Global");
        let geography = classify("Passenger Cars", "Worldwide Sales", "Vehicle");
        assert_eq!(geography.level, Level::Global);
        let geography = classify("Europe", "Germany EV Market", "");
        assert_eq!(geography.level, Level::Country);
        assert_eq!(geography.country, "Germany");
    }

    #[test]
    fn fallback_levels() {
        assert_eq!(classify("Lithium-ion", "Battery Market", "Chemistry").level, Level::Segment);
        assert_eq!(classify("Model X", "Sales", "Product").level, Level::Product);
        assert_eq!(classify("Model X", "Sales", "").level, Level::Segment);
    }

    #[test]
    fn levels_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Level::Regional).ok().as_deref(), Some("\"regional\""));
        assert_eq!(Level::Country.to_string(), "country");
    }
}
