//! Ordered first-match-wins keyword rules.
use regex::Regex;
use std::sync::LazyLock;

/// One `(pattern, outcome)` entry of a rule list.
#[derive(Debug)]
pub struct Rule<T> {
    pub name: &'static str,
    pattern: Regex,
    pub outcome: T,
}

#[derive(Debug)]
pub struct RuleSet<T> {
    rules: Vec<Rule<T>>,
}

impl<T> RuleSet<T> {
    /// Builds a rule list from hardcoded case-insensitive patterns.
    fn new(entries: Vec<(&'static str, &'static str, T)>) -> Self {
        let rules = entries
            .into_iter()
            .map(|(name, pattern, outcome)| Rule {
                name,
                pattern: Regex::new(&format!("(?i){}", pattern)).expect("Hardcode regex pattern"),
                outcome,
            })
            .collect();
        RuleSet { rules }
    }

    pub fn first_match(&self, text: &str) -> Option<&Rule<T>> {
        self.rules.iter().find(|rule| rule.pattern.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Geographic outcome of a rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Place {
    Global,
    Country { name: &'static str, region: &'static str },
    Region { name: &'static str },
}

pub const NORTH_AMERICA: &str = "North America";
pub const EUROPE: &str = "Europe";
pub const ASIA_PACIFIC: &str = "Asia Pacific";
pub const LATIN_AMERICA: &str = "Latin America";
pub const MIDDLE_EAST_AFRICA: &str = "Middle East & Africa";

fn country(name: &'static str, pattern: &'static str, region: &'static str) -> (&'static str, &'static str, Place) {
    ("country", pattern, Place::Country { name, region })
}

fn region(name: &'static str, pattern: &'static str) -> (&'static str, &'static str, Place) {
    ("region", pattern, Place::Region { name })
}

/// Global first, then countries, then regions.
pub static GEOGRAPHY: LazyLock<RuleSet<Place>> = LazyLock::new(|| {
    RuleSet::new(vec![
        ("global", r"\b(?:global|worldwide)\b", Place::Global),
        country("United States", r"\b(?:united states|u\.s\.a?\.?|usa)(?:\W|$)|\b(?-i:US)\b", NORTH_AMERICA),
        country("Canada", r"\bcanada\b", NORTH_AMERICA),
        country("Mexico", r"\bmexico\b", NORTH_AMERICA),
        country("United Kingdom", r"\b(?:united kingdom|great britain|britain|england)\b|\b(?-i:UK)\b|\b(?-i:U\.K\.)", EUROPE),
        country("Germany", r"\bgermany\b", EUROPE),
        country("France", r"\bfrance\b", EUROPE),
        country("Italy", r"\bitaly\b", EUROPE),
        country("Spain", r"\bspain\b", EUROPE),
        country("Netherlands", r"\b(?:netherlands|holland)\b", EUROPE),
        country("Belgium", r"\bbelgium\b", EUROPE),
        country("Switzerland", r"\bswitzerland\b", EUROPE),
        country("Sweden", r"\bsweden\b", EUROPE),
        country("Norway", r"\bnorway\b", EUROPE),
        country("Denmark", r"\bdenmark\b", EUROPE),
        country("Poland", r"\bpoland\b", EUROPE),
        country("Austria", r"\baustria\b", EUROPE),
        country("Russia", r"\brussia\b", EUROPE),
        country("China", r"\bchina\b", ASIA_PACIFIC),
        country("Japan", r"\bjapan\b", ASIA_PACIFIC),
        country("India", r"\bindia\b", ASIA_PACIFIC),
        country("South Korea", r"\b(?:south korea|korea)\b", ASIA_PACIFIC),
        country("Australia", r"\baustralia\b", ASIA_PACIFIC),
        country("New Zealand", r"\bnew zealand\b", ASIA_PACIFIC),
        country("Indonesia", r"\bindonesia\b", ASIA_PACIFIC),
        country("Singapore", r"\bsingapore\b", ASIA_PACIFIC),
        country("Thailand", r"\bthailand\b", ASIA_PACIFIC),
        country("Malaysia", r"\bmalaysia\b", ASIA_PACIFIC),
        country("Vietnam", r"\bviet\s?nam\b", ASIA_PACIFIC),
        country("Philippines", r"\bphilippines\b", ASIA_PACIFIC),
        country("Taiwan", r"\btaiwan\b", ASIA_PACIFIC),
        country("Brazil", r"\bbrazil\b", LATIN_AMERICA),
        country("Argentina", r"\bargentina\b", LATIN_AMERICA),
        country("Chile", r"\bchile\b", LATIN_AMERICA),
        country("Colombia", r"\bcolombia\b", LATIN_AMERICA),
        country("Peru", r"\bperu\b", LATIN_AMERICA),
        country("Saudi Arabia", r"\bsaudi arabia\b|\bksa\b", MIDDLE_EAST_AFRICA),
        country("United Arab Emirates", r"\b(?:united arab emirates|uae)\b", MIDDLE_EAST_AFRICA),
        country("South Africa", r"\bsouth africa\b", MIDDLE_EAST_AFRICA),
        country("Israel", r"\bisrael\b", MIDDLE_EAST_AFRICA),
        country("Egypt", r"\begypt\b", MIDDLE_EAST_AFRICA),
        country("Nigeria", r"\bnigeria\b", MIDDLE_EAST_AFRICA),
        country("Qatar", r"\bqatar\b", MIDDLE_EAST_AFRICA),
        region(NORTH_AMERICA, r"\bnorth america\b"),
        region(LATIN_AMERICA, r"\b(?:latin america|south america|central america|latam)\b"),
        region(EUROPE, r"\beurope(?:an)?\b"),
        region(ASIA_PACIFIC, r"\b(?:asia[\s-]?pacific|apac|asia)\b"),
        region(MIDDLE_EAST_AFRICA, r"\b(?:middle east|africa|mea|gcc)\b"),
    ])
});

/// Dimensions that name a product axis rather than a geography.
pub static PRODUCT_AXIS: LazyLock<RuleSet<()>> = LazyLock::new(|| {
    RuleSet::new(vec![
        ("product", r"\bproducts?\b", ()),
        ("brand", r"\bbrands?\b", ()),
    ])
});
