/// Placeholder used when no key of the table occurs in a summary
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Vendor title tokens and the Portuguese place names that replace them.
///
/// Order matters: the first key contained in a summary wins.
const FORMULA1_LOCATIONS: &[(&str, &str)] = &[
    ("BAHRAIN", "Bahrain"),
    ("SAUDI ARABIAN", "Arábia Saudita"),
    ("AUSTRALIAN", "Austrália"),
    ("JAPANESE", "Japão"),
    ("CHINESE", "China"),
    ("MIAMI", "Miami, EUA"),
    ("MADE IN ITALY E DELL'EMILIA-ROMAGNA", "Emilia-Romagna, Itália"),
    ("MONACO", "Mônaco"),
    ("CANADA", "Canadá"),
    ("ESPAÑA", "Espanha"),
    ("AUSTRIAN", "Áustria"),
    ("BRITISH", "Reino Unido"),
    ("HUNGARIAN", "Hungria"),
    ("BELGIAN", "Bélgica"),
    ("DUTCH", "Holanda"),
    ("D`ITALIA", "Itália"),
    ("AZERBAIJAN", "Azerbaijão"),
    ("SINGAPORE", "Singapura"),
    ("UNITED STATES", "Estados Unidos"),
    ("CIUDAD DE MÉXICO", "Cidade do México, México"),
    ("SÃO PAULO", "São Paulo, Brasil"),
    ("LAS VEGAS", "Las Vegas, EUA"),
    ("QATAR", "Qatar"),
    ("ABU DHABI", "Abu Dhabi, Emirados Árabes Unidos"),
];

/// Ordered substring lookup from vendor tokens to display names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTable {
    entries: Vec<(String, String)>,
}

impl LocationTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, name)| (key.into(), name.into()))
                .collect(),
        }
    }

    /// The Formula 1 season table
    pub fn formula1() -> Self {
        Self::new(FORMULA1_LOCATIONS.iter().copied())
    }

    /// Display name for the first key, in table order, found in `summary`
    pub fn resolve(&self, summary: &str) -> &str {
        self.entries
            .iter()
            .find(|(key, _)| summary.contains(key.as_str()))
            .map(|(_, name)| name.as_str())
            .unwrap_or(UNKNOWN_LOCATION)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::formula1()
    }
}
