/// Result-language hint sent to the search API.
///
/// Detected language labels are free-form model output, so the mapping is a
/// closed table: only the exact label `"Polish"` selects [`Locale::Pl`];
/// every other label falls back to [`Locale::En`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    Pl,
    #[default]
    En,
}

const LANGUAGE_TABLE: &[(&str, Locale)] = &[("Polish", Locale::Pl)];

impl Locale {
    pub fn from_language(label: &str) -> Self {
        LANGUAGE_TABLE
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, locale)| *locale)
            .unwrap_or_default()
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Pl => "pl",
            Locale::En => "en",
        }
    }
}
