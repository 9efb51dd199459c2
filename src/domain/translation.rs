use serde::{Deserialize, Serialize};

use crate::domain::language::Language;

/// One UI string with its English source text and optional Hindi rendering.
/// Keys are dot-paths ("home.title", "catalog.empty").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub key: String,
    pub en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hi: Option<String>,
}

impl TranslationEntry {
    /// Text for the requested language, falling back to English when the
    /// Hindi side is missing or empty.
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::Hi => match &self.hi {
                Some(hi) if !hi.is_empty() => hi,
                _ => &self.en,
            },
            Language::En => &self.en,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hindi_side_wins_when_present() {
        let entry = TranslationEntry {
            key: "home.title".into(),
            en: "Today's Prices".into(),
            hi: Some("आज के भाव".into()),
        };
        assert_eq!(entry.text(Language::Hi), "आज के भाव");
        assert_eq!(entry.text(Language::En), "Today's Prices");
    }

    #[test]
    fn missing_or_empty_hindi_falls_back_to_english() {
        let mut entry = TranslationEntry {
            key: "catalog.empty".into(),
            en: "No products found".into(),
            hi: None,
        };
        assert_eq!(entry.text(Language::Hi), "No products found");
        entry.hi = Some(String::new());
        assert_eq!(entry.text(Language::Hi), "No products found");
    }
}
