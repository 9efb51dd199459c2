use serde::{Deserialize, Serialize};

use crate::domain::language::Language;

/// A display string stored either as a plain string or as a bilingual
/// `{en, hi?}` object. The two JSON shapes coexist in the data this service
/// inherited, so both deserialize transparently; `en` is mandatory in the
/// object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Bilingual {
        en: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hi: Option<String>,
    },
}

impl LocalizedText {
    pub fn plain(text: impl Into<String>) -> Self {
        LocalizedText::Plain(text.into())
    }

    pub fn bilingual(en: impl Into<String>, hi: impl Into<String>) -> Self {
        LocalizedText::Bilingual {
            en: en.into(),
            hi: Some(hi.into()),
        }
    }

    pub fn english(en: impl Into<String>) -> Self {
        LocalizedText::Bilingual {
            en: en.into(),
            hi: None,
        }
    }

    /// The primary-language (`en`) rendering; for plain strings, the string
    /// itself. Used for deterministic ordering.
    pub fn primary(&self) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Bilingual { en, .. } => en,
        }
    }

    /// Render for the requested language: the language's entry when present
    /// and non-empty, otherwise the primary entry. Plain strings ignore the
    /// requested language.
    pub fn localize(&self, lang: Language) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Bilingual { en, hi } => match lang {
                Language::En => en,
                Language::Hi => match hi.as_deref() {
                    Some(text) if !text.is_empty() => text,
                    _ => en,
                },
            },
        }
    }

    /// The canonical storage form: plain strings become `{en: ...}` objects
    /// so JSONB columns can be queried uniformly by language key.
    pub fn canonical(&self) -> LocalizedText {
        match self {
            LocalizedText::Plain(text) => LocalizedText::Bilingual {
                en: text.clone(),
                hi: None,
            },
            other => other.clone(),
        }
    }

    fn entries(&self) -> (&str, Option<&str>) {
        match self {
            LocalizedText::Plain(text) => (text, None),
            LocalizedText::Bilingual { en, hi } => (en, hi.as_deref()),
        }
    }

    /// Case-insensitive equality against either language's entry.
    pub fn matches_ci(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let (en, hi) = self.entries();
        en.to_lowercase() == needle || hi.is_some_and(|h| h.to_lowercase() == needle)
    }

    /// Case-insensitive substring search against either language's entry.
    pub fn contains_ci(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        let (en, hi) = self.entries();
        en.to_lowercase().contains(&needle)
            || hi.is_some_and(|h| h.to_lowercase().contains(&needle))
    }
}

/// Total localization helper: absent text renders as the empty string, never
/// an error.
pub fn localize(text: Option<&LocalizedText>, lang: Language) -> String {
    text.map(|t| t.localize(lang).to_string()).unwrap_or_default()
}
