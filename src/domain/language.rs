use serde::{Deserialize, Serialize};

/// Languages the catalog can render. English is the primary language: every
/// bilingual field is required to carry an `en` entry, so `En` is always a
/// safe fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Parse a language query parameter. Tolerant of case and region tags
    /// (`hi-IN` -> `Hi`); anything unrecognized falls back to English rather
    /// than erroring, so a bad `lang` value never fails a request.
    pub fn from_code(code: Option<&str>) -> Self {
        let Some(raw) = code else {
            return Language::En;
        };
        let normalized = raw.trim().to_ascii_lowercase();
        let base = normalized.split(['-', '_']).next().unwrap_or("");
        match base {
            "hi" => Language::Hi,
            _ => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_codes_parse_case_insensitively() {
        assert_eq!(Language::from_code(Some("hi")), Language::Hi);
        assert_eq!(Language::from_code(Some("HI")), Language::Hi);
        assert_eq!(Language::from_code(Some("en")), Language::En);
        assert_eq!(Language::from_code(Some(" hi-IN ")), Language::Hi);
    }

    #[test]
    fn unrecognized_codes_fall_back_to_english() {
        assert_eq!(Language::from_code(Some("fr")), Language::En);
        assert_eq!(Language::from_code(Some("")), Language::En);
        assert_eq!(Language::from_code(None), Language::En);
    }
}
