//! Supported response languages and the script-range language detector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A response language. Anything unrecognized reads as English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Kannada,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Kannada];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Kannada => "kannada",
        }
    }

    /// ISO 639-1 code used by the speech services.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Kannada => "kn",
        }
    }

    /// Display name used inside prompts ("Hindi", "Kannada").
    pub fn title(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Kannada => "Kannada",
        }
    }

    /// Lenient parse: accepts names and codes in any case; unsupported values are English.
    pub fn from_name(name: &str) -> Language {
        match name.trim().to_lowercase().as_str() {
            "hindi" | "hi" => Language::Hindi,
            "kannada" | "kn" => Language::Kannada,
            _ => Language::English,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language selection for inbound speech or text: detect from the script, or trust the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanguageMode {
    #[default]
    Auto,
    Fixed(Language),
}

impl LanguageMode {
    /// `"auto"` selects detection; everything else goes through [`Language::from_name`].
    pub fn from_name(name: &str) -> LanguageMode {
        if name.trim().eq_ignore_ascii_case("auto") {
            LanguageMode::Auto
        } else {
            LanguageMode::Fixed(Language::from_name(name))
        }
    }

    /// Resolve against the text the mode applies to.
    pub fn resolve(&self, text: &str) -> Language {
        match self {
            LanguageMode::Auto => detect_language(text),
            LanguageMode::Fixed(language) => *language,
        }
    }

    /// Language hint for the speech-to-text service (`None` lets it detect).
    pub fn hint(&self) -> Option<Language> {
        match self {
            LanguageMode::Auto => None,
            LanguageMode::Fixed(language) => Some(*language),
        }
    }
}

fn is_kannada(c: char) -> bool {
    ('\u{0C80}'..='\u{0CFF}').contains(&c)
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Classify text by script. Any Kannada character wins over Devanagari; Latin or empty text is
/// English.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_kannada) {
        Language::Kannada
    } else if text.chars().any(is_devanagari) {
        Language::Hindi
    } else {
        Language::English
    }
}
