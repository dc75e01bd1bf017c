//! English ⇄ Hindi/Kannada translation through the completion endpoint, with an offline table
//! for common phrases.

use crate::dispatcher::{Dispatcher, Sampling};
use crate::language::{detect_language, Language, LanguageMode};
use crate::prompts::templates::{
    render, TRANSLATE_FROM_ENGLISH_TEMPLATE, TRANSLATE_TO_ENGLISH_TEMPLATE,
};
use crate::prompts::PromptBuilder;
use serde::Serialize;
use tracing::warn;

const TRANSLATION_SAMPLING: Sampling = Sampling::deterministic(500);

/// (English, Hindi, Kannada) for phrases answered without a model call.
const COMMON_PHRASES: [(&str, &str, &str); 6] = [
    ("Hello", "नमस्ते", "ನಮಸ್ಕಾರ"),
    ("Thank you", "धन्यवाद", "ಧನ್ಯವಾದಗಳು"),
    ("Yes", "हाँ", "ಹೌದು"),
    ("No", "नहीं", "ಇಲ್ಲ"),
    ("Please wait", "कृपया प्रतीक्षा करें", "ದಯವಿಟ್ಟು ಕಾಯಿರಿ"),
    ("Error occurred", "त्रुटि हुई", "ದೋಷ ಸಂಭವಿಸಿದೆ"),
];

/// Outcome of one translation. On failure `translated_text` holds the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub success: bool,
    pub translated_text: String,
    pub source_language: Language,
    pub target_language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Translation {
    fn unchanged(text: &str, language: Language) -> Self {
        Self {
            success: true,
            translated_text: text.to_string(),
            source_language: language,
            target_language: language,
            error: None,
        }
    }

    fn empty(source: Language, target: Language) -> Self {
        Self {
            success: false,
            translated_text: String::new(),
            source_language: source,
            target_language: target,
            error: Some("Empty text provided".to_string()),
        }
    }
}

/// Offline translation of a common English phrase (case-insensitive, exact match).
pub fn common_phrase(text: &str, target: Language) -> Option<&'static str> {
    let wanted = text.trim();
    COMMON_PHRASES
        .iter()
        .find(|(en, _, _)| en.eq_ignore_ascii_case(wanted))
        .map(|(en, hi, kn)| match target {
            Language::English => *en,
            Language::Hindi => *hi,
            Language::Kannada => *kn,
        })
}

fn register_hint(target: Language) -> &'static str {
    match target {
        Language::Hindi => "Use respectful Hindi suitable for rural banking customers in Karnataka. Use formal 'aap' forms.",
        Language::Kannada => "Use respectful Kannada suitable for rural banking customers in Karnataka. Use appropriate honorifics.",
        Language::English => "",
    }
}

#[derive(Clone)]
pub struct Translator {
    dispatcher: Dispatcher,
}

impl Translator {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn detect_language(&self, text: &str) -> Language {
        detect_language(text)
    }

    pub async fn translate_to_english(&self, text: &str, source: LanguageMode) -> Translation {
        let source = source.resolve(text);
        if text.trim().is_empty() {
            return Translation::empty(source, Language::English);
        }
        if source == Language::English {
            return Translation::unchanged(text, Language::English);
        }

        let prompt = render(
            TRANSLATE_TO_ENGLISH_TEMPLATE,
            &[("source", source.title()), ("text", text)],
        );
        let payload = PromptBuilder::with_instruction(source, prompt)
            .as_user_message()
            .build();
        match self.dispatcher.dispatch(&payload, TRANSLATION_SAMPLING).await {
            Ok(translated) => Translation {
                success: true,
                translated_text: translated,
                source_language: source,
                target_language: Language::English,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, %source, "translation to English failed; keeping original");
                Translation {
                    success: false,
                    translated_text: text.to_string(),
                    source_language: source,
                    target_language: Language::English,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub async fn translate_from_english(&self, text: &str, target: Language) -> Translation {
        if text.trim().is_empty() {
            return Translation::empty(Language::English, target);
        }
        if target == Language::English {
            return Translation::unchanged(text, Language::English);
        }
        if let Some(phrase) = common_phrase(text, target) {
            return Translation {
                success: true,
                translated_text: phrase.to_string(),
                source_language: Language::English,
                target_language: target,
                error: None,
            };
        }

        let prompt = render(
            TRANSLATE_FROM_ENGLISH_TEMPLATE,
            &[
                ("target", target.title()),
                ("register", register_hint(target)),
                ("text", text),
            ],
        );
        let payload = PromptBuilder::with_instruction(target, prompt)
            .as_user_message()
            .build();
        match self.dispatcher.dispatch(&payload, TRANSLATION_SAMPLING).await {
            Ok(translated) => Translation {
                success: true,
                translated_text: translated,
                source_language: Language::English,
                target_language: target,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, %target, "translation from English failed; keeping original");
                Translation {
                    success: false,
                    translated_text: text.to_string(),
                    source_language: Language::English,
                    target_language: target,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// English rendering of user input written in `language`; the input itself on failure.
    pub async fn to_english_for(&self, language: Language, text: &str) -> String {
        if language == Language::English {
            return text.to_string();
        }
        self.translate_to_english(text, LanguageMode::Fixed(language))
            .await
            .translated_text
    }

    /// `text` (English) rendered in `language`; the English text on failure.
    pub async fn to_user_language(&self, language: Language, text: &str) -> String {
        if language == Language::English {
            return text.to_string();
        }
        self.translate_from_english(text, language)
            .await
            .translated_text
    }
}
