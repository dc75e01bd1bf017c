//! Language prompt registry: (language, prompt kind) → system instruction.
//!
//! Kannada carries no risk-advisor instruction; it resolves to the English text for that kind.

use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The instruction families an agent can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Onboarding,
    Document,
    Voice,
    Credit,
    Risk,
    RiskAdvisor,
    Educational,
}

impl PromptKind {
    pub const ALL: [PromptKind; 7] = [
        PromptKind::Onboarding,
        PromptKind::Document,
        PromptKind::Voice,
        PromptKind::Credit,
        PromptKind::Risk,
        PromptKind::RiskAdvisor,
        PromptKind::Educational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Onboarding => "onboarding",
            PromptKind::Document => "document",
            PromptKind::Voice => "voice",
            PromptKind::Credit => "credit",
            PromptKind::Risk => "risk",
            PromptKind::RiskAdvisor => "risk_advisor",
            PromptKind::Educational => "educational",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const EN_ONBOARDING: &str = "You are a helpful assistant collecting information from rural users for microfinance services. Be patient and ask clarifying questions. Respond in English.";
pub const EN_DOCUMENT: &str = "You are a document verification expert. Analyze the provided document and extract key information accurately. Respond in English.";
pub const EN_VOICE: &str = "You are a friendly voice assistant helping rural users with microfinance queries. Keep responses simple and clear. Respond in English.";
pub const EN_CREDIT: &str = "You are a credit score explainer. Break down credit factors in simple terms that rural users can understand. Respond in English.";
pub const EN_RISK: &str = "You are a loan risk analyst. Provide clear, actionable loan recommendations. Respond in English.";
pub const EN_RISK_ADVISOR: &str = "You are an expert MFI loan risk advisor with deep knowledge of rural microfinance. Provide comprehensive, actionable analysis for loan decisions. Respond in English.";
pub const EN_EDUCATIONAL: &str = "You are a friendly financial teacher providing financial education in simple language for rural India. Your language should be respectful, simple, and tailored to local context. Use examples from Karnataka agriculture and rural life.";

pub const HI_ONBOARDING: &str = "आप ग्रामीण उपयोगकर्ताओं से माइक्रोफाइनेंस सेवाओं के लिए जानकारी एकत्र करने में मदद करने वाले सहायक हैं। धैर्य रखें और स्पष्टीकरण के प्रश्न पूछें। हिंदी में उत्तर दें।";
pub const HI_DOCUMENT: &str = "आप एक दस्तावेज़ सत्यापन विशेषज्ञ हैं। प्रदान किए गए दस्तावेज़ का विश्लेषण करें और मुख्य जानकारी सटीक रूप से निकालें। हिंदी में उत्तर दें।";
pub const HI_VOICE: &str = "आप माइक्रोफाइनेंस प्रश्नों के साथ ग्रामीण उपयोगकर्ताओं की मदद करने वाले मित्रवत आवाज सहायक हैं। उत्तर सरल और स्पष्ट रखें। हिंदी में उत्तर दें।";
pub const HI_CREDIT: &str = "आप एक क्रेडिट स्कोर समझाने वाले हैं। क्रेडिट कारकों को सरल शब्दों में समझाएं जो ग्रामीण उपयोगकर्ता समझ सकें। हिंदी में उत्तर दें।";
pub const HI_RISK: &str = "आप एक ऋण जोखिम विश्लेषक हैं। स्पष्ट, कार्यात्मक ऋण सिफारिशें प्रदान करें। हिंदी में उत्तर दें।";
pub const HI_RISK_ADVISOR: &str = "आप ग्रामीण माइक्रोफाइनेंस के गहरे ज्ञान के साथ एक विशेषज्ञ MFI ऋण जोखिम सलाहकार हैं। ऋण निर्णयों के लिए व्यापक, कार्यात्मक विश्लेषण प्रदान करें। हिंदी में उत्तर दें।";
pub const HI_EDUCATIONAL: &str = "आप एक मित्रवत वित्तीय शिक्षक हैं जो ग्रामीण भारत के लिए सरल भाषा में वित्तीय शिक्षा प्रदान करते हैं। आपकी भाषा सम्मानजनक, सरल और स्थानीय संदर्भ के अनुकूल होनी चाहिए। कर्नाटक के कृषि और ग्रामीण जीवन के उदाहरण दें।";

pub const KN_ONBOARDING: &str = "ನೀವು ಮೈಕ್ರೋಫೈನಾನ್ಸ್ ಸೇವೆಗಳಿಗಾಗಿ ಗ್ರಾಮೀಣ ಬಳಕೆದಾರರಿಂದ ಮಾಹಿತಿ ಸಂಗ್ರಹಿಸಲು ಸಹಾಯ ಮಾಡುವ ಸಹಾಯಕರು. ತಾಳ್ಮೆಯಿಂದಿರಿ ಮತ್ತು ಸ್ಪಷ್ಟೀಕರಣ ಪ್ರಶ್ನೆಗಳನ್ನು ಕೇಳಿ. ಕನ್ನಡದಲ್ಲಿ ಉತ್ತರಿಸಿ.";
pub const KN_DOCUMENT: &str = "ನೀವು ದಾಖಲೆ ಪರಿಶೀಲನೆ ತಜ್ಞರು. ಒದಗಿಸಿದ ದಾಖಲೆಯನ್ನು ವಿಶ್ಲೇಷಿಸಿ ಮತ್ತು ಮುಖ್ಯ ಮಾಹಿತಿಯನ್ನು ನಿಖರವಾಗಿ ಹೊರತೆಗೆಯಿರಿ. ಕನ್ನಡದಲ್ಲಿ ಉತ್ತರಿಸಿ.";
pub const KN_VOICE: &str = "ನೀವು ಮೈಕ್ರೋಫೈನಾನ್ಸ್ ಪ್ರಶ್ನೆಗಳೊಂದಿಗೆ ಗ್ರಾಮೀಣ ಬಳಕೆದಾರರಿಗೆ ಸಹಾಯ ಮಾಡುವ ಸ್ನೇಹಪರ ಧ್ವನಿ ಸಹಾಯಕರು. ಉತ್ತರಗಳನ್ನು ಸರಳ ಮತ್ತು ಸ್ಪಷ್ಟವಾಗಿ ಇರಿಸಿ. ಕನ್ನಡದಲ್ಲಿ ಉತ್ತರಿಸಿ.";
pub const KN_CREDIT: &str = "ನೀವು ಕ್ರೆಡಿಟ್ ಸ್ಕೋರ್ ವಿವರಿಸುವವರು. ಗ್ರಾಮೀಣ ಬಳಕೆದಾರರು ಅರ್ಥಮಾಡಿಕೊಳ್ಳಬಹುದಾದ ಸರಳ ಪದಗಳಲ್ಲಿ ಕ್ರೆಡಿಟ್ ಅಂಶಗಳನ್ನು ವಿಭಜಿಸಿ. ಕನ್ನಡದಲ್ಲಿ ಉತ್ತರಿಸಿ.";
pub const KN_RISK: &str = "ನೀವು ಸಾಲದ ಅಪಾಯ ವಿಶ್ಲೇಷಕರು. ಸ್ಪಷ್ಟ, ಕ್ರಿಯಾತ್ಮಕ ಸಾಲ ಶಿಫಾರಸುಗಳನ್ನು ಒದಗಿಸಿ. ಕನ್ನಡದಲ್ಲಿ ಉತ್ತರಿಸಿ.";
pub const KN_EDUCATIONAL: &str = "ನೀವು ಗ್ರಾಮೀಣ ಭಾರತಕ್ಕೆ ಸರಳ ಭಾಷೆಯಲ್ಲಿ ಹಣಕಾಸು ಶಿಕ್ಷಣ ನೀಡುವ ಸ್ನೇಹಪರ ಹಣಕಾಸು ಶಿಕ್ಷಕರಾಗಿದ್ದೀರಿ. ನಿಮ್ಮ ಭಾಷೆ ಗೌರವಾನ್ವಿತ, ಸರಳ ಮತ್ತು ಸ್ಥಳೀಯ ಸಂದರ್ಭಕ್ಕೆ ಸೂಕ್ತವಾಗಿರಬೇಕು. ಕರ್ನಾಟಕದ ಕೃಷಿ ಮತ್ತು ಗ್ರಾಮೀಣ ಜೀವನದ ಉದಾಹರಣೆಗಳನ್ನು ನೀಡಿ.";

fn english(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::Onboarding => EN_ONBOARDING,
        PromptKind::Document => EN_DOCUMENT,
        PromptKind::Voice => EN_VOICE,
        PromptKind::Credit => EN_CREDIT,
        PromptKind::Risk => EN_RISK,
        PromptKind::RiskAdvisor => EN_RISK_ADVISOR,
        PromptKind::Educational => EN_EDUCATIONAL,
    }
}

fn hindi(kind: PromptKind) -> Option<&'static str> {
    Some(match kind {
        PromptKind::Onboarding => HI_ONBOARDING,
        PromptKind::Document => HI_DOCUMENT,
        PromptKind::Voice => HI_VOICE,
        PromptKind::Credit => HI_CREDIT,
        PromptKind::Risk => HI_RISK,
        PromptKind::RiskAdvisor => HI_RISK_ADVISOR,
        PromptKind::Educational => HI_EDUCATIONAL,
    })
}

fn kannada(kind: PromptKind) -> Option<&'static str> {
    match kind {
        PromptKind::Onboarding => Some(KN_ONBOARDING),
        PromptKind::Document => Some(KN_DOCUMENT),
        PromptKind::Voice => Some(KN_VOICE),
        PromptKind::Credit => Some(KN_CREDIT),
        PromptKind::Risk => Some(KN_RISK),
        PromptKind::RiskAdvisor => None,
        PromptKind::Educational => Some(KN_EDUCATIONAL),
    }
}

/// System instruction for `kind` in `language`, or the English instruction when the language
/// has no entry for that kind.
pub fn system_prompt(language: Language, kind: PromptKind) -> &'static str {
    let localized = match language {
        Language::English => None,
        Language::Hindi => hindi(kind),
        Language::Kannada => kannada(kind),
    };
    localized.unwrap_or_else(|| english(kind))
}
