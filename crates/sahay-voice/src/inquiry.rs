//! Canned, personalised replies for routine borrower inquiries.

use sahay_core::prompts::templates::render;
use sahay_core::Language;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryType {
    LoanStatus,
    PaymentDue,
    Balance,
    #[default]
    General,
}

impl InquiryType {
    pub const ALL: [InquiryType; 4] = [
        InquiryType::LoanStatus,
        InquiryType::PaymentDue,
        InquiryType::Balance,
        InquiryType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryType::LoanStatus => "loan_status",
            InquiryType::PaymentDue => "payment_due",
            InquiryType::Balance => "balance",
            InquiryType::General => "general",
        }
    }

    /// Unknown names are general inquiries.
    pub fn from_name(name: &str) -> InquiryType {
        let name = name.trim();
        InquiryType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }

    fn template(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::English, InquiryType::LoanStatus) => "Hello {name}! Your loan application from {village} is being processed. As a {occupation}, we're reviewing your application carefully. You'll receive an update within 2-3 working days.",
            (Language::English, InquiryType::PaymentDue) => "Dear {name}, this is a reminder that your loan payment is due soon. Please visit your nearest center or use mobile banking to make the payment. Thank you for being a valued member from {village}.",
            (Language::English, InquiryType::Balance) => "Hello {name}! Your current loan balance and savings details will be shared with you. For specific amounts, please visit your group meeting or contact your field officer.",
            (Language::English, InquiryType::General) => "Namaste {name}! How can I help you today? I can assist with loan information, payment reminders, or answer questions about our services in {village}.",
            (Language::Hindi, InquiryType::LoanStatus) => "नमस्ते {name} जी! {village} से आपका ऋण आवेदन प्रक्रिया में है। एक {occupation} के रूप में, हम आपके आवेदन की सावधानीपूर्वक समीक्षा कर रहे हैं। आपको 2-3 कार्य दिवसों में अपडेट मिलेगा।",
            (Language::Hindi, InquiryType::PaymentDue) => "प्रिय {name} जी, यह याद दिलाना है कि आपका ऋण भुगतान जल्द ही देय है। कृपया अपने निकटतम केंद्र पर जाएं या मोबाइल बैंकिंग का उपयोग करके भुगतान करें। {village} के एक मूल्यवान सदस्य होने के लिए धन्यवाद।",
            (Language::Hindi, InquiryType::Balance) => "नमस्ते {name} जी! आपका वर्तमान ऋण बैलेंस और बचत विवरण आपके साथ साझा किया जाएगा। विशिष्ट राशि के लिए, कृपया अपनी समूह बैठक में जाएं या अपने फील्ड ऑफिसर से संपर्क करें।",
            (Language::Hindi, InquiryType::General) => "नमस्ते {name} जी! आज मैं आपकी कैसे मदद कर सकता हूं? मैं {village} में ऋण जानकारी, भुगतान अनुस्मारक, या हमारी सेवाओं के बारे में प्रश्नों में सहायता कर सकता हूं।",
            (Language::Kannada, InquiryType::LoanStatus) => "ನಮಸ್ಕಾರ {name}! {village} ಇಂದ ನಿಮ್ಮ ಸಾಲದ ಅರ್ಜಿ ಪ್ರಕ್ರಿಯೆಯಲ್ಲಿದೆ. ಒಬ್ಬ {occupation} ಆಗಿ, ನಾವು ನಿಮ್ಮ ಅರ್ಜಿಯನ್ನು ಎಚ್ಚರಿಕೆಯಿಂದ ಪರಿಶೀಲಿಸುತ್ತಿದ್ದೇವೆ. ನೀವು 2-3 ಕೆಲಸದ ದಿನಗಳಲ್ಲಿ ಅಪ್‌ಡೇಟ್ ಪಡೆಯುವಿರಿ.",
            (Language::Kannada, InquiryType::PaymentDue) => "ಪ್ರಿಯ {name}, ನಿಮ್ಮ ಸಾಲದ ಪಾವತಿ ಶೀಘ್ರದಲ್ಲೇ ಕೊಡಬೇಕು ಎಂದು ನೆನಪಿಸುತ್ತಿದ್ದೇನೆ. ದಯವಿಟ್ಟು ನಿಮ್ಮ ಹತ್ತಿರದ ಕೇಂದ್ರಕ್ಕೆ ಹೋಗಿ ಅಥವಾ ಮೊಬೈಲ್ ಬ್ಯಾಂಕಿಂಗ್ ಬಳಸಿ ಪಾವತಿ ಮಾಡಿ. {village} ನ ಮೌಲ್ಯಯುತ ಸದಸ್ಯರಾಗಿದ್ದಕ್ಕಾಗಿ ಧನ್ಯವಾದಗಳು.",
            (Language::Kannada, InquiryType::Balance) => "ನಮಸ್ಕಾರ {name}! ನಿಮ್ಮ ಪ್ರಸ್ತುತ ಸಾಲದ ಬ್ಯಾಲೆನ್ಸ್ ಮತ್ತು ಉಳಿತಾಯ ವಿವರಗಳನ್ನು ನಿಮ್ಮೊಂದಿಗೆ ಹಂಚಿಕೊಳ್ಳಲಾಗುವುದು. ನಿರ್ದಿಷ್ಟ ಮೊತ್ತಕ್ಕಾಗಿ, ದಯವಿಟ್ಟು ನಿಮ್ಮ ಗುಂಪಿನ ಸಭೆಗೆ ಹೋಗಿ ಅಥವಾ ನಿಮ್ಮ ಫೀಲ್ಡ್ ಅಧಿಕಾರಿಯನ್ನು ಸಂಪರ್ಕಿಸಿ.",
            (Language::Kannada, InquiryType::General) => "ನಮಸ್ಕಾರ {name}! ಇಂದು ನಾನು ನಿಮಗೆ ಹೇಗೆ ಸಹಾಯ ಮಾಡಬಹುದು? {village} ನಲ್ಲಿ ಸಾಲದ ಮಾಹಿತಿ, ಪಾವತಿ ನೆನಪಿಕೆಗಳು, ಅಥವಾ ನಮ್ಮ ಸೇವೆಗಳ ಬಗ್ಗೆ ಪ್ರಶ್ನೆಗಳಲ್ಲಿ ನಾನು ಸಹಾಯ ಮಾಡಬಹುದು.",
        }
    }

    /// Reply text with the borrower's name, village, and occupation filled in.
    pub fn reply(&self, language: Language, name: &str, village: &str, occupation: &str) -> String {
        render(
            self.template(language),
            &[("name", name), ("village", village), ("occupation", occupation)],
        )
    }
}

impl std::fmt::Display for InquiryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_is_filled() {
        for language in Language::ALL {
            for inquiry in InquiryType::ALL {
                let text = inquiry.reply(language, "Savitha", "Hosur", "weaver");
                assert!(text.contains("Savitha"), "{language} {inquiry}");
                assert!(!text.contains('{'), "{language} {inquiry}");
            }
        }
    }

    #[test]
    fn test_unknown_inquiry_is_general() {
        assert_eq!(InquiryType::from_name("PAYMENT_DUE"), InquiryType::PaymentDue);
        assert_eq!(InquiryType::from_name("weather"), InquiryType::General);
    }
}
