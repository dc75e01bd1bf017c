//! Fallback responder: deterministic, offline answers used when dispatch fails.
//!
//! Each function returns the same shape as the live path of its operation. Content is picked
//! by coarse profile signals only (occupation keywords, bank-account status).

use crate::agents::education::{AdviceItem, EducationTopic, ImprovementAdvice};
use crate::agents::risk::{format_rupees, LoanDecision, LoanRecommendation, LoanTerms, Verdict};
use crate::language::Language;
use crate::profile::{CreditResult, UserProfile};
use serde_json::{json, Value};

/// Polite "couldn't process, try again" message.
pub fn retry_message(language: Language) -> &'static str {
    match language {
        Language::English => "Sorry, I couldn't process your request. Please try again.",
        Language::Hindi => "क्षमा करें, मैं आपके अनुरोध को संसाधित नहीं कर सका। कृपया पुनः प्रयास करें।",
        Language::Kannada => "ಕ್ಷಮಿಸಿ, ನಿಮ್ಮ ವಿನಂತಿಯನ್ನು ಪ್ರಕ್ರಿಯೆಗೊಳಿಸಲು ಸಾಧ್ಯವಾಗಲಿಲ್ಲ. ದಯವಿಟ್ಟು ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.",
    }
}

/// One-sentence credit explanation naming the score and risk level.
pub fn credit_explanation(credit: &CreditResult, language: Language) -> String {
    let score = credit.display_score();
    let risk_level = &credit.risk_level;
    match language {
        Language::Hindi => format!(
            "आपका क्रेडिट स्कोर {score} है, जो {risk_level} जोखिम श्रेणी में है। यह स्कोर आपकी आर्थिक स्थिति और ऋण चुकाने की क्षमता को दर्शाता है।"
        ),
        Language::Kannada => format!(
            "ನಿಮ್ಮ ಕ್ರೆಡಿಟ್ ಸ್ಕೋರ್ {score} ಇದೆ, ಇದು {risk_level} ಅಪಾಯ ವರ್ಗದಲ್ಲಿದೆ. ಈ ಸ್ಕೋರ್ ನಿಮ್ಮ ಆರ್ಥಿಕ ಸ್ಥಿತಿ ಮತ್ತು ಸಾಲ ಮರುಪಾವತಿ ಸಾಮರ್ಥ್ಯವನ್ನು ತೋರಿಸುತ್ತದೆ."
        ),
        Language::English => format!(
            "Your credit score is {score}, which falls in the {risk_level} risk category. This score reflects your financial health and ability to repay loans."
        ),
    }
}

fn item(pairs: &[(&str, Value)]) -> AdviceItem {
    AdviceItem::Detailed(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

fn motivation(language: Language) -> &'static str {
    match language {
        Language::English => "Your strong income foundation gives you excellent potential for building an outstanding credit profile.",
        Language::Hindi => "आपकी आय की मज़बूत नींव आपको एक उत्कृष्ट क्रेडिट प्रोफ़ाइल बनाने की बेहतरीन संभावना देती है।",
        Language::Kannada => "ನಿಮ್ಮ ಆದಾಯದ ಬಲವಾದ ಅಡಿಪಾಯವು ಅತ್ಯುತ್ತಮ ಕ್ರೆಡಿಟ್ ಪ್ರೊಫೈಲ್ ನಿರ್ಮಿಸಲು ನಿಮಗೆ ಉತ್ತಮ ಅವಕಾಶ ನೀಡುತ್ತದೆ.",
    }
}

/// True when the occupation mentions farming.
pub fn is_farming(occupation: &str) -> bool {
    let occupation = occupation.to_lowercase();
    ["farm", "agriculture", "crop"]
        .iter()
        .any(|k| occupation.contains(k))
}

fn is_salaried_tech(occupation: &str) -> bool {
    let occupation = occupation.to_lowercase();
    occupation.contains("engineer")
        || occupation
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "it")
}

/// Improvement advice with the five fixed keys.
pub fn improvement_advice(profile: &UserProfile, language: Language) -> ImprovementAdvice {
    let occupation = profile.lookup("primary_occupation");
    let farmer = is_farming(occupation);
    let bank_status = profile.lookup("bank_account_status").trim().to_lowercase();

    let immediate = if bank_status.is_empty() || bank_status == "no" {
        item(&[
            ("action", json!("Open a bank account if you don't have one")),
            (
                "explanation",
                json!("Banks help you save money safely and build financial history"),
            ),
            (
                "local_example",
                json!("Visit your nearest bank branch with Aadhaar card"),
            ),
        ])
    } else {
        item(&[
            ("action", json!("Document and formalize your assets")),
            (
                "explanation",
                json!("Having proper documentation increases your credibility with lenders"),
            ),
            (
                "local_example",
                json!("Get land documents, property papers, or business licenses organized"),
            ),
        ])
    };

    let seasonal_tip = if farmer {
        "SHGs help during lean agricultural seasons"
    } else if is_salaried_tech(occupation) {
        "Build an emergency fund for career transitions"
    } else {
        "Plan your finances month by month"
    };
    let strategy = if farmer {
        "Join a Self Help Group (SHG)"
    } else {
        "Build multiple income sources"
    };

    ImprovementAdvice {
        immediate_actions: vec![immediate],
        short_term_goals: vec![item(&[
            ("goal", json!("Increase your savings rate consistently")),
            (
                "steps",
                json!([
                    "Save at least 20% of monthly income",
                    "Use systematic investment plans"
                ]),
            ),
            (
                "benefit",
                json!("Shows excellent financial discipline to lenders"),
            ),
        ])],
        long_term_strategies: vec![item(&[
            ("strategy", json!(strategy)),
            ("timeline", json!("Benefits visible in 6-12 months")),
            ("seasonal_tip", json!(seasonal_tip)),
        ])],
        local_resources: vec![item(&[
            ("resource", json!("Local banks and cooperative societies")),
            (
                "how_to_access",
                json!("Contact nearest branch with proper documentation"),
            ),
            (
                "benefit",
                json!("Access to formal credit and financial services"),
            ),
        ])],
        motivation_message: motivation(language).to_string(),
    }
}

const TIPS_EN: [&str; 5] = [
    "Save a portion of your harvest income for the next season",
    "Plan for festival expenses in advance",
    "Keep some money aside for medical emergencies",
    "Consider crop insurance to protect against losses",
    "Join group savings schemes in your village",
];

const TIPS_HI: [&str; 5] = [
    "अगले मौसम के लिए अपनी फसल की आय का एक हिस्सा बचाकर रखें",
    "त्योहारों के खर्च की योजना पहले से बनाएं",
    "चिकित्सा आपात स्थिति के लिए कुछ पैसे अलग रखें",
    "नुकसान से बचाव के लिए फसल बीमा पर विचार करें",
    "अपने गाँव की समूह बचत योजनाओं में शामिल हों",
];

const TIPS_KN: [&str; 5] = [
    "ಮುಂದಿನ ಋತುವಿಗಾಗಿ ನಿಮ್ಮ ಸುಗ್ಗಿಯ ಆದಾಯದ ಒಂದು ಭಾಗವನ್ನು ಉಳಿಸಿ",
    "ಹಬ್ಬದ ಖರ್ಚುಗಳಿಗೆ ಮುಂಚಿತವಾಗಿ ಯೋಜನೆ ಮಾಡಿ",
    "ವೈದ್ಯಕೀಯ ತುರ್ತು ಪರಿಸ್ಥಿತಿಗಳಿಗಾಗಿ ಸ್ವಲ್ಪ ಹಣವನ್ನು ಮೀಸಲಿಡಿ",
    "ನಷ್ಟದಿಂದ ರಕ್ಷಣೆಗಾಗಿ ಬೆಳೆ ವಿಮೆಯನ್ನು ಪರಿಗಣಿಸಿ",
    "ನಿಮ್ಮ ಗ್ರಾಮದ ಗುಂಪು ಉಳಿತಾಯ ಯೋಜನೆಗಳಿಗೆ ಸೇರಿ",
];

/// The five fixed seasonal tips.
pub fn seasonal_tips(language: Language) -> Vec<String> {
    let tips = match language {
        Language::English => TIPS_EN,
        Language::Hindi => TIPS_HI,
        Language::Kannada => TIPS_KN,
    };
    tips.iter().map(|t| t.to_string()).collect()
}

pub fn education_content(topic: EducationTopic, language: Language) -> String {
    let topic = topic.as_str();
    match language {
        Language::English => format!("Unable to create content about {topic}. Please try again."),
        Language::Hindi => {
            format!("{topic} के बारे में सामग्री नहीं बनाई जा सकी। कृपया पुनः प्रयास करें।")
        }
        Language::Kannada => {
            format!("{topic} ಕುರಿತು ವಿಷಯವನ್ನು ರಚಿಸಲು ಸಾಧ್ಯವಾಗಲಿಲ್ಲ. ದಯವಿಟ್ಟು ಮತ್ತೆ ಪ್ರಯತ್ನಿಸಿ.")
        }
    }
}

/// Score-threshold loan decision: ≥ 70 approve, ≥ 50 conditional, otherwise reject.
pub fn loan_recommendation(credit: &CreditResult) -> LoanRecommendation {
    let score = credit.display_score();
    let risk = credit.risk_level.to_lowercase();
    let (verdict, max_amount, rate) = if credit.credit_score >= 70.0 {
        (Verdict::Approve, "₹50,000", "12%")
    } else if credit.credit_score >= 50.0 {
        (Verdict::ConditionalApprove, "₹25,000", "14%")
    } else {
        (Verdict::Reject, "₹0", "N/A")
    };

    LoanRecommendation {
        loan_recommendation: LoanDecision {
            decision: verdict,
            confidence: "medium".to_string(),
            maximum_loan_amount: max_amount.to_string(),
            interest_rate_suggestion: rate.to_string(),
            repayment_period: "12 months".to_string(),
            collateral_requirement: "not_required".to_string(),
        },
        detailed_risk_analysis: json!({
            "overall_risk_score": credit.credit_score,
            "risk_category": risk,
            "key_risk_factors": [{
                "factor": "Credit score assessment",
                "impact": "high",
                "explanation": format!("Credit score of {score} indicates {risk} risk"),
                "mitigation_strategy": "Improve financial habits and repayment history"
            }],
            "positive_factors": [{
                "factor": "Application completeness",
                "impact": "medium",
                "explanation": "User provided complete information for assessment"
            }]
        }),
        financial_health_assessment: None,
        detailed_recommendation_reasoning: None,
        alternative_recommendations: None,
        final_summary: json!({
            "executive_summary": format!(
                "Based on credit score of {score}, recommendation is {}",
                verdict.as_str()
            ),
            "key_next_steps": ["Review application details", "Verify documents", "Communicate decision"],
            "borrower_communication": "Explain decision clearly with improvement suggestions"
        }),
    }
}

/// One-paragraph summary of recommended loan terms.
pub fn loan_terms_explanation(category: &str, terms: &LoanTerms, language: Language) -> String {
    let category = category.to_lowercase();
    let amount = format_rupees(terms.recommended_amount);
    let emi = format_rupees(terms.monthly_emi);
    let (rate, months) = (terms.interest_rate, terms.tenure_months);
    match language {
        Language::Hindi => format!(
            "आपकी {category} प्रोफ़ाइल के आधार पर, हम {rate}% ब्याज पर {months} महीनों के लिए {amount} के ऋण की सिफारिश करते हैं। आपकी मासिक EMI {emi} होगी।"
        ),
        Language::Kannada => format!(
            "ನಿಮ್ಮ {category} ಪ್ರೊಫೈಲ್ ಆಧಾರದ ಮೇಲೆ, {rate}% ಬಡ್ಡಿಯಲ್ಲಿ {months} ತಿಂಗಳುಗಳಿಗೆ {amount} ಸಾಲವನ್ನು ನಾವು ಶಿಫಾರಸು ಮಾಡುತ್ತೇವೆ. ನಿಮ್ಮ ಮಾಸಿಕ EMI {emi} ಆಗಿರುತ್ತದೆ."
        ),
        Language::English => format!(
            "Based on your {category} profile, we recommend a loan of {amount} at {rate}% interest for {months} months. Your monthly EMI would be {emi}."
        ),
    }
}

/// Said when no critical onboarding field is missing.
pub fn onboarding_complete(language: Language) -> &'static str {
    match language {
        Language::English => "Thank you! I have collected all the necessary information.",
        Language::Hindi => "धन्यवाद! मैंने सभी आवश्यक जानकारी एकत्र कर ली है।",
        Language::Kannada => "ಧನ್ಯವಾದಗಳು! ನಾನು ಎಲ್ಲಾ ಅಗತ್ಯ ಮಾಹಿತಿಯನ್ನು ಸಂಗ್ರಹಿಸಿದ್ದೇನೆ.",
    }
}

/// Direct question for one missing onboarding field; `None` for fields without one.
pub fn clarifying_question(field: &str, language: Language) -> Option<&'static str> {
    let question = match (field, language) {
        ("full_name", Language::English) => "What is your full name?",
        ("full_name", Language::Hindi) => "आपका पूरा नाम क्या है?",
        ("full_name", Language::Kannada) => "ನಿಮ್ಮ ಪೂರ್ಣ ಹೆಸರು ಏನು?",
        ("age", Language::English) => "How old are you?",
        ("age", Language::Hindi) => "आपकी उम्र कितनी है?",
        ("age", Language::Kannada) => "ನಿಮ್ಮ ವಯಸ್ಸು ಎಷ್ಟು?",
        ("phone_number", Language::English) => "What is your mobile number?",
        ("phone_number", Language::Hindi) => "आपका मोबाइल नंबर क्या है?",
        ("phone_number", Language::Kannada) => "ನಿಮ್ಮ ಮೊಬೈಲ್ ಸಂಖ್ಯೆ ಏನು?",
        ("village_name", Language::English) => "Which village are you from?",
        ("village_name", Language::Hindi) => "आप किस गांव से हैं?",
        ("village_name", Language::Kannada) => "ನೀವು ಯಾವ ಹಳ್ಳಿಯವರು?",
        ("primary_occupation", Language::English) => "What is your main occupation?",
        ("primary_occupation", Language::Hindi) => "आपका मुख्य व्यवसाय क्या है?",
        ("primary_occupation", Language::Kannada) => "ನಿಮ್ಮ ಮುಖ್ಯ ಉದ್ಯೋಗ ಏನು?",
        ("monthly_income", Language::English) => "What is your monthly income?",
        ("monthly_income", Language::Hindi) => "आपकी मासिक आय कितनी है?",
        ("monthly_income", Language::Kannada) => "ನಿಮ್ಮ ಮಾಸಿಕ ಆದಾಯ ಎಷ್ಟು?",
        ("bank_account_status", Language::English) => "Do you have a bank account?",
        ("bank_account_status", Language::Hindi) => "क्या आपका बैंक खाता है?",
        ("bank_account_status", Language::Kannada) => "ನಿಮಗೆ ಬ್ಯಾಂಕ್ ಖಾತೆ ಇದೆಯೇ?",
        _ => return None,
    };
    Some(question)
}

/// Property document shape with every field empty; confidence low, completeness incomplete.
pub fn property_template() -> Value {
    json!({
        "document_analysis": {
            "document_type": "",
            "language_detected": "",
            "confidence": "low",
            "completeness": "incomplete"
        },
        "property_details": {
            "survey_number": "",
            "sub_division": "",
            "village": "",
            "taluk": "",
            "district": "",
            "total_area": "",
            "area_unit": "",
            "land_classification": "",
            "land_type": ""
        },
        "ownership_details": {
            "owner_name": "",
            "father_name": "",
            "ownership_type": "",
            "acquisition_mode": ""
        },
        "encumbrances": {
            "mortgages": [],
            "loans_against_property": [],
            "legal_disputes": []
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hindi_explanation_names_score_and_risk() {
        let text = credit_explanation(&CreditResult::new(67.0, "Medium"), Language::Hindi);
        assert!(text.contains("67"));
        assert!(text.contains("Medium"));
        assert!(text.starts_with("आपका क्रेडिट स्कोर"));
    }

    #[test]
    fn advice_depends_on_bank_account_and_occupation() {
        let farmer = UserProfile::new()
            .with("occupation_income", "primary_occupation", "Farmer")
            .with("financial_details", "bank_account_status", "yes");
        let advice = improvement_advice(&farmer, Language::English);
        let value = serde_json::to_value(&advice).unwrap();
        assert_eq!(
            value["immediate_actions"][0]["action"],
            "Document and formalize your assets"
        );
        assert_eq!(
            value["long_term_strategies"][0]["strategy"],
            "Join a Self Help Group (SHG)"
        );

        let engineer = UserProfile::new().with("occupation_income", "primary_occupation", "IT engineer");
        let value = serde_json::to_value(improvement_advice(&engineer, Language::English)).unwrap();
        assert_eq!(
            value["immediate_actions"][0]["action"],
            "Open a bank account if you don't have one"
        );
        assert_eq!(
            value["long_term_strategies"][0]["seasonal_tip"],
            "Build an emergency fund for career transitions"
        );
    }

    #[test]
    fn knitter_is_not_read_as_it() {
        assert!(!is_salaried_tech("knitter"));
        assert!(is_salaried_tech("works in IT"));
    }

    #[test]
    fn five_tips_in_every_language() {
        for language in Language::ALL {
            assert_eq!(seasonal_tips(language).len(), 5);
        }
        assert_eq!(
            seasonal_tips(Language::English)[0],
            "Save a portion of your harvest income for the next season"
        );
    }

    #[test]
    fn clarifying_questions_cover_critical_fields_only() {
        assert_eq!(
            clarifying_question("village_name", Language::English),
            Some("Which village are you from?")
        );
        assert_eq!(
            clarifying_question("age", Language::Kannada),
            Some("ನಿಮ್ಮ ವಯಸ್ಸು ಎಷ್ಟು?")
        );
        assert_eq!(clarifying_question("voter_id", Language::Hindi), None);
    }

    #[test]
    fn empty_property_document_is_low_confidence() {
        let template = property_template();
        assert_eq!(template["document_analysis"]["confidence"], "low");
        assert_eq!(template["document_analysis"]["completeness"], "incomplete");
        assert_eq!(template["ownership_details"]["owner_name"], "");
    }

    #[test]
    fn loan_thresholds() {
        let decide = |score| {
            loan_recommendation(&CreditResult::new(score, "Medium"))
                .loan_recommendation
                .decision
        };
        assert_eq!(decide(70.0), Verdict::Approve);
        assert_eq!(decide(69.9), Verdict::ConditionalApprove);
        assert_eq!(decide(50.0), Verdict::ConditionalApprove);
        assert_eq!(decide(49.0), Verdict::Reject);
        let reject = loan_recommendation(&CreditResult::new(30.0, "High"));
        assert_eq!(reject.loan_recommendation.maximum_loan_amount, "₹0");
        assert_eq!(reject.loan_recommendation.interest_rate_suggestion, "N/A");
    }
}
