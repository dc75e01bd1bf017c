//! Borrower onboarding: free-text (or transcribed speech) → structured profile.

use crate::agents::translation::Translator;
use crate::cache::{cache_key, ResponseCache};
use crate::dispatcher::{Dispatcher, Sampling};
use crate::fallback;
use crate::language::{detect_language, Language};
use crate::profile::UserProfile;
use crate::prompts::templates::{
    CLARIFYING_QUESTIONS_GUIDANCE, CLARIFYING_QUESTIONS_TASK, ONBOARDING_EXTRACT_TASK,
};
use crate::prompts::{PromptBuilder, PromptKind};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const REQUIRED_FIELDS: [(&str, &str); 8] = [
    ("personal_info", "full_name"),
    ("personal_info", "age"),
    ("personal_info", "phone_number"),
    ("household_location", "village_name"),
    ("household_location", "district"),
    ("occupation_income", "primary_occupation"),
    ("occupation_income", "monthly_income"),
    ("financial_details", "bank_account_status"),
];

const OPTIONAL_FIELDS: [(&str, &str); 4] = [
    ("personal_info", "aadhaar_number"),
    ("household_location", "pincode"),
    ("financial_details", "existing_loans"),
    ("land_property", "owns_land"),
];

/// Fields a loan officer cannot proceed without; missing ones prompt clarifying questions.
const CRITICAL_FIELDS: [(&str, &str); 7] = [
    ("personal_info", "full_name"),
    ("personal_info", "age"),
    ("personal_info", "phone_number"),
    ("household_location", "village_name"),
    ("occupation_income", "primary_occupation"),
    ("occupation_income", "monthly_income"),
    ("financial_details", "bank_account_status"),
];

const AMOUNT_FIELDS: [&str; 3] = ["monthly_income", "monthly_expenses", "savings_per_month"];

/// Result of checking one field value. `formatted_value` is the normalized form when valid and
/// the raw input otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    pub is_valid: bool,
    pub formatted_value: String,
    pub error_message: String,
    pub suggestions: Vec<String>,
}

impl FieldValidation {
    fn valid(formatted: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            formatted_value: formatted.into(),
            error_message: String::new(),
            suggestions: Vec::new(),
        }
    }

    fn invalid(raw: &str, error: &str, suggestion: Option<&str>) -> Self {
        Self {
            is_valid: false,
            formatted_value: raw.to_string(),
            error_message: error.to_string(),
            suggestions: suggestion.map(str::to_string).into_iter().collect(),
        }
    }
}

fn digits_of(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Required fields weigh 80 points, optional fields 20.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub completeness_score: f64,
    pub is_complete: bool,
    pub missing_required_fields: Vec<String>,
    pub completed_required: usize,
    pub total_required: usize,
}

pub struct OnboardingAgent {
    dispatcher: Dispatcher,
    translator: Translator,
    cache: ResponseCache<UserProfile>,
    data_dir: PathBuf,
}

impl OnboardingAgent {
    pub fn new(dispatcher: Dispatcher, cache_capacity: usize, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            translator: Translator::new(dispatcher.clone()),
            dispatcher,
            cache: ResponseCache::new(cache_capacity),
            data_dir: data_dir.into(),
        }
    }

    /// Extract profile fields from `input` and merge them over `existing`.
    ///
    /// Script detection overrides an English default. The result always carries the full
    /// template; on model failure it is the validated `existing` profile.
    pub async fn extract_user_info(
        &mut self,
        input: &str,
        language: Language,
        existing: Option<&UserProfile>,
    ) -> UserProfile {
        let detected = detect_language(input);
        let language = if language == Language::English {
            detected
        } else {
            language
        };
        let english_input = self.translator.to_english_for(language, input).await;

        let key = cache_key(&json!({"input": english_input, "lang": language}));
        let extracted = match self.cache.get(&key) {
            Some(hit) => Some(hit),
            None => {
                let schema = serde_json::to_string_pretty(&UserProfile::empty_template().to_value())
                    .unwrap_or_default();
                let payload = PromptBuilder::new(PromptKind::Onboarding, language)
                    .section(ONBOARDING_EXTRACT_TASK)
                    .output_schema(&schema)
                    .section(format!("User Input: {}", english_input))
                    .build();
                match self
                    .dispatcher
                    .dispatch_structured::<UserProfile>(&payload, Sampling::deterministic(1500))
                    .await
                {
                    Ok(profile) => {
                        self.cache.insert(key, profile.clone());
                        Some(profile)
                    }
                    Err(e) => {
                        warn!(error = %e, %language, "profile extraction fell back to existing data");
                        None
                    }
                }
            }
        };

        let mut merged = existing.cloned().unwrap_or_default();
        if let Some(extracted) = extracted {
            merged.merge_non_empty(&extracted);
        }
        merged.validated()
    }

    pub fn validate_completeness(profile: &UserProfile) -> CompletenessReport {
        let filled = |(category, field): &(&str, &str)| !profile.get(category, field).trim().is_empty();

        let missing_required_fields: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|f| !filled(f))
            .map(|(category, field)| format!("{}.{}", category, field))
            .collect();
        let completed_required = REQUIRED_FIELDS.len() - missing_required_fields.len();
        let completed_optional = OPTIONAL_FIELDS.iter().filter(|f| filled(f)).count();

        let score = completed_required as f64 / REQUIRED_FIELDS.len() as f64 * 80.0
            + completed_optional as f64 / OPTIONAL_FIELDS.len() as f64 * 20.0;
        let completeness_score = (score * 100.0).round() / 100.0;

        CompletenessReport {
            completeness_score,
            is_complete: completeness_score >= 80.0,
            missing_required_fields,
            completed_required,
            total_required: REQUIRED_FIELDS.len(),
        }
    }

    /// Check and normalize one field: Aadhaar as `XXXX XXXX XXXX`, phone as ten digits
    /// (a leading trunk `0` is dropped), amounts as positive whole rupees. Other fields pass.
    pub fn validate_field_format(field: &str, value: &str) -> FieldValidation {
        let value = value.trim();
        let digits = digits_of(value);
        match field {
            "aadhaar_number" if digits.len() == 12 => FieldValidation::valid(format!(
                "{} {} {}",
                &digits[..4],
                &digits[4..8],
                &digits[8..]
            )),
            "aadhaar_number" => FieldValidation::invalid(
                value,
                "Aadhaar number should be 12 digits",
                Some("Please provide your 12-digit Aadhaar number"),
            ),
            "phone_number" if digits.len() == 10 => FieldValidation::valid(digits),
            "phone_number" if digits.len() == 11 && digits.starts_with('0') => {
                FieldValidation::valid(&digits[1..])
            }
            "phone_number" => FieldValidation::invalid(
                value,
                "Phone number should be 10 digits",
                Some("Please provide your 10-digit mobile number"),
            ),
            f if AMOUNT_FIELDS.contains(&f) => match digits.parse::<u64>() {
                Ok(0) => FieldValidation::invalid(value, "Amount should be greater than 0", None),
                Ok(amount) => FieldValidation::valid(amount.to_string()),
                Err(_) => FieldValidation::invalid(
                    value,
                    "Please provide amount in numbers",
                    Some("Example: 15000 for fifteen thousand rupees"),
                ),
            },
            _ => FieldValidation::valid(value),
        }
    }

    /// Two or three friendly questions for the critical fields still missing, or a thank-you
    /// when none are. Falls back to one canned question per missing field.
    pub async fn ask_clarifying_questions(
        &self,
        profile: &UserProfile,
        language: Language,
    ) -> String {
        let missing: Vec<&str> = CRITICAL_FIELDS
            .iter()
            .filter(|(category, field)| profile.get(category, field).trim().is_empty())
            .map(|(_, field)| *field)
            .collect();
        if missing.is_empty() {
            return fallback::onboarding_complete(language).to_string();
        }

        let payload = PromptBuilder::new(PromptKind::Onboarding, language)
            .section(CLARIFYING_QUESTIONS_TASK)
            .section(format!("Missing fields: {}", missing.join(", ")))
            .json("Current user data", &profile.to_value())
            .section(CLARIFYING_QUESTIONS_GUIDANCE)
            .build();

        match self
            .dispatcher
            .dispatch(&payload, Sampling::deterministic(500))
            .await
        {
            Ok(questions) => questions,
            Err(e) => {
                warn!(error = %e, missing = missing.len(), "clarifying questions fell back");
                missing
                    .iter()
                    .filter_map(|field| fallback::clarifying_question(field, language))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }

    /// Write the profile as pretty JSON. Default path:
    /// `{data_dir}/user_profiles/{name}_profile.json`, or `profile_{unix_ts}.json` without a name.
    pub async fn save_user_profile(
        &self,
        profile: &UserProfile,
        path: Option<&Path>,
    ) -> std::io::Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let name = profile.full_name().trim().to_lowercase().replace(' ', "_");
                let file = if name.is_empty() {
                    format!("profile_{}.json", Utc::now().timestamp())
                } else {
                    format!("{}_profile.json", name)
                };
                self.data_dir.join("user_profiles").join(file)
            }
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, serde_json::to_string_pretty(profile)?).await?;
        info!(path = %path.display(), "user profile saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_profile() -> UserProfile {
        REQUIRED_FIELDS
            .iter()
            .fold(UserProfile::new(), |p, (c, f)| p.with(c, f, "x"))
    }

    #[test]
    fn all_required_fields_make_a_complete_profile() {
        let report = OnboardingAgent::validate_completeness(&complete_profile());
        assert_eq!(report.completeness_score, 80.0);
        assert!(report.is_complete);
        assert!(report.missing_required_fields.is_empty());
    }

    #[test]
    fn missing_required_field_is_listed() {
        let profile = complete_profile()
            .with("personal_info", "age", "")
            .with("land_property", "owns_land", "yes");
        let report = OnboardingAgent::validate_completeness(&profile);
        assert_eq!(report.completeness_score, 75.0);
        assert!(!report.is_complete);
        assert_eq!(report.missing_required_fields, vec!["personal_info.age"]);
        assert_eq!(report.completed_required, 7);
        assert_eq!(report.total_required, 8);
    }

    #[test]
    fn empty_profile_scores_zero() {
        let report = OnboardingAgent::validate_completeness(&UserProfile::empty_template());
        assert_eq!(report.completeness_score, 0.0);
        assert_eq!(report.missing_required_fields.len(), 8);
    }

    #[test]
    fn aadhaar_is_grouped_in_fours() {
        let ok = OnboardingAgent::validate_field_format("aadhaar_number", "1234-5678-9012");
        assert!(ok.is_valid);
        assert_eq!(ok.formatted_value, "1234 5678 9012");

        let short = OnboardingAgent::validate_field_format("aadhaar_number", "12345");
        assert!(!short.is_valid);
        assert_eq!(short.error_message, "Aadhaar number should be 12 digits");
        assert_eq!(short.formatted_value, "12345");
    }

    #[test]
    fn phone_drops_trunk_zero() {
        let phone = OnboardingAgent::validate_field_format("phone_number", "098765 43210");
        assert!(phone.is_valid);
        assert_eq!(phone.formatted_value, "9876543210");
        assert!(!OnboardingAgent::validate_field_format("phone_number", "98765").is_valid);
    }

    #[test]
    fn amounts_must_be_positive_numbers() {
        let income = OnboardingAgent::validate_field_format("monthly_income", "₹15,000");
        assert_eq!(income.formatted_value, "15000");
        let zero = OnboardingAgent::validate_field_format("savings_per_month", "0");
        assert_eq!(zero.error_message, "Amount should be greater than 0");
        let words = OnboardingAgent::validate_field_format("monthly_expenses", "ten thousand");
        assert_eq!(
            words.suggestions,
            vec!["Example: 15000 for fifteen thousand rupees"]
        );
        let name = OnboardingAgent::validate_field_format("full_name", "  Lakshmi ");
        assert!(name.is_valid);
        assert_eq!(name.formatted_value, "Lakshmi");
    }
}
