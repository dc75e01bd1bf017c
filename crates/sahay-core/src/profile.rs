//! Borrower profile (category → field → value) and credit-scoring results.
//!
//! Profiles arrive from model output, saved JSON, or callers, so decoding is lenient: numbers
//! and booleans read back as strings, missing fields read as empty, and flat top-level fields
//! (`"primary_occupation": "farmer"`) are filed under the category that owns them.

use crate::language::Language;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Onboarding template: every category with its fields, in prompt order.
pub const PROFILE_TEMPLATE: &[(&str, &[&str])] = &[
    (
        "personal_info",
        &[
            "full_name",
            "age",
            "gender",
            "preferred_language",
            "aadhaar_number",
            "phone_number",
            "marital_status",
            "voter_id",
        ],
    ),
    (
        "household_location",
        &[
            "village_name",
            "district",
            "state",
            "pincode",
            "house_type",
            "electricity_connection",
            "number_of_dependents",
        ],
    ),
    (
        "occupation_income",
        &[
            "primary_occupation",
            "secondary_income_sources",
            "monthly_income",
            "monthly_expenses",
            "seasonal_variation",
        ],
    ),
    (
        "financial_details",
        &[
            "bank_account_status",
            "bank_name",
            "existing_loans",
            "repayment_history",
            "savings_per_month",
            "group_membership",
            "past_loan_amounts",
        ],
    ),
    (
        "land_property",
        &[
            "owns_land",
            "land_area",
            "land_type",
            "patta_or_katha_number",
            "property_location",
        ],
    ),
    (
        "digital_literacy",
        &[
            "owns_smartphone",
            "knows_how_to_use_apps",
            "preferred_mode_of_communication",
            "internet_availability",
        ],
    ),
    ("additional_notes", &["user_notes", "agent_observations"]),
];

/// Category for flat fields that match no template field.
const EXTRA_CATEGORY: &str = "additional_fields";

fn template_default(category: &str, field: &str) -> &'static str {
    match (category, field) {
        ("household_location", "state") => "Karnataka",
        _ => "",
    }
}

fn owning_category(field: &str) -> Option<&'static str> {
    PROFILE_TEMPLATE
        .iter()
        .find(|(_, fields)| fields.contains(&field))
        .map(|(category, _)| *category)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Borrower profile. Partial by nature; unknown fields read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserProfile {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every template field present, empty except for template defaults.
    pub fn empty_template() -> Self {
        let mut profile = Self::default();
        for (category, fields) in PROFILE_TEMPLATE {
            for field in *fields {
                profile.set(category, field, template_default(category, field));
            }
        }
        profile
    }

    /// Build from any JSON value; non-objects yield an empty profile.
    pub fn from_value(value: &Value) -> Self {
        let mut profile = Self::default();
        let Some(map) = value.as_object() else {
            return profile;
        };
        for (key, entry) in map {
            match entry {
                Value::Object(fields) => {
                    for (field, v) in fields {
                        profile.set(key, field, scalar_to_string(v));
                    }
                }
                scalar => {
                    let category = owning_category(key).unwrap_or(EXTRA_CATEGORY);
                    profile.set(category, key, scalar_to_string(scalar));
                }
            }
        }
        profile
    }

    /// Builder-style setter for fixtures and callers assembling a profile by hand.
    pub fn with(mut self, category: &str, field: &str, value: impl Into<String>) -> Self {
        self.set(category, field, value);
        self
    }

    pub fn set(&mut self, category: &str, field: &str, value: impl Into<String>) {
        self.sections
            .entry(category.to_string())
            .or_default()
            .insert(field.to_string(), value.into());
    }

    /// Value at `category.field`, or `""`.
    pub fn get(&self, category: &str, field: &str) -> &str {
        self.sections
            .get(category)
            .and_then(|fields| fields.get(field))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// First non-empty value named `field` in any category, or `""`.
    pub fn lookup(&self, field: &str) -> &str {
        self.sections
            .values()
            .filter_map(|fields| fields.get(field))
            .map(String::as_str)
            .find(|v| !v.trim().is_empty())
            .unwrap_or("")
    }

    pub fn full_name(&self) -> &str {
        self.get("personal_info", "full_name")
    }

    pub fn occupation(&self) -> &str {
        self.get("occupation_income", "primary_occupation")
    }

    pub fn village(&self) -> &str {
        self.get("household_location", "village_name")
    }

    /// Declared preferred language, if the profile has one.
    pub fn preferred_language(&self) -> Option<Language> {
        let declared = self.lookup("preferred_language");
        if declared.trim().is_empty() {
            None
        } else {
            Some(Language::from_name(declared))
        }
    }

    /// True for "yes", "y", or an answer that starts with "yes" ("yes - SHG member").
    pub fn answers_yes(&self, category: &str, field: &str) -> bool {
        let value = self.get(category, field).trim().to_lowercase();
        value == "y" || value == "yes" || value.starts_with("yes ")
    }

    /// Copy every non-empty value of `other` over this profile.
    pub fn merge_non_empty(&mut self, other: &UserProfile) {
        for (category, fields) in &other.sections {
            for (field, value) in fields {
                if !value.trim().is_empty() {
                    self.set(category, field, value.clone());
                }
            }
        }
    }

    /// Project onto the full template: every template field present, nothing else.
    pub fn validated(&self) -> UserProfile {
        let mut out = Self::empty_template();
        for (category, fields) in PROFILE_TEMPLATE {
            for field in *fields {
                let value = self.get(category, field);
                if !value.is_empty() {
                    out.set(category, field, value);
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.sections
            .values()
            .all(|fields| fields.values().all(|v| v.trim().is_empty()))
    }

    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        for (category, fields) in &self.sections {
            let inner: Map<String, Value> = fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            root.insert(category.clone(), Value::Object(inner));
        }
        Value::Object(root)
    }
}

impl<'de> Deserialize<'de> for UserProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(UserProfile::from_value(&value))
    }
}

fn default_risk_level() -> String {
    "Unknown".to_string()
}

/// Output of the upstream credit-scoring step. Extra keys are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditResult {
    #[serde(default)]
    pub credit_score: f64,
    #[serde(default = "default_risk_level")]
    pub risk_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CreditResult {
    pub fn new(credit_score: f64, risk_level: impl Into<String>) -> Self {
        Self {
            credit_score,
            risk_level: risk_level.into(),
            recommendation: None,
            details: Map::new(),
        }
    }

    /// Score as shown to borrowers: whole numbers without a decimal point.
    pub fn display_score(&self) -> String {
        if self.credit_score.fract() == 0.0 {
            format!("{:.0}", self.credit_score)
        } else {
            format!("{:.1}", self.credit_score)
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_booleans_read_as_strings() {
        let profile: UserProfile = serde_json::from_value(json!({
            "personal_info": {"full_name": "Ramesh Kumar", "age": 42},
            "land_property": {"owns_land": true},
        }))
        .unwrap();
        assert_eq!(profile.get("personal_info", "age"), "42");
        assert_eq!(profile.get("land_property", "owns_land"), "yes");
        assert_eq!(profile.get("personal_info", "voter_id"), "");
    }

    #[test]
    fn flat_fields_are_filed_under_their_category() {
        let profile = UserProfile::from_value(&json!({
            "primary_occupation": "farmer",
            "bank_account_status": "no",
            "favourite_crop": "ragi",
        }));
        assert_eq!(profile.occupation(), "farmer");
        assert_eq!(profile.lookup("bank_account_status"), "no");
        assert_eq!(profile.get("additional_fields", "favourite_crop"), "ragi");
    }

    #[test]
    fn yes_answers() {
        let profile = UserProfile::new()
            .with("financial_details", "group_membership", "Yes - farmers cooperative")
            .with("land_property", "owns_land", " Y ")
            .with("financial_details", "bank_account_status", "yesterday");
        assert!(profile.answers_yes("financial_details", "group_membership"));
        assert!(profile.answers_yes("land_property", "owns_land"));
        assert!(!profile.answers_yes("financial_details", "bank_account_status"));
        assert!(!profile.answers_yes("digital_literacy", "owns_smartphone"));
    }

    #[test]
    fn validated_profile_has_full_template_and_defaults() {
        let profile = UserProfile::new()
            .with("personal_info", "full_name", "Lakshmi")
            .with("unknown_category", "x", "y");
        let validated = profile.validated();
        assert_eq!(validated.full_name(), "Lakshmi");
        assert_eq!(validated.get("household_location", "state"), "Karnataka");
        assert_eq!(validated.get("unknown_category", "x"), "");
        let value = validated.to_value();
        for (category, fields) in PROFILE_TEMPLATE {
            for field in *fields {
                assert!(value[category][field].is_string(), "{category}.{field}");
            }
        }
    }

    #[test]
    fn merge_keeps_existing_values_when_new_ones_are_empty() {
        let mut existing = UserProfile::new().with("personal_info", "full_name", "Lakshmi");
        let extracted = UserProfile::new()
            .with("personal_info", "full_name", "")
            .with("personal_info", "age", "35");
        existing.merge_non_empty(&extracted);
        assert_eq!(existing.full_name(), "Lakshmi");
        assert_eq!(existing.get("personal_info", "age"), "35");
    }

    #[test]
    fn preferred_language_is_lenient() {
        let profile = UserProfile::new().with("personal_info", "preferred_language", "Kannada");
        assert_eq!(profile.preferred_language(), Some(Language::Kannada));
        assert_eq!(UserProfile::new().preferred_language(), None);
    }

    #[test]
    fn credit_result_keeps_extra_keys_and_formats_score() {
        let credit: CreditResult = serde_json::from_value(json!({
            "credit_score": 67,
            "risk_level": "Medium",
            "key_risk_factors": ["Seasonal income variation"],
        }))
        .unwrap();
        assert_eq!(credit.display_score(), "67");
        assert!(credit.details.contains_key("key_risk_factors"));
        assert_eq!(CreditResult::new(72.5, "Low").display_score(), "72.5");
    }
}
