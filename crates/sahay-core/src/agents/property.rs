//! Land and property documents: structured parsing of patta, katha, and revenue records, and
//! ownership cross-checks against the borrower profile.
//!
//! Both outputs are loose JSON and feed the property section of the detailed loan
//! recommendation.

use crate::cache::{cache_key, ResponseCache};
use crate::dispatcher::{Dispatcher, Sampling};
use crate::fallback;
use crate::language::Language;
use crate::profile::UserProfile;
use crate::prompts::templates::{
    OWNERSHIP_VERIFY_SCHEMA, OWNERSHIP_VERIFY_TASK, PROPERTY_DOCUMENT_SCHEMA, PROPERTY_PARSE_TASK,
};
use crate::prompts::{PromptBuilder, PromptKind};
use serde_json::{json, Value};
use tracing::{info, warn};

fn normalized_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// "exact", "partial" (one name contains the other), or "no_match". Case, spaces, and
/// initials' dots are ignored; an empty name never matches.
pub fn name_match(a: &str, b: &str) -> &'static str {
    let (a, b) = (normalized_name(a), normalized_name(b));
    if a.is_empty() || b.is_empty() {
        "no_match"
    } else if a == b {
        "exact"
    } else if a.contains(&b) || b.contains(&a) {
        "partial"
    } else {
        "no_match"
    }
}

/// Offline cross-check: owner name against the borrower's name, document village against
/// the profile village. Always asks for manual verification.
pub fn ownership_check(property: &Value, profile: &UserProfile) -> Value {
    let text = |section: &str, field: &str| {
        property[section][field].as_str().unwrap_or_default().to_string()
    };
    let owner = text("ownership_details", "owner_name");
    let father = text("ownership_details", "father_name");
    let village = text("property_details", "village");

    let address_consistency = if village.trim().is_empty() || profile.village().trim().is_empty()
    {
        "insufficient_data"
    } else if name_match(&village, profile.village()) == "no_match" {
        "inconsistent"
    } else {
        "consistent"
    };

    json!({
        "ownership_verification": {
            "name_match": name_match(&owner, profile.full_name()),
            "father_name_match": name_match(&father, profile.lookup("father_name")),
            "address_consistency": address_consistency,
            "verification_status": "needs_verification"
        },
        "risk_factors": {
            "legal_disputes": "none",
            "encumbrances": "clear",
            "title_clarity": "unclear"
        },
        "recommendations": {
            "loan_eligibility": "conditional",
            "additional_verification_needed": ["Manual document verification by field officer"]
        },
        "confidence_score": 0
    })
}

pub struct PropertyVerifier {
    dispatcher: Dispatcher,
    cache: ResponseCache<Value>,
}

impl PropertyVerifier {
    pub fn new(dispatcher: Dispatcher, cache_capacity: usize) -> Self {
        Self {
            dispatcher,
            cache: ResponseCache::new(cache_capacity),
        }
    }

    /// Structured fields from OCR or typed document text. Cached per (text, type, language);
    /// falls back to the empty low-confidence document.
    pub async fn parse_property_document(
        &mut self,
        document_text: &str,
        document_type: Option<&str>,
        language: Language,
    ) -> Value {
        let document_type = document_type.unwrap_or("auto");
        let key = cache_key(&json!({
            "document": document_text,
            "type": document_type,
            "lang": language,
        }));
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let payload = PromptBuilder::new(PromptKind::Document, language)
            .section(PROPERTY_PARSE_TASK)
            .fields("Document", &[("Document type hint", document_type)])
            .section(format!("Document text:\n{document_text}"))
            .output_schema(PROPERTY_DOCUMENT_SCHEMA)
            .section("Extract and return ONLY the JSON:")
            .build();

        match self
            .dispatcher
            .dispatch_structured::<Value>(&payload, Sampling::new(1500, 0.1))
            .await
        {
            Ok(parsed) if parsed.is_object() => {
                info!(document_type, "property document parsed");
                self.cache.insert(key, parsed.clone());
                parsed
            }
            Ok(_) => {
                warn!(document_type, "property document answer was not an object");
                fallback::property_template()
            }
            Err(e) => {
                warn!(error = %e, document_type, "property document parse fell back");
                fallback::property_template()
            }
        }
    }

    /// Cross-match parsed property data with the borrower profile.
    pub async fn verify_property_ownership(
        &self,
        property: &Value,
        profile: &UserProfile,
        language: Language,
    ) -> Value {
        let payload = PromptBuilder::new(PromptKind::Document, language)
            .section(OWNERSHIP_VERIFY_TASK)
            .json("Property Document Data", property)
            .json("User Profile", &profile.to_value())
            .output_schema(OWNERSHIP_VERIFY_SCHEMA)
            .section("Verify and return ONLY the JSON:")
            .build();

        match self
            .dispatcher
            .dispatch_structured::<Value>(&payload, Sampling::new(1200, 0.1))
            .await
        {
            Ok(verification) if verification.is_object() => verification,
            Ok(_) => ownership_check(property, profile),
            Err(e) => {
                warn!(error = %e, "ownership verification fell back");
                ownership_check(property, profile)
            }
        }
    }
}
