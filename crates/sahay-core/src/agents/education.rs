//! Educational content: credit-score explanations, improvement advice, topic lessons, and
//! seasonal tips for rural borrowers.

use crate::cache::{cache_key, ResponseCache};
use crate::dispatcher::{Dispatcher, Sampling};
use crate::fallback;
use crate::language::Language;
use crate::profile::{CreditResult, UserProfile};
use crate::prompts::templates::{
    render, EDUCATION_CONTENT_GUIDANCE, EDUCATION_CONTENT_TEMPLATE, EXPLAIN_CREDIT_GUIDANCE,
    EXPLAIN_CREDIT_TASK, IMPROVEMENT_ADVICE_SCHEMA, IMPROVEMENT_ADVICE_TASK,
    SEASONAL_TIPS_GUIDANCE, SEASONAL_TIPS_TASK,
};
use crate::prompts::{PromptBuilder, PromptKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};

const MAX_TIPS: usize = 5;

static LIST_MARKER: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]+|\d+\s*[.)])\s*").ok());

fn strip_list_marker(line: &str) -> String {
    match LIST_MARKER.as_ref() {
        Some(re) => re.replace(line, "").trim().to_string(),
        None => line.to_string(),
    }
}

/// One advice entry: plain text, or an object such as `{action, explanation, local_example}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdviceItem {
    Text(String),
    Detailed(BTreeMap<String, Value>),
}

/// Credit improvement advice. All five keys are required, so a model answer missing one is
/// rejected and replaced by the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementAdvice {
    pub immediate_actions: Vec<AdviceItem>,
    pub short_term_goals: Vec<AdviceItem>,
    pub long_term_strategies: Vec<AdviceItem>,
    pub local_resources: Vec<AdviceItem>,
    pub motivation_message: String,
}

/// Financial-education lesson topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationTopic {
    #[default]
    CreditScoreBasics,
    ImprovementStrategies,
    FinancialPlanning,
    LoanProcess,
    SavingsHabits,
    GroupBenefits,
    DigitalBanking,
    RiskManagement,
}

impl EducationTopic {
    pub const ALL: [EducationTopic; 8] = [
        EducationTopic::CreditScoreBasics,
        EducationTopic::ImprovementStrategies,
        EducationTopic::FinancialPlanning,
        EducationTopic::LoanProcess,
        EducationTopic::SavingsHabits,
        EducationTopic::GroupBenefits,
        EducationTopic::DigitalBanking,
        EducationTopic::RiskManagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationTopic::CreditScoreBasics => "credit_score_basics",
            EducationTopic::ImprovementStrategies => "improvement_strategies",
            EducationTopic::FinancialPlanning => "financial_planning",
            EducationTopic::LoanProcess => "loan_process",
            EducationTopic::SavingsHabits => "savings_habits",
            EducationTopic::GroupBenefits => "group_benefits",
            EducationTopic::DigitalBanking => "digital_banking",
            EducationTopic::RiskManagement => "risk_management",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EducationTopic::CreditScoreBasics => "Understanding what credit score means",
            EducationTopic::ImprovementStrategies => "How to improve credit score",
            EducationTopic::FinancialPlanning => "Basic financial planning for rural families",
            EducationTopic::LoanProcess => "Understanding loan application and approval process",
            EducationTopic::SavingsHabits => "Developing good savings and spending habits",
            EducationTopic::GroupBenefits => "Benefits of SHG and cooperative membership",
            EducationTopic::DigitalBanking => "Using mobile banking and digital payments",
            EducationTopic::RiskManagement => "Managing financial risks in farming and business",
        }
    }

    /// Unknown topic names read as [`EducationTopic::CreditScoreBasics`].
    pub fn from_name(name: &str) -> EducationTopic {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .unwrap_or_default()
    }
}

/// Split a model's tip list into at most five tips: blank lines and Markdown headings are
/// dropped, list markers stripped.
pub fn parse_tips(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(strip_list_marker)
        .filter(|tip| !tip.is_empty())
        .take(MAX_TIPS)
        .collect()
}

pub struct EducationalContentAgent {
    dispatcher: Dispatcher,
    explanations: ResponseCache<String>,
    advice: ResponseCache<ImprovementAdvice>,
}

impl EducationalContentAgent {
    pub fn new(dispatcher: Dispatcher, cache_capacity: usize) -> Self {
        Self {
            dispatcher,
            explanations: ResponseCache::new(cache_capacity),
            advice: ResponseCache::new(cache_capacity),
        }
    }

    fn profile_fields(profile: &UserProfile) -> [(&'static str, &str); 3] {
        [
            ("Name", profile.lookup("full_name")),
            ("Occupation", profile.lookup("primary_occupation")),
            ("Village", profile.lookup("village_name")),
        ]
    }

    /// Plain-language explanation of a credit score. Cached per (score, profile, language).
    pub async fn explain_credit_score(
        &mut self,
        credit: &CreditResult,
        profile: &UserProfile,
        language: Language,
    ) -> String {
        let key = cache_key(&json!({
            "score": credit.to_value(),
            "user": profile.to_value(),
            "lang": language,
        }));
        if let Some(hit) = self.explanations.get(&key) {
            return hit;
        }

        let payload = PromptBuilder::new(PromptKind::Educational, language)
            .section(EXPLAIN_CREDIT_TASK)
            .fields("User Profile", &Self::profile_fields(profile))
            .json("Credit Score Results", &credit.to_value())
            .section(EXPLAIN_CREDIT_GUIDANCE)
            .build();

        match self.dispatcher.dispatch(&payload, Sampling::new(800, 0.3)).await {
            Ok(explanation) => {
                self.explanations.insert(key, explanation.clone());
                explanation
            }
            Err(e) => {
                warn!(error = %e, %language, "credit explanation fell back");
                fallback::credit_explanation(credit, language)
            }
        }
    }

    /// Structured improvement plan. Cached per (score, profile, language).
    pub async fn provide_improvement_advice(
        &mut self,
        credit: &CreditResult,
        profile: &UserProfile,
        language: Language,
    ) -> ImprovementAdvice {
        let key = cache_key(&json!({
            "advice": credit.to_value(),
            "user": profile.to_value(),
            "lang": language,
        }));
        if let Some(hit) = self.advice.get(&key) {
            return hit;
        }

        let payload = PromptBuilder::new(PromptKind::Educational, language)
            .section(IMPROVEMENT_ADVICE_TASK)
            .json("User Profile", &profile.to_value())
            .json("Credit Assessment", &credit.to_value())
            .output_schema(IMPROVEMENT_ADVICE_SCHEMA)
            .section("Provide advice in simple, actionable language:")
            .build();

        match self
            .dispatcher
            .dispatch_structured::<ImprovementAdvice>(&payload, Sampling::new(1200, 0.2))
            .await
        {
            Ok(advice) => {
                self.advice.insert(key, advice.clone());
                advice
            }
            Err(e) => {
                warn!(error = %e, %language, "improvement advice fell back");
                fallback::improvement_advice(profile, language)
            }
        }
    }

    /// Short lesson on `topic`, personalized with `context`.
    pub async fn create_financial_education_content(
        &self,
        topic: EducationTopic,
        context: &Value,
        language: Language,
    ) -> String {
        let payload = PromptBuilder::new(PromptKind::Educational, language)
            .section(render(
                EDUCATION_CONTENT_TEMPLATE,
                &[("topic", topic.description())],
            ))
            .json("User Context", context)
            .section(EDUCATION_CONTENT_GUIDANCE)
            .build();

        match self.dispatcher.dispatch(&payload, Sampling::new(1000, 0.4)).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, topic = topic.as_str(), "education content fell back");
                fallback::education_content(topic, language)
            }
        }
    }

    /// Up to five season-specific tips. Not cached.
    pub async fn generate_seasonal_financial_tips(
        &self,
        profile: &UserProfile,
        season: &str,
        language: Language,
    ) -> Vec<String> {
        let owns_land = profile.lookup("owns_land").trim().eq_ignore_ascii_case("yes");
        let payload = PromptBuilder::new(PromptKind::Educational, language)
            .section(SEASONAL_TIPS_TASK)
            .fields(
                "User Profile",
                &[
                    ("Occupation", profile.lookup("primary_occupation")),
                    ("Owns Land", if owns_land { "yes" } else { "no" }),
                    ("Current Season", season),
                ],
            )
            .section(SEASONAL_TIPS_GUIDANCE)
            .build();

        match self.dispatcher.dispatch(&payload, Sampling::new(600, 0.3)).await {
            Ok(text) => {
                let tips = parse_tips(&text);
                if tips.is_empty() {
                    info!(season, "tip list was empty; using fixed tips");
                    fallback::seasonal_tips(language)
                } else {
                    tips
                }
            }
            Err(e) => {
                warn!(error = %e, season, "seasonal tips fell back");
                fallback::seasonal_tips(language)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tips_drop_headings_and_markers() {
        let text = "# Kharif tips\n\n1. Save seed money\n2) Insure the crop\n- Avoid moneylenders\n* Join an SHG\n• Track expenses\n6. Too many";
        assert_eq!(
            parse_tips(text),
            vec![
                "Save seed money",
                "Insure the crop",
                "Avoid moneylenders",
                "Join an SHG",
                "Track expenses"
            ]
        );
    }

    #[test]
    fn unknown_topic_reads_as_basics() {
        assert_eq!(
            EducationTopic::from_name("crypto"),
            EducationTopic::CreditScoreBasics
        );
        assert_eq!(
            EducationTopic::from_name("Savings_Habits"),
            EducationTopic::SavingsHabits
        );
    }

    #[test]
    fn advice_requires_all_five_keys() {
        let partial = r#"{"immediate_actions": [], "motivation_message": "x"}"#;
        assert!(serde_json::from_str::<ImprovementAdvice>(partial).is_err());
        let full = r#"{
            "immediate_actions": ["Open an account"],
            "short_term_goals": [{"goal": "Save", "steps": ["a"]}],
            "long_term_strategies": [],
            "local_resources": [],
            "motivation_message": "You can do it"
        }"#;
        let advice: ImprovementAdvice = serde_json::from_str(full).unwrap();
        assert_eq!(
            advice.immediate_actions[0],
            AdviceItem::Text("Open an account".into())
        );
    }
}
