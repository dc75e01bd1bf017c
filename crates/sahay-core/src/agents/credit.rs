//! Credit scoring on a 0-100 scale.
//!
//! The rule score weighs five profile factors (income stability 25, repayment history 30,
//! social capital 20, asset ownership 15, financial behaviour 10). The model-backed score asks
//! the completion endpoint for the same factors and falls back to the rule score when the
//! answer is missing or malformed. Risk level, recommendation, and key risk factors are always
//! derived locally from the final numbers.

use crate::agents::risk::amount_in_text;
use crate::cache::{cache_key, ResponseCache};
use crate::dispatcher::{Dispatcher, Sampling};
use crate::fallback::is_farming;
use crate::language::Language;
use crate::profile::{CreditResult, UserProfile};
use crate::prompts::templates::{CREDIT_SCORING_SCHEMA, CREDIT_SCORING_TASK};
use crate::prompts::{PromptBuilder, PromptKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// Factor weights in percent; they sum to 100.
pub const FACTOR_WEIGHTS: [(&str, f64); 5] = [
    ("income_stability", 25.0),
    ("repayment_history", 30.0),
    ("social_capital", 20.0),
    ("asset_ownership", 15.0),
    ("financial_behavior", 10.0),
];

const RISK_FACTOR_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScoringMethod {
    #[default]
    #[serde(rename = "rule_based")]
    RuleBased,
    #[serde(rename = "ai_backed")]
    ModelBacked,
}

impl ScoringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::RuleBased => "rule_based",
            ScoringMethod::ModelBacked => "ai_backed",
        }
    }
}

/// Per-factor scores, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorScores {
    pub income_stability: f64,
    pub repayment_history: f64,
    pub social_capital: f64,
    pub asset_ownership: f64,
    pub financial_behavior: f64,
}

impl FactorScores {
    /// Scores in [`FACTOR_WEIGHTS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("income_stability", self.income_stability),
            ("repayment_history", self.repayment_history),
            ("social_capital", self.social_capital),
            ("asset_ownership", self.asset_ownership),
            ("financial_behavior", self.financial_behavior),
        ]
    }

    fn clamped(self) -> Self {
        let c = |v: f64| v.clamp(0.0, 100.0);
        Self {
            income_stability: c(self.income_stability),
            repayment_history: c(self.repayment_history),
            social_capital: c(self.social_capital),
            asset_ownership: c(self.asset_ownership),
            financial_behavior: c(self.financial_behavior),
        }
    }

    /// Weighted 0-100 total, rounded to one decimal.
    pub fn weighted_total(&self) -> f64 {
        let total: f64 = self
            .entries()
            .iter()
            .zip(FACTOR_WEIGHTS.iter())
            .map(|((_, score), (_, weight))| score * weight / 100.0)
            .sum();
        (total * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub credit_score: f64,
    pub scoring_method: ScoringMethod,
    pub factor_scores: FactorScores,
    pub risk_level: String,
    pub recommendation: String,
    pub key_risk_factors: Vec<String>,
    /// Strengths, concerns, and confidence from the model, when it scored the profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<Value>,
}

impl CreditAssessment {
    fn from_scores(
        credit_score: f64,
        factor_scores: FactorScores,
        method: ScoringMethod,
        ai_analysis: Option<Value>,
    ) -> Self {
        let credit_score = credit_score.clamp(0.0, 100.0);
        let risk_level = risk_level(credit_score);
        Self {
            credit_score,
            scoring_method: method,
            factor_scores,
            risk_level: risk_level.to_string(),
            recommendation: recommendation(risk_level).to_string(),
            key_risk_factors: key_risk_factors(&factor_scores),
            ai_analysis,
        }
    }

    /// The shape consumed by the education and risk agents.
    pub fn to_credit_result(&self) -> CreditResult {
        let mut details = Map::new();
        details.insert("scoring_method".into(), json!(self.scoring_method.as_str()));
        details.insert("factor_scores".into(), json!(self.factor_scores));
        details.insert("key_risk_factors".into(), json!(self.key_risk_factors));
        CreditResult {
            credit_score: self.credit_score,
            risk_level: self.risk_level.clone(),
            recommendation: Some(self.recommendation.clone()),
            details,
        }
    }
}

/// ≥ 70 Low, ≥ 50 Medium, ≥ 30 High, otherwise Very High.
pub fn risk_level(credit_score: f64) -> &'static str {
    if credit_score >= 70.0 {
        "Low"
    } else if credit_score >= 50.0 {
        "Medium"
    } else if credit_score >= 30.0 {
        "High"
    } else {
        "Very High"
    }
}

pub fn recommendation(risk_level: &str) -> &'static str {
    match risk_level {
        "Low" => "Approved",
        "Medium" => "Needs Support",
        _ => "Rejected",
    }
}

fn risk_factor_label(factor: &str) -> &'static str {
    match factor {
        "income_stability" => "Irregular or low income source",
        "repayment_history" => "Poor or no repayment track record",
        "social_capital" => "Limited community ties or group membership",
        "asset_ownership" => "Insufficient collateral or asset ownership",
        _ => "Poor financial management or savings habits",
    }
}

/// The three weakest factors scoring below 60, weakest first.
pub fn key_risk_factors(scores: &FactorScores) -> Vec<String> {
    let mut entries = scores.entries();
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
    let factors: Vec<String> = entries
        .iter()
        .take(3)
        .filter(|(_, score)| *score < RISK_FACTOR_THRESHOLD)
        .map(|(factor, _)| risk_factor_label(factor).to_string())
        .collect();
    if factors.is_empty() {
        vec!["No significant risk factors identified".to_string()]
    } else {
        factors
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn income_stability(profile: &UserProfile) -> f64 {
    let occupation = profile.occupation().to_lowercase();
    let mut score = 40.0;
    score += if contains_any(&occupation, &["government", "teacher", "clerk"]) {
        35.0
    } else if is_farming(&occupation) {
        20.0
    } else if contains_any(&occupation, &["business", "shop", "trade"]) {
        25.0
    } else if contains_any(&occupation, &["labor", "labour", "worker", "daily"]) {
        10.0
    } else {
        15.0
    };

    let income = amount_in_text(profile.get("occupation_income", "monthly_income")).unwrap_or(0.0);
    score += if income >= 20_000.0 {
        15.0
    } else if income >= 15_000.0 {
        10.0
    } else if income >= 10_000.0 {
        5.0
    } else {
        0.0
    };

    let seasonal = profile.get("occupation_income", "seasonal_variation").trim().to_lowercase();
    if seasonal == "yes" || seasonal == "high" {
        score -= 10.0;
    }
    let secondary = profile.get("occupation_income", "secondary_income_sources").trim().to_lowercase();
    if !secondary.is_empty() && secondary != "none" && secondary != "no" {
        score += 10.0;
    }
    score
}

fn repayment_history(profile: &UserProfile) -> f64 {
    let repayment = profile.get("financial_details", "repayment_history").to_lowercase();
    let mut score = 50.0;
    if contains_any(&repayment, &["excellent", "perfect", "always on time"]) {
        score += 40.0;
    } else if contains_any(&repayment, &["good", "regular", "no issues"]) {
        score += 30.0;
    } else if contains_any(&repayment, &["fair", "occasional delay"]) {
        score += 10.0;
    } else if contains_any(&repayment, &["late", "missed", "defaulted"]) {
        score -= 30.0;
    } else if contains_any(&repayment, &["bad", "poor", "irregular"]) {
        score -= 40.0;
    }

    let loans = profile.get("financial_details", "existing_loans").trim().to_lowercase();
    if loans.is_empty() || loans == "no" || loans.starts_with("none") || loans.starts_with("no ") {
        score += 10.0;
    } else if contains_any(&loans, &["small", "minor", "manageable"]) {
        score += 5.0;
    } else if contains_any(&loans, &["large", "multiple", "heavy"]) {
        score -= 15.0;
    }

    let past = profile.get("financial_details", "past_loan_amounts").trim().to_lowercase();
    if !past.is_empty() && !past.contains("never") && past != "none" && past != "no" {
        score += 10.0;
    }
    score
}

fn social_capital(profile: &UserProfile) -> f64 {
    let group = profile.get("financial_details", "group_membership").to_lowercase();
    let mut score = 30.0;
    if profile.answers_yes("financial_details", "group_membership")
        || contains_any(&group, &["shg", "cooperative", "society"])
    {
        score += 40.0;
    }
    if profile.answers_yes("financial_details", "bank_account_status") {
        score += 20.0;
    }
    if !profile.get("personal_info", "phone_number").trim().is_empty() {
        score += 10.0;
    }
    score
}

fn asset_ownership(profile: &UserProfile) -> f64 {
    let mut score = 20.0;
    if profile.answers_yes("land_property", "owns_land") {
        score += 50.0;
        let area = profile.get("land_property", "land_area").to_lowercase();
        if area.contains("acre") {
            score += 15.0;
        } else if area.contains("gunta") {
            score += 10.0;
        }
    }
    let house = profile.get("household_location", "house_type").to_lowercase();
    score += if house.contains("semi") {
        10.0
    } else if house.contains("pucca") {
        20.0
    } else if house.contains("kachcha") {
        5.0
    } else {
        0.0
    };
    if profile.answers_yes("household_location", "electricity_connection") {
        score += 5.0;
    }
    score
}

fn financial_behavior(profile: &UserProfile) -> f64 {
    let mut score = 40.0;
    let savings = amount_in_text(profile.get("financial_details", "savings_per_month")).unwrap_or(0.0);
    if savings > 0.0 {
        score += 30.0;
        if savings >= 2_000.0 {
            score += 10.0;
        }
    }
    let income = amount_in_text(profile.get("occupation_income", "monthly_income"));
    let expenses = amount_in_text(profile.get("occupation_income", "monthly_expenses"));
    if let (Some(income), Some(expenses)) = (income, expenses) {
        if income > expenses {
            score += 20.0;
        }
    }
    score
}

/// Rule-based assessment of `profile`. Pure and offline.
pub fn score_profile(profile: &UserProfile) -> CreditAssessment {
    let factors = FactorScores {
        income_stability: income_stability(profile),
        repayment_history: repayment_history(profile),
        social_capital: social_capital(profile),
        asset_ownership: asset_ownership(profile),
        financial_behavior: financial_behavior(profile),
    }
    .clamped();
    CreditAssessment::from_scores(
        factors.weighted_total(),
        factors,
        ScoringMethod::RuleBased,
        None,
    )
}

/// What the model is asked to return.
#[derive(Debug, Deserialize)]
struct ModelScore {
    credit_score: f64,
    factor_scores: FactorScores,
    #[serde(default)]
    ai_analysis: Option<Value>,
}

pub struct CreditScoringAgent {
    dispatcher: Dispatcher,
    cache: ResponseCache<CreditAssessment>,
}

impl CreditScoringAgent {
    pub fn new(dispatcher: Dispatcher, cache_capacity: usize) -> Self {
        Self {
            dispatcher,
            cache: ResponseCache::new(cache_capacity),
        }
    }

    /// Score `profile`. The model-backed method is cached per (profile, language) and falls
    /// back to the rule score; the rule method never calls the model.
    pub async fn calculate_credit_score(
        &mut self,
        profile: &UserProfile,
        method: ScoringMethod,
        language: Language,
    ) -> CreditAssessment {
        if method == ScoringMethod::RuleBased {
            return score_profile(profile);
        }

        let key = cache_key(&json!({
            "data": profile.to_value(),
            "method": method.as_str(),
            "lang": language,
        }));
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let payload = PromptBuilder::new(PromptKind::Credit, language)
            .section(CREDIT_SCORING_TASK)
            .json("User Data", &profile.to_value())
            .output_schema(CREDIT_SCORING_SCHEMA)
            .section("Analyze and return ONLY the JSON:")
            .build();

        match self
            .dispatcher
            .dispatch_structured::<ModelScore>(&payload, Sampling::deterministic(1000))
            .await
        {
            Ok(scored) => {
                let assessment = CreditAssessment::from_scores(
                    scored.credit_score,
                    scored.factor_scores.clamped(),
                    ScoringMethod::ModelBacked,
                    scored.ai_analysis,
                );
                debug!(score = assessment.credit_score, "model credit score");
                self.cache.insert(key, assessment.clone());
                assessment
            }
            Err(e) => {
                warn!(error = %e, %language, "model credit scoring fell back to rules");
                score_profile(profile)
            }
        }
    }
}
