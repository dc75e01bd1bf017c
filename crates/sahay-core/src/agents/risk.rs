//! Lender-side loan risk: rule-based risk assessment, loan terms with EMI, option comparison,
//! and the model-written detailed recommendation.
//!
//! Risk scores run 0-100 with higher meaning safer.

use crate::cache::{cache_key, ResponseCache};
use crate::dispatcher::{Dispatcher, Sampling};
use crate::fallback::{self, is_farming};
use crate::language::Language;
use crate::profile::{CreditResult, UserProfile};
use crate::prompts::templates::{
    LOAN_RECOMMENDATION_SCHEMA, LOAN_RECOMMENDATION_TASK, LOAN_TERMS_GUIDANCE, LOAN_TERMS_TASK,
};
use crate::prompts::{PromptBuilder, PromptKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::{info, warn};

/// Share of monthly income that may go to loan repayments.
pub const MAX_EMI_SHARE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approve,
    ConditionalApprove,
    Reject,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Approve => "APPROVE",
            Verdict::ConditionalApprove => "CONDITIONAL_APPROVE",
            Verdict::Reject => "REJECT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDecision {
    pub decision: Verdict,
    pub confidence: String,
    pub maximum_loan_amount: String,
    pub interest_rate_suggestion: String,
    pub repayment_period: String,
    pub collateral_requirement: String,
}

/// Detailed recommendation. Decision, risk analysis, and summary are always present; the
/// remaining sections only when the model produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecommendation {
    pub loan_recommendation: LoanDecision,
    pub detailed_risk_analysis: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_health_assessment: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_recommendation_reasoning: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_recommendations: Option<Value>,
    pub final_summary: Value,
}

/// Rupee amount from free text ("12,000", "₹ 8000.50"); `None` when not a plain number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Like [`parse_amount`], but also reads amounts inside prose ("15000 rupees") by keeping
/// only the digits.
pub fn amount_in_text(raw: &str) -> Option<f64> {
    parse_amount(raw).or_else(|| {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        digits.parse::<f64>().ok()
    })
}

/// Debt-to-income percentage and recommended maximum EMI for the profile.
pub fn debt_capacity(profile: &UserProfile) -> (f64, f64) {
    let income = parse_amount(profile.get("occupation_income", "monthly_income")).unwrap_or(0.0);
    let debt = parse_amount(profile.get("financial_details", "existing_loans")).unwrap_or(0.0);
    let dti = if income > 0.0 { debt / income * 100.0 } else { 0.0 };
    (dti, income * MAX_EMI_SHARE)
}

fn add_quantitative_metrics(recommendation: &mut LoanRecommendation, profile: &UserProfile) {
    let (dti, max_emi) = debt_capacity(profile);
    let Some(Value::Object(health)) = recommendation.financial_health_assessment.as_mut() else {
        return;
    };
    let capacity = health
        .entry("debt_capacity")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(capacity) = capacity {
        capacity.insert(
            "current_debt_to_income".to_string(),
            json!(format!("{:.1}%", dti)),
        );
        capacity.insert(
            "recommended_max_emi".to_string(),
            json!(format!("₹{:.0}", max_emi)),
        );
    }
}

/// Two-decimal rounding for money and rates.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole rupees with thousands separators (`₹125,000`).
pub fn format_rupees(amount: f64) -> String {
    let digits = format!("{:.0}", amount.max(0.0));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("₹{}", grouped)
}

/// Equated monthly instalment for `principal` at `annual_rate_pct` over `months`.
/// A zero rate divides the principal evenly; zero months is treated as one.
pub fn monthly_emi(principal: f64, annual_rate_pct: f64, months: u32) -> f64 {
    let n = f64::from(months.max(1));
    let r = annual_rate_pct / 12.0 / 100.0;
    if r <= 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Agriculture,
    MicroBusiness,
    #[default]
    Personal,
    Housing,
    Education,
}

/// Lending limits for one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductTerms {
    pub max_amount: f64,
    /// (lowest, highest) annual rate in percent
    pub interest_rate_range: (f64, f64),
    /// (shortest, longest) tenure in months
    pub typical_tenure: (u32, u32),
    pub collateral_required: bool,
    pub seasonal_considerations: bool,
}

impl LoanType {
    pub const ALL: [LoanType; 5] = [
        LoanType::Agriculture,
        LoanType::MicroBusiness,
        LoanType::Personal,
        LoanType::Housing,
        LoanType::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Agriculture => "agriculture",
            LoanType::MicroBusiness => "micro_business",
            LoanType::Personal => "personal",
            LoanType::Housing => "housing",
            LoanType::Education => "education",
        }
    }

    /// Unknown products are personal loans.
    pub fn from_name(name: &str) -> LoanType {
        let name = name.trim();
        LoanType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }

    pub fn terms(&self) -> ProductTerms {
        let (max_amount, interest_rate_range, typical_tenure, collateral_required, seasonal) =
            match self {
                LoanType::Agriculture => (500_000.0, (8.5, 12.0), (12, 60), false, true),
                LoanType::MicroBusiness => (200_000.0, (10.0, 14.0), (6, 36), false, false),
                LoanType::Personal => (100_000.0, (12.0, 18.0), (3, 24), false, false),
                LoanType::Housing => (1_000_000.0, (8.0, 11.0), (60, 240), true, false),
                LoanType::Education => (300_000.0, (9.0, 13.0), (12, 84), false, false),
            };
        ProductTerms {
            max_amount,
            interest_rate_range,
            typical_tenure,
            collateral_required,
            seasonal_considerations: seasonal,
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan application: amount, product, and stated purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    #[serde(alias = "requested_amount")]
    pub amount: f64,
    #[serde(rename = "type", alias = "loan_type", default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub purpose: String,
}

impl LoanRequest {
    pub fn new(amount: f64, loan_type: LoanType) -> Self {
        Self {
            amount,
            loan_type,
            purpose: String::new(),
        }
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }
}

/// Risk factors as (name, weight, threshold).
pub const RISK_FACTORS: [(&str, f64, f64); 5] = [
    ("income_stability", 0.25, 60.0),
    ("debt_to_income", 0.20, 40.0),
    ("credit_history", 0.25, 65.0),
    ("collateral_value", 0.15, 70.0),
    ("social_capital", 0.15, 50.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskScores {
    pub income_stability: f64,
    pub debt_to_income: f64,
    pub credit_history: f64,
    pub collateral_value: f64,
    pub social_capital: f64,
}

impl RiskScores {
    /// Scores in [`RISK_FACTORS`] order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("income_stability", self.income_stability),
            ("debt_to_income", self.debt_to_income),
            ("credit_history", self.credit_history),
            ("collateral_value", self.collateral_value),
            ("social_capital", self.social_capital),
        ]
    }

    pub fn overall(&self) -> f64 {
        self.entries()
            .iter()
            .zip(RISK_FACTORS.iter())
            .map(|((_, score), (_, weight, _))| score * weight)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactorStatus {
    Strong,
    Adequate,
    Weak,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorAnalysis {
    pub factor: String,
    pub score: f64,
    pub status: FactorStatus,
    pub threshold: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk_score: f64,
    /// "Low Risk", "Medium Risk", "High Risk", or "Very High Risk"
    pub risk_category: String,
    pub individual_scores: RiskScores,
    pub loan_details: LoanRequest,
    pub risk_factors_analysis: Vec<FactorAnalysis>,
    pub approval_recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub recommended_amount: f64,
    pub interest_rate: f64,
    pub tenure_months: u32,
    pub monthly_emi: f64,
    pub total_interest: f64,
    pub total_repayment: f64,
    /// One percent of the recommended amount.
    pub processing_fee: f64,
    pub collateral_required: bool,
    pub guarantor_required: bool,
    pub terms_explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOption {
    pub loan_option: LoanRequest,
    pub risk_assessment: RiskAssessment,
    pub recommended_terms: LoanTerms,
    pub affordability_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanComparison {
    /// Best first.
    pub loan_comparisons: Vec<LoanOption>,
    pub recommended_option: Option<LoanOption>,
    pub comparison_summary: String,
}

/// Longest tenure offered whatever the product allows.
pub const MAX_TENURE_MONTHS: u32 = 36;

fn income_of(profile: &UserProfile) -> f64 {
    amount_in_text(profile.get("occupation_income", "monthly_income")).unwrap_or(0.0)
}

fn has_existing_loans(profile: &UserProfile) -> bool {
    let loans = profile.get("financial_details", "existing_loans").trim().to_lowercase();
    !(loans.is_empty() || loans == "no" || loans.starts_with("none") || loans.starts_with("no "))
}

fn assess_income_stability(profile: &UserProfile, amount: f64) -> f64 {
    let mut score = 50.0;
    let income = income_of(profile);
    if income > 0.0 && amount > 0.0 {
        let coverage = income * 12.0 / amount;
        score += if coverage > 2.0 {
            30.0
        } else if coverage > 1.0 {
            20.0
        } else if coverage > 0.5 {
            10.0
        } else {
            0.0
        };
    }
    let occupation = profile.occupation().to_lowercase();
    if occupation.contains("government") {
        score += 20.0;
    } else if is_farming(&occupation) {
        score += 10.0;
    } else if occupation.contains("business") {
        score += 15.0;
    }
    if profile.answers_yes("occupation_income", "seasonal_variation") {
        score -= 10.0;
    }
    score
}

fn assess_debt_to_income(profile: &UserProfile, amount: f64) -> f64 {
    let mut score = 70.0;
    let income = income_of(profile);
    if income > 0.0 && has_existing_loans(profile) {
        // new EMI estimated at 2% of the principal
        let ratio = amount * 0.02 / income;
        score += if ratio < 0.3 {
            20.0
        } else if ratio < 0.4 {
            10.0
        } else if ratio < 0.5 {
            -10.0
        } else {
            -30.0
        };
    }
    score
}

fn assess_credit_history(profile: &UserProfile) -> f64 {
    let repayment = profile.get("financial_details", "repayment_history").to_lowercase();
    let mut score = 60.0;
    if repayment.contains("excellent") {
        score += 30.0;
    } else if repayment.contains("good") {
        score += 20.0;
    } else if repayment.contains("late") {
        score -= 20.0;
    } else if repayment.contains("missed") {
        score -= 40.0;
    }
    if profile.answers_yes("financial_details", "bank_account_status") {
        score += 10.0;
    }
    score
}

fn assess_collateral_value(profile: &UserProfile) -> f64 {
    let mut score = 50.0;
    if profile.answers_yes("land_property", "owns_land") {
        score += 30.0;
        if profile
            .get("land_property", "land_area")
            .chars()
            .any(|c| c.is_ascii_digit())
        {
            score += 20.0;
        }
    }
    let house = profile.get("household_location", "house_type").to_lowercase();
    if house.contains("semi") {
        score += 10.0;
    } else if house.contains("pucca") {
        score += 20.0;
    }
    score
}

fn assess_social_capital(profile: &UserProfile) -> f64 {
    let mut score = 40.0;
    let group = profile.get("financial_details", "group_membership").to_lowercase();
    if profile.answers_yes("financial_details", "group_membership") || group.contains("shg") {
        score += 30.0;
    }
    if profile.answers_yes("financial_details", "bank_account_status") {
        score += 20.0;
    }
    if !profile.get("personal_info", "phone_number").trim().is_empty() {
        score += 10.0;
    }
    score
}

fn risk_category(score: f64) -> &'static str {
    if score >= 80.0 {
        "Low Risk"
    } else if score >= 60.0 {
        "Medium Risk"
    } else if score >= 40.0 {
        "High Risk"
    } else {
        "Very High Risk"
    }
}

fn approval_recommendation(score: f64) -> &'static str {
    if score >= 75.0 {
        "APPROVED - Low risk applicant, standard terms recommended"
    } else if score >= 60.0 {
        "CONDITIONAL APPROVAL - Medium risk, enhanced terms recommended"
    } else if score >= 45.0 {
        "CONDITIONAL APPROVAL - High risk, strict conditions apply"
    } else {
        "REJECTED - Very high risk, alternative products suggested"
    }
}

fn analyze_factors(scores: &RiskScores) -> Vec<FactorAnalysis> {
    scores
        .entries()
        .iter()
        .zip(RISK_FACTORS.iter())
        .map(|((factor, score), (_, weight, threshold))| FactorAnalysis {
            factor: factor.to_string(),
            score: *score,
            status: if score >= threshold {
                FactorStatus::Strong
            } else if *score >= threshold - 20.0 {
                FactorStatus::Adequate
            } else {
                FactorStatus::Weak
            },
            threshold: *threshold,
            weight: *weight,
        })
        .collect()
}

/// Rule-based terms for an assessment; `terms_explanation` is the English summary.
///
/// Risk ≥ 80 gets the lowest rate, the full amount, and the longest tenure; ≥ 60 the middle
/// rate, 80% of the amount and tenure; anything lower the highest rate, half the amount, and
/// 1.5× the shortest tenure. Tenure never exceeds [`MAX_TENURE_MONTHS`].
pub fn loan_terms(assessment: &RiskAssessment) -> LoanTerms {
    let score = assessment.overall_risk_score;
    let requested = assessment.loan_details.amount;
    let product = assessment.loan_details.loan_type.terms();
    let (low_rate, high_rate) = product.interest_rate_range;
    let (short, long) = product.typical_tenure;

    let (rate, amount, tenure) = if score >= 80.0 {
        (low_rate, requested.min(product.max_amount), f64::from(long))
    } else if score >= 60.0 {
        (
            (low_rate + high_rate) / 2.0,
            (requested * 0.8).min(product.max_amount),
            f64::from(long) * 0.8,
        )
    } else {
        (
            high_rate,
            (requested * 0.5).min(product.max_amount * 0.5),
            f64::from(short) * 1.5,
        )
    };
    let tenure_months = (tenure.floor() as u32).clamp(1, MAX_TENURE_MONTHS);
    let emi = monthly_emi(amount, rate, tenure_months);
    let total_repayment = emi * f64::from(tenure_months);

    let mut terms = LoanTerms {
        recommended_amount: round2(amount),
        interest_rate: round2(rate),
        tenure_months,
        monthly_emi: round2(emi),
        total_interest: round2(total_repayment - amount),
        total_repayment: round2(total_repayment),
        processing_fee: round2(amount * 0.01),
        collateral_required: product.collateral_required && score < 70.0,
        guarantor_required: score < 60.0,
        terms_explanation: String::new(),
    };
    terms.terms_explanation =
        fallback::loan_terms_explanation(&assessment.risk_category, &terms, Language::English);
    terms
}

/// 0-100: how comfortably the EMI fits in income left after expenses (expenses default to
/// 70% of income). Profiles without income score 50.
pub fn affordability(profile: &UserProfile, terms: &LoanTerms) -> f64 {
    let income = income_of(profile);
    if income <= 0.0 {
        return 50.0;
    }
    let expenses = amount_in_text(profile.get("occupation_income", "monthly_expenses"))
        .unwrap_or(income * 0.7);
    let disposable = income - expenses;
    if disposable <= 0.0 {
        return 0.0;
    }
    let ratio = terms.monthly_emi / disposable;
    if ratio <= 0.3 {
        100.0
    } else if ratio <= 0.4 {
        80.0
    } else if ratio <= 0.5 {
        60.0
    } else if ratio <= 0.6 {
        40.0
    } else {
        20.0
    }
}

fn comparison_summary(options: &[LoanOption]) -> String {
    match options.first() {
        None => "No loan options available for comparison.".to_string(),
        Some(best) => format!(
            "Recommended: {} loan of {} at {}% interest with EMI of {}.",
            best.loan_option.loan_type,
            format_rupees(best.recommended_terms.recommended_amount),
            best.recommended_terms.interest_rate,
            format_rupees(best.recommended_terms.monthly_emi),
        ),
    }
}

pub struct LoanRiskAdvisor {
    dispatcher: Dispatcher,
    terms_cache: ResponseCache<LoanTerms>,
}

impl LoanRiskAdvisor {
    pub fn new(dispatcher: Dispatcher, cache_capacity: usize) -> Self {
        Self {
            dispatcher,
            terms_cache: ResponseCache::new(cache_capacity),
        }
    }

    /// Weighted five-factor risk assessment of `request` for `profile`. Offline.
    pub fn assess_loan_risk(profile: &UserProfile, request: &LoanRequest) -> RiskAssessment {
        let amount = request.amount.max(0.0);
        let individual_scores = RiskScores {
            income_stability: assess_income_stability(profile, amount).clamp(0.0, 100.0),
            debt_to_income: assess_debt_to_income(profile, amount).clamp(0.0, 100.0),
            credit_history: assess_credit_history(profile).clamp(0.0, 100.0),
            collateral_value: assess_collateral_value(profile).clamp(0.0, 100.0),
            social_capital: assess_social_capital(profile).clamp(0.0, 100.0),
        };
        let overall = round2(individual_scores.overall());
        RiskAssessment {
            overall_risk_score: overall,
            risk_category: risk_category(overall).to_string(),
            individual_scores,
            loan_details: request.clone(),
            risk_factors_analysis: analyze_factors(&individual_scores),
            approval_recommendation: approval_recommendation(overall).to_string(),
        }
    }

    /// Terms with EMI for an assessment, explained in `language` by the model. Cached per
    /// (assessment, language); on model failure the explanation is the localized template and
    /// nothing is cached.
    pub async fn recommend_loan_terms(
        &mut self,
        assessment: &RiskAssessment,
        language: Language,
    ) -> LoanTerms {
        let key = cache_key(&json!({"risk": assessment, "lang": language}));
        if let Some(hit) = self.terms_cache.get(&key) {
            return hit;
        }

        let mut terms = loan_terms(assessment);
        let payload = PromptBuilder::new(PromptKind::Risk, language)
            .section(LOAN_TERMS_TASK)
            .json("Risk Assessment", &json!(assessment))
            .json("Recommended Terms", &json!(terms))
            .section(LOAN_TERMS_GUIDANCE)
            .build();

        match self.dispatcher.dispatch(&payload, Sampling::new(400, 0.2)).await {
            Ok(explanation) => {
                terms.terms_explanation = explanation;
                self.terms_cache.insert(key, terms.clone());
            }
            Err(e) => {
                warn!(error = %e, %language, "loan terms explanation fell back");
                terms.terms_explanation = fallback::loan_terms_explanation(
                    &assessment.risk_category,
                    &terms,
                    language,
                );
            }
        }
        info!(
            amount = terms.recommended_amount,
            rate = terms.interest_rate,
            months = terms.tenure_months,
            emi = terms.monthly_emi,
            "loan terms recommended"
        );
        terms
    }

    /// Assess and price each option, ranked by 40% risk score and 60% affordability.
    pub async fn compare_loan_options(
        &mut self,
        profile: &UserProfile,
        options: &[LoanRequest],
        language: Language,
    ) -> LoanComparison {
        let mut compared = Vec::with_capacity(options.len());
        for option in options {
            let risk_assessment = Self::assess_loan_risk(profile, option);
            let recommended_terms = self.recommend_loan_terms(&risk_assessment, language).await;
            let affordability_score = affordability(profile, &recommended_terms);
            compared.push(LoanOption {
                loan_option: option.clone(),
                risk_assessment,
                recommended_terms,
                affordability_score,
            });
        }
        let rank = |o: &LoanOption| {
            o.risk_assessment.overall_risk_score * 0.4 + o.affordability_score * 0.6
        };
        compared.sort_by(|a, b| rank(b).total_cmp(&rank(a)));

        LoanComparison {
            comparison_summary: comparison_summary(&compared),
            recommended_option: compared.first().cloned(),
            loan_comparisons: compared,
        }
    }

    /// Full recommendation for an MFI officer. Falls back to the score-threshold table.
    pub async fn provide_detailed_loan_recommendation(
        &self,
        profile: &UserProfile,
        credit: &CreditResult,
        property: Option<&Value>,
        language: Language,
    ) -> LoanRecommendation {
        let empty = json!({});
        let payload = PromptBuilder::new(PromptKind::RiskAdvisor, language)
            .section(LOAN_RECOMMENDATION_TASK)
            .json("USER PROFILE", &profile.to_value())
            .json("CREDIT ASSESSMENT", &credit.to_value())
            .json("PROPERTY VERIFICATION", property.unwrap_or(&empty))
            .output_schema(LOAN_RECOMMENDATION_SCHEMA)
            .section("Provide comprehensive, actionable analysis:")
            .build();

        match self
            .dispatcher
            .dispatch_structured::<LoanRecommendation>(&payload, Sampling::new(3000, 0.1))
            .await
        {
            Ok(mut recommendation) => {
                add_quantitative_metrics(&mut recommendation, profile);
                recommendation
            }
            Err(e) => {
                warn!(error = %e, score = credit.credit_score, "loan recommendation fell back");
                fallback::loan_recommendation(credit)
            }
        }
    }
}
