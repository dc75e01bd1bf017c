//! Microfinance agents built on the dispatcher.
//!
//! Each agent owns its cache (and history, where it keeps one) and exposes `async` operations
//! that always return a usable value: live output when the model answers, fallback output
//! otherwise.

pub mod credit;
pub mod education;
pub mod onboarding;
pub mod property;
pub mod rag;
pub mod risk;
pub mod translation;

pub use credit::{CreditAssessment, CreditScoringAgent, FactorScores, ScoringMethod};
pub use education::{AdviceItem, EducationTopic, EducationalContentAgent, ImprovementAdvice};
pub use onboarding::{CompletenessReport, FieldValidation, OnboardingAgent};
pub use property::PropertyVerifier;
pub use rag::{Audience, DatabaseInfo, RagChat};
pub use risk::{
    LoanComparison, LoanDecision, LoanOption, LoanRecommendation, LoanRequest, LoanRiskAdvisor,
    LoanTerms, LoanType, RiskAssessment, Verdict,
};
pub use translation::{Translation, Translator};
