//! Sahay core: templated-prompt dispatcher for rural microfinance assistance.
//!
//! Every agent operation follows the same path: build a prompt from the language registry and
//! the caller's profile, check the response cache, dispatch to the hosted completion endpoint,
//! and fall back to deterministic canned output when the endpoint fails. Callers always get a
//! usable answer; transport and parse failures stay inside this crate.

pub mod agents;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fallback;
pub mod history;
pub mod knowledge;
pub mod language;
pub mod normalize;
pub mod profile;
pub mod prompts;

pub use agents::{
    AdviceItem, Audience, CompletenessReport, CreditAssessment, CreditScoringAgent, DatabaseInfo,
    EducationTopic, EducationalContentAgent, FactorScores, FieldValidation, ImprovementAdvice,
    LoanComparison, LoanDecision, LoanOption, LoanRecommendation, LoanRequest, LoanRiskAdvisor,
    LoanTerms, LoanType, OnboardingAgent, PropertyVerifier, RagChat, RiskAssessment,
    ScoringMethod, Translation, Translator, Verdict,
};
pub use cache::{cache_key, ResponseCache};
pub use config::SahayConfig;
pub use dispatcher::{
    CompletionBackend, CompletionRequest, Dispatcher, OpenAiCompatClient, PlaceholderBackend,
    Sampling,
};
pub use error::{ConfigError, DispatchError, ParseError, VectorError};
pub use history::{ConversationHistory, ConversationRecord};
pub use knowledge::{HttpKnowledgeBase, KnowledgeBase, KnowledgeStats};
pub use language::{detect_language, Language, LanguageMode};
pub use profile::{CreditResult, UserProfile, PROFILE_TEMPLATE};
pub use prompts::{system_prompt, ChatMessage, PromptBuilder, PromptKind, PromptPayload};
