//! Agent behaviour when the completion endpoint is down: every operation still answers, with
//! the same shape as its live path.

mod common;

use common::{farmer, init_tracing, medium_credit, RecordingBackend};
use sahay_core::agents::rag::{CHAT_FAILED, KB_UNAVAILABLE};
use sahay_core::fallback;
use sahay_core::{
    Audience, DatabaseInfo, EducationTopic, EducationalContentAgent, Language, LoanRiskAdvisor,
    OnboardingAgent, RagChat, UserProfile, Verdict,
};
use serde_json::json;

#[tokio::test]
async fn test_hindi_explanation_fallback_names_score_and_risk() {
    init_tracing();
    let backend = RecordingBackend::failing();
    let mut agent = EducationalContentAgent::new(backend.dispatcher(), 16);

    let text = agent
        .explain_credit_score(&medium_credit(), &farmer(), Language::Hindi)
        .await;

    assert!(text.contains("67"));
    assert!(text.contains("Medium"));
    assert!(text.contains("क्रेडिट स्कोर"));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_fallback_explanations_are_not_cached() {
    let backend = RecordingBackend::failing();
    let mut agent = EducationalContentAgent::new(backend.dispatcher(), 16);
    for _ in 0..2 {
        agent
            .explain_credit_score(&medium_credit(), &farmer(), Language::English)
            .await;
    }
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_seasonal_tips_fallback_is_stable() {
    let backend = RecordingBackend::failing();
    let agent = EducationalContentAgent::new(backend.dispatcher(), 16);

    let first = agent
        .generate_seasonal_financial_tips(&farmer(), "Kharif", Language::English)
        .await;
    let second = agent
        .generate_seasonal_financial_tips(&farmer(), "Kharif", Language::English)
        .await;

    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
    assert_eq!(first, fallback::seasonal_tips(Language::English));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_advice_fallback_has_every_key() {
    let backend = RecordingBackend::failing();
    let mut agent = EducationalContentAgent::new(backend.dispatcher(), 16);

    let advice = agent
        .provide_improvement_advice(&medium_credit(), &farmer(), Language::Kannada)
        .await;
    let value = serde_json::to_value(&advice).unwrap();

    for key in [
        "immediate_actions",
        "short_term_goals",
        "long_term_strategies",
        "local_resources",
        "motivation_message",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert_eq!(
        value["long_term_strategies"][0]["seasonal_tip"],
        "SHGs help during lean agricultural seasons"
    );
    assert!(!advice.motivation_message.is_empty());
}

#[tokio::test]
async fn test_education_content_fallback_names_topic() {
    let agent = EducationalContentAgent::new(RecordingBackend::failing().dispatcher(), 4);
    let text = agent
        .create_financial_education_content(
            EducationTopic::SavingsHabits,
            &json!({"occupation": "weaver"}),
            Language::English,
        )
        .await;
    assert_eq!(
        text,
        "Unable to create content about savings_habits. Please try again."
    );
}

#[tokio::test]
async fn test_loan_fallback_follows_score_table() {
    let advisor = LoanRiskAdvisor::new(RecordingBackend::failing().dispatcher(), 8);
    let recommendation = advisor
        .provide_detailed_loan_recommendation(
            &farmer(),
            &medium_credit(),
            None,
            Language::English,
        )
        .await;

    assert_eq!(
        recommendation.loan_recommendation.decision,
        Verdict::ConditionalApprove
    );
    assert_eq!(recommendation.loan_recommendation.maximum_loan_amount, "₹25,000");
    assert_eq!(
        recommendation.final_summary["executive_summary"],
        "Based on credit score of 67, recommendation is CONDITIONAL_APPROVE"
    );
}

#[tokio::test]
async fn test_onboarding_fallback_keeps_existing_profile() {
    let dir = tempfile::tempdir().unwrap();
    let mut agent = OnboardingAgent::new(RecordingBackend::failing().dispatcher(), 8, dir.path());
    let existing = UserProfile::new().with("personal_info", "full_name", "Lakshmi");

    let profile = agent
        .extract_user_info("I grow ragi on two acres", Language::English, Some(&existing))
        .await;

    assert_eq!(profile.full_name(), "Lakshmi");
    assert_eq!(profile.get("household_location", "state"), "Karnataka");
    assert_eq!(profile.occupation(), "");
}

#[tokio::test]
async fn test_rag_without_knowledge_base_or_model() {
    let backend = RecordingBackend::failing();
    let mut chat = RagChat::new(backend.dispatcher(), None, 10);

    let answer = chat
        .get_response("What documents do I need?", Audience::Borrower)
        .await;

    assert_eq!(answer, CHAT_FAILED);
    assert!(chat.history().is_empty());
    let prompt = backend.last_request().unwrap().messages[0].content.clone();
    assert!(prompt.contains(KB_UNAVAILABLE));
    assert!(prompt.contains("No previous conversation."));
    assert_eq!(
        chat.database_info().await,
        DatabaseInfo::Unavailable {
            message: "Vector database not initialized".to_string()
        }
    );
}
