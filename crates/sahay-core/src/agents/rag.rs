//! Retrieval-augmented chat for borrowers and lenders.
//!
//! Retrieval is delegated to a [`KnowledgeBase`]; this agent concatenates the returned context
//! with a short history excerpt and the audience's role instruction.

use crate::dispatcher::{Dispatcher, Sampling};
use crate::history::ConversationHistory;
use crate::knowledge::{KnowledgeBase, KnowledgeStats};
use crate::language::detect_language;
use crate::prompts::templates::{RAG_BORROWER_ROLE, RAG_GUIDANCE, RAG_LENDER_ROLE};
use crate::prompts::PromptBuilder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const MAX_CONTEXT_CHARS: usize = 1500;
const HISTORY_EXCHANGES: usize = 3;
const HISTORY_RESPONSE_CHARS: usize = 200;

pub const KB_UNAVAILABLE: &str =
    "Vector database not available. I can still help based on my general knowledge.";
pub const KB_RETRIEVAL_FAILED: &str = "Context retrieval temporarily unavailable.";
pub const CHAT_FAILED: &str =
    "I'm experiencing technical difficulties. Please try again in a moment.";

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Borrower,
    Lender,
}

impl Audience {
    fn role(&self) -> &'static str {
        match self {
            Audience::Borrower => RAG_BORROWER_ROLE,
            Audience::Lender => RAG_LENDER_ROLE,
        }
    }
}

const BORROWER_QUESTIONS: [&str; 8] = [
    "How do I apply for a microfinance loan?",
    "What documents do I need for a loan application?",
    "How can I improve my credit score?",
    "What are the different types of savings accounts?",
    "How do I start a small business with a loan?",
    "What government schemes are available for entrepreneurs?",
    "How do I plan my finances and create a budget?",
    "What is the difference between secured and unsecured loans?",
];

const LENDER_QUESTIONS: [&str; 8] = [
    "How do I assess borrower creditworthiness?",
    "What are the current RBI guidelines for microfinance?",
    "How do I manage portfolio risk effectively?",
    "What are the best practices for loan collections?",
    "How do I calculate appropriate interest rates?",
    "What technology solutions can improve MFI operations?",
    "How do I ensure regulatory compliance?",
    "What are the key metrics to track for portfolio health?",
];

/// Knowledge-base status for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DatabaseInfo {
    Unavailable { message: String },
    Available { stats: KnowledgeStats, message: String },
    Error { message: String },
}

pub struct RagChat {
    dispatcher: Dispatcher,
    knowledge: Option<Arc<dyn KnowledgeBase>>,
    history: ConversationHistory,
}

impl RagChat {
    pub fn new(
        dispatcher: Dispatcher,
        knowledge: Option<Arc<dyn KnowledgeBase>>,
        history_capacity: usize,
    ) -> Self {
        Self {
            dispatcher,
            knowledge,
            history: ConversationHistory::new(history_capacity),
        }
    }

    async fn relevant_context(&self, query: &str) -> String {
        let Some(kb) = &self.knowledge else {
            return KB_UNAVAILABLE.to_string();
        };
        match kb.context_for_query(query, MAX_CONTEXT_CHARS).await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "context retrieval failed");
                KB_RETRIEVAL_FAILED.to_string()
            }
        }
    }

    /// Answer `query` for `audience`. Successful exchanges are appended to the history.
    pub async fn get_response(&mut self, query: &str, audience: Audience) -> String {
        let context = self.relevant_context(query).await;
        let language = detect_language(query);
        let payload = PromptBuilder::with_instruction(language, audience.role())
            .section(format!("KNOWLEDGE BASE CONTEXT:\n{}", context))
            .history(
                "RECENT CONVERSATION HISTORY",
                &self.history,
                HISTORY_EXCHANGES,
                HISTORY_RESPONSE_CHARS,
            )
            .section(format!("USER QUESTION: {}", query))
            .section(RAG_GUIDANCE)
            .as_user_message()
            .build();

        match self.dispatcher.dispatch(&payload, Sampling::new(800, 0.7)).await {
            Ok(answer) => {
                self.history.record(query, answer.clone(), language);
                answer
            }
            Err(e) => {
                warn!(error = %e, ?audience, "RAG chat fell back");
                CHAT_FAILED.to_string()
            }
        }
    }

    pub fn suggested_questions(audience: Audience) -> Vec<&'static str> {
        match audience {
            Audience::Borrower => BORROWER_QUESTIONS.to_vec(),
            Audience::Lender => LENDER_QUESTIONS.to_vec(),
        }
    }

    pub async fn database_info(&self) -> DatabaseInfo {
        let Some(kb) = &self.knowledge else {
            return DatabaseInfo::Unavailable {
                message: "Vector database not initialized".to_string(),
            };
        };
        match kb.stats().await {
            Ok(stats) => DatabaseInfo::Available {
                message: format!(
                    "Knowledge base contains {} documents from {} PDF files",
                    stats.total_documents, stats.unique_files
                ),
                stats,
            },
            Err(e) => DatabaseInfo::Error {
                message: format!("Error accessing database: {}", e),
            },
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
