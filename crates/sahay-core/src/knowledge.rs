//! Knowledge-base collaborator for RAG chat.
//!
//! Retrieval and ranking live in an external vector-database sidecar; this crate only asks it
//! for a context string and for collection statistics.

use crate::config::SahayConfig;
use crate::error::{VectorError, VectorResult};
use crate::history::take_chars;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Collection statistics reported by the sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub total_documents: u64,
    pub unique_files: u64,
}

#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Concatenated context for `query`, at most `max_context_length` chars.
    async fn context_for_query(&self, query: &str, max_context_length: usize)
        -> VectorResult<String>;

    async fn stats(&self) -> VectorResult<KnowledgeStats>;
}

#[derive(Serialize)]
struct ContextRequest<'a> {
    query: &'a str,
    max_context_length: usize,
}

#[derive(Deserialize)]
struct ContextResponse {
    context: String,
}

/// HTTP client for the sidecar: `POST {base}/context`, `GET {base}/stats`.
pub struct HttpKnowledgeBase {
    base_url: String,
    client: reqwest::Client,
}

impl HttpKnowledgeBase {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &SahayConfig) -> VectorResult<Self> {
        let url = config
            .vector_db_url
            .as_deref()
            .ok_or(VectorError::NotConfigured)?;
        Ok(Self::new(
            url,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn context_for_query(
        &self,
        query: &str,
        max_context_length: usize,
    ) -> VectorResult<String> {
        let url = format!("{}/context", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&ContextRequest {
                query,
                max_context_length,
            })
            .send()
            .await
            .map_err(|e| VectorError::ConnectionFailed(e.to_string()))?;
        if !res.status().is_success() {
            return Err(VectorError::QueryFailed(format!(
                "context request returned {}",
                res.status()
            )));
        }
        let body: ContextResponse = res
            .json()
            .await
            .map_err(|e| VectorError::QueryFailed(e.to_string()))?;
        Ok(take_chars(&body.context, max_context_length).to_string())
    }

    async fn stats(&self) -> VectorResult<KnowledgeStats> {
        let url = format!("{}/stats", self.base_url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VectorError::ConnectionFailed(e.to_string()))?;
        if !res.status().is_success() {
            return Err(VectorError::QueryFailed(format!(
                "stats request returned {}",
                res.status()
            )));
        }
        res.json()
            .await
            .map_err(|e| VectorError::QueryFailed(e.to_string()))
    }
}

/// Knowledge base from config, or `None` when no sidecar URL is set.
pub fn create_knowledge_base(config: &SahayConfig) -> Option<Arc<dyn KnowledgeBase>> {
    match HttpKnowledgeBase::from_config(config) {
        Ok(kb) => {
            info!(url = config.vector_db_url.as_deref().unwrap_or(""), "knowledge base configured");
            Some(Arc::new(kb))
        }
        Err(e) => {
            warn!("RAG chat will answer without retrieval: {}", e);
            None
        }
    }
}
