//! Shared fixtures: a completion backend that counts calls and remembers the last request.

#![allow(dead_code)]

use async_trait::async_trait;
use sahay_core::{
    CompletionBackend, CompletionRequest, CreditResult, DispatchError, Dispatcher, UserProfile,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingBackend {
    response: Option<String>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl RecordingBackend {
    pub fn answering(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::new(self.clone()), "test-model")
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.response
            .clone()
            .ok_or_else(|| DispatchError::Transport("connection refused".into()))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn farmer() -> UserProfile {
    UserProfile::new()
        .with("personal_info", "full_name", "Ramesh Kumar")
        .with("occupation_income", "primary_occupation", "farmer")
        .with("occupation_income", "seasonal_variation", "yes")
        .with("household_location", "village_name", "Davangere Village")
}

pub fn medium_credit() -> CreditResult {
    let mut credit = CreditResult::new(67.0, "Medium");
    credit.recommendation = Some("Needs Support".to_string());
    credit
}
