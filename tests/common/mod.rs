// Shared test services

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use ponder::providers::{Choice, CompletionRequest, CompletionResponse, CompletionService};
use ponder::usage::TokenUsage;

type Responder = dyn Fn(&CompletionRequest) -> Result<CompletionResponse> + Send + Sync;

/// Completion service that answers with a closure and records every request
pub struct FakeService {
    responder: Box<Responder>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeService {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&CompletionRequest) -> Result<CompletionResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Replays `responses` in order, failing once they run out
    pub fn scripted(responses: Vec<CompletionResponse>) -> Arc<Self> {
        let queue = Mutex::new(responses.into_iter());
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .next()
                .ok_or_else(|| anyhow::anyhow!("no scripted response left"))
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for FakeService {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn reply(texts: &[&str], prompt_tokens: u64, completion_tokens: u64) -> CompletionResponse {
    CompletionResponse::new(
        texts.iter().map(|t| Choice::new(*t)).collect(),
        TokenUsage::new(prompt_tokens, completion_tokens),
    )
}

/// Last user message of a request
pub fn last_user(request: &CompletionRequest) -> &str {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == ponder::Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}
