#![allow(dead_code)]

use async_trait::async_trait;
use job_url_builder::gateway::{LanguageModel, ModelRequest};
use job_url_builder::{Action, RequestState, SessionStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Replies with canned text in call order. A gate holds calls until permits are added.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ModelRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self::build(replies, None))
    }

    pub fn gated(replies: Vec<Result<&str, &str>>, gate: Arc<Semaphore>) -> Arc<Self> {
        Arc::new(Self::build(replies, Some(gate)))
    }

    fn build(replies: Vec<Result<&str, &str>>, gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
            gate,
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply".to_string()));

        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        reply.map_err(anyhow::Error::msg)
    }
}

pub async fn wait_until_pending(store: &SessionStore, id: Uuid, action: Action) {
    loop {
        let session = store.get(id).await.expect("session exists");
        if *session.actions.get(action) == RequestState::Pending {
            return;
        }
        tokio::task::yield_now().await;
    }
}

pub const EXTRACTED_FILTERS: &str = r#"{
    "keywords": "Python, Django, Backend",
    "excludeKeywords": "Senior",
    "location": "Berlin, Germany",
    "distance": "25",
    "jobTypes": ["F"],
    "experienceLevels": ["2"],
    "timePosted": "r604800",
    "workplaceTypes": ["3"],
    "companyTypes": ["startup"],
    "sortBy": "R"
}"#;
