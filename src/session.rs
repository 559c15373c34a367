// src/session.rs
//! Per-user search state and the three model-backed actions run against it.
//!
//! Each action has its own [`RequestState`] and admits one call at a time.
//! The store lock is never held across a model call, so a session can be
//! edited or removed while a call is in flight; results for removed sessions
//! are discarded. A call whose future is dropped before it settles puts its
//! action back to idle.
//!
//! Sessions idle for longer than [`SessionLimits::idle_ttl`] are evicted when a
//! new session is created, as is the least recently used one once the store
//! reaches [`SessionLimits::max_sessions`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gateway::{merge_keywords, GatewayError, PromptGateway};
use crate::types::{FilterState, SavedSearch};
use crate::url_builder::build_search_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    AiFill,
    GenerateQuery,
    SuggestKeywords,
}

impl Action {
    /// Parse the path segment used for the action in the HTTP API.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "ai-fill" => Some(Action::AiFill),
            "generate" => Some(Action::GenerateQuery),
            "suggest-keywords" => Some(Action::SuggestKeywords),
            _ => None,
        }
    }

    /// Message shown to the user when the action fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Action::AiFill => "Failed to generate parameters from your prompt. Please try again.",
            Action::GenerateQuery => "Failed to generate URL and query. Please try again.",
            Action::SuggestKeywords => "Failed to suggest keywords. Please try again.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::AiFill => "AI fill",
            Action::GenerateQuery => "Query generation",
            Action::SuggestKeywords => "Keyword suggestion",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStates {
    pub ai_fill: RequestState,
    pub generate_query: RequestState,
    pub suggest_keywords: RequestState,
}

impl ActionStates {
    pub fn get(&self, action: Action) -> &RequestState {
        match action {
            Action::AiFill => &self.ai_fill,
            Action::GenerateQuery => &self.generate_query,
            Action::SuggestKeywords => &self.suggest_keywords,
        }
    }

    fn get_mut(&mut self, action: Action) -> &mut RequestState {
        match action {
            Action::AiFill => &mut self.ai_fill,
            Action::GenerateQuery => &mut self.generate_query,
            Action::SuggestKeywords => &mut self.suggest_keywords,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),
    #[error("{0} is already in progress")]
    Busy(Action),
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("Saved search name must not be empty")]
    InvalidName,
    #[error("Saved search not found: {0}")]
    SavedSearchNotFound(Uuid),
    #[error("{}", .action.failure_message())]
    ActionFailed {
        action: Action,
        #[source]
        source: GatewayError,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    pub id: Uuid,
    pub filters: FilterState,
    pub prompt: String,
    pub advanced_query: String,
    pub generated_url: String,
    pub actions: ActionStates,
    pub saved_searches: Vec<SavedSearch>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    next_ticket: u64,
    #[serde(skip)]
    tickets: HashMap<Action, u64>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filters: FilterState::initial(),
            prompt: String::new(),
            advanced_query: String::new(),
            generated_url: String::new(),
            actions: ActionStates::default(),
            saved_searches: Vec::new(),
            created_at: now,
            updated_at: now,
            next_ticket: 0,
            tickets: HashMap::new(),
        }
    }

    /// Mark `action` pending and hand out the ticket identifying this call.
    fn begin(&mut self, action: Action) -> Result<u64, SessionError> {
        let state = self.actions.get_mut(action);
        if *state == RequestState::Pending {
            return Err(SessionError::Busy(action));
        }
        *state = RequestState::Pending;
        self.next_ticket += 1;
        self.tickets.insert(action, self.next_ticket);
        Ok(self.next_ticket)
    }

    fn settle(&mut self, action: Action, state: RequestState) {
        self.tickets.remove(&action);
        *self.actions.get_mut(action) = state;
    }

    /// Back to idle, but only if `ticket` is still the call in flight.
    fn cancel(&mut self, action: Action, ticket: u64) -> bool {
        if self.tickets.get(&action) != Some(&ticket) {
            return false;
        }
        self.settle(action, RequestState::Idle);
        true
    }

    /// Return a settled action to idle. A pending action is left alone.
    pub fn acknowledge(&mut self, action: Action) {
        let state = self.actions.get_mut(action);
        if *state != RequestState::Pending {
            *state = RequestState::Idle;
        }
    }

    /// Snapshot the current filters and the URL they build with the last query.
    pub fn save_search(&mut self, name: &str) -> Result<SavedSearch, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidName);
        }

        let url = build_search_url(&self.filters, &self.advanced_query);
        let saved = SavedSearch::new(
            name.to_string(),
            url,
            self.filters.clone(),
            self.advanced_query.clone(),
        );
        self.saved_searches.push(saved.clone());
        Ok(saved)
    }

    pub fn load_saved(&mut self, saved_id: Uuid) -> Result<(), SessionError> {
        let saved = self
            .saved_searches
            .iter()
            .find(|s| s.id == saved_id)
            .ok_or(SessionError::SavedSearchNotFound(saved_id))?;

        self.filters = saved.params.clone();
        self.advanced_query = saved.query.clone();
        self.generated_url = saved.url.clone();
        Ok(())
    }

    pub fn delete_saved(&mut self, saved_id: Uuid) -> Result<(), SessionError> {
        let before = self.saved_searches.len();
        self.saved_searches.retain(|s| s.id != saved_id);
        if self.saved_searches.len() == before {
            return Err(SessionError::SavedSearchNotFound(saved_id));
        }
        Ok(())
    }
}

/// Bounds on how many sessions the store keeps in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_ttl: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl: Duration::minutes(DEFAULT_IDLE_TTL_MINUTES),
        }
    }
}

pub const DEFAULT_MAX_SESSIONS: usize = 1000;
pub const DEFAULT_IDLE_TTL_MINUTES: i64 = 24 * 60;

/// In-memory sessions keyed by id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SearchSession>>>,
    limits: SessionLimits,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: SessionLimits) -> Self {
        Self {
            sessions: Arc::default(),
            limits,
        }
    }

    pub async fn create(&self) -> SearchSession {
        let session = SearchSession::new();
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, session.created_at);
        sessions.insert(session.id, session.clone());
        info!("Created search session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<SearchSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Removed search session {}", id))
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn update_filters(
        &self,
        id: Uuid,
        filters: FilterState,
    ) -> Result<SearchSession, SessionError> {
        self.with_session(id, |session| {
            session.filters = filters;
            Ok(session.clone())
        })
        .await
    }

    pub async fn acknowledge(&self, id: Uuid, action: Action) -> Result<SearchSession, SessionError> {
        self.with_session(id, |session| {
            session.acknowledge(action);
            Ok(session.clone())
        })
        .await
    }

    /// Replace the session's filters with ones extracted from `prompt`.
    /// On failure the existing filters are kept.
    pub async fn ai_fill(
        &self,
        id: Uuid,
        gateway: &PromptGateway,
        prompt: &str,
    ) -> Result<SearchSession, SessionError> {
        let prompt = non_empty_prompt(prompt)?;
        let ticket = self
            .with_session(id, |session| {
                let ticket = session.begin(Action::AiFill)?;
                session.prompt = prompt.to_string();
                Ok(ticket)
            })
            .await?;
        let call = PendingCall::new(self, id, Action::AiFill, ticket);

        let outcome = gateway.extract_filters(prompt).await;

        self.finish(call, outcome, |session, filters| {
            session.filters = filters;
        })
        .await
    }

    /// Generate the boolean query for the current filters and the URL for both.
    pub async fn generate(
        &self,
        id: Uuid,
        gateway: &PromptGateway,
    ) -> Result<SearchSession, SessionError> {
        let (ticket, filters) = self
            .with_session(id, |session| {
                let ticket = session.begin(Action::GenerateQuery)?;
                Ok((ticket, session.filters.clone()))
            })
            .await?;
        let call = PendingCall::new(self, id, Action::GenerateQuery, ticket);

        let outcome = gateway
            .synthesize_query(&filters)
            .await
            .map(|query| {
                let url = build_search_url(&filters, &query);
                (query, url)
            });

        self.finish(call, outcome, |session, (query, url)| {
            info!("Generated search URL for session {}: {}", session.id, url);
            session.advanced_query = query;
            session.generated_url = url;
        })
        .await
    }

    /// Ask for more keywords and append them to the current keyword list.
    pub async fn suggest_keywords(
        &self,
        id: Uuid,
        gateway: &PromptGateway,
        prompt: &str,
    ) -> Result<SearchSession, SessionError> {
        let prompt = non_empty_prompt(prompt)?;
        let (ticket, filters) = self
            .with_session(id, |session| {
                let ticket = session.begin(Action::SuggestKeywords)?;
                Ok((ticket, session.filters.clone()))
            })
            .await?;
        let call = PendingCall::new(self, id, Action::SuggestKeywords, ticket);

        let outcome = gateway.suggest_keywords(prompt, &filters).await;

        self.finish(call, outcome, |session, suggested| {
            session.filters.keywords = merge_keywords(&session.filters.keywords, &suggested);
        })
        .await
    }

    pub async fn save_search(&self, id: Uuid, name: &str) -> Result<SavedSearch, SessionError> {
        self.with_session(id, |session| session.save_search(name)).await
    }

    pub async fn saved_searches(&self, id: Uuid) -> Result<Vec<SavedSearch>, SessionError> {
        self.get(id).await.map(|session| session.saved_searches)
    }

    pub async fn load_saved(&self, id: Uuid, saved_id: Uuid) -> Result<SearchSession, SessionError> {
        self.with_session(id, |session| {
            session.load_saved(saved_id)?;
            Ok(session.clone())
        })
        .await
    }

    pub async fn delete_saved(&self, id: Uuid, saved_id: Uuid) -> Result<(), SessionError> {
        self.with_session(id, |session| session.delete_saved(saved_id))
            .await
    }

    async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SearchSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        session.updated_at = Utc::now();
        f(session)
    }

    async fn finish<T>(
        &self,
        call: PendingCall,
        outcome: Result<T, GatewayError>,
        apply: impl FnOnce(&mut SearchSession, T),
    ) -> Result<SearchSession, SessionError> {
        let mut sessions = self.sessions.write().await;
        let (id, action) = (call.id, call.action);
        call.disarm();

        let Some(session) = sessions.get_mut(&id) else {
            debug!("Session {} removed during {}, discarding result", id, action);
            return Err(SessionError::NotFound(id));
        };
        session.updated_at = Utc::now();

        match outcome {
            Ok(value) => {
                apply(session, value);
                session.settle(action, RequestState::Succeeded);
                Ok(session.clone())
            }
            Err(source) => {
                warn!("{} failed for session {}: {}", action, id, source);
                session.settle(
                    action,
                    RequestState::Failed {
                        message: action.failure_message().to_string(),
                    },
                );
                Err(SessionError::ActionFailed { action, source })
            }
        }
    }

    /// Drop idle sessions, then the least recently used ones until there is
    /// room for one more.
    fn evict(&self, sessions: &mut HashMap<Uuid, SearchSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        let cutoff = now - self.limits.idle_ttl;
        sessions.retain(|_, session| session.updated_at >= cutoff);

        while !sessions.is_empty() && sessions.len() >= self.limits.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|session| session.updated_at)
                .map(|session| session.id);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
            }
        }

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle search sessions", evicted);
        }
    }
}

/// Resets its action to idle if dropped before [`SessionStore::finish`] takes it.
struct PendingCall {
    sessions: Arc<RwLock<HashMap<Uuid, SearchSession>>>,
    id: Uuid,
    action: Action,
    ticket: u64,
    armed: bool,
}

impl PendingCall {
    fn new(store: &SessionStore, id: Uuid, action: Action, ticket: u64) -> Self {
        Self {
            sessions: Arc::clone(&store.sessions),
            id,
            action,
            ticket,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (id, action, ticket) = (self.id, self.action, self.ticket);
        let cancel = move |sessions: &mut HashMap<Uuid, SearchSession>| {
            if let Some(session) = sessions.get_mut(&id) {
                if session.cancel(action, ticket) {
                    warn!("{} for session {} was cancelled before it finished", action, id);
                }
            }
        };

        match self.sessions.try_write() {
            Ok(mut sessions) => cancel(&mut *sessions),
            Err(_) => {
                // Contended lock: settle from a task.
                let sessions = Arc::clone(&self.sessions);
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(async move {
                            cancel(&mut *sessions.write().await);
                        });
                    }
                    Err(_) => warn!("{} for session {} left pending: no runtime", action, id),
                }
            }
        }
    }
}

fn non_empty_prompt(prompt: &str) -> Result<&str, SessionError> {
    if prompt.trim().is_empty() {
        Err(SessionError::EmptyPrompt)
    } else {
        Ok(prompt)
    }
}
