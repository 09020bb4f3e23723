//! The per-turn pipeline itself (§4.11 steps 1-9).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use uia_catalog::Catalog;
use uia_core::config::UiaConfig;
use uia_core::model::{
    Message, MessageRole, MessageType, Survey, SurveyType,
};
use uia_core::UiaError;
use uia_intent::{classify_scope, detect_intent, ScopeOutcome};
use uia_llm::{CompletionOptions, LlmClient};
use uia_nudge::generate_nudge;
use uia_insights::run_stage1;
use uia_progress::{labels, ProgressBroker};
use uia_rag::{RagEngine, RagRequest};
use uia_state::ChatStateStore;
use uia_survey::{build_employment_survey, build_insight_survey_envelope, build_skills_survey};

use crate::error::Result;
use crate::history::ChatHistory;

/// Drives one user turn end-to-end (C11, §4.11).
///
/// Holds `Arc`s to every collaborating component plus its own
/// chat-id-keyed cancellation-token map, mirroring
/// `skynet-gateway::AppState::active_operations` (§4.11 ambient detail).
pub struct TurnOrchestrator {
    llm: Arc<dyn LlmClient>,
    catalog: Arc<Catalog>,
    store: Arc<ChatStateStore>,
    progress: Arc<ProgressBroker>,
    rag: Arc<RagEngine>,
    config: UiaConfig,
    active_operations: DashMap<String, CancellationToken>,
}

impl TurnOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        catalog: Arc<Catalog>,
        store: Arc<ChatStateStore>,
        progress: Arc<ProgressBroker>,
        rag: Arc<RagEngine>,
        config: UiaConfig,
    ) -> Self {
        Self {
            llm,
            catalog,
            store,
            progress,
            rag,
            config,
            active_operations: DashMap::new(),
        }
    }

    /// Abort a turn currently running for `chat_id`, if any (the `/stop`
    /// equivalent). Returns `true` if a running turn was found and signalled.
    pub fn cancel(&self, chat_id: &str) -> bool {
        match self.active_operations.get(chat_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn base_opts(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.config.llm.model.clone(),
            temperature: 0.2,
            max_tokens: 512,
            system: None,
            timeout: Duration::from_secs(self.config.llm.request_timeout_secs),
        }
    }

    /// Runs the full per-turn pipeline (§4.11) and returns the persisted
    /// assistant message. `cancel` is an optional externally-driven token;
    /// the orchestrator also registers its own token under `chat_id` for
    /// `cancel()` above, combining both via `tokio::select!`.
    #[instrument(skip(self, history, user_text, cancel), fields(chat_id, request_id))]
    pub async fn run_turn(
        &self,
        history: &dyn ChatHistory,
        chat_id: &str,
        request_id: &str,
        user_text: &str,
        cancel: Option<CancellationToken>,
    ) -> Result<Message> {
        let own_token = CancellationToken::new();
        self.active_operations.insert(chat_id.to_string(), own_token.clone());

        let outcome = tokio::select! {
            biased;
            _ = own_token.cancelled() => self.cancelled_result(request_id),
            _ = cancelled_or_pending(cancel.as_ref()) => self.cancelled_result(request_id),
            result = self.run_turn_inner(history, chat_id, request_id, user_text) => {
                result.inspect_err(|e| {
                    self.progress.publish(request_id, labels::ERROR, Some(e.to_string()));
                })
            }
        };

        self.active_operations.remove(chat_id);
        outcome
    }

    fn cancelled_result(&self, request_id: &str) -> Result<Message> {
        self.progress.publish(request_id, labels::ERROR, Some("cancelled".to_string()));
        Err(UiaError::Transient("turn cancelled".to_string()))
    }

    async fn run_turn_inner(
        &self,
        history: &dyn ChatHistory,
        chat_id: &str,
        request_id: &str,
        user_text: &str,
    ) -> Result<Message> {
        let now = chrono::Utc::now();
        history
            .append(Message {
                id: Uuid::now_v7().to_string(),
                chat_id: chat_id.to_string(),
                role: MessageRole::User,
                message_type: MessageType::Text,
                content: user_text.to_string(),
                survey_type: None,
                survey: None,
                enc_question: None,
                sources: Vec::new(),
                scope_label: None,
                created_at: now,
            })
            .await;
        self.progress.publish(request_id, labels::RECEIVED, None);

        let previous_enc_question = history.last_assistant_enc_question(chat_id).await;
        let has_pending_nudge = previous_enc_question.as_deref().is_some_and(|s| !s.is_empty());

        // ---- 2. Scope gate ----
        self.progress.publish(request_id, labels::SCOPE_GATE, None);
        let opts = self.base_opts();
        match classify_scope(self.llm.as_ref(), &opts, user_text, has_pending_nudge).await {
            ScopeOutcome::Reject { message } => {
                return self
                    .finish_terminal(history, chat_id, request_id, message, "out_of_scope")
                    .await;
            }
            ScopeOutcome::Explain { message } => {
                return self
                    .finish_terminal(history, chat_id, request_id, message, "about_system")
                    .await;
            }
            ScopeOutcome::Proceed => {}
        }

        // ---- 3. Employment / skills flow ----
        self.progress.publish(request_id, labels::INTENT, None);
        let intent = detect_intent(self.llm.as_ref(), &opts, &self.catalog, user_text).await;
        info!(
            employment_intent = intent.employment_intent,
            skills_intent = intent.skills_intent,
            category_hit = ?intent.category_hit,
            "intent detected"
        );

        self.progress.publish(request_id, labels::SURVEY_GATE, None);
        let (mut category_id, mut just_recorded_category) =
            (self.store.get_chat_state(chat_id)?.and_then(|s| s.employment_category_id), false);

        if category_id.is_none() {
            if let Some(hit) = &intent.category_hit {
                if self.config.catalog.persistable_categories.iter().any(|c| c == hit) {
                    match self.store.set_employment_category(chat_id, hit, self.catalog.vault_version()) {
                        Ok(state) => {
                            category_id = state.employment_category_id;
                            just_recorded_category = true;
                        }
                        Err(e) => warn!(error = %e, "failed to record first-seen category hit"),
                    }
                }
            }
        }

        let mut chosen_survey: Option<(SurveyType, Survey)> = None;

        if category_id.is_none() {
            if intent.employment_intent {
                chosen_survey = Some((SurveyType::EcSurvey, Survey::Employment(build_employment_survey(&self.catalog))));
            }
        } else if let Some(cat_id) = category_id.clone() {
            let skills_recorded = self
                .store
                .get_chat_state(chat_id)?
                .is_some_and(|s| s.skills_recorded());
            if !skills_recorded && (intent.skills_intent || just_recorded_category) {
                let survey = build_skills_survey(&self.catalog, &cat_id)?;
                chosen_survey = Some((SurveyType::SkillsSurvey, Survey::Skills(survey)));
            }
        }

        // ---- 4. Insight inference (unconditional) + gated insight survey ----
        self.progress.publish(request_id, labels::INSIGHTS_STAGE1, None);
        let stage1 = run_stage1(self.llm.as_ref(), &opts, &self.store, &self.catalog, chat_id, user_text)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "stage-1 insight inference aborted for this turn");
                Default::default()
            });

        if chosen_survey.is_none() {
            let skills_recorded = self
                .store
                .get_chat_state(chat_id)?
                .is_some_and(|s| s.skills_recorded());
            if category_id.is_some() && skills_recorded {
                let envelope = build_insight_survey_envelope(&self.catalog, &stage1.pending_by_batch);
                if !envelope.batches.is_empty() {
                    chosen_survey = Some((SurveyType::InsightSurvey, Survey::Insight(envelope)));
                }
            }
            // else: skipReason=prereqs_not_met, nothing attached this turn.
        }

        // ---- 5. RAG answer ----
        self.progress.publish(request_id, labels::RAG_INIT, None);
        let rag_req = RagRequest {
            request_id: request_id.to_string(),
            current_question: user_text.to_string(),
            previous_question: previous_enc_question,
            doc_filters: None,
            allow_general_knowledge: self.config.rag.allow_general_knowledge,
            max_general_fraction: self.config.rag.max_general_fraction,
            token_limit: 0,
        };
        let rag_answer = self.rag.answer(&rag_req).await;

        // ---- 6. Nudge ----
        self.progress.publish(request_id, labels::NUDGE, None);
        let surveys_prepared = if chosen_survey.is_some() { 1 } else { 0 };
        let nudge = generate_nudge(self.llm.as_ref(), &opts, &self.store, &self.catalog, chat_id, user_text, surveys_prepared)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "nudge generation failed for this turn");
                None
            });

        // ---- 7. Compose assistant message ----
        self.progress.publish(request_id, labels::COMPOSE, None);
        let (survey_type, survey) = match chosen_survey {
            Some((st, s)) => (Some(st), Some(s)),
            None => (None, None),
        };
        let enc_question = if survey.is_none() { nudge } else { None };

        let assistant = Message {
            id: Uuid::now_v7().to_string(),
            chat_id: chat_id.to_string(),
            role: MessageRole::Assistant,
            message_type: if survey.is_some() { MessageType::Survey } else { MessageType::Text },
            content: rag_answer.answer_markdown,
            survey_type,
            survey,
            enc_question,
            sources: rag_answer
                .sources
                .into_iter()
                .map(|s| uia_core::model::message::SourceRef {
                    chunk_id: s.chunk_id,
                    breadcrumb: s.breadcrumb,
                })
                .collect(),
            scope_label: None,
            created_at: chrono::Utc::now(),
        };

        debug_assert!(assistant.satisfies_survey_precedence());

        history.append(assistant.clone()).await;
        self.progress.publish(request_id, labels::DONE, None);
        Ok(assistant)
    }

    /// Steps 2's early-return paths: commit a single text message and stop
    /// (neither the out-of-scope rejection nor the about-system explainer
    /// runs any further stage).
    async fn finish_terminal(
        &self,
        history: &dyn ChatHistory,
        chat_id: &str,
        request_id: &str,
        content: String,
        scope_label: &str,
    ) -> Result<Message> {
        let message = Message {
            id: Uuid::now_v7().to_string(),
            chat_id: chat_id.to_string(),
            role: MessageRole::Assistant,
            message_type: MessageType::Text,
            content,
            survey_type: None,
            survey: None,
            enc_question: None,
            sources: Vec::new(),
            scope_label: Some(scope_label.to_string()),
            created_at: chrono::Utc::now(),
        };
        history.append(message.clone()).await;
        self.progress.publish(request_id, labels::DONE, None);
        Ok(message)
    }
}

/// Waits on a caller-supplied token's cancellation, or never resolves when
/// no token was given -- lets `run_turn`'s `select!` treat "no caller
/// token" and "own token not yet cancelled" uniformly without an extra
/// background task to bridge the two signals.
async fn cancelled_or_pending(token: Option<&CancellationToken>) {
    match token {
        Some(t) => t.cancelled().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use uia_llm::MockLlmClient;
    use uia_retrieval::{seed_chunks, IndexStore};

    fn fresh_store() -> Arc<ChatStateStore> {
        Arc::new(ChatStateStore::new(Connection::open_in_memory().unwrap()).unwrap())
    }

    fn test_orchestrator(llm: MockLlmClient) -> TurnOrchestrator {
        let catalog = Arc::new(Catalog::seeded());
        let store = fresh_store();
        let progress = ProgressBroker::new();
        let llm: Arc<dyn LlmClient> = Arc::new(llm);
        let index = Arc::new(IndexStore::new(seed_chunks()));
        let rag = Arc::new(RagEngine::new(llm.clone(), index, progress.clone(), "planner", "rerank", "general", 12));
        TurnOrchestrator::new(llm, catalog, store, progress, rag, UiaConfig::default())
    }

    #[tokio::test]
    async fn out_of_scope_message_commits_single_text_message_and_no_state() {
        let mock = MockLlmClient::new().with_default(
            r#"{"proceed": false, "is_about_system": false, "message": "I can only help with data science career topics."}"#,
        );
        let orchestrator = test_orchestrator(mock);
        let history = uia_orchestrator::InMemoryChatHistory::new();

        let msg = orchestrator
            .run_turn(&history, "chat1", "req1", "write me a python script to sort a list", None)
            .await
            .unwrap();

        assert_eq!(msg.scope_label.as_deref(), Some("out_of_scope"));
        assert!(msg.survey.is_none());
        assert!(msg.enc_question.is_none() || msg.enc_question.as_deref() == Some(""));
        assert!(orchestrator.store.get_chat_state("chat1").unwrap().is_none());
    }

    #[tokio::test]
    async fn employment_mention_without_role_shows_ec_survey() {
        let mock = MockLlmClient::new()
            .with_response(
                "Known employment categories",
                r#"{"employmentIntent": true, "skillsIntent": false, "categoryHit": null, "confidence": 0.8}"#,
            )
            .with_default(r#"{"proceed": true, "is_about_system": false, "message": ""}"#);
        let orchestrator = test_orchestrator(mock);
        let history = uia_orchestrator::InMemoryChatHistory::new();

        let msg = orchestrator
            .run_turn(&history, "chat2", "req2", "I work with ML pipelines", None)
            .await
            .unwrap();

        assert_eq!(msg.survey_type, Some(SurveyType::EcSurvey));
        assert!(msg.enc_question.is_none());
        assert!(orchestrator
            .store
            .get_chat_state("chat2")
            .unwrap()
            .and_then(|s| s.employment_category_id)
            .is_none());
    }

    #[tokio::test]
    async fn explicit_role_records_category_and_shows_skills_survey_same_turn() {
        let mock = MockLlmClient::new()
            .with_response(
                "Known employment categories",
                r#"{"employmentIntent": true, "skillsIntent": false, "categoryHit": "ec_ds", "confidence": 0.9}"#,
            )
            .with_default(r#"{"proceed": true, "is_about_system": false, "message": ""}"#);
        let orchestrator = test_orchestrator(mock);
        let history = uia_orchestrator::InMemoryChatHistory::new();

        let msg = orchestrator
            .run_turn(&history, "chat3", "req3", "I am a data scientist", None)
            .await
            .unwrap();

        assert_eq!(msg.survey_type, Some(SurveyType::SkillsSurvey));
        assert_eq!(
            orchestrator.store.get_chat_state("chat3").unwrap().unwrap().employment_category_id,
            Some("ec_ds".to_string())
        );
    }

    #[tokio::test]
    async fn cancel_aborts_a_running_turn() {
        let mock = MockLlmClient::new();
        let orchestrator = test_orchestrator(mock);
        let history = uia_orchestrator::InMemoryChatHistory::new();

        assert!(!orchestrator.cancel("chat-nonexistent"));

        let token = CancellationToken::new();
        token.cancel();
        let result = orchestrator.run_turn(&history, "chat4", "req4", "hi", Some(token)).await;
        assert!(result.is_err());
    }
}
