//! C6 RAG Engine: plan -> retrieve -> rerank -> filter -> pack -> sufficiency
//! -> compose -> validate (§4.6). Stateless pipeline; every step but
//! retrieval calls the LLM client in JSON mode.

use std::sync::Arc;

use tracing::instrument;
use uia_llm::{CompletionOptions, LlmClient};
use uia_progress::{labels, ProgressBroker};
use uia_retrieval::IndexStore;

use crate::compose::compose;
use crate::filter::filter_relevant;
use crate::pack::pack;
use crate::plan::plan;
use crate::rerank::rerank;
use crate::retrieve::retrieve;
use crate::sufficiency::{allow_general_knowledge, assess_sufficiency};
use crate::types::{RagAnswer, RagRequest, RagSource};
use crate::validate::validate;

const DEFAULT_TOKEN_LIMIT: u32 = 2000;

pub struct RagEngine {
    llm: Arc<dyn LlmClient>,
    index: Arc<IndexStore>,
    progress: Arc<ProgressBroker>,
    planner_model: String,
    rerank_model: String,
    general_model: String,
    timeout_secs: u64,
}

impl RagEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        index: Arc<IndexStore>,
        progress: Arc<ProgressBroker>,
        planner_model: impl Into<String>,
        rerank_model: impl Into<String>,
        general_model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            llm,
            index,
            progress,
            planner_model: planner_model.into(),
            rerank_model: rerank_model.into(),
            general_model: general_model.into(),
            timeout_secs,
        }
    }

    /// Run the full pipeline for one question (§4.6). Never propagates a
    /// hard error to the caller -- every step degrades locally, and the
    /// orchestrator's own RAG invocation additionally tolerates a fully
    /// degraded (unused) answer by proceeding with no RAG content.
    #[instrument(skip(self, req), fields(request_id = %req.request_id))]
    pub async fn answer(&self, req: &RagRequest) -> RagAnswer {
        self.progress.publish(&req.request_id, labels::RAG_PLAN, None);
        let plan_opts = self.opts(&self.planner_model);
        let style_plan = plan(self.llm.as_ref(), &plan_opts, &req.current_question, req.previous_question.as_deref()).await;

        self.progress.publish(&req.request_id, labels::RAG_RETRIEVE, None);
        let candidates = retrieve(&self.index, &style_plan, req.doc_filters.clone()).await;
        if candidates.is_empty() {
            self.progress.publish(&req.request_id, labels::RAG_COMPOSE, Some("no candidates retrieved".to_string()));
            return RagAnswer::unused();
        }

        self.progress.publish(&req.request_id, labels::RAG_RERANK, None);
        let rerank_opts = self.opts(&self.rerank_model);
        let reranked = rerank(self.llm.as_ref(), &rerank_opts, &req.current_question, &candidates).await;

        self.progress.publish(&req.request_id, labels::RAG_FILTER, None);
        let filter_opts = self.opts(&self.rerank_model);
        let filtered = filter_relevant(self.llm.as_ref(), &filter_opts, &req.current_question, reranked).await;
        if filtered.is_empty() {
            return RagAnswer::unused();
        }

        self.progress.publish(&req.request_id, labels::RAG_PACK, None);
        let packed = pack(&filtered, req_token_limit(req));

        self.progress.publish(&req.request_id, labels::RAG_SUFFICIENCY, None);
        let general_opts = self.opts(&self.general_model);
        let sufficiency = assess_sufficiency(self.llm.as_ref(), &general_opts, &req.current_question, &packed.included).await;
        let allow_general = allow_general_knowledge(req.allow_general_knowledge, style_plan.allow_general_knowledge, sufficiency.sufficiency);

        self.progress.publish(&req.request_id, labels::RAG_COMPOSE, None);
        let draft = compose(
            self.llm.as_ref(),
            &general_opts,
            &req.current_question,
            &packed.text,
            &style_plan,
            &sufficiency,
            allow_general,
            req.max_general_fraction,
        )
        .await;

        self.progress.publish(&req.request_id, labels::RAG_VALIDATE, None);
        let final_answer = validate(self.llm.as_ref(), &general_opts, &req.current_question, &draft, &packed.included).await;

        let sources = packed
            .included
            .iter()
            .map(|c| RagSource {
                chunk_id: c.chunk_id.clone(),
                breadcrumb: c.breadcrumb.clone(),
            })
            .collect();

        RagAnswer {
            used: true,
            answer_markdown: final_answer,
            sources,
        }
    }

    fn opts(&self, model: &str) -> CompletionOptions {
        CompletionOptions {
            model: model.to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            system: None,
            timeout: std::time::Duration::from_secs(self.timeout_secs),
        }
    }
}

fn req_token_limit(req: &RagRequest) -> u32 {
    if req.token_limit == 0 {
        DEFAULT_TOKEN_LIMIT
    } else {
        req.token_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uia_llm::MockLlmClient;
    use uia_retrieval::seed_chunks;

    fn mock_pipeline() -> MockLlmClient {
        MockLlmClient::new()
            .with_response(
                "Plan the retrieval",
                r#"{"link_prev": false, "queries": ["machine learning fundamentals", "supervised learning"], "doc_filters": [], "style": "informative", "tone": "warm", "format": "paragraphs", "audience": "general", "allow_general_knowledge": false, "notes": ""}"#,
            )
            .with_response("Candidates:", r#"{"selected": []}"#)
            .with_response("Compose the answer", "Here is a grounded answer about machine learning fundamentals.")
            .with_response("Draft answer", r#"{"on_topic": true, "contradiction": false, "revision": null}"#)
            .with_response("Kept context summaries", r#"{"sufficiency": 0.9, "missing_aspects": []}"#)
    }

    #[tokio::test]
    async fn produces_a_used_answer_for_a_relevant_question() {
        let llm: Arc<dyn LlmClient> = Arc::new(mock_pipeline());
        let index = Arc::new(IndexStore::new(seed_chunks()));
        let progress = ProgressBroker::new();
        let engine = RagEngine::new(llm, index, progress, "planner", "rerank", "general", 12);

        let req = RagRequest {
            request_id: "req-1".to_string(),
            current_question: "What are machine learning fundamentals I should learn?".to_string(),
            previous_question: None,
            doc_filters: None,
            allow_general_knowledge: false,
            max_general_fraction: 0.25,
            token_limit: 2000,
        };

        let answer = engine.answer(&req).await;
        assert!(answer.used);
        assert!(!answer.sources.is_empty());
        assert!(answer.sources.iter().all(|s| packed_sources_are_subset(&s.chunk_id, &answer.sources)));
    }

    fn packed_sources_are_subset(chunk_id: &str, sources: &[RagSource]) -> bool {
        sources.iter().any(|s| s.chunk_id == chunk_id)
    }

    #[tokio::test]
    async fn empty_index_yields_unused_answer() {
        let llm: Arc<dyn LlmClient> = Arc::new(mock_pipeline());
        let index = Arc::new(IndexStore::new(vec![]));
        let progress = ProgressBroker::new();
        let engine = RagEngine::new(llm, index, progress, "planner", "rerank", "general", 12);

        let req = RagRequest {
            request_id: "req-2".to_string(),
            current_question: "anything".to_string(),
            previous_question: None,
            doc_filters: None,
            allow_general_knowledge: false,
            max_general_fraction: 0.25,
            token_limit: 2000,
        };

        let answer = engine.answer(&req).await;
        assert!(!answer.used);
        assert!(answer.sources.is_empty());
        let _ = HashSet::<String>::new();
    }
}
