use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, instrument};

use uia_core::model::{
    ChatInsightSession, ChatInsightState, ChatUIAState, InsightMeta, InsightMode, InsightSource,
    PendingReason, TakenAnswer,
};

use crate::db::init_db;
use crate::error::{Result, StateError};

/// Thread-safe durable store for per-chat UIA state (C3, §4.3).
///
/// Wraps a single SQLite connection in a `Mutex`, mirroring
/// `skynet-sessions::SessionManager` — a Mutex is sufficient for the
/// single-node target; a connection pool would be the next step under load.
pub struct ChatStateStore {
    db: Mutex<Connection>,
}

impl ChatStateStore {
    /// Wrap a connection, creating the tables if they don't already exist.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }

    // ---------------- chat_uia_state ----------------

    #[instrument(skip(self), fields(chat_id))]
    pub fn get_chat_state(&self, chat_id: &str) -> Result<Option<ChatUIAState>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT chat_id, employment_category_id, skills_selected, let_system_decide,
                    vault_version, recorded_at, updated_at
             FROM chat_uia_state WHERE chat_id = ?1",
            params![chat_id],
            row_to_chat_state,
        )
        .optional()
        .map_err(StateError::Database)
    }

    /// Record the employment category (P1: once set, never changes).
    ///
    /// Re-recording the same id is an idempotent no-op (survey retries,
    /// repeat intent hits). Recording a different id than what's already
    /// stored is a conflict the caller must surface to the user.
    #[instrument(skip(self), fields(chat_id, category_id))]
    pub fn set_employment_category(&self, chat_id: &str, category_id: &str, vault_version: &str) -> Result<ChatUIAState> {
        if let Some(existing) = self.get_chat_state(chat_id)? {
            if let Some(current) = &existing.employment_category_id {
                if current == category_id {
                    return Ok(existing);
                }
                return Err(StateError::Conflict(format!(
                    "employment category already recorded as '{current}'"
                )));
            }
        }

        let now = chrono::Utc::now();
        let now_str = now.to_rfc3339();
        let db = self.db.lock().unwrap();
        // Setting the category clears any previously recorded skills, mirroring
        // the teacher repo's $unset-on-EC-change upsert.
        db.execute(
            "INSERT INTO chat_uia_state (chat_id, employment_category_id, skills_selected,
                    let_system_decide, vault_version, recorded_at, updated_at)
             VALUES (?1, ?2, NULL, 0, ?3, ?4, ?4)
             ON CONFLICT(chat_id) DO UPDATE SET
                employment_category_id = excluded.employment_category_id,
                skills_selected = NULL,
                let_system_decide = 0,
                vault_version = excluded.vault_version,
                updated_at = excluded.updated_at",
            params![chat_id, category_id, vault_version, now_str],
        )?;
        drop(db);

        debug!(chat_id, category_id, "recorded employment category");
        self.get_chat_state(chat_id)?.ok_or_else(|| StateError::NotFound(chat_id.to_string()))
    }

    /// Record skills selection or "let the system decide" (P2: once
    /// recorded, never re-recorded). Requires the employment category to
    /// already be set.
    #[instrument(skip(self, skills), fields(chat_id, let_system_decide))]
    pub fn set_skills(
        &self,
        chat_id: &str,
        skills: Option<HashSet<String>>,
        let_system_decide: bool,
    ) -> Result<ChatUIAState> {
        let existing = self
            .get_chat_state(chat_id)?
            .ok_or_else(|| StateError::NotFound(format!("no chat state for chat '{chat_id}'")))?;

        if existing.employment_category_id.is_none() {
            return Err(StateError::Conflict(
                "employment category must be recorded before skills".to_string(),
            ));
        }
        if existing.skills_recorded() {
            return Err(StateError::Conflict("skills already recorded for this chat".to_string()));
        }

        let skills_json = match &skills {
            Some(s) => Some(serde_json::to_string(s)?),
            None => None,
        };
        let now_str = chrono::Utc::now().to_rfc3339();

        let db = self.db.lock().unwrap();
        db.execute(
            "UPDATE chat_uia_state
             SET skills_selected = ?1, let_system_decide = ?2, updated_at = ?3
             WHERE chat_id = ?4",
            params![skills_json, let_system_decide as i64, now_str, chat_id],
        )?;
        drop(db);

        self.get_chat_state(chat_id)?.ok_or_else(|| StateError::NotFound(chat_id.to_string()))
    }

    // ---------------- chat_insight_session ----------------

    #[instrument(skip(self), fields(chat_id))]
    pub fn ensure_session(&self, chat_id: &str, vault_version: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO chat_insight_session (chat_id, touched_batch_ids, taken_count, pending_count,
                    vault_version, created_at, updated_at)
             VALUES (?1, '[]', 0, 0, ?2, ?3, ?3)
             ON CONFLICT(chat_id) DO NOTHING",
            params![chat_id, vault_version, now],
        )?;
        Ok(())
    }

    /// Add `batch_id` to the touched set (idempotent union, §9 "Touched batch").
    /// Ensures the session row exists first, so callers don't need to
    /// sequence this after a separate `ensure_session` call.
    #[instrument(skip(self), fields(chat_id, batch_id))]
    pub fn touch_batch(&self, chat_id: &str, batch_id: &str, vault_version: &str) -> Result<()> {
        self.ensure_session(chat_id, vault_version)?;
        let mut session = self.get_session(chat_id)?.unwrap_or_default();
        session.chat_id = chat_id.to_string();
        if !session.touched_batch_ids.insert(batch_id.to_string()) {
            return Ok(()); // already touched, nothing to persist
        }

        let touched_json = serde_json::to_string(&session.touched_batch_ids)?;
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "UPDATE chat_insight_session SET touched_batch_ids = ?1, updated_at = ?2 WHERE chat_id = ?3",
            params![touched_json, now, chat_id],
        )?;
        Ok(())
    }

    #[instrument(skip(self), fields(chat_id))]
    pub fn get_session(&self, chat_id: &str) -> Result<Option<ChatInsightSession>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT chat_id, touched_batch_ids, taken_count, pending_count, vault_version
             FROM chat_insight_session WHERE chat_id = ?1",
            params![chat_id],
            row_to_session,
        )
        .optional()
        .map_err(StateError::Database)
    }

    /// Recompute and persist `{takenCount, pendingCount}` from the state rows.
    #[instrument(skip(self), fields(chat_id))]
    pub fn recompute_stats(&self, chat_id: &str) -> Result<(u32, u32)> {
        let db = self.db.lock().unwrap();
        let taken_count: i64 = db.query_row(
            "SELECT COUNT(*) FROM chat_insight_state WHERE chat_id = ?1 AND taken = 1",
            params![chat_id],
            |r| r.get(0),
        )?;
        let pending_count: i64 = db.query_row(
            "SELECT COUNT(*) FROM chat_insight_state WHERE chat_id = ?1 AND taken = 0",
            params![chat_id],
            |r| r.get(0),
        )?;
        db.execute(
            "UPDATE chat_insight_session SET taken_count = ?1, pending_count = ?2 WHERE chat_id = ?3",
            params![taken_count, pending_count, chat_id],
        )?;
        Ok((taken_count as u32, pending_count as u32))
    }

    // ---------------- chat_insight_state ----------------

    #[instrument(skip(self), fields(chat_id, insight_id))]
    pub fn get_insight_state(&self, chat_id: &str, insight_id: &str) -> Result<Option<ChatInsightState>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT chat_id, batch_id, insight_id, taken, answer_id, answer_ids, pending_reason,
                    meta_source, meta_mode, meta_confidence, meta_evidence, meta_vault_version
             FROM chat_insight_state WHERE chat_id = ?1 AND insight_id = ?2",
            params![chat_id, insight_id],
            row_to_insight_state,
        )
        .optional()
        .map_err(StateError::Database)
    }

    /// Split the chat's insight rows into `(taken_ids, pending_ids)`.
    pub fn get_taken_and_pending(&self, chat_id: &str) -> Result<(HashSet<String>, HashSet<String>)> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT insight_id, taken FROM chat_insight_state WHERE chat_id = ?1",
        )?;
        let rows = stmt.query_map(params![chat_id], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)? != 0))
        })?;

        let mut taken = HashSet::new();
        let mut pending = HashSet::new();
        for row in rows {
            let (id, is_taken) = row?;
            if is_taken {
                taken.insert(id);
            } else {
                pending.insert(id);
            }
        }
        Ok((taken, pending))
    }

    /// Pending (`taken=false`) rows for the given batches, grouped by batch id.
    /// Used to build the insight survey envelope (§4.8).
    pub fn list_pending_by_batch(
        &self,
        chat_id: &str,
        batch_ids: &[String],
    ) -> Result<HashMap<String, Vec<ChatInsightState>>> {
        if batch_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = batch_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT chat_id, batch_id, insight_id, taken, answer_id, answer_ids, pending_reason,
                    meta_source, meta_mode, meta_confidence, meta_evidence, meta_vault_version
             FROM chat_insight_state
             WHERE chat_id = ? AND taken = 0 AND batch_id IN ({placeholders})"
        );

        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&sql)?;
        let mut rusqlite_params: Vec<&dyn rusqlite::ToSql> = vec![&chat_id];
        for b in batch_ids {
            rusqlite_params.push(b);
        }
        let rows = stmt.query_map(rusqlite_params.as_slice(), row_to_insight_state)?;

        let mut out: HashMap<String, Vec<ChatInsightState>> = HashMap::new();
        for row in rows {
            let state = row?;
            out.entry(state.batch_id.clone()).or_default().push(state);
        }
        Ok(out)
    }

    /// Record an auto-inferred single-answer take (§4.9). No-op does not
    /// apply here — Stage-1 only calls this when the row isn't already taken.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, evidence), fields(chat_id, insight_id))]
    pub fn write_auto_take_single(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        answer_id: &str,
        mode: InsightMode,
        confidence: f32,
        evidence: &[String],
        vault_version: &str,
    ) -> Result<()> {
        self.upsert_taken(
            chat_id,
            batch_id,
            insight_id,
            TakenAnswer::Single(answer_id.to_string()),
            InsightSource::AutoInference,
            Some(mode),
            confidence,
            evidence,
            vault_version,
        )
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, answer_ids, evidence), fields(chat_id, insight_id))]
    pub fn write_auto_take_multi(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        answer_ids: &[String],
        mode: InsightMode,
        confidence: f32,
        evidence: &[String],
        vault_version: &str,
    ) -> Result<()> {
        self.upsert_taken(
            chat_id,
            batch_id,
            insight_id,
            TakenAnswer::Multi(answer_ids.to_vec()),
            InsightSource::AutoInference,
            Some(mode),
            confidence,
            evidence,
            vault_version,
        )
    }

    /// Record a `QUESTION_ONLY` pending row (§4.9): the insight is touched
    /// but not yet answered, and becomes a candidate survey question.
    #[instrument(skip(self), fields(chat_id, insight_id))]
    pub fn write_pending(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        reason: PendingReason,
        confidence: f32,
        vault_version: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO chat_insight_state (chat_id, batch_id, insight_id, taken, pending_reason,
                    meta_confidence, meta_vault_version, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(chat_id, insight_id) DO UPDATE SET
                pending_reason = excluded.pending_reason,
                meta_confidence = excluded.meta_confidence,
                updated_at = excluded.updated_at
             WHERE chat_insight_state.taken = 0",
            params![chat_id, batch_id, insight_id, reason.as_str(), confidence, vault_version, now],
        )?;
        Ok(())
    }

    /// Insert a `BATCH_FILL` pending row only when no row exists yet for this
    /// insight (§4.9 batch expansion). Unlike `write_pending`, this never
    /// touches an existing row's `pending_reason` -- a `question_only` row
    /// must keep that classification even when the same insight is later
    /// swept in as part of a batch-fill expansion.
    #[instrument(skip(self), fields(chat_id, insight_id))]
    pub fn write_batch_fill_if_absent(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        confidence: f32,
        vault_version: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO chat_insight_state (chat_id, batch_id, insight_id, taken, pending_reason,
                    meta_confidence, meta_vault_version, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, ?7)
             ON CONFLICT(chat_id, insight_id) DO NOTHING",
            params![
                chat_id,
                batch_id,
                insight_id,
                PendingReason::BatchFill.as_str(),
                confidence,
                vault_version,
                now
            ],
        )?;
        Ok(())
    }

    /// Record a survey submission (R1). Surveys always win — this overwrites
    /// any prior auto-inferred row for the same insight.
    #[instrument(skip(self), fields(chat_id, insight_id))]
    pub fn write_survey_single(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        answer_id: &str,
        vault_version: &str,
    ) -> Result<()> {
        self.upsert_taken(
            chat_id,
            batch_id,
            insight_id,
            TakenAnswer::Single(answer_id.to_string()),
            InsightSource::Survey,
            None,
            1.0,
            &[],
            vault_version,
        )
    }

    #[instrument(skip(self, answer_ids), fields(chat_id, insight_id))]
    pub fn write_survey_multi(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        answer_ids: &[String],
        vault_version: &str,
    ) -> Result<()> {
        self.upsert_taken(
            chat_id,
            batch_id,
            insight_id,
            TakenAnswer::Multi(answer_ids.to_vec()),
            InsightSource::Survey,
            None,
            1.0,
            &[],
            vault_version,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn upsert_taken(
        &self,
        chat_id: &str,
        batch_id: &str,
        insight_id: &str,
        answer: TakenAnswer,
        source: InsightSource,
        mode: Option<InsightMode>,
        confidence: f32,
        evidence: &[String],
        vault_version: &str,
    ) -> Result<()> {
        let (answer_id, answer_ids) = match &answer {
            TakenAnswer::Single(id) => (Some(id.clone()), None),
            TakenAnswer::Multi(ids) => (None, Some(serde_json::to_string(ids)?)),
        };
        let mode_str = mode.map(|m| match m {
            InsightMode::Qa => "qa",
            InsightMode::AnswerOnly => "answer_only",
        });
        let evidence_json = serde_json::to_string(evidence)?;
        let now = chrono::Utc::now().to_rfc3339();

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO chat_insight_state (chat_id, batch_id, insight_id, taken, answer_id, answer_ids,
                    pending_reason, meta_source, meta_mode, meta_confidence, meta_evidence, meta_vault_version,
                    created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5, NULL, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             ON CONFLICT(chat_id, insight_id) DO UPDATE SET
                taken = 1,
                answer_id = excluded.answer_id,
                answer_ids = excluded.answer_ids,
                pending_reason = NULL,
                meta_source = excluded.meta_source,
                meta_mode = excluded.meta_mode,
                meta_confidence = excluded.meta_confidence,
                meta_evidence = excluded.meta_evidence,
                meta_vault_version = excluded.meta_vault_version,
                updated_at = excluded.updated_at",
            params![
                chat_id,
                batch_id,
                insight_id,
                answer_id,
                answer_ids,
                source.as_str(),
                mode_str,
                confidence,
                evidence_json,
                vault_version,
                now
            ],
        )?;
        Ok(())
    }
}

fn row_to_chat_state(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatUIAState> {
    let skills_json: Option<String> = row.get(2)?;
    let skills_selected = skills_json
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(ChatUIAState {
        chat_id: row.get(0)?,
        employment_category_id: row.get(1)?,
        skills_selected,
        let_system_decide: row.get::<_, i64>(3)? != 0,
        vault_version: row.get(4)?,
        recorded_at: parse_rfc3339(row, 5)?,
        updated_at: parse_rfc3339(row, 6)?,
    })
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatInsightSession> {
    let touched_json: String = row.get(1)?;
    let touched_batch_ids = serde_json::from_str(&touched_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(ChatInsightSession {
        chat_id: row.get(0)?,
        touched_batch_ids,
        taken_count: row.get::<_, i64>(2)? as u32,
        pending_count: row.get::<_, i64>(3)? as u32,
        vault_version: row.get(4)?,
    })
}

fn row_to_insight_state(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatInsightState> {
    let taken = row.get::<_, i64>(3)? != 0;
    let answer_id: Option<String> = row.get(4)?;
    let answer_ids_json: Option<String> = row.get(5)?;
    let pending_reason: Option<String> = row.get(6)?;

    let answer = if taken {
        if let Some(ids_json) = answer_ids_json {
            let ids: Vec<String> = serde_json::from_str(&ids_json)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?;
            Some(TakenAnswer::Multi(ids))
        } else {
            answer_id.map(TakenAnswer::Single)
        }
    } else {
        None
    };

    let pending_reason = pending_reason.map(|s| match s.as_str() {
        "question_only" => PendingReason::QuestionOnly,
        _ => PendingReason::BatchFill,
    });

    let meta_source: Option<String> = row.get(7)?;
    let meta = meta_source.map(|source_str| {
        let mode_str: Option<String> = row.get(8).unwrap_or(None);
        let confidence: f32 = row.get(9).unwrap_or(0.0);
        let evidence_json: Option<String> = row.get(10).unwrap_or(None);
        let vault_version: String = row.get(11).unwrap_or_default();
        let evidence: Vec<String> = evidence_json
            .and_then(|j| serde_json::from_str(&j).ok())
            .unwrap_or_default();
        let source = match source_str.as_str() {
            "survey" => InsightSource::Survey,
            "batch-expansion" => InsightSource::BatchExpansion,
            _ => InsightSource::AutoInference,
        };
        let mode = mode_str.map(|m| if m == "qa" { InsightMode::Qa } else { InsightMode::AnswerOnly });
        InsightMeta {
            source,
            mode,
            confidence,
            evidence,
            vault_version,
        }
    });

    Ok(ChatInsightState {
        chat_id: row.get(0)?,
        batch_id: row.get(1)?,
        insight_id: row.get(2)?,
        taken,
        answer,
        pending_reason,
        meta,
    })
}

fn parse_rfc3339(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    let raw: String = row.get(idx)?;
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ChatStateStore {
        ChatStateStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn employment_category_is_monotonic() {
        let store = fresh();
        let state = store.set_employment_category("c1", "ec_ds", "v1").unwrap();
        assert_eq!(state.employment_category_id.as_deref(), Some("ec_ds"));

        // Re-recording the same id is an idempotent no-op.
        let state2 = store.set_employment_category("c1", "ec_ds", "v1").unwrap();
        assert_eq!(state2.employment_category_id.as_deref(), Some("ec_ds"));

        // Recording a different id is a conflict (P1).
        let err = store.set_employment_category("c1", "ec_swe", "v1").unwrap_err();
        assert!(matches!(err, StateError::Conflict(_)));
        assert_eq!(
            store.get_chat_state("c1").unwrap().unwrap().employment_category_id.as_deref(),
            Some("ec_ds")
        );
    }

    #[test]
    fn skills_require_category_and_cannot_be_re_recorded() {
        let store = fresh();

        // No category yet -> rejected.
        let err = store.set_skills("c1", None, true).unwrap_err();
        assert!(matches!(err, StateError::NotFound(_)));

        store.set_employment_category("c1", "ec_ds", "v1").unwrap();
        let state = store.set_skills("c1", None, true).unwrap();
        assert!(state.let_system_decide);
        assert!(state.skills_recorded());

        // Second submission is a conflict (P2).
        let err = store.set_skills("c1", Some(HashSet::from(["sk_python".to_string()])), false).unwrap_err();
        assert!(matches!(err, StateError::Conflict(_)));
    }

    #[test]
    fn taken_rows_have_exactly_one_answer_field_and_no_duplicates() {
        let store = fresh();
        store
            .write_auto_take_multi(
                "c1",
                "b1",
                "i1",
                &["A".to_string(), "B".to_string()],
                InsightMode::Qa,
                0.9,
                &["evidence".to_string()],
                "v1",
            )
            .unwrap();

        let row = store.get_insight_state("c1", "i1").unwrap().unwrap();
        assert!(row.taken);
        match row.answer.as_ref().unwrap() {
            TakenAnswer::Multi(ids) => {
                assert!(!ids.is_empty());
                let unique: HashSet<_> = ids.iter().collect();
                assert_eq!(unique.len(), ids.len());
            }
            TakenAnswer::Single(_) => panic!("expected multi answer"),
        }
        assert!(row.pending_reason.is_none());
    }

    #[test]
    fn pending_rows_never_carry_an_answer() {
        let store = fresh();
        store.write_pending("c1", "b1", "i1", PendingReason::QuestionOnly, 0.65, "v1").unwrap();

        let row = store.get_insight_state("c1", "i1").unwrap().unwrap();
        assert!(!row.taken);
        assert!(row.answer.is_none());
        assert_eq!(row.pending_reason, Some(PendingReason::QuestionOnly));
    }

    #[test]
    fn batch_fill_never_overwrites_an_existing_question_only_row() {
        let store = fresh();
        store.write_pending("c1", "b1", "i1", PendingReason::QuestionOnly, 0.65, "v1").unwrap();
        store.write_batch_fill_if_absent("c1", "b1", "i1", 0.0, "v1").unwrap();

        let row = store.get_insight_state("c1", "i1").unwrap().unwrap();
        assert_eq!(row.pending_reason, Some(PendingReason::QuestionOnly));
    }

    #[test]
    fn batch_fill_never_overwrites_an_existing_taken_row() {
        let store = fresh();
        store
            .write_auto_take_single("c1", "b1", "i1", "A", InsightMode::AnswerOnly, 0.8, &[], "v1")
            .unwrap();
        store.write_batch_fill_if_absent("c1", "b1", "i1", 0.0, "v1").unwrap();

        let row = store.get_insight_state("c1", "i1").unwrap().unwrap();
        assert!(row.taken);
        assert_eq!(row.answer, Some(TakenAnswer::Single("A".to_string())));
    }

    #[test]
    fn survey_submission_overwrites_prior_auto_inferred_row_and_sets_source_survey() {
        let store = fresh();
        store
            .write_auto_take_single("c1", "b1", "i1", "A", InsightMode::AnswerOnly, 0.8, &[], "v1")
            .unwrap();
        store.write_survey_single("c1", "b1", "i1", "B", "v1").unwrap();

        let row = store.get_insight_state("c1", "i1").unwrap().unwrap();
        assert_eq!(row.answer, Some(TakenAnswer::Single("B".to_string())));
        assert_eq!(row.meta.unwrap().source, InsightSource::Survey);
    }

    #[test]
    fn touch_batch_is_idempotent_and_unions() {
        let store = fresh();
        store.touch_batch("c1", "b1", "v1").unwrap();
        store.touch_batch("c1", "b1", "v1").unwrap();
        store.touch_batch("c1", "b2", "v1").unwrap();

        let session = store.get_session("c1").unwrap().unwrap();
        assert_eq!(session.touched_batch_ids, HashSet::from(["b1".to_string(), "b2".to_string()]));
    }

    #[test]
    fn list_pending_by_batch_groups_and_excludes_taken() {
        let store = fresh();
        store.write_pending("c1", "b1", "i1", PendingReason::QuestionOnly, 0.65, "v1").unwrap();
        store.write_pending("c1", "b1", "i2", PendingReason::BatchFill, 0.0, "v1").unwrap();
        store
            .write_auto_take_single("c1", "b1", "i3", "A", InsightMode::AnswerOnly, 0.8, &[], "v1")
            .unwrap();

        let grouped = store.list_pending_by_batch("c1", &["b1".to_string()]).unwrap();
        let pending_ids: HashSet<_> = grouped.get("b1").unwrap().iter().map(|s| s.insight_id.clone()).collect();
        assert_eq!(pending_ids, HashSet::from(["i1".to_string(), "i2".to_string()]));
    }

    #[test]
    fn recompute_stats_counts_taken_and_pending() {
        let store = fresh();
        store.write_pending("c1", "b1", "i1", PendingReason::BatchFill, 0.0, "v1").unwrap();
        store
            .write_auto_take_single("c1", "b1", "i2", "A", InsightMode::AnswerOnly, 0.8, &[], "v1")
            .unwrap();

        let (taken, pending) = store.recompute_stats("c1").unwrap();
        assert_eq!(taken, 1);
        assert_eq!(pending, 1);
    }
}
