use rusqlite::Connection;

use crate::error::Result;

/// Initialise the durable chat state tables (§4.3). Safe to call on every
/// startup — uses `IF NOT EXISTS` throughout.
///
/// `chat_uia_state` holds the recorded employment category/skills per chat.
/// `chat_insight_session` holds per-chat touched-batch tracking and cached
/// stats. `chat_insight_state` holds one row per `{chat_id, insight_id}`
/// with the `UNIQUE(chat_id, insight_id)` constraint backing the
/// taken/pending invariants (P3, P4).
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS chat_uia_state (
            chat_id                TEXT PRIMARY KEY,
            employment_category_id TEXT,
            skills_selected         TEXT,
            let_system_decide      INTEGER NOT NULL DEFAULT 0,
            vault_version          TEXT NOT NULL,
            recorded_at            TEXT NOT NULL,
            updated_at             TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chat_insight_session (
            chat_id          TEXT PRIMARY KEY,
            touched_batch_ids TEXT NOT NULL DEFAULT '[]',
            taken_count      INTEGER NOT NULL DEFAULT 0,
            pending_count    INTEGER NOT NULL DEFAULT 0,
            vault_version    TEXT NOT NULL,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chat_insight_state (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id          TEXT NOT NULL,
            batch_id         TEXT NOT NULL,
            insight_id       TEXT NOT NULL,
            taken            INTEGER NOT NULL DEFAULT 0,
            answer_id        TEXT,
            answer_ids       TEXT,
            pending_reason   TEXT,
            meta_source      TEXT,
            meta_mode        TEXT,
            meta_confidence  REAL,
            meta_evidence    TEXT,
            meta_vault_version TEXT,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            UNIQUE(chat_id, insight_id)
        );
        CREATE INDEX IF NOT EXISTS idx_insight_state_chat_batch
            ON chat_insight_state(chat_id, batch_id);",
    )?;
    Ok(())
}
