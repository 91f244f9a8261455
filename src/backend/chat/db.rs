//! Database operations for the conversation store
//!
//! The append-only message log and its queries. Conversations have no table
//! of their own; the listing is an aggregation over `messages` grouped by
//! conversation id, recomputed on demand.

use sqlx::{Row, SqlitePool};

use crate::shared::chat::{user_id_from_conversation, ChatMessage, ConversationSummary};

/// Persist a message
pub async fn insert_message(pool: &SqlitePool, message: &ChatMessage) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, conversation_id, sender_id, sender_username, receiver_id, body, is_from_admin, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&message.id)
    .bind(&message.conversation_id)
    .bind(&message.sender_id)
    .bind(&message.sender_username)
    .bind(&message.receiver_id)
    .bind(&message.body)
    .bind(message.is_from_admin)
    .bind(message.read)
    .bind(message.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a conversation's history: the most recent `limit` messages, in
/// ascending creation order
pub async fn conversation_history(
    pool: &SqlitePool,
    conversation_id: &str,
    limit: i64,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, conversation_id, sender_id, sender_username, receiver_id, body, is_from_admin, is_read, created_at
        FROM (
            SELECT rowid AS rid, *
            FROM messages
            WHERE conversation_id = ?
            ORDER BY created_at DESC, rid DESC
            LIMIT ?
        )
        ORDER BY created_at ASC, rid ASC
        "#,
    )
    .bind(conversation_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| message_from_row(&row)).collect())
}

/// Flip every unacknowledged user message in a conversation to read
///
/// Admin-authored messages are never touched; `read` only tracks admin-side
/// acknowledgment.
///
/// # Returns
/// Number of messages flipped
pub async fn mark_conversation_read(
    pool: &SqlitePool,
    conversation_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET is_read = TRUE
        WHERE conversation_id = ? AND is_from_admin = FALSE AND is_read = FALSE
        "#,
    )
    .bind(conversation_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Delete a single message by id
pub async fn delete_message(pool: &SqlitePool, message_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(message_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every message in a conversation
pub async fn delete_conversation(
    pool: &SqlitePool,
    conversation_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
        .bind(conversation_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// The conversation listing: one summary row per conversation id, most
/// recently active first.
///
/// The last-message columns come from the chronologically last message of
/// each group. The counterpart is always the non-admin participant: its id
/// is recovered from the `"user-<id>"` conversation id and its username from
/// the latest non-admin message, so an admin replying last never
/// misattributes the conversation to the admin. `unread_count` counts
/// messages still awaiting admin acknowledgment.
pub async fn list_conversations(pool: &SqlitePool) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT m.conversation_id,
               m.body AS last_message,
               m.created_at AS last_message_time,
               m.sender_id AS last_sender_id,
               m.sender_username AS last_sender_username,
               (SELECT s.sender_username
                  FROM messages s
                 WHERE s.conversation_id = m.conversation_id
                   AND s.is_from_admin = FALSE
                 ORDER BY s.created_at DESC, s.rowid DESC
                 LIMIT 1) AS counterpart_username,
               (SELECT COUNT(*)
                  FROM messages u
                 WHERE u.conversation_id = m.conversation_id
                   AND u.is_from_admin = FALSE
                   AND u.is_read = FALSE) AS unread_count
        FROM messages m
        WHERE m.rowid = (SELECT x.rowid
                           FROM messages x
                          WHERE x.conversation_id = m.conversation_id
                          ORDER BY x.created_at DESC, x.rowid DESC
                          LIMIT 1)
        ORDER BY m.created_at DESC, m.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let conversation_id: String = row.get("conversation_id");
            // Conversations that predate the naming convention fall back to
            // the last sender's identity
            let counterpart_id = user_id_from_conversation(&conversation_id)
                .map(str::to_string)
                .unwrap_or_else(|| row.get("last_sender_id"));
            let counterpart_username: Option<String> = row.get("counterpart_username");
            let counterpart_username =
                counterpart_username.unwrap_or_else(|| row.get("last_sender_username"));

            ConversationSummary {
                conversation_id,
                last_message: row.get("last_message"),
                last_message_time: row.get("last_message_time"),
                counterpart_id,
                counterpart_username,
                unread_count: row.get("unread_count"),
            }
        })
        .collect())
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> ChatMessage {
    ChatMessage {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        sender_username: row.get("sender_username"),
        receiver_id: row.get("receiver_id"),
        body: row.get("body"),
        is_from_admin: row.get("is_from_admin"),
        read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}
