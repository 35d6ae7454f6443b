use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::parse_column;
use crate::db::DatabaseError;
use crate::models::{AiFeatures, AnalysisResult, ChatMessage, StoredChatMessage};

/// Analysis and feature metadata share one JSON column.
#[derive(Serialize, Deserialize, Default)]
struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ai_features: Option<AiFeatures>,
}

fn payload_error(e: serde_json::Error) -> DatabaseError {
    DatabaseError::InvalidJson {
        field: "chat_messages.payload".into(),
        reason: e.to_string(),
    }
}

/// Append one transcript entry. The message keeps its own timestamp.
pub fn insert_chat_message(
    conn: &Connection,
    user_id: &str,
    message: &ChatMessage,
) -> Result<(), DatabaseError> {
    let payload = if message.analysis.is_none() && message.ai_features.is_none() {
        None
    } else {
        Some(
            serde_json::to_string(&MessagePayload {
                analysis: message.analysis.clone(),
                ai_features: message.ai_features.clone(),
            })
            .map_err(payload_error)?,
        )
    };
    conn.execute(
        "INSERT INTO chat_messages (id, user_id, role, content, category, payload, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            message.id,
            user_id,
            message.role.as_str(),
            message.content,
            message.category.map(|c| c.as_str()),
            payload,
            message.timestamp,
        ],
    )?;
    Ok(())
}

/// Full history for a user, oldest first.
pub fn get_chat_history(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<StoredChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, role, content, category, payload, timestamp FROM chat_messages
         WHERE user_id = ?1 ORDER BY timestamp ASC, rowid ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let category: Option<String> = row.get(3)?;
        Ok((
            ChatMessage {
                id: row.get(0)?,
                role: parse_column(1, row.get(1)?)?,
                content: row.get(2)?,
                category: category.map(|raw| parse_column(3, raw)).transpose()?,
                analysis: None,
                ai_features: None,
                timestamp: row.get(5)?,
            },
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut history = Vec::new();
    for row in rows {
        let (mut message, payload) = row?;
        if let Some(raw) = payload {
            let payload: MessagePayload = serde_json::from_str(&raw).map_err(payload_error)?;
            message.analysis = payload.analysis;
            message.ai_features = payload.ai_features;
        }
        history.push(StoredChatMessage {
            user_id: user_id.to_string(),
            message,
        });
    }
    Ok(history)
}
