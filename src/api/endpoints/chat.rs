//! Chat endpoints.
//!
//! - `GET /api/chat`: live conversation: transcript, state, stage
//! - `POST /api/chat/send`: submit a message and wait for the reply
//! - `GET /api/chat/history`: persisted transcript entries
//!
//! A send while a reply is pending answers 409 `BUSY` and leaves the
//! conversation untouched.

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::chat::{ConversationView, RejectReason, SubmitOutcome};
use crate::db;
use crate::models::{ChatMessage, StoredChatMessage};

#[derive(Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatSendResponse {
    pub user: ChatMessage,
    pub replies: Vec<ChatMessage>,
}

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub messages: Vec<StoredChatMessage>,
}

/// `GET /api/chat`
pub async fn view(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ConversationView>, ApiError> {
    let conversation = ctx.core.conversation_for(&user.uid)?;
    Ok(Json(conversation.view()))
}

/// `POST /api/chat/send`
///
/// The turn runs on its own task, so a client that disconnects midway
/// still gets its reply appended and logged.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>, ApiError> {
    match ctx.core.spawn_chat_turn(&user.uid, req.message).await?? {
        SubmitOutcome::Replied { user, replies } => Ok(Json(ChatSendResponse { user, replies })),
        SubmitOutcome::Rejected(RejectReason::EmptyMessage) => {
            Err(ApiError::BadRequest("Message must not be empty".into()))
        }
        SubmitOutcome::Rejected(RejectReason::ResponsePending) => Err(ApiError::Busy),
    }
}

/// `GET /api/chat/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let conn = ctx.core.db()?;
    let messages = db::get_chat_history(&conn, &user.uid)?;
    Ok(Json(ChatHistoryResponse { messages }))
}
