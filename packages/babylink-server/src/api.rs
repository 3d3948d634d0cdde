//! Chat REST API handlers.
//!
//! - `GET  /api/chats/:userId`: Conversation with one user, oldest first
//! - `POST /api/chats`: Send a message
//! - `GET  /api/chats/midwives`: All midwives
//! - `PUT  /api/chats/read/:userId`: Mark a counterparty's messages as read
//! - `GET  /api/chats/users`: Everyone the caller has chatted with
//! - `GET  /api/chats/unread`: Unread counts per counterparty

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use babylink_core::{Error, MessageRecord, UnreadCount, UserSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

// ── Request / Response Types ─────────────────────────────────────────────────

/// GET /api/chats/:userId query string
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Return only the most recent `limit` messages
    pub limit: Option<usize>,
}

/// POST /api/chats
///
/// Fields stay loose so a missing or mistyped field is reported as a 400
/// with a specific message rather than a generic body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Option<String>,
    pub text: Option<Value>,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: &'static str,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/chats/:userId: Full conversation between the caller and `userId`.
pub async fn get_chat_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(other_id): Path<String>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<MessageRecord>>, ApiError> {
    let Query(query) = query.map_err(|e| Error::InvalidRequest(e.body_text()))?;
    let messages = state.chat.chat_history(&user.id, &other_id, query.limit)?;
    Ok(Json(messages))
}

/// POST /api/chats: Send a message from the caller.
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageRecord>), ApiError> {
    let Json(req) = body.map_err(|e| Error::InvalidRequest(e.body_text()))?;

    let receiver_id = req.receiver_id.ok_or(Error::MissingField("receiverId"))?;
    let text = match req.text {
        Some(Value::String(text)) => text,
        Some(_) => return Err(Error::NotAString("text").into()),
        None => return Err(Error::MissingField("text").into()),
    };

    let message = state.chat.send_message(&user.id, &receiver_id, &text)?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/chats/midwives: Every midwife.
pub async fn get_midwives(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.chat.midwives()?))
}

/// PUT /api/chats/read/:userId: Mark messages from `userId` as read.
pub async fn mark_as_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(other_id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    state.chat.mark_as_read(&user.id, &other_id)?;
    Ok(Json(Ack {
        message: "Messages marked as read",
    }))
}

/// GET /api/chats/users: The caller's contact list.
pub async fn get_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.chat.contacts(&user.id)?))
}

/// GET /api/chats/unread: Unread counts per counterparty.
pub async fn get_unread_counts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UnreadCount>>, ApiError> {
    Ok(Json(state.chat.unread_counts(&user.id)?))
}
