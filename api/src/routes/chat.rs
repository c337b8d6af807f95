//! Tutor HTTP endpoints.
//!
//! - POST /api/chat
//! - GET /api/chat/topics
//! - GET /api/chat/subjects
//! - GET /api/chat/subjects/:subject_id/topics
//! - GET /api/chat/explain/:topic?age_group=&knowledge_level=

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use super::AppState;
use crate::errors::{AppError, ErrorResponse};
use crate::models::{ChatReply, ChatTurn, Explanation};
use crate::services::catalog::{self, SubjectInfo};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExplainQuery {
    /// Learner age group (default "general")
    #[serde(default = "default_age_group")]
    pub age_group: String,
    /// Learner knowledge level (default "beginner")
    #[serde(default = "default_knowledge_level")]
    pub knowledge_level: String,
}

fn default_age_group() -> String {
    "general".to_string()
}

fn default_knowledge_level() -> String {
    "beginner".to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopicsResponse {
    pub topics: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectsResponse {
    /// Subject id → subject
    pub subjects: BTreeMap<String, SubjectInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectTopicsResponse {
    pub subject: SubjectInfo,
    pub topics: Vec<String>,
}

/// Ask the tutor a question.
///
/// Always answers: when the language model is missing or failing the reply is
/// a canned educational fallback.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "Chat",
    request_body = ChatTurn,
    responses(
        (status = 200, description = "Tutor reply with suggested follow-up topics", body = ChatReply),
    )
)]
pub async fn chat(State(state): State<AppState>, Json(turn): Json<ChatTurn>) -> Json<ChatReply> {
    Json(state.tutor.chat(&turn).await)
}

/// List the climate topics offered in the topic browser.
#[utoipa::path(
    get,
    path = "/api/chat/topics",
    tag = "Chat",
    responses((status = 200, description = "Topic catalog", body = TopicsResponse))
)]
pub async fn list_topics() -> Json<TopicsResponse> {
    Json(TopicsResponse {
        topics: catalog::list_topics().iter().map(|t| t.to_string()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/chat/subjects",
    tag = "Chat",
    responses((status = 200, description = "Subjects keyed by id", body = SubjectsResponse))
)]
pub async fn list_subjects() -> Json<SubjectsResponse> {
    let subjects = catalog::list_subjects()
        .iter()
        .map(|s| (s.id.to_string(), SubjectInfo::from(s)))
        .collect();
    Json(SubjectsResponse { subjects })
}

#[utoipa::path(
    get,
    path = "/api/chat/subjects/{subject_id}/topics",
    tag = "Chat",
    params(("subject_id" = String, Path, description = "Subject id, e.g. \"renewable_energy\"")),
    responses(
        (status = 200, description = "Subject and its topics", body = SubjectTopicsResponse),
        (status = 404, description = "Unknown subject", body = ErrorResponse),
    )
)]
pub async fn get_subject_topics(
    Path(subject_id): Path<String>,
) -> Result<Json<SubjectTopicsResponse>, AppError> {
    let subject = catalog::topics_for_subject(&subject_id)?;
    let info = SubjectInfo::from(subject);
    Ok(Json(SubjectTopicsResponse {
        topics: info.topics.clone(),
        subject: info,
    }))
}

/// Explain a topic for the given audience.
#[utoipa::path(
    get,
    path = "/api/chat/explain/{topic}",
    tag = "Chat",
    params(
        ("topic" = String, Path, description = "Topic to explain"),
        ExplainQuery,
    ),
    responses((status = 200, description = "Explanation with related topics", body = Explanation))
)]
pub async fn explain_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Query(params): Query<ExplainQuery>,
) -> Json<Explanation> {
    Json(
        state
            .tutor
            .explain(&topic, &params.age_group, &params.knowledge_level)
            .await,
    )
}
