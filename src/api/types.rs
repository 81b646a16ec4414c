//! API request and response types

use crate::catalog::{ProjectType, Topic};
use crate::llm::{LlmErrorKind, Message};
use crate::runtime::WizardRuntime;
use crate::state_machine::{Phase, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to change the selection of an Idle session
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// Topic name or label, e.g. `Hatch Act` or `Hatch Act (1939)`
    #[serde(default)]
    pub topic: Option<String>,
    /// Project type id, noun or label
    #[serde(default)]
    pub project_type: Option<String>,
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Topic entry in the catalog
#[derive(Debug, Serialize)]
pub struct TopicInfo {
    pub name: String,
    pub label: String,
    pub enacted: u16,
    pub description: String,
}

impl From<Topic> for TopicInfo {
    fn from(topic: Topic) -> Self {
        Self {
            label: topic.label(),
            name: topic.name,
            enacted: topic.enacted,
            description: topic.description,
        }
    }
}

/// Project type entry in the catalog
#[derive(Debug, Serialize)]
pub struct ProjectTypeInfo {
    pub id: &'static str,
    pub label: &'static str,
}

impl From<ProjectType> for ProjectTypeInfo {
    fn from(project_type: ProjectType) -> Self {
        Self {
            id: project_type.id(),
            label: project_type.label(),
        }
    }
}

/// Response for the catalog
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub topics: Vec<TopicInfo>,
    pub project_types: Vec<ProjectTypeInfo>,
}

/// Failure from the last gateway call
#[derive(Debug, Serialize)]
pub struct TurnError {
    pub message: String,
    pub kind: LlmErrorKind,
}

/// Snapshot of one session for the presentation shell
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub phase: Phase,
    pub topic: Option<TopicInfo>,
    pub project_type: Option<ProjectTypeInfo>,
    pub has_system_prompt: bool,
    pub transcript: Vec<Message>,
    pub working: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TurnError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    pub fn from_runtime(runtime: &WizardRuntime) -> Self {
        let session = runtime.session();
        let export_file_name = match session {
            Session::Complete { draft, .. } => Some(draft.export_file_name()),
            _ => None,
        };
        let error = session.last_error().map(|(message, kind)| TurnError {
            message: message.to_string(),
            kind,
        });

        Self {
            id: runtime.session_id().to_string(),
            phase: session.phase(),
            topic: session.topic().cloned().map(TopicInfo::from),
            project_type: session.project_type().map(ProjectTypeInfo::from),
            has_system_prompt: session.system_prompt().is_some(),
            transcript: session.transcript().to_vec(),
            working: session.is_busy(),
            error,
            artifact: session.artifact().map(str::to_string),
            export_file_name,
            created_at: runtime.created_at(),
            updated_at: runtime.updated_at(),
        }
    }
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
