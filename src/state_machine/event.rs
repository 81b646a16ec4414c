//! Events that can occur in a session

use crate::catalog::{ProjectType, Topic};
use crate::llm::LlmError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Student events
    /// Change the topic and/or project type while Idle
    Select {
        topic: Option<Topic>,
        project_type: Option<ProjectType>,
    },
    /// Confirm the selection and begin gathering
    Start,
    UserMessage {
        text: String,
    },
    /// Re-issue the last failed gateway call
    Retry,
    Reset,

    // Gateway events
    ReplyReceived {
        content: String,
    },
    ReplyFailed {
        error: LlmError,
    },
    ArtifactReceived {
        content: String,
    },
    ArtifactFailed {
        error: LlmError,
    },
}

impl Event {
    /// Check if the event comes from the student rather than the gateway
    pub fn is_user_action(&self) -> bool {
        matches!(
            self,
            Event::Select { .. }
                | Event::Start
                | Event::UserMessage { .. }
                | Event::Retry
                | Event::Reset
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::Select { .. } => "select",
            Event::Start => "start",
            Event::UserMessage { .. } => "user_message",
            Event::Retry => "retry",
            Event::Reset => "reset",
            Event::ReplyReceived { .. } => "reply_received",
            Event::ReplyFailed { .. } => "reply_failed",
            Event::ArtifactReceived { .. } => "artifact_received",
            Event::ArtifactFailed { .. } => "artifact_failed",
        }
    }
}
