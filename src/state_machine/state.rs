//! Session state types

use crate::catalog::{export_file_name, ProjectType, Topic};
use crate::llm::{
    LlmErrorKind, LlmRequest, Message, MessageRole, FINAL_SAMPLING, GATHER_SAMPLING,
};
use crate::system_prompt::{build_system_prompt, final_system_prompt};
use serde::{Deserialize, Serialize};

/// Literal tokens that end the gathering phase.
///
/// Matched as plain lowercase substrings, so "already" counts as "ready".
pub const FINISH_KEYWORDS: &[&str] = &["done", "finish", "ready"];

/// Whether a student's raw input asks to wrap up
pub fn wants_to_finish(input: &str) -> bool {
    let lowered = input.to_lowercase();
    FINISH_KEYWORDS.iter().any(|word| lowered.contains(word))
}

// ============================================================================
// Selection and Draft
// ============================================================================

/// Choices made before a session starts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub topic: Option<Topic>,
    pub project_type: Option<ProjectType>,
}

/// Everything fixed at start plus the transcript gathered so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub topic: Topic,
    pub project_type: ProjectType,
    pub system_prompt: String,
    /// User and assistant messages, in order
    pub transcript: Vec<Message>,
}

impl Draft {
    /// Fresh draft with an empty transcript
    pub fn new(topic: Topic, project_type: ProjectType) -> Self {
        let system_prompt = build_system_prompt(&topic, project_type);
        Self {
            topic,
            project_type,
            system_prompt,
            transcript: Vec::new(),
        }
    }

    /// Most recent thing the student typed
    pub fn last_user_input(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }

    /// Request for the next gathering turn: full history, no truncation
    pub fn gather_request(&self) -> LlmRequest {
        LlmRequest::new(self.system_prompt.clone(), &self.transcript, GATHER_SAMPLING)
    }

    /// Request for the final synthesis pass
    pub fn final_request(&self) -> LlmRequest {
        LlmRequest::new(
            final_system_prompt(&self.system_prompt),
            &self.transcript,
            FINAL_SAMPLING,
        )
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(&self.topic, self.project_type)
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Progress of the current model call within a phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    /// Waiting for the student
    #[default]
    Ready,
    /// Gateway call in flight
    Awaiting,
    /// Last gateway call failed; the student may retry
    Failed {
        message: String,
        error_kind: LlmErrorKind,
    },
}

/// Session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Session {
    /// Choosing a topic and project type
    Idle { selection: Selection },

    /// Multi-turn conversation collecting the student's ideas
    Gathering { draft: Draft, status: TurnStatus },

    /// Final project being generated
    Finalizing { draft: Draft, status: TurnStatus },

    /// Final project available for export
    Complete { draft: Draft, artifact: String },
}

impl Default for Session {
    fn default() -> Self {
        Session::Idle {
            selection: Selection::default(),
        }
    }
}

/// Phase name without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Gathering,
    Finalizing,
    Complete,
}

impl Session {
    pub fn phase(&self) -> Phase {
        match self {
            Session::Idle { .. } => Phase::Idle,
            Session::Gathering { .. } => Phase::Gathering,
            Session::Finalizing { .. } => Phase::Finalizing,
            Session::Complete { .. } => Phase::Complete,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            Session::Idle { .. } => None,
            Session::Gathering { draft, .. }
            | Session::Finalizing { draft, .. }
            | Session::Complete { draft, .. } => Some(draft),
        }
    }

    pub fn topic(&self) -> Option<&Topic> {
        match self {
            Session::Idle { selection } => selection.topic.as_ref(),
            _ => self.draft().map(|d| &d.topic),
        }
    }

    pub fn project_type(&self) -> Option<ProjectType> {
        match self {
            Session::Idle { selection } => selection.project_type,
            _ => self.draft().map(|d| d.project_type),
        }
    }

    /// Set iff the session has left Idle
    pub fn system_prompt(&self) -> Option<&str> {
        self.draft().map(|d| d.system_prompt.as_str())
    }

    pub fn transcript(&self) -> &[Message] {
        match self.draft() {
            Some(draft) => &draft.transcript,
            None => &[],
        }
    }

    /// Set iff the session is Complete
    pub fn artifact(&self) -> Option<&str> {
        match self {
            Session::Complete { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&TurnStatus> {
        match self {
            Session::Gathering { status, .. } | Session::Finalizing { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Check if a gateway call is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self.status(), Some(TurnStatus::Awaiting))
    }

    /// Failure from the last gateway call, if any
    pub fn last_error(&self) -> Option<(&str, LlmErrorKind)> {
        match self.status() {
            Some(TurnStatus::Failed {
                message,
                error_kind,
            }) => Some((message.as_str(), *error_kind)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_topic;

    #[test]
    fn test_finish_keywords_are_naive_substrings() {
        assert!(wants_to_finish("I choose A, done"));
        assert!(wants_to_finish("FINISHED!"));
        assert!(wants_to_finish("I'm Ready"));
        assert!(wants_to_finish("I already picked B"));
        assert!(wants_to_finish("abandoned"));
        assert!(!wants_to_finish("B please"));
        assert!(!wants_to_finish(""));
    }

    #[test]
    fn test_idle_has_no_prompt_or_transcript() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.system_prompt().is_none());
        assert!(session.transcript().is_empty());
        assert!(session.artifact().is_none());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_draft_requests() {
        let mut draft = Draft::new(find_topic("Hatch Act").unwrap(), ProjectType::Skit);
        draft.transcript.push(Message::user("A"));
        draft.transcript.push(Message::assistant("Great choice!"));

        let gather = draft.gather_request();
        assert_eq!(gather.messages.len(), 3);
        assert_eq!(gather.messages[0], Message::system(draft.system_prompt.clone()));
        assert_eq!(gather.max_tokens, 300);

        let last = draft.final_request();
        assert!(last.messages[0]
            .content
            .ends_with("generate the final project."));
        assert!(last.max_tokens > gather.max_tokens);
        assert!(last.temperature < gather.temperature);
        assert_eq!(&last.messages[1..], draft.transcript.as_slice());
    }

    #[test]
    fn test_last_user_input() {
        let mut draft = Draft::new(find_topic("Hatch Act").unwrap(), ProjectType::Paragraph);
        assert_eq!(draft.last_user_input(), None);
        draft.transcript.push(Message::user("first"));
        draft.transcript.push(Message::assistant("reply"));
        assert_eq!(draft.last_user_input(), Some("first"));
    }

    #[test]
    fn test_session_serializes_with_phase_tag() {
        let value = serde_json::to_value(Session::default()).unwrap();
        assert_eq!(value["phase"], "idle");
    }
}
