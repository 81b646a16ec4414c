//! Pure state transition function

use super::state::{wants_to_finish, Draft, Selection, Session, TurnStatus};
use super::{Effect, Event};
use crate::llm::{LlmError, Message};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition. None of them change state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{0}")]
    Validation(String),
    #[error("Still working on the last request, please wait")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// Gateway calls are requested through [`Effect`]s and their outcomes come
/// back as events.
pub fn transition(state: &Session, event: Event) -> Result<TransitionResult, TransitionError> {
    if state.is_busy() && event.is_user_action() {
        return Err(TransitionError::Busy);
    }

    match (state, event) {
        // ============================================================
        // Selection
        // ============================================================
        (
            Session::Idle { selection },
            Event::Select {
                topic,
                project_type,
            },
        ) => {
            let selection = Selection {
                topic: topic.or_else(|| selection.topic.clone()),
                project_type: project_type.or(selection.project_type),
            };
            Ok(TransitionResult::new(Session::Idle { selection }))
        }

        (_, Event::Select { .. }) => Err(TransitionError::Validation(
            "Start a new project to change the act or project type".to_string(),
        )),

        // Idle + Start -> Gathering, with a fresh prompt and empty transcript
        (Session::Idle { selection }, Event::Start) => {
            let (Some(topic), Some(project_type)) =
                (selection.topic.clone(), selection.project_type)
            else {
                return Err(TransitionError::Validation(
                    "Please select both an act and project type first!".to_string(),
                ));
            };

            Ok(TransitionResult::new(Session::Gathering {
                draft: Draft::new(topic, project_type),
                status: TurnStatus::Ready,
            }))
        }

        // ============================================================
        // Gathering
        // ============================================================
        (Session::Gathering { draft, .. }, Event::UserMessage { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::Validation(
                    "Type an answer first".to_string(),
                ));
            }

            let mut draft = draft.clone();
            draft.transcript.push(Message::user(text));
            Ok(TransitionResult::new(Session::Gathering {
                draft,
                status: TurnStatus::Awaiting,
            })
            .with_effect(Effect::RequestReply))
        }

        (
            Session::Gathering {
                draft,
                status: TurnStatus::Awaiting,
            },
            Event::ReplyReceived { content },
        ) => {
            let mut draft = draft.clone();
            draft.transcript.push(Message::assistant(content));

            if draft.last_user_input().is_some_and(wants_to_finish) {
                Ok(TransitionResult::new(Session::Finalizing {
                    draft,
                    status: TurnStatus::Awaiting,
                })
                .with_effect(Effect::RequestArtifact))
            } else {
                Ok(TransitionResult::new(Session::Gathering {
                    draft,
                    status: TurnStatus::Ready,
                }))
            }
        }

        // The student's message stays in the transcript so a retry needs no retyping
        (
            Session::Gathering {
                draft,
                status: TurnStatus::Awaiting,
            },
            Event::ReplyFailed { error },
        ) => Ok(TransitionResult::new(Session::Gathering {
            draft: draft.clone(),
            status: failed(&error),
        })),

        (
            Session::Gathering {
                draft,
                status: TurnStatus::Failed { .. },
            },
            Event::Retry,
        ) => Ok(TransitionResult::new(Session::Gathering {
            draft: draft.clone(),
            status: TurnStatus::Awaiting,
        })
        .with_effect(Effect::RequestReply)),

        // ============================================================
        // Finalizing
        // ============================================================
        (
            Session::Finalizing {
                draft,
                status: TurnStatus::Awaiting,
            },
            Event::ArtifactReceived { content },
        ) => {
            if content.trim().is_empty() {
                return Ok(TransitionResult::new(Session::Finalizing {
                    draft: draft.clone(),
                    status: failed(&LlmError::malformed("The final project came back empty")),
                }));
            }

            Ok(TransitionResult::new(Session::Complete {
                draft: draft.clone(),
                artifact: content,
            }))
        }

        (
            Session::Finalizing {
                draft,
                status: TurnStatus::Awaiting,
            },
            Event::ArtifactFailed { error },
        ) => Ok(TransitionResult::new(Session::Finalizing {
            draft: draft.clone(),
            status: failed(&error),
        })),

        (
            Session::Finalizing {
                draft,
                status: TurnStatus::Failed { .. },
            },
            Event::Retry,
        ) => Ok(TransitionResult::new(Session::Finalizing {
            draft: draft.clone(),
            status: TurnStatus::Awaiting,
        })
        .with_effect(Effect::RequestArtifact)),

        // ============================================================
        // Reset
        // ============================================================
        (_, Event::Reset) => Ok(TransitionResult::new(Session::default())),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "cannot handle {} while {:?}",
            event.name(),
            state.phase()
        ))),
    }
}

fn failed(error: &LlmError) -> TurnStatus {
    TurnStatus::Failed {
        message: error.message.clone(),
        error_kind: error.kind,
    }
}
