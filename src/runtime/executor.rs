//! Wizard runtime executor

use crate::llm::{LlmError, LlmService};
use crate::state_machine::{transition, Effect, Event, Session, TransitionError, TurnStatus};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;

/// One session plus the gateway that serves it
pub struct WizardRuntime {
    session_id: String,
    session: Session,
    llm_client: Arc<dyn LlmService>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WizardRuntime {
    pub fn new(session_id: impl Into<String>, llm_client: Arc<dyn LlmService>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            session: Session::default(),
            llm_client,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a student event and run every effect it leads to.
    ///
    /// Effects are executed in a loop, each gateway outcome fed back as an
    /// event, until none remain. A gateway failure is not an error here: it
    /// is recorded in the session as a failed turn.
    pub async fn dispatch(&mut self, event: Event) -> Result<&Session, TransitionError> {
        self.settle_interrupted_turn();
        let mut effects: VecDeque<Effect> = self.apply(event)?.into();

        while let Some(effect) = effects.pop_front() {
            let follow_up = self.execute_effect(effect).await?;
            effects.extend(self.apply(follow_up)?);
        }

        Ok(&self.session)
    }

    /// Fail a turn whose dispatch was dropped mid-call.
    ///
    /// `&mut self` means no dispatch is running, so an `Awaiting` status can
    /// only be left over from a cancelled one (client disconnect, timeout).
    pub fn settle_interrupted_turn(&mut self) {
        let error = || LlmError::network("Request cancelled before the model replied");
        let event = match &self.session {
            Session::Gathering {
                status: TurnStatus::Awaiting,
                ..
            } => Event::ReplyFailed { error: error() },
            Session::Finalizing {
                status: TurnStatus::Awaiting,
                ..
            } => Event::ArtifactFailed { error: error() },
            _ => return,
        };

        tracing::warn!(
            session_id = %self.session_id,
            phase = ?self.session.phase(),
            "Gateway call was cancelled before it finished"
        );
        // Failure events from Awaiting always apply and never produce effects
        let _ = self.apply(event);
    }

    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let event_name = event.name();
        let result = transition(&self.session, event).map_err(|e| {
            tracing::debug!(
                session_id = %self.session_id,
                event = event_name,
                error = %e,
                "Event rejected"
            );
            e
        })?;

        let (from, to) = (self.session.phase(), result.new_state.phase());
        if from == to {
            tracing::debug!(session_id = %self.session_id, event = event_name, phase = ?to, "Session updated");
        } else {
            tracing::info!(
                session_id = %self.session_id,
                event = event_name,
                from = ?from,
                to = ?to,
                "Session phase changed"
            );
        }

        self.session = result.new_state;
        self.updated_at = Utc::now();
        Ok(result.effects)
    }

    async fn execute_effect(&self, effect: Effect) -> Result<Event, TransitionError> {
        let draft = self.session.draft().ok_or_else(|| {
            TransitionError::InvalidTransition(format!("{effect:?} requested without a draft"))
        })?;

        let event = match effect {
            Effect::RequestReply => {
                let request = draft.gather_request();
                match self.llm_client.complete(&request).await {
                    Ok(response) => Event::ReplyReceived {
                        content: response.content,
                    },
                    Err(error) => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            error = %error,
                            kind = ?error.kind,
                            "Gathering reply failed"
                        );
                        Event::ReplyFailed { error }
                    }
                }
            }
            Effect::RequestArtifact => {
                let request = draft.final_request();
                match self.llm_client.complete(&request).await {
                    Ok(response) => Event::ArtifactReceived {
                        content: response.content,
                    },
                    Err(error) => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            error = %error,
                            kind = ?error.kind,
                            "Final project generation failed"
                        );
                        Event::ArtifactFailed { error }
                    }
                }
            }
        };

        Ok(event)
    }
}
