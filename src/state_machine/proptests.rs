//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{all_topics, ProjectType, Topic};
use crate::llm::{LlmError, LlmErrorKind, Message};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_topic() -> impl Strategy<Value = Topic> {
    proptest::sample::select(all_topics())
}

fn arb_project_type() -> impl Strategy<Value = ProjectType> {
    proptest::sample::select(ProjectType::ALL.to_vec())
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::Malformed),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_llm_error() -> impl Strategy<Value = LlmError> {
    (arb_error_kind(), "[a-zA-Z ]{1,30}").prop_map(|(kind, message)| LlmError::new(kind, message))
}

/// Student input, sometimes carrying a finish keyword in any case
fn arb_user_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z ,]{0,30}",
        1 => ("[a-z ]{0,10}", prop_oneof![Just("done"), Just("Finish"), Just("READY"), Just("already")], "[a-z ]{0,10}")
            .prop_map(|(pre, word, post)| format!("{pre}{word}{post}")),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (proptest::option::of(arb_topic()), proptest::option::of(arb_project_type()))
            .prop_map(|(topic, project_type)| Event::Select { topic, project_type }),
        Just(Event::Start),
        arb_user_text().prop_map(|text| Event::UserMessage { text }),
        Just(Event::Retry),
        Just(Event::Reset),
        "[a-zA-Z .]{0,40}".prop_map(|content| Event::ReplyReceived { content }),
        arb_llm_error().prop_map(|error| Event::ReplyFailed { error }),
        "[a-zA-Z :.]{0,40}".prop_map(|content| Event::ArtifactReceived { content }),
        arb_llm_error().prop_map(|error| Event::ArtifactFailed { error }),
    ]
}

fn arb_gathering_awaiting() -> impl Strategy<Value = (Session, String)> {
    (arb_topic(), arb_project_type(), arb_user_text().prop_filter("non-blank", |t| !t.trim().is_empty()))
        .prop_map(|(topic, project_type, text)| {
            let mut draft = Draft::new(topic, project_type);
            draft.transcript.push(Message::user(text.clone()));
            (
                Session::Gathering {
                    draft,
                    status: TurnStatus::Awaiting,
                },
                text,
            )
        })
}

// ============================================================================
// State Validity Checkers
// ============================================================================

fn is_valid_state(state: &Session) -> bool {
    let artifact_ok = match state {
        Session::Complete { artifact, .. } => !artifact.trim().is_empty(),
        _ => state.artifact().is_none(),
    };
    let prompt_ok = state.system_prompt().is_some() == (state.phase() != Phase::Idle);
    let finalizing_ok = !matches!(
        state,
        Session::Finalizing {
            status: TurnStatus::Ready,
            ..
        }
    );
    artifact_ok && prompt_ok && finalizing_ok
}

fn effects_are_valid(effects: &[Effect], new_state: &Session) -> bool {
    effects.iter().all(|effect| match effect {
        Effect::RequestReply => matches!(
            new_state,
            Session::Gathering {
                status: TurnStatus::Awaiting,
                ..
            }
        ),
        Effect::RequestArtifact => matches!(
            new_state,
            Session::Finalizing {
                status: TurnStatus::Awaiting,
                ..
            }
        ),
    })
}

fn transcript_change_is_valid(old: &Session, new: &Session) -> bool {
    let (old_len, new_len) = (old.transcript().len(), new.transcript().len());
    match (old.phase(), new.phase()) {
        // Cleared exactly at start
        (Phase::Idle, Phase::Gathering) => new_len == 0,
        (Phase::Gathering, Phase::Gathering | Phase::Finalizing) => new_len >= old_len,
        (Phase::Finalizing, Phase::Finalizing | Phase::Complete) => new_len == old_len,
        (_, Phase::Idle) => new_len == 0,
        _ => false,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Valid state and effects after any sequence of events
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = Session::default();

        for event in events {
            if let Ok(result) = transition(&state, event) {
                prop_assert!(is_valid_state(&result.new_state), "Invalid state: {:?}", result.new_state);
                prop_assert!(
                    effects_are_valid(&result.effects, &result.new_state),
                    "Invalid effects for state {:?}: {:?}",
                    result.new_state,
                    result.effects
                );
                prop_assert!(
                    transcript_change_is_valid(&state, &result.new_state),
                    "Transcript changed illegally from {:?} to {:?}",
                    state,
                    result.new_state
                );
                state = result.new_state;
            }
        }
    }

    // Invariant 2: Topic and project type never change outside Idle
    #[test]
    fn prop_selection_locked_after_start(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = Session::default();

        for event in events {
            if let Ok(result) = transition(&state, event) {
                if state.phase() != Phase::Idle && result.new_state.phase() != Phase::Idle {
                    prop_assert_eq!(state.topic(), result.new_state.topic());
                    prop_assert_eq!(state.project_type(), result.new_state.project_type());
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 3: A reply ends gathering iff the input had a finish keyword
    #[test]
    fn prop_finish_keyword_decides_phase(
        (state, text) in arb_gathering_awaiting(),
        reply in "[a-zA-Z ]{1,30}",
    ) {
        let result = transition(&state, Event::ReplyReceived { content: reply }).unwrap();
        let lowered = text.to_lowercase();
        let expected_finish = ["done", "finish", "ready"].iter().any(|w| lowered.contains(w));

        if expected_finish {
            prop_assert_eq!(result.new_state.phase(), Phase::Finalizing);
            prop_assert_eq!(result.effects, vec![Effect::RequestArtifact]);
        } else {
            prop_assert_eq!(result.new_state.phase(), Phase::Gathering);
            prop_assert!(result.effects.is_empty());
        }
    }

    // Invariant 4: Gateway failure in gathering keeps phase, transcript and no artifact
    #[test]
    fn prop_gathering_failure_changes_nothing_else(
        (state, _text) in arb_gathering_awaiting(),
        error in arb_llm_error(),
    ) {
        let result = transition(&state, Event::ReplyFailed { error: error.clone() }).unwrap();
        prop_assert_eq!(result.new_state.phase(), Phase::Gathering);
        prop_assert_eq!(result.new_state.transcript(), state.transcript());
        prop_assert!(result.new_state.artifact().is_none());
        prop_assert_eq!(
            result.new_state.last_error(),
            Some((error.message.as_str(), error.kind))
        );
    }

    // Invariant 5: Busy sessions reject every student action
    #[test]
    fn prop_busy_rejects_user_actions((state, _text) in arb_gathering_awaiting(), event in arb_event()) {
        if event.is_user_action() {
            prop_assert_eq!(transition(&state, event).unwrap_err(), TransitionError::Busy);
        }
    }

    // Invariant 6: Reset from any idle-reachable non-busy state returns to an empty session
    #[test]
    fn prop_reset_clears_session(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = Session::default();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }

        if !state.is_busy() {
            let result = transition(&state, Event::Reset).unwrap();
            prop_assert_eq!(result.new_state, Session::default());
            prop_assert!(result.effects.is_empty());
        }
    }
}
