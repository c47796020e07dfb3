//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn plain_context() -> ChatContext {
    ChatContext::default()
}

fn arb_context() -> impl Strategy<Value = ChatContext> {
    (
        proptest::option::of("[a-zA-Z .]{1,30}"),
        prop_oneof![Just(ContextMode::Full), Just(ContextMode::Latest)],
    )
        .prop_map(|(system_prompt, context_mode)| ChatContext {
            system_prompt,
            context_mode,
        })
}

/// Drive an event through the transition, the way the runtime does
fn apply(session: &Session, ctx: &ChatContext, event: Event) -> Option<TransitionResult> {
    transition(session, ctx, event).ok()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,30}",
        "[ \t\n]{0,5}",
        "[ ]{0,3}[a-z]{1,10}[ ]{0,3}",
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::StageDraft { text }),
        arb_text().prop_map(|text| Event::Submit { text }),
        Just(Event::ClearAll),
        ("[a-zA-Z ]{0,10}", "[a-z@.]{0,15}")
            .prop_map(|(name, email)| Event::UpdateProfile { name, email }),
        "[a-zA-Z ]{0,30}".prop_map(|content| Event::ModelReply { content }),
        "[a-zA-Z ]{1,30}".prop_map(|message| Event::ModelFailed { message }),
    ]
}

fn arb_model_outcome() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z]{1,30}".prop_map(|content| Event::ModelReply { content }),
        "[a-zA-Z ]{1,30}".prop_map(|message| Event::ModelFailed { message }),
    ]
}

// ============================================================================
// Transcript Validity Checkers
// ============================================================================

/// Every assistant turn directly follows a user turn, and no two user turns
/// are adjacent
fn transcript_is_well_formed(transcript: &[Turn]) -> bool {
    transcript.windows(2).all(|pair| {
        let (prev, next) = (&pair[0], &pair[1]);
        !(prev.role == Role::User && next.role == Role::User)
            && (next.role != Role::Assistant || prev.role == Role::User)
    }) && transcript.first().is_none_or(|t| t.role != Role::Assistant)
}

fn effects_are_valid(effects: &[Effect], new_state: &Session) -> bool {
    let invokes = effects
        .iter()
        .filter(|e| matches!(e, Effect::InvokeModel { .. }))
        .count();

    if invokes > 1 {
        return false;
    }

    // Model calls only go out with the session marked as submitting
    if invokes == 1 && new_state.phase != ChatPhase::Submitting {
        return false;
    }

    true
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: transcript stays well formed under any event sequence
    #[test]
    fn prop_transitions_preserve_transcript_shape(
        ctx in arb_context(),
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let mut session = Session::new(&ctx);

        for event in events {
            if let Some(result) = apply(&session, &ctx, event) {
                prop_assert!(
                    transcript_is_well_formed(&result.new_state.transcript),
                    "Malformed transcript: {:?}",
                    result.new_state.transcript
                );
                prop_assert!(
                    effects_are_valid(&result.effects, &result.new_state),
                    "Invalid effects {:?} for {:?}",
                    result.effects,
                    result.new_state
                );
                session = result.new_state;
            }
        }
    }

    // Invariant 2: transcript is append-only except for an explicit clear
    #[test]
    fn prop_transcript_append_only(
        ctx in arb_context(),
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let mut session = Session::new(&ctx);

        for event in events {
            let is_clear = matches!(event, Event::ClearAll);
            if let Some(result) = apply(&session, &ctx, event) {
                let next = &result.new_state.transcript;
                if is_clear {
                    prop_assert_eq!(next, &ctx.seed_transcript());
                } else {
                    prop_assert!(next.len() >= session.transcript.len());
                    prop_assert_eq!(&next[..session.transcript.len()], &session.transcript[..]);
                }
                session = result.new_state;
            }
        }
    }

    // Invariant 3: the clear flag only turns on when a cycle completes
    #[test]
    fn prop_clear_flag_set_only_by_completed_cycle(
        ctx in arb_context(),
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let mut session = Session::new(&ctx);

        for event in events {
            let completes = matches!(event, Event::ModelReply { .. } | Event::ModelFailed { .. });
            if let Some(result) = apply(&session, &ctx, event) {
                if result.new_state.pending_input_clear && !session.pending_input_clear {
                    prop_assert!(completes, "Flag set outside a completed cycle");
                    let tail = &result.new_state.transcript[result.new_state.transcript.len() - 2..];
                    prop_assert_eq!(tail[0].role, Role::User);
                    prop_assert_eq!(tail[1].role, Role::Assistant);
                }
                session = result.new_state;
            }
        }
    }

    // Invariant 4: clearing returns to the initial transcript length
    #[test]
    fn prop_clear_restores_initial_length(
        ctx in arb_context(),
        texts in proptest::collection::vec("[a-z]{1,10}", 0..5)
    ) {
        let initial_len = Session::new(&ctx).transcript.len();
        let mut session = Session::new(&ctx);

        for text in texts {
            session = apply(&session, &ctx, Event::Submit { text }).unwrap().new_state;
            session = apply(&session, &ctx, Event::ModelReply { content: "ok".to_string() })
                .unwrap()
                .new_state;
        }

        let cleared = apply(&session, &ctx, Event::ClearAll).unwrap().new_state;
        prop_assert_eq!(cleared.transcript.len(), initial_len);
    }

    // Invariant 5: whitespace submissions change nothing and call nothing
    #[test]
    fn prop_whitespace_submit_is_noop(ctx in arb_context(), text in "[ \t\n\r]{0,10}") {
        let session = Session::new(&ctx);
        let result = transition(&session, &ctx, Event::Submit { text }).unwrap();
        prop_assert_eq!(result.new_state, session);
        prop_assert!(result.effects.is_empty());
    }

    // Invariant 6: a full cycle adds exactly the user turn and one assistant turn
    #[test]
    fn prop_cycle_adds_two_turns(
        ctx in arb_context(),
        text in "[ ]{0,3}[a-zA-Z]{1,20}[ ]{0,3}",
        outcome in arb_model_outcome()
    ) {
        let session = Session::new(&ctx);
        let failed = matches!(outcome, Event::ModelFailed { .. });

        let submitted = transition(&session, &ctx, Event::Submit { text: text.clone() }).unwrap();
        let done = transition(&submitted.new_state, &ctx, outcome).unwrap().new_state;

        let before = session.transcript.len();
        prop_assert_eq!(done.transcript.len(), before + 2);
        prop_assert_eq!(&done.transcript[before], &Turn::user(text.trim()));
        prop_assert_eq!(done.transcript[before + 1].role, Role::Assistant);
        if failed {
            prop_assert!(done.transcript[before + 1].content.starts_with(MODEL_ERROR_PREFIX));
        }
        prop_assert!(done.pending_input_clear);
        prop_assert!(done.is_idle());
    }

    // Invariant 7: after a completed cycle, reconcile empties whatever draft was staged
    #[test]
    fn prop_reconcile_after_cycle_empties_draft(
        ctx in arb_context(),
        draft in "[a-zA-Z ]{0,20}",
        outcome in arb_model_outcome()
    ) {
        let mut session = Session::new(&ctx);
        session = apply(&session, &ctx, Event::StageDraft { text: "hello".to_string() })
            .unwrap()
            .new_state;
        session = apply(&session, &ctx, Event::Submit { text: "hello".to_string() })
            .unwrap()
            .new_state;
        session = apply(&session, &ctx, outcome).unwrap().new_state;

        // Whatever the control held when the page re-ran
        session.draft_input_text = draft;
        session.apply_pending_clear();

        prop_assert_eq!(session.draft_input_text, "");
        prop_assert!(!session.pending_input_clear);
    }

    // Invariant 8: submitting sessions reject new input
    #[test]
    fn prop_submitting_rejects_input(ctx in arb_context(), text in "[a-z]{1,10}") {
        let session = Session::new(&ctx);
        let submitted = transition(&session, &ctx, Event::Submit { text: text.clone() })
            .unwrap()
            .new_state;

        prop_assert_eq!(
            transition(&submitted, &ctx, Event::Submit { text }).unwrap_err(),
            TransitionError::Busy
        );
    }
}
