//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::config::Keywords;
use crate::db::WordPair;
use crate::ledger::{AddOutcome, DeleteOutcome};
use crate::quiz::Round;
use crate::texts::Texts;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new(
        42,
        42,
        Arc::new(Keywords::default()),
        Arc::new(Texts::default()),
    )
}

fn is_reserved(text: &str) -> bool {
    Command::parse(text, &Keywords::default()).is_some()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
}

fn arb_round() -> impl Strategy<Value = Round> {
    proptest::collection::hash_set(arb_word(), 1..5).prop_map(|words| {
        let mut words: Vec<String> = words.into_iter().collect();
        let target = words.remove(0);
        let mut options = words.clone();
        options.push(target.clone());
        Round {
            target: WordPair {
                source_word: target,
                translation: "перевод".into(),
            },
            distractors: words,
            options,
        }
    })
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Quiz { round: None }),
        arb_round().prop_map(|round| SessionState::Quiz { round: Some(round) }),
        Just(SessionState::AwaitingNewWord),
        arb_word().prop_map(|source_word| SessionState::AwaitingNewTranslation { source_word }),
        Just(SessionState::AwaitingDeleteTarget),
    ]
}

fn arb_user_text() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_word(),
        Just(String::new()),
        Just("   ".to_string()),
        "[a-zA-Zа-я ]{1,60}",
    ]
}

fn arb_user_event() -> impl Strategy<Value = Event> {
    let keywords = Keywords::default();
    prop_oneof![
        arb_user_text().prop_map(|text| Event::UserText { text }),
        Just(Event::AddWordRequested),
        Just(Event::DeleteWordRequested),
        Just(Event::NextRequested),
        Just(Event::Help),
        Just(Event::ListWords),
        any::<bool>().prop_map(|greet| Event::Start {
            first_name: "Ann".into(),
            greet,
        }),
        Just(keywords.add_word).prop_map(|text| Event::UserText { text }),
    ]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::SelectRound),
        Just(Action::AddWord),
        Just(Action::DeleteWord),
        Just(Action::ListWords),
    ]
}

fn arb_add_outcome() -> impl Strategy<Value = AddOutcome> {
    (arb_word(), 1usize..100).prop_flat_map(|(word, catalog_size)| {
        let pair = WordPair {
            source_word: word.clone(),
            translation: "перевод".into(),
        };
        prop_oneof![
            Just(AddOutcome::Added {
                word: pair.clone(),
                catalog_size,
            }),
            Just(AddOutcome::AlreadyOwned { source_word: word }),
            Just(AddOutcome::CatalogConflict {
                existing: pair,
                catalog_size,
            }),
        ]
    })
}

fn arb_delete_outcome() -> impl Strategy<Value = DeleteOutcome> {
    prop_oneof![
        Just(DeleteOutcome::Deleted),
        Just(DeleteOutcome::NotOwned),
        Just(DeleteOutcome::UnknownWord),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: user events are accepted in every phase
    #[test]
    fn prop_user_events_always_accepted(
        state in arb_state(),
        events in proptest::collection::vec(arb_user_event(), 1..20)
    ) {
        let ctx = test_context();
        let mut state = state;
        for event in events {
            let result = transition(&state, &ctx, event.clone());
            prop_assert!(result.is_ok(), "{:?} rejected in {:?}", event, state);
            state = result.unwrap().new_state;
        }
    }

    // Invariant 2: reserved commands short-circuit every phase
    #[test]
    fn prop_commands_short_circuit(state in arb_state()) {
        let ctx = test_context();

        let add = transition(&state, &ctx, Event::AddWordRequested).unwrap();
        prop_assert_eq!(add.new_state, SessionState::AwaitingNewWord);

        let delete = transition(&state, &ctx, Event::DeleteWordRequested).unwrap();
        prop_assert_eq!(delete.new_state, SessionState::AwaitingDeleteTarget);

        let next = transition(&state, &ctx, Event::NextRequested).unwrap();
        prop_assert_eq!(next.new_state, SessionState::Quiz { round: None });
        prop_assert_eq!(next.effects, vec![Effect::SelectRound]);
    }

    // Invariant 3: ordinary text never leaves the phase's own handler
    #[test]
    fn prop_text_in_dialogue_phases_is_not_an_answer(text in arb_user_text()) {
        prop_assume!(!is_reserved(&text));
        let ctx = test_context();

        for state in [SessionState::AwaitingNewWord, SessionState::AwaitingDeleteTarget] {
            let result = transition(&state, &ctx, Event::UserText { text: text.clone() }).unwrap();
            let correct = Effect::reply(ctx.texts.correct.clone());
            let incorrect = Effect::reply(ctx.texts.incorrect.clone());
            prop_assert!(!result.effects.contains(&correct));
            prop_assert!(!result.effects.contains(&incorrect));
        }
    }

    // Invariant 4: failures always land in Quiz
    #[test]
    fn prop_failures_fall_back_to_quiz(state in arb_state(), action in arb_action()) {
        let ctx = test_context();
        let event = Event::ActionFailed { action, kind: ErrorKind::StoreUnavailable };
        let result = transition(&state, &ctx, event).unwrap();
        prop_assert_eq!(result.new_state.phase(), Phase::Quiz);
        prop_assert!(!result.effects.is_empty());
    }

    // Invariant 5: finishing a flow always asks for the next round
    #[test]
    fn prop_completed_flows_request_round(
        add in arb_add_outcome(),
        delete in arb_delete_outcome(),
        word in arb_word(),
        example in proptest::option::of("[a-z ]{1,20}"),
    ) {
        let ctx = test_context();
        let idle = SessionState::Quiz { round: None };

        for event in [
            Event::WordAdded { outcome: add },
            Event::WordDeleted { source_word: word, outcome: delete },
            Event::ExampleFetched { example },
        ] {
            let result = transition(&idle, &ctx, event).unwrap();
            prop_assert_eq!(result.effects.last(), Some(&Effect::SelectRound));
        }
    }

    // Invariant 6: wrong answers retry the same round
    #[test]
    fn prop_wrong_answer_keeps_round(round in arb_round(), answer in arb_word()) {
        prop_assume!(!round.is_correct(&answer));
        let ctx = test_context();
        let state = SessionState::Quiz { round: Some(round) };
        let result = transition(&state, &ctx, Event::UserText { text: answer }).unwrap();
        prop_assert_eq!(result.new_state, state);
    }

    // Invariant 7: round prompts list options first, keywords last
    #[test]
    fn prop_round_prompt_choices(round in arb_round()) {
        let ctx = test_context();
        let result = transition(
            &SessionState::Quiz { round: None },
            &ctx,
            Event::RoundReady { round: round.clone() },
        ).unwrap();

        match &result.effects[..] {
            [Effect::Reply(Reply { choices: Some(choices), .. })] => {
                let option_count = choices.len() - 3;
                prop_assert_eq!(&choices[..option_count], &round.options[..]);
                prop_assert_eq!(&choices[option_count], &ctx.keywords.next);
            }
            other => prop_assert!(false, "unexpected effects {:?}", other),
        }
    }
}
