//! Property-based tests for round construction

use super::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn arb_catalog() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::hash_set("[a-z]{1,8}", 4..20).prop_map(|set| set.into_iter().collect())
}

proptest! {
    // Full catalogs always give exactly three distinct distractors
    #[test]
    fn prop_round_has_three_distinct_distractors(
        catalog in arb_catalog(),
        target_index in any::<prop::sample::Index>(),
        seed in any::<u64>(),
    ) {
        let target = catalog[target_index.index(catalog.len())].clone();
        let candidates: Vec<String> = catalog.iter().filter(|w| **w != target).cloned().collect();
        let mut rng = StdRng::seed_from_u64(seed);

        let round = Round::new(
            WordPair { source_word: target.clone(), translation: "t".into() },
            candidates,
            &mut rng,
        );

        prop_assert_eq!(round.distractors.len(), DISTRACTOR_COUNT);
        prop_assert!(!round.distractors.contains(&target));
        let unique: HashSet<_> = round.distractors.iter().collect();
        prop_assert_eq!(unique.len(), DISTRACTOR_COUNT);
    }

    // Options are exactly target + distractors, whatever the candidate noise
    #[test]
    fn prop_options_are_target_plus_distractors(
        candidates in proptest::collection::vec("[a-cA-C]{1,2}", 0..10),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let round = Round::new(
            WordPair { source_word: "a".into(), translation: "t".into() },
            candidates,
            &mut rng,
        );

        prop_assert!(round.distractors.len() <= DISTRACTOR_COUNT);
        prop_assert!(round.distractors.iter().all(|d| !d.eq_ignore_ascii_case("a")));

        let mut expected: Vec<String> = round.distractors.clone();
        expected.push("a".into());
        expected.sort();
        let mut options = round.options.clone();
        options.sort();
        prop_assert_eq!(options, expected);

        let lowered: HashSet<String> = round.options.iter().map(|o| o.to_ascii_lowercase()).collect();
        prop_assert_eq!(lowered.len(), round.options.len());
    }
}
