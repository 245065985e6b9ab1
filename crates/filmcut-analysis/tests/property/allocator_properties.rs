use std::cmp::Reverse;

use filmcut_analysis::{
    language::LanguageCategory, popularity::assign_popularity, quota::QuotaTable,
};
use proptest::prelude::*;

fn entries_strategy(max_len: usize) -> impl Strategy<Value = Vec<(LanguageCategory, f64)>> {
    prop::collection::vec(
        (0..LanguageCategory::ALL.len(), -1000.0..1000.0_f64),
        0..max_len,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(i, seed)| (LanguageCategory::ALL[i], seed.round()))
            .collect()
    })
}

fn categories_by_rank(
    entries: &[(LanguageCategory, f64)],
    popularity: &[usize],
) -> Vec<LanguageCategory> {
    let mut ranked = entries
        .iter()
        .zip(popularity)
        .map(|((category, _), p)| (*p, *category))
        .collect::<Vec<_>>();
    ranked.sort_by_key(|(p, _)| Reverse(*p));
    ranked.into_iter().map(|(_, c)| c).collect()
}

proptest! {
    #[test]
    fn popularity_is_a_permutation(entries in entries_strategy(200)) {
        let mut popularity = assign_popularity(&entries, &QuotaTable::default());
        popularity.sort_unstable();
        let expected = (1..=entries.len()).collect::<Vec<_>>();
        prop_assert_eq!(popularity, expected);
    }

    #[test]
    fn seed_order_is_kept_within_category(entries in entries_strategy(200)) {
        let popularity = assign_popularity(&entries, &QuotaTable::default());
        for (i, (category_i, seed_i)) in entries.iter().enumerate() {
            for (j, (category_j, seed_j)) in entries.iter().enumerate().skip(i + 1) {
                if category_i != category_j {
                    continue;
                }
                // Equal seeds keep encounter order
                if seed_i >= seed_j {
                    prop_assert!(popularity[i] > popularity[j], "{i} vs {j}");
                } else {
                    prop_assert!(popularity[i] < popularity[j], "{i} vs {j}");
                }
            }
        }
    }

    #[test]
    fn stocked_windows_match_weights(
        windows in 1..4_usize,
        surplus in prop::collection::vec(0..10_usize, 7),
    ) {
        let quota = QuotaTable::default();
        let mut entries = vec![];
        for (category, extra) in LanguageCategory::ALL.into_iter().zip(&surplus) {
            for i in 0..quota.weight(category) * windows + extra {
                #[expect(clippy::cast_precision_loss)]
                let seed = i as f64;
                entries.push((category, seed));
            }
        }

        let popularity = assign_popularity(&entries, &quota);
        let ranked = categories_by_rank(&entries, &popularity);
        for window in ranked.chunks(quota.window_size()).take(windows) {
            for category in LanguageCategory::ALL {
                let count = window.iter().filter(|c| **c == category).count();
                prop_assert_eq!(count, quota.weight(category));
            }
        }
    }

    #[test]
    fn windows_are_consumed_in_declaration_order(entries in entries_strategy(120)) {
        let quota = QuotaTable::default();
        let popularity = assign_popularity(&entries, &quota);
        let ranked = categories_by_rank(&entries, &popularity);
        for window in ranked.chunks(quota.window_size()) {
            prop_assert!(window.is_sorted(), "{window:?}");
        }
    }
}
