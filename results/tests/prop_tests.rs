use proptest::prelude::*;

use ballot_results::{percentage, standings, total_votes, winner};
use ballot_types::VoteTally;

fn tallies() -> impl Strategy<Value = VoteTally> {
    prop::collection::btree_map("[A-Za-z]{1,8}", 0u64..10_000, 0..12)
}

proptest! {
    /// total_votes is the plain sum of the counts.
    #[test]
    fn total_is_sum(t in tallies()) {
        prop_assert_eq!(total_votes(Some(&t)), t.values().sum::<u64>());
    }

    /// The winner holds the maximum count and is the smallest name among ties.
    #[test]
    fn winner_is_max_and_smallest_name(t in tallies()) {
        match winner(Some(&t)) {
            None => prop_assert!(t.is_empty()),
            Some((name, count)) => {
                let max = *t.values().max().unwrap();
                prop_assert_eq!(count, max);
                let first_max = t.iter().find(|(_, &c)| c == max).map(|(n, _)| n.as_str());
                prop_assert_eq!(Some(name), first_max);
            }
        }
    }

    /// Percentages stay within [0, 100] and are c/t*100 rounded to one decimal.
    #[test]
    fn percentage_bounds(count in 0u64..100_000, extra in 0u64..100_000) {
        let total = count + extra;
        let p = percentage(count, total);
        prop_assert!((0.0..=100.0).contains(&p));
        if total > 0 {
            let exact = count as f64 / total as f64 * 100.0;
            prop_assert!((p - exact).abs() <= 0.05 + 1e-9);
            prop_assert!((p * 10.0 - (p * 10.0).round()).abs() < 1e-6);
        } else {
            prop_assert_eq!(p, 0.0);
        }
    }

    /// Standings are non-increasing in votes and keep every candidate.
    #[test]
    fn standings_are_sorted(t in tallies()) {
        let rows = standings(Some(&t));
        prop_assert_eq!(rows.len(), t.len());
        for pair in rows.windows(2) {
            prop_assert!(pair[0].votes >= pair[1].votes);
        }
        if let Some(first) = rows.first() {
            prop_assert_eq!(Some(first.candidate.as_str()), winner(Some(&t)).map(|(n, _)| n));
        }
    }
}
