//! Per-chain relay totals and the top-N ranking derived from them.

use crate::relay::RelaySession;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Number of chains shown on the leaderboard.
pub const DEFAULT_TOP_N: usize = 10;

/// One row of the ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// Service identifier.
    pub spec_id: String,
    /// Cumulative relay count across all accumulated sessions.
    pub total: u64,
}

/// Accumulates relay sessions and keeps the ranking current.
///
/// Sessions are append-only for the lifetime of the aggregator. Every
/// append recomputes totals from the full set.
#[derive(Debug, Clone)]
pub struct Aggregator {
    relays: Vec<RelaySession>,
    ranking: Vec<RankingEntry>,
    top_n: usize,
}

impl Aggregator {
    /// Create an empty aggregator.
    ///
    /// # Arguments
    /// * `top_n` - Maximum number of rows kept in the ranking
    pub fn new(top_n: usize) -> Self {
        Self {
            relays: Vec::new(),
            ranking: Vec::new(),
            top_n,
        }
    }

    /// Append a batch of sessions and recompute the ranking.
    pub fn extend(&mut self, batch: Vec<RelaySession>) -> &[RankingEntry] {
        debug!("Appending {} relay sessions to {}", batch.len(), self.relays.len());
        self.relays.extend(batch);
        self.ranking = rank(&self.relays, self.top_n);
        &self.ranking
    }

    /// All accumulated sessions, in arrival order.
    pub fn relays(&self) -> &[RelaySession] {
        &self.relays
    }

    /// The current ranking.
    pub fn ranking(&self) -> &[RankingEntry] {
        &self.ranking
    }

    /// Maximum ranking length.
    pub fn top_n(&self) -> usize {
        self.top_n
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

/// Sum relay counts per service identifier.
///
/// Entries come back in order of each identifier's first appearance.
pub fn compute_totals(relays: &[RelaySession]) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, u64)> = Vec::new();

    for relay in relays {
        match index.get(relay.spec_id.as_str()) {
            Some(&i) => totals[i].1 = totals[i].1.saturating_add(relay.relay_num),
            None => {
                index.insert(relay.spec_id.as_str(), totals.len());
                totals.push((relay.spec_id.clone(), relay.relay_num));
            }
        }
    }

    totals
}

/// Rank service identifiers by total relays, highest first.
///
/// Ties keep first-appearance order. At most `top_n` rows are returned.
pub fn rank(relays: &[RelaySession], top_n: usize) -> Vec<RankingEntry> {
    let mut totals = compute_totals(relays);
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
        .into_iter()
        .take(top_n)
        .map(|(spec_id, total)| RankingEntry { spec_id, total })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(spec_id: &str, total: u64) -> RankingEntry {
        RankingEntry {
            spec_id: spec_id.to_string(),
            total,
        }
    }

    #[test]
    fn test_totals_and_ranking() {
        let relays = vec![
            RelaySession::new("ETH1", 5, 1),
            RelaySession::new("ETH1", 3, 1),
            RelaySession::new("COS3", 10, 2),
        ];

        assert_eq!(
            compute_totals(&relays),
            vec![("ETH1".to_string(), 8), ("COS3".to_string(), 10)]
        );
        assert_eq!(rank(&relays, 10), vec![entry("COS3", 10), entry("ETH1", 8)]);
    }

    #[test]
    fn test_ranking_truncates_to_top_n() {
        let relays: Vec<_> = (0..15)
            .map(|i| RelaySession::new(format!("SPEC{i}"), i as u64 + 1, 0))
            .collect();

        let ranking = rank(&relays, DEFAULT_TOP_N);
        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0], entry("SPEC14", 15));
        assert_eq!(ranking[9], entry("SPEC5", 6));
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let relays = vec![
            RelaySession::new("LAV1", 4, 0),
            RelaySession::new("EVMOS", 4, 0),
            RelaySession::new("FTM250", 4, 0),
        ];

        let ranking = rank(&relays, 10);
        let order: Vec<_> = ranking.iter().map(|e| e.spec_id.as_str()).collect();
        assert_eq!(order, vec!["LAV1", "EVMOS", "FTM250"]);
    }

    #[test]
    fn test_empty_batch_leaves_ranking_unchanged() {
        let mut aggregator = Aggregator::default();
        aggregator.extend(vec![RelaySession::new("ETH1", 5, 1)]);
        let before = aggregator.ranking().to_vec();

        aggregator.extend(Vec::new());
        assert_eq!(aggregator.ranking(), before.as_slice());
        assert_eq!(aggregator.relays().len(), 1);
    }

    #[test]
    fn test_totals_saturate() {
        let relays = vec![
            RelaySession::new("ETH1", u64::MAX, 0),
            RelaySession::new("ETH1", 1, 0),
        ];
        assert_eq!(rank(&relays, 10), vec![entry("ETH1", u64::MAX)]);
    }

    fn arb_relays() -> impl Strategy<Value = Vec<RelaySession>> {
        proptest::collection::vec(
            (0usize..20, 0u64..1_000, 0u64..100)
                .prop_map(|(spec, relays, epoch)| RelaySession::new(format!("S{spec}"), relays, epoch)),
            0..200,
        )
    }

    proptest! {
        #[test]
        fn prop_ranking_is_sorted_and_bounded(relays in arb_relays()) {
            let ranking = rank(&relays, DEFAULT_TOP_N);
            prop_assert!(ranking.len() <= DEFAULT_TOP_N);
            prop_assert!(ranking.windows(2).all(|w| w[0].total >= w[1].total));
        }

        #[test]
        fn prop_ranking_is_idempotent(relays in arb_relays()) {
            prop_assert_eq!(rank(&relays, DEFAULT_TOP_N), rank(&relays, DEFAULT_TOP_N));
        }

        #[test]
        fn prop_every_session_counted_once(batches in proptest::collection::vec(arb_relays(), 0..5)) {
            let mut aggregator = Aggregator::new(usize::MAX);
            let mut expected = 0u64;
            let mut count = 0usize;
            for batch in batches {
                expected += batch.iter().map(|r| r.relay_num).sum::<u64>();
                count += batch.len();
                aggregator.extend(batch);
            }
            prop_assert_eq!(aggregator.relays().len(), count);
            prop_assert_eq!(aggregator.ranking().iter().map(|e| e.total).sum::<u64>(), expected);
        }
    }
}
