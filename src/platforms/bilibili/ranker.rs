use std::cmp::Ordering;
use std::collections::HashSet;

use bilicopy_core::models::settings::RankingPolicy;

use crate::models::media::{RankedStreamList, StreamCandidate};

/// Keeps the first candidate per served tier (and per URL), then orders the
/// survivors. Sizes are compared only when every survivor has one; otherwise
/// the quality code decides. Candidates without a tier sort last. The sort is
/// stable, so ties keep discovery order.
pub fn rank_candidates(candidates: Vec<StreamCandidate>, policy: RankingPolicy) -> RankedStreamList {
    let mut seen_qn = HashSet::new();
    let mut seen_url = HashSet::new();
    let mut streams: Vec<StreamCandidate> = candidates
        .into_iter()
        .filter(|c| {
            if !seen_url.insert(c.url.clone()) {
                return false;
            }
            match c.qn() {
                Some(qn) => seen_qn.insert(qn),
                None => true,
            }
        })
        .collect();

    let by_size = streams.iter().all(|c| c.size_bytes.is_some());

    streams.sort_by(|a, b| {
        let ord = if by_size {
            a.size_bytes.cmp(&b.size_bytes)
        } else {
            match (a.qn(), b.qn()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        };
        match policy {
            RankingPolicy::Lowest => ord,
            RankingPolicy::Highest => ord.reverse(),
        }
    });

    RankedStreamList { streams }
}
