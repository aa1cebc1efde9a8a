use std::collections::BTreeMap;

use crate::track::RawSpot;

/// Division candidates: tracks whose per-frame spot count reaches >= 2 at some
/// frame and still has that exact count at the last observed frame. A track
/// that reverts to a single spot after the jump is a spurious detector merge
/// and is not flagged. Rows without a track id or frame are ignored.
pub fn find_division_candidates(spots: &[RawSpot]) -> Vec<u64> {
    let mut counts_by_track: BTreeMap<u64, BTreeMap<usize, usize>> = BTreeMap::new();
    for spot in spots {
        let (Some(track_id), Some(frame)) = (spot.track_id, spot.frame) else {
            continue;
        };
        *counts_by_track
            .entry(track_id)
            .or_default()
            .entry(frame)
            .or_insert(0) += 1;
    }

    let mut candidates = Vec::new();
    for (track_id, counts) in &counts_by_track {
        let Some(split_count) = counts.values().find(|&&n| n >= 2).copied() else {
            continue;
        };
        let last_count = counts.values().next_back().copied().unwrap_or(0);
        if last_count == split_count {
            candidates.push(*track_id);
        }
    }
    candidates
}
