use std::collections::HashMap;

use tracing::{debug, info};

use crate::math::stats;
use crate::track::{Channel, SpotRecord};

/// Per-track values sampled at one frame. `time` is rebased after the frame
/// sweep so that the recorded division frame maps to 0. Median and mean carry
/// the same per-spot summary value: at most one usable record exists per frame
/// pre-division, so there is nothing to aggregate at the spot level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub time: i64,
    pub x: i64,
    pub y: i64,
    pub green_median: f64,
    pub red_median: f64,
    pub green_mean: f64,
    pub red_mean: f64,
}

/// One output row per original frame index.
#[derive(Debug, Clone)]
pub struct AlignedRow {
    pub frame: usize,
    pub green_frame_average: Option<f64>,
    pub red_frame_average: Option<f64>,
    /// Parallel to `AlignedTable::tracks`; None where the track has no record.
    pub samples: Vec<Option<TrackSample>>,
}

#[derive(Debug)]
pub struct AlignedTable {
    /// Curated track ids, ascending; fixes the column order.
    pub tracks: Vec<u64>,
    /// First frame with >= 2 records, for tracks where one was observed.
    pub division_frames: HashMap<u64, usize>,
    pub rows: Vec<AlignedRow>,
}

/// Build the division-aligned wide table over frames `[0, n_frames)`.
///
/// `spots` is the full cleaned table: population medians per frame use every
/// spot, while per-track columns only sample records of `tracks`. Frames are
/// swept in ascending order, which makes "first frame with two records"
/// well-defined; the post-pass then subtracts each track's recorded division
/// frame (0 when never observed) from its time column.
pub fn align_curated_tracks(
    spots: &[SpotRecord],
    tracks: &[u64],
    n_frames: usize,
) -> AlignedTable {
    let track_columns: HashMap<u64, usize> = tracks
        .iter()
        .enumerate()
        .map(|(col, &id)| (id, col))
        .collect();

    // Bucket by frame, preserving input row order within each frame.
    let mut all_by_frame: Vec<Vec<&SpotRecord>> = vec![Vec::new(); n_frames];
    let mut curated_by_frame: Vec<Vec<&SpotRecord>> = vec![Vec::new(); n_frames];
    for spot in spots {
        if spot.frame >= n_frames {
            continue;
        }
        all_by_frame[spot.frame].push(spot);
        if track_columns.contains_key(&spot.track_id) {
            curated_by_frame[spot.frame].push(spot);
        }
    }

    let mut division_frames: HashMap<u64, usize> = HashMap::new();
    let mut rows = Vec::with_capacity(n_frames);

    for frame in 0..n_frames {
        if frame % 50 == 0 {
            info!(frame, n_frames, "align_frame_sweep");
        }
        debug!(frame, spots = all_by_frame[frame].len(), "align_frame");

        let green_frame_average = frame_median(&all_by_frame[frame], Channel::Gfp);
        let red_frame_average = frame_median(&all_by_frame[frame], Channel::Cy3);

        let mut per_track: Vec<Vec<&SpotRecord>> = vec![Vec::new(); tracks.len()];
        for spot in curated_by_frame[frame].iter().copied() {
            if let Some(&col) = track_columns.get(&spot.track_id) {
                per_track[col].push(spot);
            }
        }

        let mut samples = Vec::with_capacity(tracks.len());
        for (col, track_id) in tracks.iter().enumerate() {
            let records = &per_track[col];
            if records.len() > 1 && !division_frames.contains_key(track_id) {
                division_frames.insert(*track_id, frame);
            }
            let sample = records.first().map(|spot| TrackSample {
                time: frame as i64,
                x: spot.x as i64,
                y: spot.y as i64,
                green_median: spot.channel(Channel::Gfp),
                red_median: spot.channel(Channel::Cy3),
                green_mean: spot.channel(Channel::Gfp),
                red_mean: spot.channel(Channel::Cy3),
            });
            samples.push(sample);
        }

        rows.push(AlignedRow {
            frame,
            green_frame_average,
            red_frame_average,
            samples,
        });
    }

    // Rebase every track's time axis so division happens at time 0.
    for (col, track_id) in tracks.iter().enumerate() {
        let division = division_frames.get(track_id).copied().unwrap_or(0) as i64;
        for row in &mut rows {
            if let Some(sample) = &mut row.samples[col] {
                sample.time -= division;
            }
        }
    }

    info!(
        tracks = tracks.len(),
        divisions = division_frames.len(),
        "alignment_done"
    );

    AlignedTable {
        tracks: tracks.to_vec(),
        division_frames,
        rows,
    }
}

fn frame_median(spots: &[&SpotRecord], ch: Channel) -> Option<f64> {
    if spots.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = spots.iter().map(|s| s.channel(ch)).collect();
    Some(stats::median(&mut values))
}
