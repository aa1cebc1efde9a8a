use std::collections::HashSet;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::ctx::StdMode;
use crate::math::stats;
use crate::track::{Channel, SpotRecord};

/// Per-frame channel statistics over curated-track spots, indexed
/// `[channel][frame]`. None where a frame has no curated spots (std
/// additionally needs at least 2).
#[derive(Debug)]
pub struct FrameChannelStats {
    pub median: Vec<Vec<Option<f64>>>,
    pub std: Vec<Vec<Option<f64>>>,
}

impl FrameChannelStats {
    pub fn median_at(&self, ch: Channel, frame: usize) -> Option<f64> {
        self.median[ch.index()].get(frame).copied().flatten()
    }

    pub fn std_at(&self, ch: Channel, frame: usize) -> Option<f64> {
        self.std[ch.index()].get(frame).copied().flatten()
    }
}

/// One row of the normalized + classed output table.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub id: u64,
    pub track_id: u64,
    pub x: i64,
    pub y: i64,
    pub frame: usize,
    pub averages: [Option<f64>; 4],
    pub stds: [Option<f64>; 4],
    pub gfp_nq: Option<f64>,
    pub cy3_nq: Option<f64>,
    pub class: Option<u32>,
}

#[derive(Debug)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub n_red: usize,
    pub n_green: usize,
}

impl FeatureTable {
    pub fn class_column(&self) -> String {
        format!("nq_cls{}x{}", self.n_red, self.n_green)
    }
}

/// Median and standard deviation per channel per frame, computed from spots of
/// curated tracks only. `StdMode::GlobalScalar` reproduces the legacy collapse:
/// every frame's std is replaced by the mean of the defined per-frame values,
/// one scalar per channel.
pub fn frame_channel_stats(
    spots: &[SpotRecord],
    curated: &HashSet<u64>,
    n_frames: usize,
    std_mode: StdMode,
) -> FrameChannelStats {
    let mut values: Vec<Vec<Vec<f64>>> = vec![vec![Vec::new(); n_frames]; Channel::ALL.len()];
    for spot in spots {
        if spot.frame >= n_frames || !curated.contains(&spot.track_id) {
            continue;
        }
        for ch in Channel::ALL {
            values[ch.index()][spot.frame].push(spot.channel(ch));
        }
    }

    let mut median = vec![vec![None; n_frames]; Channel::ALL.len()];
    let mut std = vec![vec![None; n_frames]; Channel::ALL.len()];
    for ch in Channel::ALL {
        info!(channel = ch.label(), "frame_stats_channel");
        for frame in 0..n_frames {
            let frame_values = &mut values[ch.index()][frame];
            if frame_values.is_empty() {
                continue;
            }
            debug!(channel = ch.label(), frame, n = frame_values.len(), "frame_stats");
            if frame_values.len() >= 2 {
                std[ch.index()][frame] = Some(stats::sample_std(frame_values));
            }
            median[ch.index()][frame] = Some(stats::median(frame_values));
        }
        if std_mode == StdMode::GlobalScalar {
            let defined: Vec<f64> = std[ch.index()].iter().flatten().copied().collect();
            let scalar = if defined.is_empty() {
                None
            } else {
                Some(stats::mean(&defined))
            };
            std[ch.index()] = vec![scalar; n_frames];
        }
    }

    FrameChannelStats { median, std }
}

/// Broadcast frame statistics onto every spot, derive the background-corrected
/// reporter intensities (`*_nq` = raw - frame median), and assign composite
/// quantile classes. Positions are truncated to integers; the raw per-channel
/// columns do not survive into the output rows.
pub fn build_feature_table(
    spots: &[SpotRecord],
    frame_stats: &FrameChannelStats,
    n_red: usize,
    n_green: usize,
    warnings: &mut Vec<String>,
) -> Result<FeatureTable> {
    let mut rows: Vec<FeatureRow> = spots
        .iter()
        .map(|spot| {
            let mut averages = [None; 4];
            let mut stds = [None; 4];
            for ch in Channel::ALL {
                averages[ch.index()] = frame_stats.median_at(ch, spot.frame);
                stds[ch.index()] = frame_stats.std_at(ch, spot.frame);
            }
            let gfp_nq = averages[Channel::Gfp.index()].map(|a| spot.channel(Channel::Gfp) - a);
            let cy3_nq = averages[Channel::Cy3.index()].map(|a| spot.channel(Channel::Cy3) - a);
            FeatureRow {
                id: spot.id,
                track_id: spot.track_id,
                x: spot.x as i64,
                y: spot.y as i64,
                frame: spot.frame,
                averages,
                stds,
                gfp_nq,
                cy3_nq,
                class: None,
            }
        })
        .collect();

    assign_classes(&mut rows, n_red, n_green, warnings)?;

    Ok(FeatureTable {
        rows,
        n_red,
        n_green,
    })
}

/// Two-level equal-frequency classing: bin the red reporter into `n_red`
/// quantile bins, split each red bin independently into `n_green` green bins,
/// and combine as `red + green * n_red`. A spot missing either input, or
/// landing in a red bin too degenerate to split, stays unclassed.
fn assign_classes(
    rows: &mut [FeatureRow],
    n_red: usize,
    n_green: usize,
    warnings: &mut Vec<String>,
) -> Result<()> {
    let mut reds: Vec<f64> = rows.iter().filter_map(|r| r.cy3_nq).collect();
    let Some(red_edges) = stats::quantile_edges(&mut reds, n_red) else {
        bail!(
            "cannot split {} red intensities into {} equal-frequency bins",
            reds.len(),
            n_red
        );
    };

    let red_bins: Vec<Option<usize>> = rows
        .iter()
        .map(|r| r.cy3_nq.and_then(|v| stats::bin_index(v, &red_edges)))
        .collect();

    for red_bin in 0..n_red {
        let mut greens: Vec<f64> = rows
            .iter()
            .zip(&red_bins)
            .filter(|(_, b)| **b == Some(red_bin))
            .filter_map(|(r, _)| r.gfp_nq)
            .collect();
        let n_in_bin = greens.len();
        let Some(green_edges) = stats::quantile_edges(&mut greens, n_green) else {
            warnings.push(format!(
                "red bin {}: {} green intensities could not be split into {} bins; spots left unclassed",
                red_bin, n_in_bin, n_green
            ));
            continue;
        };
        for (row, bin) in rows.iter_mut().zip(&red_bins) {
            if *bin != Some(red_bin) {
                continue;
            }
            row.class = row
                .gfp_nq
                .and_then(|v| stats::bin_index(v, &green_edges))
                .map(|green| (red_bin + green * n_red) as u32);
        }
    }

    info!(
        classed = rows.iter().filter(|r| r.class.is_some()).count(),
        total = rows.len(),
        "classes_assigned"
    );
    Ok(())
}
