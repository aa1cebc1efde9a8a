//! Manually curated division records.
//!
//! Curation produces two files: a one-column headerless CSV of track ids with
//! exactly one confirmed division (the training set), and an optional
//! `track,start,stop` CSV of tracks with two confirmed divisions spanning a
//! full cell cycle (the validation set).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Two confirmed division frames bracketing one full cell cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullCycle {
    pub start: usize,
    pub stop: usize,
}

/// Explicit curated-division mapping. Invariant: a track id appears in
/// `singles` iff exactly one division was confirmed for it, and in
/// `full_cycles` iff exactly two were (start < stop).
#[derive(Debug, Default)]
pub struct CuratedDivisions {
    /// Ascending single-division track ids.
    pub singles: Vec<u64>,
    pub full_cycles: BTreeMap<u64, FullCycle>,
}

impl CuratedDivisions {
    pub fn load(singles_path: &Path, full_cycles_path: Option<&Path>) -> Result<Self> {
        let singles = read_track_list(singles_path)?;
        let full_cycles = match full_cycles_path {
            Some(path) => read_full_cycles(path)?,
            None => BTreeMap::new(),
        };
        Ok(Self {
            singles,
            full_cycles,
        })
    }
}

/// One integer track id per line, no header. Returned ascending, deduplicated.
pub fn read_track_list(path: &Path) -> Result<Vec<u64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read curated track list {}", path.display()))?;

    let mut tracks = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim().trim_end_matches(',');
        if trimmed.is_empty() {
            continue;
        }
        let track_id: u64 = trimmed.parse().with_context(|| {
            format!("{}:{} invalid track id '{}'", path.display(), line_no, trimmed)
        })?;
        tracks.push(track_id);
    }
    if tracks.is_empty() {
        bail!("{} contains no track ids", path.display());
    }
    tracks.sort_unstable();
    tracks.dedup();
    Ok(tracks)
}

fn read_full_cycles(path: &Path) -> Result<BTreeMap<u64, FullCycle>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read full-cycle list {}", path.display()))?;

    let mut cycles = BTreeMap::new();
    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if idx == 0 && trimmed.starts_with("track") {
            continue;
        }
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            bail!(
                "{}:{} expected 'track,start,stop', got '{}'",
                path.display(),
                line_no,
                trimmed
            );
        }
        let track_id: u64 = parts[0].parse().with_context(|| {
            format!("{}:{} invalid track id '{}'", path.display(), line_no, parts[0])
        })?;
        let start: usize = parts[1].parse().with_context(|| {
            format!("{}:{} invalid start frame '{}'", path.display(), line_no, parts[1])
        })?;
        let stop: usize = parts[2].parse().with_context(|| {
            format!("{}:{} invalid stop frame '{}'", path.display(), line_no, parts[2])
        })?;
        if start >= stop {
            bail!(
                "{}:{} full cycle must have start < stop (got {} >= {})",
                path.display(),
                line_no,
                start,
                stop
            );
        }
        if cycles.insert(track_id, FullCycle { start, stop }).is_some() {
            bail!("{}:{} duplicate track id {}", path.display(), line_no, track_id);
        }
    }
    Ok(cycles)
}
