use std::collections::HashSet;

use trackcurate::ctx::StdMode;
use trackcurate::track::SpotRecord;
use trackcurate::track::features::{build_feature_table, frame_channel_stats};

fn spot(id: u64, track_id: u64, frame: usize, gfp: f64, cy3: f64) -> SpotRecord {
    SpotRecord {
        id,
        track_id,
        frame,
        x: 10.0,
        y: 20.0,
        cmdn: [gfp, cy3, 100.0, 200.0],
    }
}

fn curated() -> HashSet<u64> {
    [1u64].into_iter().collect()
}

#[test]
fn normalization_subtracts_frame_median() {
    // Curated GFP values at frame 0: 6, 8, 10 -> median 8.
    let spots = vec![
        spot(1, 1, 0, 6.0, 1.0),
        spot(2, 1, 0, 8.0, 2.0),
        spot(3, 1, 0, 10.0, 3.0),
    ];
    let stats = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    let mut warnings = Vec::new();
    let table = build_feature_table(&spots, &stats, 2, 1, &mut warnings).unwrap();

    assert_eq!(table.rows[2].gfp_nq, Some(2.0));
    // Round trip: raw value recoverable as nq + frame median.
    for (row, s) in table.rows.iter().zip(&spots) {
        let nq = row.gfp_nq.unwrap();
        let median = stats.median_at(trackcurate::track::Channel::Gfp, 0).unwrap();
        assert_eq!(nq + median, s.cmdn[0]);
    }
}

#[test]
fn stats_come_from_curated_tracks_only_but_apply_to_all() {
    let spots = vec![
        spot(1, 1, 0, 6.0, 1.0),
        spot(2, 1, 0, 8.0, 2.0),
        spot(3, 1, 0, 10.0, 3.0),
        // Uncurated; must not move the median but still gets normalized.
        spot(4, 2, 0, 9.0, 4.0),
    ];
    let stats = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    let mut warnings = Vec::new();
    let table = build_feature_table(&spots, &stats, 2, 1, &mut warnings).unwrap();

    assert_eq!(table.rows[3].averages[0], Some(8.0));
    assert_eq!(table.rows[3].gfp_nq, Some(1.0));
}

#[test]
fn frames_without_stats_leave_rows_unnormalized() {
    let spots = vec![
        spot(1, 1, 0, 6.0, 1.0),
        spot(2, 1, 0, 8.0, 2.0),
        spot(3, 1, 0, 10.0, 3.0),
        // Past the aligned frame range: no statistics exist for frame 7.
        spot(4, 1, 7, 9.0, 4.0),
    ];
    let stats = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    let mut warnings = Vec::new();
    let table = build_feature_table(&spots, &stats, 2, 1, &mut warnings).unwrap();

    let beyond = &table.rows[3];
    assert_eq!(beyond.averages[0], None);
    assert_eq!(beyond.gfp_nq, None);
    assert_eq!(beyond.class, None);
}

#[test]
fn per_frame_std_is_default_collapse_is_opt_in() {
    use trackcurate::track::Channel;
    let spots = vec![
        // Frame 0: GFP 6, 8, 10 -> sample std 2.0.
        spot(1, 1, 0, 6.0, 1.0),
        spot(2, 1, 0, 8.0, 2.0),
        spot(3, 1, 0, 10.0, 3.0),
        // Frame 1: GFP 1, 5 -> sample std sqrt(8).
        spot(4, 1, 1, 1.0, 4.0),
        spot(5, 1, 1, 5.0, 5.0),
        // Frame 2: single spot -> no std.
        spot(6, 1, 2, 7.0, 6.0),
    ];

    let per_frame = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    assert_eq!(per_frame.std_at(Channel::Gfp, 0), Some(2.0));
    let f1 = per_frame.std_at(Channel::Gfp, 1).unwrap();
    assert!((f1 - 8.0f64.sqrt()).abs() < 1e-12);
    assert_eq!(per_frame.std_at(Channel::Gfp, 2), None);

    let collapsed = frame_channel_stats(&spots, &curated(), 5, StdMode::GlobalScalar);
    let scalar = (2.0 + 8.0f64.sqrt()) / 2.0;
    for frame in 0..5 {
        let got = collapsed.std_at(Channel::Gfp, frame).unwrap();
        assert!((got - scalar).abs() < 1e-12);
    }
}

#[test]
fn composite_classes_cover_the_grid() {
    let gfp = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0];
    let cy3 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let spots: Vec<SpotRecord> = (0..8)
        .map(|i| spot(i as u64, 1, 0, gfp[i], cy3[i]))
        .collect();

    let stats = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    let mut warnings = Vec::new();
    let table = build_feature_table(&spots, &stats, 2, 2, &mut warnings).unwrap();

    let classes: Vec<u32> = table.rows.iter().map(|r| r.class.unwrap()).collect();
    assert_eq!(classes, vec![0, 0, 2, 2, 1, 1, 3, 3]);
    assert!(warnings.is_empty());
    for class in classes {
        assert!(class < 4);
    }
}

#[test]
fn degenerate_green_bin_leaves_spots_unclassed() {
    // Red bin 0 carries four identical GFP values: no green split possible.
    let gfp = [45.0, 45.0, 45.0, 45.0, 50.0, 60.0, 70.0, 80.0];
    let cy3 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let spots: Vec<SpotRecord> = (0..8)
        .map(|i| spot(i as u64, 1, 0, gfp[i], cy3[i]))
        .collect();

    let stats = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    let mut warnings = Vec::new();
    let table = build_feature_table(&spots, &stats, 2, 2, &mut warnings).unwrap();

    for row in &table.rows[..4] {
        assert_eq!(row.class, None);
    }
    for row in &table.rows[4..] {
        assert!(row.class.is_some());
    }
    assert_eq!(warnings.len(), 1);
}

#[test]
fn degenerate_red_binning_is_an_error() {
    let spots: Vec<SpotRecord> = (0..4).map(|i| spot(i as u64, 1, 0, 10.0, 5.0)).collect();
    let stats = frame_channel_stats(&spots, &curated(), 5, StdMode::PerFrame);
    let mut warnings = Vec::new();
    let err = build_feature_table(&spots, &stats, 2, 2, &mut warnings).unwrap_err();
    assert!(err.to_string().contains("equal-frequency"));
}
