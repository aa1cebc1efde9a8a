//! CSV output tables for the align pipeline.

use std::path::Path;

use anyhow::{Context, Result};

use crate::track::{AlignedTable, Channel, FeatureTable, SpotRecord};

/// Cleaned spot table: original column order, full precision.
pub fn write_clean(path: &Path, spots: &[SpotRecord]) -> Result<()> {
    let mut writer = open_writer(path)?;

    let mut header = vec![
        "ID".to_string(),
        "TRACK_ID".to_string(),
        "POSITION_X".to_string(),
        "POSITION_Y".to_string(),
        "FRAME".to_string(),
    ];
    header.extend(Channel::ALL.iter().map(|ch| ch.column().to_string()));
    writer.write_record(&header)?;

    for spot in spots {
        let mut record = vec![
            spot.id.to_string(),
            spot.track_id.to_string(),
            spot.x.to_string(),
            spot.y.to_string(),
            spot.frame.to_string(),
        ];
        record.extend(Channel::ALL.iter().map(|ch| spot.channel(*ch).to_string()));
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Normalized + classed table, floats at 3 decimals, missing values as empty
/// cells.
pub fn write_mean_std(path: &Path, table: &FeatureTable) -> Result<()> {
    let mut writer = open_writer(path)?;

    let mut header = vec![
        "ID".to_string(),
        "TRACK_ID".to_string(),
        "POSITION_X".to_string(),
        "POSITION_Y".to_string(),
        "FRAME".to_string(),
    ];
    for ch in Channel::ALL {
        header.push(format!("{}_average", ch.label()));
        header.push(format!("{}_std", ch.label()));
    }
    header.push("GFP_nq".to_string());
    header.push("Cy3_nq".to_string());
    header.push(table.class_column());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.id.to_string(),
            row.track_id.to_string(),
            row.x.to_string(),
            row.y.to_string(),
            row.frame.to_string(),
        ];
        for ch in Channel::ALL {
            record.push(fixed3(row.averages[ch.index()]));
            record.push(fixed3(row.stds[ch.index()]));
        }
        record.push(fixed3(row.gfp_nq));
        record.push(fixed3(row.cy3_nq));
        record.push(row.class.map(|c| c.to_string()).unwrap_or_default());
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Division-aligned wide table. Hierarchical columns are written as three
/// header rows: track id, field, aggregate.
pub fn write_aligned(path: &Path, aligned: &AlignedTable) -> Result<()> {
    let mut writer = open_writer(path)?;

    let global = ["frame_num", "gfp_frame_average", "cy3_frame_average"];
    let track_fields = ["time", "x", "y", "green", "red", "green", "red"];
    let track_aggregates = ["", "", "", "median", "median", "mean", "mean"];

    let mut level0: Vec<String> = global.iter().map(|s| s.to_string()).collect();
    let mut level1: Vec<String> = vec![String::new(); global.len()];
    let mut level2: Vec<String> = vec![String::new(); global.len()];
    for track_id in &aligned.tracks {
        for (field, aggregate) in track_fields.iter().zip(track_aggregates) {
            level0.push(track_id.to_string());
            level1.push(field.to_string());
            level2.push(aggregate.to_string());
        }
    }
    writer.write_record(&level0)?;
    writer.write_record(&level1)?;
    writer.write_record(&level2)?;

    for row in &aligned.rows {
        let mut record = vec![
            row.frame.to_string(),
            optional(row.green_frame_average),
            optional(row.red_frame_average),
        ];
        for sample in &row.samples {
            match sample {
                Some(s) => {
                    record.push(s.time.to_string());
                    record.push(s.x.to_string());
                    record.push(s.y.to_string());
                    record.push(s.green_median.to_string());
                    record.push(s.red_median.to_string());
                    record.push(s.green_mean.to_string());
                    record.push(s.red_mean.to_string());
                }
                None => record.extend(std::iter::repeat_n(String::new(), 7)),
            }
        }
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    Ok(csv::Writer::from_writer(file))
}

fn fixed3(value: Option<f64>) -> String {
    value.map(|v| format!("{:.3}", v)).unwrap_or_default()
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
