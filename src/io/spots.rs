//! Spot-table CSV input.
//!
//! The table is the tracker's per-spot export: one row per detected cell per
//! frame, with the literal string `None` (or an empty cell) as the missing
//! value sentinel. Extra columns are ignored; missing required columns are a
//! hard error.

use std::path::Path;

use anyhow::{Context, Result, bail};
use crc::{CRC_64_ECMA_182, Crc};
use tracing::info;

use crate::track::{Channel, RawSpot, SpotRecord};

pub const ID_COLUMN: &str = "ID";
pub const TRACK_COLUMN: &str = "TRACK_ID";
pub const FRAME_COLUMN: &str = "FRAME";
pub const X_COLUMN: &str = "POSITION_X";
pub const Y_COLUMN: &str = "POSITION_Y";

struct ColumnIndices {
    id: usize,
    track_id: usize,
    frame: usize,
    x: usize,
    y: usize,
    cmdn: [usize; 4],
}

/// Read the raw spot table. Returns the rows plus the CRC-64 of the file
/// bytes, which keys the division-candidate cache.
pub fn read_raw_spots(path: &Path) -> Result<(Vec<RawSpot>, u64)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let crc = Crc::<u64>::new(&CRC_64_ECMA_182);
    let input_crc = crc.checksum(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes.as_slice());

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .clone();
    let columns = resolve_columns(&headers, path)?;

    let mut spots = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line_no = idx + 2;
        let record =
            record.with_context(|| format!("{} line {}", path.display(), line_no))?;
        let spot = parse_row(&record, &columns)
            .with_context(|| format!("{} line {}", path.display(), line_no))?;
        spots.push(spot);
    }

    info!(rows = spots.len(), spots = %path.display(), "spot_table_loaded");
    Ok((spots, input_crc))
}

/// Row-wise cleaning: keep only fully-populated records. Returns the cleaned
/// rows and the number of dropped ones.
pub fn clean_spots(raw: &[RawSpot]) -> (Vec<SpotRecord>, usize) {
    let spots: Vec<SpotRecord> = raw.iter().filter_map(RawSpot::cleaned).collect();
    let dropped = raw.len() - spots.len();
    (spots, dropped)
}

fn resolve_columns(headers: &csv::StringRecord, path: &Path) -> Result<ColumnIndices> {
    let find = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| {
                anyhow::anyhow!("{} is missing required column {}", path.display(), name)
            })
    };
    Ok(ColumnIndices {
        id: find(ID_COLUMN)?,
        track_id: find(TRACK_COLUMN)?,
        frame: find(FRAME_COLUMN)?,
        x: find(X_COLUMN)?,
        y: find(Y_COLUMN)?,
        cmdn: [
            find(Channel::Gfp.column())?,
            find(Channel::Cy3.column())?,
            find(Channel::Dapi.column())?,
            find(Channel::Bf.column())?,
        ],
    })
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnIndices) -> Result<RawSpot> {
    Ok(RawSpot {
        id: parse_index(opt_field(record, columns.id), ID_COLUMN)?,
        track_id: parse_index(opt_field(record, columns.track_id), TRACK_COLUMN)?,
        frame: parse_index(opt_field(record, columns.frame), FRAME_COLUMN)?
            .map(|v| v as usize),
        x: parse_value(opt_field(record, columns.x), X_COLUMN)?,
        y: parse_value(opt_field(record, columns.y), Y_COLUMN)?,
        cmdn: [
            parse_value(opt_field(record, columns.cmdn[0]), Channel::Gfp.column())?,
            parse_value(opt_field(record, columns.cmdn[1]), Channel::Cy3.column())?,
            parse_value(opt_field(record, columns.cmdn[2]), Channel::Dapi.column())?,
            parse_value(opt_field(record, columns.cmdn[3]), Channel::Bf.column())?,
        ],
    })
}

fn opt_field<'a>(record: &'a csv::StringRecord, idx: usize) -> Option<&'a str> {
    let value = record.get(idx)?;
    if value.is_empty() || value == "None" {
        None
    } else {
        Some(value)
    }
}

fn parse_value(field: Option<&str>, column: &str) -> Result<Option<f64>> {
    let Some(field) = field else {
        return Ok(None);
    };
    let value: f64 = field
        .parse()
        .with_context(|| format!("invalid {} value '{}'", column, field))?;
    Ok(Some(value))
}

/// Integer-valued field; float spellings of whole numbers are accepted because
/// the tracker export writes some id columns that way.
fn parse_index(field: Option<&str>, column: &str) -> Result<Option<u64>> {
    let Some(field) = field else {
        return Ok(None);
    };
    if let Ok(value) = field.parse::<u64>() {
        return Ok(Some(value));
    }
    let value: f64 = field
        .parse()
        .with_context(|| format!("invalid {} value '{}'", column, field))?;
    if value < 0.0 || value.fract() != 0.0 {
        bail!("invalid {} value '{}': not a non-negative integer", column, field);
    }
    Ok(Some(value as u64))
}
