//! Machine-readable run report (`--json`).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InputSummary {
    pub rows_total: usize,
    pub rows_dropped: usize,
    pub tracks_curated: usize,
    pub tracks_full_cycle: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionSummary {
    pub candidates: usize,
    pub cache_reused: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderSummary {
    pub tracks_rendered: usize,
    pub tracks_skipped: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlignmentSummary {
    pub frames: usize,
    pub division_frames_recorded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub tool: ToolMeta,
    pub input: InputSummary,
    pub detection: DetectionSummary,
    pub render: RenderSummary,
    pub alignment: AlignmentSummary,
    pub outputs: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn empty(version: &str) -> Self {
        Self {
            tool: ToolMeta {
                name: "trackcurate".to_string(),
                version: version.to_string(),
            },
            input: InputSummary::default(),
            detection: DetectionSummary::default(),
            render: RenderSummary::default(),
            alignment: AlignmentSummary::default(),
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}
