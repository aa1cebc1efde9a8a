use std::path::PathBuf;

use crate::io::curated::CuratedDivisions;
use crate::io::report::RunReport;
use crate::track::{AlignedTable, FeatureTable, RawSpot, SpotRecord};

/// How the per-frame standard deviation columns are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdMode {
    /// One value per frame (default).
    PerFrame,
    /// Legacy collapse: one scalar per channel, the mean of the per-frame values.
    GlobalScalar,
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub cache_path: PathBuf,
    pub clean_path: PathBuf,
    pub mean_std_path: PathBuf,
    pub intensities_path: PathBuf,
    pub report_path: PathBuf,
}

impl OutputPaths {
    pub fn new(out_dir: PathBuf) -> Self {
        let cache_path = out_dir.join("split_tracks.bin");
        let clean_path = out_dir.join("statistics_clean.csv");
        let mean_std_path = out_dir.join("statistics_mean_std.csv");
        let intensities_path = out_dir.join("intensities.csv");
        let report_path = out_dir.join("report.json");
        Self {
            out_dir,
            cache_path,
            clean_path,
            mean_std_path,
            intensities_path,
            report_path,
        }
    }
}

/// Everything a pipeline run needs: configuration resolved from the CLI plus
/// the state stages hand to each other. No module-level state anywhere.
#[derive(Debug)]
pub struct Ctx {
    pub spots_path: PathBuf,
    pub image_dir: Option<PathBuf>,
    pub curated_tracks_path: Option<PathBuf>,
    pub double_divisions_path: Option<PathBuf>,
    pub n_frames: usize,
    pub crop_margin: i64,
    pub n_red: usize,
    pub n_green: usize,
    pub std_mode: StdMode,
    pub write_json: bool,
    pub raw_spots: Vec<RawSpot>,
    pub input_crc: u64,
    pub spots: Vec<SpotRecord>,
    pub dropped_rows: usize,
    pub candidates: Vec<u64>,
    pub cache_reused: bool,
    pub curated: Option<CuratedDivisions>,
    pub rendered_tracks: Vec<u64>,
    pub skipped_tracks: Vec<u64>,
    pub aligned: Option<AlignedTable>,
    pub features: Option<FeatureTable>,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: RunReport,
}

impl Ctx {
    pub fn new(spots_path: PathBuf, out_dir: PathBuf, tool_version: &str) -> Self {
        let output = OutputPaths::new(out_dir);
        let report = RunReport::empty(tool_version);
        Self {
            spots_path,
            image_dir: None,
            curated_tracks_path: None,
            double_divisions_path: None,
            n_frames: 200,
            crop_margin: 10,
            n_red: 2,
            n_green: 2,
            std_mode: StdMode::PerFrame,
            write_json: false,
            raw_spots: Vec::new(),
            input_crc: 0,
            spots: Vec::new(),
            dropped_rows: 0,
            candidates: Vec::new(),
            cache_reused: false,
            curated: None,
            rendered_tracks: Vec::new(),
            skipped_tracks: Vec::new(),
            aligned: None,
            features: None,
            warnings: Vec::new(),
            output,
            report,
        }
    }
}
