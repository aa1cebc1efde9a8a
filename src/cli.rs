use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "trackcurate",
    version,
    about = "Curation and division-aligned feature tables for cell-tracking timelapses"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Flag division-candidate tracks in the spot table.
    Detect(DetectArgs),

    /// Render per-frame curation crops for every division candidate.
    Curate(CurateArgs),

    /// Build the division-aligned, normalized and classed feature tables.
    Align(AlignArgs),
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    #[arg(long, help = "Tracking CSV ('spots in tracks' export)")]
    pub spots: PathBuf,

    #[arg(long, help = "Curation folder (holds the candidate cache)")]
    pub out: PathBuf,

    #[arg(long, help = "Override path of the candidate cache file")]
    pub cache: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CurateArgs {
    #[arg(long, help = "Tracking CSV ('spots in tracks' export)")]
    pub spots: PathBuf,

    #[arg(long, help = "Folder of per-frame microscopy images (nothing else in it)")]
    pub images: PathBuf,

    #[arg(long, help = "Curation folder for rendered track crops")]
    pub out: PathBuf,

    #[arg(long, help = "Override path of the candidate cache file")]
    pub cache: Option<PathBuf>,

    #[arg(long, default_value_t = 10, help = "Crop margin around the track bounding box (px)")]
    pub margin: i64,
}

#[derive(Debug, Args)]
pub struct AlignArgs {
    #[arg(long, help = "Tracking CSV ('spots in tracks' export)")]
    pub spots: PathBuf,

    #[arg(long, help = "Single-division track list (one id per line, no header)")]
    pub curated_tracks: PathBuf,

    #[arg(long, help = "Output folder")]
    pub out: PathBuf,

    #[arg(long, help = "Full-cycle track list (track,start,stop CSV)")]
    pub double_divisions: Option<PathBuf>,

    #[arg(long, default_value_t = 200, help = "Number of frames to align")]
    pub frames: usize,

    #[arg(long, default_value_t = 2, help = "Red (Cy3) quantile bins")]
    pub n_red: usize,

    #[arg(long, default_value_t = 2, help = "Green (GFP) quantile bins per red bin")]
    pub n_green: usize,

    #[arg(
        long,
        default_value_t = false,
        help = "Collapse per-frame standard deviations to one scalar per channel"
    )]
    pub collapse_std: bool,

    #[arg(long, default_value_t = false, help = "Also write report.json")]
    pub json: bool,

    #[arg(long, help = "Override path of the cleaned table")]
    pub statistics_clean: Option<PathBuf>,

    #[arg(long, help = "Override path of the normalized/classed table")]
    pub statistics_mean_std: Option<PathBuf>,

    #[arg(long, help = "Override path of the division-aligned table")]
    pub intensities: Option<PathBuf>,
}
