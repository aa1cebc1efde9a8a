use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::curated::CuratedDivisions;
use crate::io::spots;
use crate::pipeline::Stage;

pub struct Stage4Curated;

impl Stage4Curated {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Curated {
    fn name(&self) -> &'static str {
        "stage4_curated"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let singles_path = ctx
            .curated_tracks_path
            .as_ref()
            .context("curated track list required for alignment")?;
        let curated =
            CuratedDivisions::load(singles_path, ctx.double_divisions_path.as_deref())?;
        info!(
            singles = curated.singles.len(),
            full_cycles = curated.full_cycles.len(),
            "curated_divisions_loaded"
        );

        let (cleaned, dropped) = spots::clean_spots(&ctx.raw_spots);
        info!(rows = cleaned.len(), dropped, "spot_table_cleaned");

        ctx.report.input.rows_dropped = dropped;
        ctx.report.input.tracks_curated = curated.singles.len();
        ctx.report.input.tracks_full_cycle = curated.full_cycles.len();
        ctx.spots = cleaned;
        ctx.dropped_rows = dropped;
        ctx.curated = Some(curated);
        Ok(())
    }
}
