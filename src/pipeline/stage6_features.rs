use std::collections::HashSet;

use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::track::features;

pub struct Stage6Features;

impl Stage6Features {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Features {
    fn name(&self) -> &'static str {
        "stage6_features"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let curated = ctx
            .curated
            .as_ref()
            .context("curated divisions not loaded before feature building")?;
        let curated_set: HashSet<u64> = curated.singles.iter().copied().collect();

        let frame_stats =
            features::frame_channel_stats(&ctx.spots, &curated_set, ctx.n_frames, ctx.std_mode);
        let table = features::build_feature_table(
            &ctx.spots,
            &frame_stats,
            ctx.n_red,
            ctx.n_green,
            &mut ctx.warnings,
        )?;
        info!(rows = table.rows.len(), "feature_table_built");

        ctx.features = Some(table);
        Ok(())
    }
}
