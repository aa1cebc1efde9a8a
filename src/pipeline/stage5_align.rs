use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::track::align;

pub struct Stage5Align;

impl Stage5Align {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Align {
    fn name(&self) -> &'static str {
        "stage5_align"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let curated = ctx
            .curated
            .as_ref()
            .context("curated divisions not loaded before alignment")?;
        let aligned = align::align_curated_tracks(&ctx.spots, &curated.singles, ctx.n_frames);

        ctx.report.alignment.frames = ctx.n_frames;
        ctx.report.alignment.division_frames_recorded = aligned.division_frames.len();
        ctx.aligned = Some(aligned);
        Ok(())
    }
}
