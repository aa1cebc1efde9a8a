use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::io::split_cache;
use crate::pipeline::Stage;
use crate::track::detect;

pub struct Stage2Candidates;

impl Stage2Candidates {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Candidates {
    fn name(&self) -> &'static str {
        "stage2_candidates"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let path = ctx.output.cache_path.clone();
        if path.exists() {
            match split_cache::read_cache(&path) {
                Ok(cache) if cache.input_crc == ctx.input_crc => {
                    info!(
                        cache = %path.display(),
                        candidates = cache.tracks.len(),
                        "candidate_cache_reuse"
                    );
                    ctx.candidates = cache.tracks;
                    ctx.cache_reused = true;
                    ctx.report.detection.candidates = ctx.candidates.len();
                    ctx.report.detection.cache_reused = true;
                    return Ok(());
                }
                Ok(_) => {
                    info!(cache = %path.display(), "candidate_cache_stale");
                }
                Err(err) => {
                    warn!(cache = %path.display(), error = %err, "candidate_cache_invalid");
                    ctx.warnings
                        .push(format!("invalid candidate cache rebuilt: {}", err));
                }
            }
        }

        let candidates = detect::find_division_candidates(&ctx.raw_spots);
        info!(candidates = candidates.len(), "division_candidates_found");
        split_cache::write_cache(&path, ctx.input_crc, &candidates)?;

        ctx.candidates = candidates;
        ctx.cache_reused = false;
        ctx.report.detection.candidates = ctx.candidates.len();
        ctx.report.detection.cache_reused = false;
        Ok(())
    }
}
