use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::render::{self, RenderConfig, RenderOutcome};

pub struct Stage3Render;

impl Stage3Render {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Render {
    fn name(&self) -> &'static str {
        "stage3_render"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let image_dir = ctx
            .image_dir
            .as_ref()
            .context("image directory required for curation rendering")?;
        let frame_images = render::list_frame_images(image_dir)?;
        info!(frames = frame_images.len(), "frame_images_listed");

        // Renderer wants positions only; intensity columns may be missing.
        let mut positions: HashMap<u64, Vec<(usize, f64, f64)>> = HashMap::new();
        for spot in &ctx.raw_spots {
            let (Some(track_id), Some(frame), Some(x), Some(y)) =
                (spot.track_id, spot.frame, spot.x, spot.y)
            else {
                continue;
            };
            positions.entry(track_id).or_default().push((frame, x, y));
        }

        let config = RenderConfig {
            margin: ctx.crop_margin,
        };
        let candidates = ctx.candidates.clone();
        for track_id in candidates {
            let Some(track_positions) = positions.get(&track_id) else {
                ctx.warnings.push(format!(
                    "candidate track {} has no positioned spots; skipped",
                    track_id
                ));
                ctx.skipped_tracks.push(track_id);
                continue;
            };
            let outcome = render::render_track(
                track_id,
                track_positions,
                &frame_images,
                &ctx.output.out_dir,
                &config,
            )?;
            match outcome {
                RenderOutcome::Rendered { .. } => ctx.rendered_tracks.push(track_id),
                RenderOutcome::AlreadyRendered => ctx.skipped_tracks.push(track_id),
                RenderOutcome::NearEdge => {
                    ctx.warnings.push(format!(
                        "track {} too close to the image edge for a safe crop; not rendered",
                        track_id
                    ));
                    ctx.skipped_tracks.push(track_id);
                }
            }
        }

        info!(
            rendered = ctx.rendered_tracks.len(),
            skipped = ctx.skipped_tracks.len(),
            "curation_rendering_done"
        );
        ctx.report.render.tracks_rendered = ctx.rendered_tracks.len();
        ctx.report.render.tracks_skipped = ctx.skipped_tracks.len();
        Ok(())
    }
}
