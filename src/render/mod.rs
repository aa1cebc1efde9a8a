//! Curation crop rendering.
//!
//! For each division-candidate track, every frame the track appears in is
//! cropped to the track's bounding box (plus margin), contrast-stretched to
//! the [p1, p99] percentile range, overlaid with red markers at the spot
//! positions, and saved as one PNG per frame under a directory named after the
//! track id. An existing track directory means the track was already rendered
//! (or inspected) and is left untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::{ImageBuffer, Luma, Rgb, RgbImage};
use tracing::{debug, info};

use crate::math::stats;

pub const MARKER_RADIUS: i64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Pixels added around the track's bounding box on each side.
    pub margin: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { margin: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered { frames: usize },
    /// Track directory already exists; nothing written.
    AlreadyRendered,
    /// Bounding box too close to the image origin for a safe crop.
    NearEdge,
}

/// Frame images of the timelapse: every regular file in the directory, sorted
/// by filename. Frame index = position in this listing.
pub fn list_frame_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut names: Vec<String> = Vec::new();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list image directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    if names.is_empty() {
        bail!("image directory {} contains no files", dir.display());
    }
    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

/// Render one candidate track. `positions` are (frame, x, y) triples of every
/// spot in the track.
pub fn render_track(
    track_id: u64,
    positions: &[(usize, f64, f64)],
    frame_images: &[PathBuf],
    out_dir: &Path,
    config: &RenderConfig,
) -> Result<RenderOutcome> {
    let track_dir = out_dir.join(track_id.to_string());
    if track_dir.exists() {
        debug!(track_id, "track_already_rendered");
        return Ok(RenderOutcome::AlreadyRendered);
    }
    if positions.is_empty() {
        bail!("track {} has no positioned spots", track_id);
    }

    // Integer bounding box over the whole track.
    let xs: Vec<i64> = positions.iter().map(|(_, x, _)| *x as i64).collect();
    let ys: Vec<i64> = positions.iter().map(|(_, _, y)| *y as i64).collect();
    let x_min = xs.iter().min().copied().unwrap_or(0);
    let x_max = xs.iter().max().copied().unwrap_or(0);
    let y_min = ys.iter().min().copied().unwrap_or(0);
    let y_max = ys.iter().max().copied().unwrap_or(0);

    // Crop-origin guard: the margin must fit between the box and the image
    // origin, otherwise the crop would start out of bounds.
    if x_min.min(y_min) <= config.margin {
        info!(track_id, x_min, y_min, "track_near_edge_skipped");
        return Ok(RenderOutcome::NearEdge);
    }

    let mut by_frame: BTreeMap<usize, Vec<(f64, f64)>> = BTreeMap::new();
    for (frame, x, y) in positions {
        by_frame.entry(*frame).or_default().push((*x, *y));
    }

    fs::create_dir_all(&track_dir)
        .with_context(|| format!("failed to create {}", track_dir.display()))?;

    let mut frames_written = 0usize;
    for (frame, spots) in &by_frame {
        let image_path = frame_images.get(*frame).ok_or_else(|| {
            anyhow::anyhow!(
                "track {}: frame {} beyond image listing ({} files)",
                track_id,
                frame,
                frame_images.len()
            )
        })?;
        let gray = image::open(image_path)
            .with_context(|| format!("failed to load {}", image_path.display()))?
            .into_luma16();

        let crop = crop_and_stretch(&gray, x_min, x_max, y_min, y_max, config.margin)
            .with_context(|| format!("track {}: frame {}", track_id, frame))?;

        let mut rgb = gray_to_rgb(&crop);
        for (x, y) in spots {
            let cx = *x as i64 - x_min + config.margin;
            let cy = *y as i64 - y_min + config.margin;
            draw_marker(&mut rgb, cx, cy, MARKER_RADIUS);
        }

        let out_path = track_dir.join(format!("{}.png", frame));
        rgb.save(&out_path)
            .with_context(|| format!("failed to save {}", out_path.display()))?;
        frames_written += 1;
        debug!(track_id, frame, "curation_frame_saved");
    }

    info!(track_id, frames = frames_written, "track_rendered");
    Ok(RenderOutcome::Rendered {
        frames: frames_written,
    })
}

/// Crop to the margin-expanded bounding box (clamped to the image on the far
/// edges) and contrast-stretch to the crop's [p1, p99] intensity range.
fn crop_and_stretch(
    gray: &ImageBuffer<Luma<u16>, Vec<u16>>,
    x_min: i64,
    x_max: i64,
    y_min: i64,
    y_max: i64,
    margin: i64,
) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let (width, height) = (gray.width() as i64, gray.height() as i64);
    let x0 = x_min - margin;
    let y0 = y_min - margin;
    let x1 = (x_max + margin).min(width);
    let y1 = (y_max + margin).min(height);
    if x0 < 0 || y0 < 0 || x0 >= x1 || y0 >= y1 {
        bail!(
            "crop [{}, {}) x [{}, {}) out of bounds for {}x{} image",
            x0,
            x1,
            y0,
            y1,
            width,
            height
        );
    }

    let (crop_w, crop_h) = ((x1 - x0) as u32, (y1 - y0) as u32);
    let mut values = Vec::with_capacity((crop_w * crop_h) as usize);
    for y in 0..crop_h {
        for x in 0..crop_w {
            let pixel = gray.get_pixel(x0 as u32 + x, y0 as u32 + y);
            values.push(pixel.0[0] as f64);
        }
    }
    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    let lo = stats::quantile(&sorted, 0.01);
    let hi = stats::quantile(&sorted, 0.99);
    let range = hi - lo;

    let mut out = ImageBuffer::new(crop_w, crop_h);
    for (i, value) in values.iter().enumerate() {
        let scaled = if range > 0.0 {
            ((value.clamp(lo, hi) - lo) / range * 255.0).round() as u8
        } else {
            0
        };
        let (x, y) = (i as u32 % crop_w, i as u32 / crop_w);
        out.put_pixel(x, y, Luma([scaled]));
    }
    Ok(out)
}

fn gray_to_rgb(gray: &ImageBuffer<Luma<u8>, Vec<u8>>) -> RgbImage {
    let mut rgb = RgbImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let v = pixel.0[0];
        rgb.put_pixel(x, y, Rgb([v, v, v]));
    }
    rgb
}

/// Filled red disc, clipped to the image.
fn draw_marker(image: &mut RgbImage, cx: i64, cy: i64, radius: i64) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && x < width && y >= 0 && y < height {
                image.put_pixel(x as u32, y as u32, Rgb([255, 0, 0]));
            }
        }
    }
}
