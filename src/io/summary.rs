//! Human-readable post-run summaries.

use std::fmt::Write as _;

use crate::ctx::Ctx;

pub fn format_detect_summary(ctx: &Ctx) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "trackcurate detect ok");
    let _ = writeln!(out, "rows: {}", ctx.raw_spots.len());
    let _ = writeln!(
        out,
        "division candidates: {}{}",
        ctx.candidates.len(),
        if ctx.cache_reused { " (cache reused)" } else { "" }
    );
    let _ = writeln!(out, "cache: {}", ctx.output.cache_path.display());
    append_warnings(&mut out, ctx);
    out
}

pub fn format_curate_summary(ctx: &Ctx) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "trackcurate curate ok");
    let _ = writeln!(out, "division candidates: {}", ctx.candidates.len());
    let _ = writeln!(out, "tracks rendered: {}", ctx.rendered_tracks.len());
    let _ = writeln!(out, "tracks skipped: {}", ctx.skipped_tracks.len());
    let _ = writeln!(out, "curation folder: {}", ctx.output.out_dir.display());
    append_warnings(&mut out, ctx);
    out
}

pub fn format_align_summary(ctx: &Ctx) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "trackcurate align ok");
    let _ = writeln!(
        out,
        "rows: {} ({} dropped during cleaning)",
        ctx.spots.len(),
        ctx.dropped_rows
    );
    if let Some(curated) = &ctx.curated {
        let _ = writeln!(
            out,
            "curated tracks: {} single, {} full-cycle",
            curated.singles.len(),
            curated.full_cycles.len()
        );
    }
    if let Some(aligned) = &ctx.aligned {
        let _ = writeln!(
            out,
            "division frames recorded: {} of {} tracks",
            aligned.division_frames.len(),
            aligned.tracks.len()
        );
    }
    let _ = writeln!(out, "cleaned table: {}", ctx.output.clean_path.display());
    let _ = writeln!(out, "feature table: {}", ctx.output.mean_std_path.display());
    let _ = writeln!(
        out,
        "aligned table: {}",
        ctx.output.intensities_path.display()
    );
    append_warnings(&mut out, ctx);
    out
}

fn append_warnings(out: &mut String, ctx: &Ctx) {
    if ctx.warnings.is_empty() {
        return;
    }
    let _ = writeln!(out, "warnings:");
    for warning in &ctx.warnings {
        let _ = writeln!(out, "- {}", warning);
    }
}
