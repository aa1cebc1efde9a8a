use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use trackcurate::cli::{AlignArgs, Cli, Commands, CurateArgs, DetectArgs};
use trackcurate::ctx::{Ctx, StdMode};
use trackcurate::io;
use trackcurate::pipeline::Pipeline;
use trackcurate::pipeline::stage0_scaffold::Stage0Scaffold;
use trackcurate::pipeline::stage1_spots::Stage1Spots;
use trackcurate::pipeline::stage2_candidates::Stage2Candidates;
use trackcurate::pipeline::stage3_render::Stage3Render;
use trackcurate::pipeline::stage4_curated::Stage4Curated;
use trackcurate::pipeline::stage5_align::Stage5Align;
use trackcurate::pipeline::stage6_features::Stage6Features;
use trackcurate::pipeline::stage7_output::Stage7Output;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Curate(args) => run_curate(args),
        Commands::Align(args) => run_align(args),
    }
}

fn run_detect(args: DetectArgs) -> Result<()> {
    let mut ctx = Ctx::new(args.spots, args.out, env!("CARGO_PKG_VERSION"));
    if let Some(cache) = args.cache {
        ctx.output.cache_path = cache;
    }

    let pipeline = Pipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1Spots::new()),
        Box::new(Stage2Candidates::new()),
    ]);
    pipeline.run(&mut ctx)?;

    print!("{}", io::summary::format_detect_summary(&ctx));
    Ok(())
}

fn run_curate(args: CurateArgs) -> Result<()> {
    let mut ctx = Ctx::new(args.spots, args.out, env!("CARGO_PKG_VERSION"));
    ctx.image_dir = Some(args.images);
    ctx.crop_margin = args.margin;
    if let Some(cache) = args.cache {
        ctx.output.cache_path = cache;
    }

    let pipeline = Pipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1Spots::new()),
        Box::new(Stage2Candidates::new()),
        Box::new(Stage3Render::new()),
    ]);
    pipeline.run(&mut ctx)?;

    print!("{}", io::summary::format_curate_summary(&ctx));
    Ok(())
}

fn run_align(args: AlignArgs) -> Result<()> {
    let mut ctx = Ctx::new(args.spots, args.out, env!("CARGO_PKG_VERSION"));
    ctx.curated_tracks_path = Some(args.curated_tracks);
    ctx.double_divisions_path = args.double_divisions;
    ctx.n_frames = args.frames;
    ctx.n_red = args.n_red;
    ctx.n_green = args.n_green;
    ctx.std_mode = if args.collapse_std {
        StdMode::GlobalScalar
    } else {
        StdMode::PerFrame
    };
    ctx.write_json = args.json;
    if let Some(path) = args.statistics_clean {
        ctx.output.clean_path = path;
    }
    if let Some(path) = args.statistics_mean_std {
        ctx.output.mean_std_path = path;
    }
    if let Some(path) = args.intensities {
        ctx.output.intensities_path = path;
    }

    let pipeline = Pipeline::new(vec![
        Box::new(Stage0Scaffold::new()),
        Box::new(Stage1Spots::new()),
        Box::new(Stage4Curated::new()),
        Box::new(Stage5Align::new()),
        Box::new(Stage6Features::new()),
        Box::new(Stage7Output::new()),
    ]);
    pipeline.run(&mut ctx)?;

    print!("{}", io::summary::format_align_summary(&ctx));
    Ok(())
}
