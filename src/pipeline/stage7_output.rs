use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{report, table_writer};
use crate::pipeline::Stage;

pub struct Stage7Output;

impl Stage7Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage7Output {
    fn name(&self) -> &'static str {
        "stage7_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        table_writer::write_clean(&ctx.output.clean_path, &ctx.spots)?;
        ctx.report
            .outputs
            .push(ctx.output.clean_path.display().to_string());

        let features = ctx.features.as_ref().context("feature table missing")?;
        table_writer::write_mean_std(&ctx.output.mean_std_path, features)?;
        ctx.report
            .outputs
            .push(ctx.output.mean_std_path.display().to_string());

        let aligned = ctx.aligned.as_ref().context("aligned table missing")?;
        table_writer::write_aligned(&ctx.output.intensities_path, aligned)?;
        ctx.report
            .outputs
            .push(ctx.output.intensities_path.display().to_string());

        info!(
            clean = %ctx.output.clean_path.display(),
            mean_std = %ctx.output.mean_std_path.display(),
            intensities = %ctx.output.intensities_path.display(),
            "output_tables_written"
        );

        if ctx.write_json {
            ctx.report.warnings = ctx.warnings.clone();
            report::write_report(&ctx.output.report_path, &ctx.report)?;
            info!(report = %ctx.output.report_path.display(), "report_written");
        }
        Ok(())
    }
}
