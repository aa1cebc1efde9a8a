use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::spots;
use crate::pipeline::Stage;

pub struct Stage1Spots;

impl Stage1Spots {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Spots {
    fn name(&self) -> &'static str {
        "stage1_spots"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let (raw_spots, input_crc) = spots::read_raw_spots(&ctx.spots_path)?;
        info!(rows = raw_spots.len(), input_crc, "spot_table_ready");
        ctx.report.input.rows_total = raw_spots.len();
        ctx.raw_spots = raw_spots;
        ctx.input_crc = input_crc;
        Ok(())
    }
}
