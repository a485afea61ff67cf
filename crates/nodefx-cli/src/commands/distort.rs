//! Distort command

use crate::DistortArgs;
use anyhow::Result;
use nodefx_ops::{DistortParams, distort};
use tracing::info;

pub fn run(args: DistortArgs) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let mut params: DistortParams = super::preset_or_default(args.preset.as_deref())?;

    if let Some(kind) = args.kind {
        params.kind = kind;
    }
    if let Some(v) = args.intensity {
        params.intensity = v;
    }
    if let Some(v) = args.frequency {
        params.frequency = v;
    }
    if let Some(v) = args.offset_x {
        params.offset_x = v;
    }
    if let Some(v) = args.offset_y {
        params.offset_y = v;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }

    info!(kind = %params.kind, "distorting {}", args.input.display());
    let output = distort(&image, &params)?;
    super::save_image(&args.output, &output)
}
