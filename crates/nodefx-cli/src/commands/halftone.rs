//! Halftone command

use crate::HalftoneArgs;
use anyhow::Result;
use nodefx_ops::{HalftoneParams, halftone};
use tracing::info;

pub fn run(args: HalftoneArgs) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let mut params: HalftoneParams = super::preset_or_default(args.preset.as_deref())?;

    if let Some(effect) = args.effect {
        params.effect = effect;
    }
    if let Some(v) = args.dot_size {
        params.dot_size = v;
    }
    if let Some(v) = args.angle {
        params.angle = v;
    }
    if let Some(v) = args.sharpness {
        params.sharpness = v;
    }
    if let Some(v) = args.contrast {
        params.contrast = v;
    }
    params.colorize |= args.colorize;

    info!(effect = %params.effect, "halftone {}", args.input.display());
    let output = halftone(&image, &params)?;
    super::save_image(&args.output, &output)
}
