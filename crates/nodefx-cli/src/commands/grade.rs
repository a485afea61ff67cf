//! Grade command

use crate::GradeArgs;
use anyhow::Result;
use nodefx_ops::{GradeParams, grade};
use tracing::info;

pub fn run(args: GradeArgs) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let mut params: GradeParams = super::preset_or_default(args.preset.as_deref())?;

    params.invert |= args.invert;
    let overrides = [
        (args.exposure, &mut params.exposure),
        (args.temperature, &mut params.temperature),
        (args.tint, &mut params.tint),
        (args.highlights, &mut params.highlights),
        (args.shadows, &mut params.shadows),
        (args.blacks, &mut params.blacks),
        (args.whites, &mut params.whites),
        (args.contrast, &mut params.contrast),
        (args.brightness, &mut params.brightness),
        (args.hue, &mut params.hue),
        (args.saturation, &mut params.saturation),
    ];
    for (value, field) in overrides {
        if let Some(v) = value {
            *field = v;
        }
    }

    info!(identity = params.is_identity(), "grading {}", args.input.display());
    let output = grade(&image, &params)?;
    super::save_image(&args.output, &output)
}
