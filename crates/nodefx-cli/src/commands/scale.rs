//! Scale-to-megapixels command

use crate::ScaleArgs;
use anyhow::Result;
use nodefx_ops::scale::{ScaleParams, megapixel_dimensions, scale_to_megapixels};
use tracing::info;

pub fn run(args: ScaleArgs) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let mut params: ScaleParams = super::preset_or_default(args.preset.as_deref())?;

    if let Some(v) = args.megapixels {
        params.megapixels = v;
    }
    if let Some(m) = args.multiple {
        params.width_multiple = m;
        params.height_multiple = m;
    }
    if let Some(m) = args.width_multiple {
        params.width_multiple = m;
    }
    if let Some(m) = args.height_multiple {
        params.height_multiple = m;
    }
    if args.no_keep_aspect {
        params.keep_aspect = false;
    }
    if let Some(f) = args.filter {
        params.filter = f;
    }

    let (w, h) = megapixel_dimensions(image.width(), image.height(), &params);
    info!(
        "scaling {}x{} -> {}x{} ({})",
        image.width(),
        image.height(),
        w,
        h,
        params.filter
    );
    let output = scale_to_megapixels(&image, &params)?;
    super::save_image(&args.output, &output)?;
    println!("{}x{}", output.width(), output.height());
    Ok(())
}
