//! Crop command

use crate::CropArgs;
use anyhow::{Context, Result};
use nodefx_ops::crop::{CropRect, crop};
use tracing::info;

pub fn run(args: CropArgs) -> Result<()> {
    let image = super::load_image(&args.input)?;

    let rect = match &args.crop_data {
        Some(json) => serde_json::from_str::<CropRect>(json)
            .with_context(|| format!("Invalid crop data: {json}"))?,
        None => CropRect {
            x: args.x,
            y: args.y,
            width: args.width,
            height: args.height,
        },
    };

    let (output, px) = crop(&image, &rect)?;
    info!(
        "cropping {}x{} @ ({},{}) from {}x{}",
        px.width,
        px.height,
        px.x,
        px.y,
        image.width(),
        image.height()
    );
    super::save_image(&args.output, &output)?;
    println!("{} {} {} {}", px.x, px.y, px.width, px.height);
    Ok(())
}
