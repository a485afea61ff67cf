//! Texture generation command

use crate::TextureArgs;
use anyhow::Result;
use nodefx_ops::texture::{TextureParams, generate};
use tracing::info;

pub fn run(args: TextureArgs) -> Result<()> {
    let mut params: TextureParams = super::preset_or_default(args.preset.as_deref())?;

    if let Some(v) = args.width {
        params.width = v;
    }
    if let Some(v) = args.height {
        params.height = v;
    }
    if let Some(v) = args.seed {
        params.seed = v;
    }
    if let Some(v) = args.scale {
        params.scale = v;
    }
    if let Some(v) = args.octaves {
        params.octaves = v;
    }
    if let Some(mode) = args.color_mode {
        params.color_mode = mode;
    }
    if let Some(kind) = args.noise_type {
        params.noise_type = kind;
    }
    if let Some(v) = args.warp {
        params.warp_strength = v;
    }
    if let Some(v) = args.stars {
        params.stars.density = v;
    }
    params.post.vignette |= args.vignette;
    params.post.bloom |= args.bloom;

    info!(
        seed = params.seed,
        mode = %params.color_mode,
        "generating {}x{} texture",
        params.width,
        params.height
    );
    let output = generate(&params)?;
    super::save_image(&args.output, &output)
}
