//! Edge detection command

use crate::EdgesArgs;
use anyhow::Result;
use nodefx_ops::{EdgeParams, detect_edges};
use tracing::info;

pub fn run(args: EdgesArgs) -> Result<()> {
    let image = super::load_image(&args.input)?;
    let mut params: EdgeParams = super::preset_or_default(args.preset.as_deref())?;

    if let Some(algorithm) = args.algorithm {
        params.algorithm = algorithm;
    }
    if let Some(v) = args.threshold {
        params.threshold = v;
    }
    if let Some(v) = args.thickness {
        params.thickness = v;
    }
    params.invert |= args.invert;
    if let Some(c) = &args.edge_color {
        params.edge_color = super::parse_rgb(c)?;
    }
    if let Some(c) = &args.background_color {
        params.background_color = super::parse_rgb(c)?;
    }

    info!(algorithm = %params.algorithm, "detecting edges in {}", args.input.display());
    let output = detect_edges(&image, &params)?;
    super::save_image(&args.output, &output)
}
