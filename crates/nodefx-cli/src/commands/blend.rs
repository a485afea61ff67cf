//! Blend command

use crate::BlendArgs;
use anyhow::Result;
use nodefx_ops::blend;
use nodefx_ops::composite::BlendParams;
use tracing::info;

pub fn run(args: BlendArgs) -> Result<()> {
    let base = super::load_image(&args.base)?;
    let overlay = super::load_image(&args.overlay)?;
    let mask = match &args.mask {
        Some(path) => {
            let m = super::load_mask(path)?;
            Some(if args.invert_mask { m.inverted() } else { m })
        }
        None => None,
    };

    let mut params: BlendParams = super::preset_or_default(args.preset.as_deref())?;
    if let Some(mode) = args.mode {
        params.mode = mode;
    }
    if let Some(v) = args.opacity {
        params.opacity = v;
    }

    if !overlay.same_size(&base) {
        info!(
            "overlay {}x{} will be resampled to {}x{}",
            overlay.width(),
            overlay.height(),
            base.width(),
            base.height()
        );
    }
    info!(mode = %params.mode, opacity = params.opacity, "blending");
    let output = blend(&base, &overlay, params.mode, params.opacity, mask.as_ref())?;
    super::save_image(&args.output, &output)
}
