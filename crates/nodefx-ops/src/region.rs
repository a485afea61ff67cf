//! Rasterize regional layout boxes into masks.
//!
//! A regional layout is a list of weighted boxes drawn on a canvas of known
//! size. [`region_mask`] turns them into a [`Mask`] at any output size, so a
//! layout can drive [`blend`](crate::composite::blend) directly.

use crate::grade::clamp_or;
use crate::parallel::map_plane;
use crate::{OpsError, OpsResult};
use nodefx_core::Mask;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// One box of a regional layout, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegionBox {
    /// Host-assigned box id.
    pub id: u32,
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
    /// Mask value inside the box, [0, 1].
    pub weight: f32,
}

impl Default for RegionBox {
    fn default() -> Self {
        Self {
            id: 0,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
            weight: 1.0,
        }
    }
}

impl RegionBox {
    /// Box corners as `[x1, y1, x2, y2]` fractions of the canvas, clamped to [0, 1].
    pub fn normalized(&self, canvas_w: u32, canvas_h: u32) -> [f32; 4] {
        let (cw, ch) = (canvas_w.max(1) as f32, canvas_h.max(1) as f32);
        let frac = |v: f32, extent: f32| clamp_or(v / extent, 0.0, 1.0, 0.0);
        [
            frac(self.x, cw),
            frac(self.y, ch),
            frac(self.x + self.w, cw),
            frac(self.y + self.h, ch),
        ]
    }

    /// Half-open pixel span `[x1, x2) x [y1, y2)` on an `out_w` x `out_h` mask.
    fn span(&self, canvas: (u32, u32), out_w: u32, out_h: u32) -> [usize; 4] {
        let (cw, ch) = (canvas.0 as f32, canvas.1 as f32);
        let (ow, oh) = (out_w as f32, out_h as f32);
        let to_px = |v: f32, scale: f32, limit: f32| {
            let p = (v * scale).trunc();
            if p.is_nan() { 0 } else { p.clamp(0.0, limit) as usize }
        };
        [
            to_px(self.x, ow / cw, ow),
            to_px(self.y, oh / ch, oh),
            to_px(self.x + self.w, ow / cw, ow),
            to_px(self.y + self.h, oh / ch, oh),
        ]
    }
}

/// Rasterizes `boxes` drawn on a `canvas` (width, height) into an
/// `out_w` x `out_h` mask. Overlaps take the larger weight.
pub fn region_mask(
    boxes: &[RegionBox],
    canvas: (u32, u32),
    out_w: u32,
    out_h: u32,
) -> OpsResult<Mask> {
    if canvas.0 == 0 || canvas.1 == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "region canvas {}x{} is empty",
            canvas.0, canvas.1
        )));
    }
    debug!(
        boxes = boxes.len(),
        canvas_w = canvas.0,
        canvas_h = canvas.1,
        out_w,
        out_h,
        "region_mask"
    );

    let spans: Vec<([usize; 4], f32)> = boxes
        .iter()
        .map(|b| (b.span(canvas, out_w, out_h), clamp_or(b.weight, 0.0, 1.0, 0.0)))
        .filter(|([x1, y1, x2, y2], w)| x2 > x1 && y2 > y1 && *w > 0.0)
        .collect();
    trace!(visible = spans.len(), "region spans");

    let data = map_plane(out_w as usize, out_h as usize, |x, y| {
        spans
            .iter()
            .filter(|([x1, y1, x2, y2], _)| (*x1..*x2).contains(&x) && (*y1..*y2).contains(&y))
            .fold(0.0f32, |acc, (_, w)| acc.max(*w))
    });
    Ok(Mask::from_data(out_w, out_h, data)?)
}
