//! Warp/distortion operations.
//!
//! Twelve effects selected by [`DistortKind`]. Most are coordinate remaps:
//! for each destination pixel the effect computes a fractional source
//! position, and the source is read with edge-clamped bilinear sampling.
//! The rest ([`PixelSort`](DistortKind::PixelSort),
//! [`Glitch`](DistortKind::Glitch), [`Mosaic`](DistortKind::Mosaic))
//! reorder or average pixels directly.
//!
//! All randomness derives from [`DistortParams::seed`], so output is a pure
//! function of the input image and the parameters.
//!
//! When the `parallel` feature is enabled, rows are processed on the rayon pool.
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::Image;
//! use nodefx_ops::distort::{distort, DistortKind, DistortParams};
//!
//! let img = Image::filled(32, 32, &[0.5, 0.2, 0.9]).unwrap();
//! let params = DistortParams { kind: DistortKind::Swirl, ..Default::default() };
//! let out = distort(&img, &params).unwrap();
//! assert_eq!(out.dimensions(), (32, 32));
//! ```

use crate::grade::clamp_or;
use crate::noise::{Fbm, Noise2D, Perlin};
use crate::parallel::for_each_row;
use crate::rng::hash_f32;
use crate::OpsResult;
use nodefx_core::{Image, luma, sample_bilinear};
use std::f32::consts::{PI, TAU};
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Lattice offset between the x and y displacement noise fields.
const NOISE_AXIS_OFFSET: f32 = 100.0;

/// Distortion effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum DistortKind {
    /// Sinusoidal offset on both axes.
    #[default]
    Wave,
    /// Rotation that fades out toward the radius.
    Swirl,
    /// Mirrored angular wedges.
    Kaleidoscope,
    /// Sort bright runs of each row.
    PixelSort,
    /// Perlin noise displacement.
    Displacement,
    /// Radial power-law lens.
    Fisheye,
    /// Concentric sinusoidal rings.
    Ripple,
    /// Spiral rotation that grows with radius.
    Twist,
    /// Bulge toward the center.
    Spherize,
    /// Horizontal band shifts with channel split.
    Glitch,
    /// Block averaging.
    Mosaic,
    /// Fractal noise warp.
    Warp,
}

crate::host_names!(DistortKind, "distortion type", {
    Wave => "wave",
    Swirl => "swirl",
    Kaleidoscope => "kaleidoscope",
    PixelSort => "pixelSort",
    Displacement => "displacement",
    Fisheye => "fisheye",
    Ripple => "ripple",
    Twist => "twist",
    Spherize => "spherize",
    Glitch => "glitch",
    Mosaic => "mosaic",
    Warp => "warp",
});

/// Distortion parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DistortParams {
    /// Effect to apply.
    pub kind: DistortKind,
    /// Effect strength, [0, 100].
    pub intensity: f32,
    /// Spatial frequency / block size control, [0, 100].
    pub frequency: f32,
    /// Horizontal center offset in percent of width, [-50, 50].
    pub offset_x: f32,
    /// Vertical center offset in percent of height, [-50, 50].
    pub offset_y: f32,
    /// Seed for noise and glitch decisions.
    pub seed: u32,
}

impl Default for DistortParams {
    fn default() -> Self {
        Self {
            kind: DistortKind::Wave,
            intensity: 50.0,
            frequency: 10.0,
            offset_x: 0.0,
            offset_y: 0.0,
            seed: 0,
        }
    }
}

impl DistortParams {
    /// Returns a copy with every numeric field clamped into its range.
    pub fn clamped(&self) -> Self {
        Self {
            kind: self.kind,
            intensity: clamp_or(self.intensity, 0.0, 100.0, 50.0),
            frequency: clamp_or(self.frequency, 0.0, 100.0, 10.0),
            offset_x: clamp_or(self.offset_x, -50.0, 50.0, 0.0),
            offset_y: clamp_or(self.offset_y, -50.0, 50.0, 0.0),
            seed: self.seed,
        }
    }
}

/// Radial frame shared by the center-based effects.
#[derive(Debug, Clone, Copy)]
struct Frame {
    cx: f32,
    cy: f32,
    max_radius: f32,
}

impl Frame {
    fn new(w: u32, h: u32, p: &DistortParams) -> Self {
        let (w, h) = (w as f32, h as f32);
        Self {
            cx: w / 2.0 + p.offset_x / 100.0 * w,
            cy: h / 2.0 + p.offset_y / 100.0 * h,
            max_radius: w.min(h) / 2.0,
        }
    }

    /// Source position at `distance` along `angle` from the center.
    #[inline]
    fn polar(&self, angle: f32, distance: f32) -> (f32, f32) {
        (self.cx + angle.cos() * distance, self.cy + angle.sin() * distance)
    }
}

/// Applies a distortion effect.
///
/// Input samples are clamped to `[0, 1]` first. Output has the same
/// dimensions and channel count as the input.
pub fn distort(img: &Image, params: &DistortParams) -> OpsResult<Image> {
    let p = params.clamped();
    debug!(
        width = img.width(),
        height = img.height(),
        kind = p.kind.as_str(),
        intensity = p.intensity,
        frequency = p.frequency,
        "distort"
    );

    let src = img.clamped();
    let frame = Frame::new(img.width(), img.height(), &p);

    let out = match p.kind {
        DistortKind::Wave => {
            let amp = p.intensity * 2.0;
            let f = p.frequency / 100.0;
            apply_warp(&src, |x, y| Some((x + amp * (y * f).sin(), y + amp * (x * f).sin())))
        }
        DistortKind::Swirl => {
            let strength = p.intensity / 50.0;
            apply_warp(&src, |x, y| {
                let (dx, dy) = (x - frame.cx, y - frame.cy);
                let d = dx.hypot(dy);
                if d >= frame.max_radius {
                    return Some((x, y));
                }
                let angle = dy.atan2(dx) + (1.0 - d / frame.max_radius) * strength;
                Some(frame.polar(angle, d))
            })
        }
        DistortKind::Kaleidoscope => {
            let segments = (3.0 + p.frequency / 100.0 * 9.0).floor().max(3.0);
            let wedge = TAU / segments;
            trace!(segments, "kaleidoscope");
            apply_warp(&src, |x, y| {
                let (dx, dy) = (x - frame.cx, y - frame.cy);
                let d = dx.hypot(dy);
                // each segment mirrors about its bisector, so segment edges
                // (the +x axis included) match for any segment count
                let within = dy.atan2(dx).rem_euclid(wedge);
                let folded = within.min(wedge - within);
                Some(frame.polar(folded, d))
            })
        }
        DistortKind::PixelSort => pixel_sort(&src, p.intensity, p.frequency),
        DistortKind::Displacement => {
            let perlin = Perlin::new(p.seed);
            let s = p.frequency / 200.0;
            let amp = p.intensity / 2.0;
            apply_warp(&src, |x, y| {
                let nx = perlin.sample(x * s, y * s);
                let ny = perlin.sample(x * s + NOISE_AXIS_OFFSET, y * s + NOISE_AXIS_OFFSET);
                Some((x + nx * amp, y + ny * amp))
            })
        }
        DistortKind::Fisheye => {
            let power = p.intensity / 100.0;
            apply_warp(&src, |x, y| {
                let (dx, dy) = (x - frame.cx, y - frame.cy);
                let d = dx.hypot(dy);
                if d >= frame.max_radius {
                    return None;
                }
                let amount = (d / frame.max_radius).powf(power);
                Some((frame.cx + dx * amount, frame.cy + dy * amount))
            })
        }
        DistortKind::Ripple => {
            let amp = p.intensity / 2.0;
            let f = p.frequency / 50.0;
            apply_warp(&src, |x, y| {
                let (dx, dy) = (x - frame.cx, y - frame.cy);
                let d = dx.hypot(dy);
                if d <= 0.0 {
                    return Some((x, y));
                }
                let factor = (d + (d * f).sin() * amp) / d;
                Some((frame.cx + dx * factor, frame.cy + dy * factor))
            })
        }
        DistortKind::Twist => {
            let strength = p.intensity / 100.0;
            let radius = frame.max_radius.max(f32::EPSILON);
            apply_warp(&src, |x, y| {
                let (dx, dy) = (x - frame.cx, y - frame.cy);
                let d = dx.hypot(dy);
                let angle = dy.atan2(dx) + (d / radius) * strength * PI;
                Some(frame.polar(angle, d))
            })
        }
        DistortKind::Spherize => {
            let strength = p.intensity / 100.0;
            apply_warp(&src, |x, y| {
                let (dx, dy) = (x - frame.cx, y - frame.cy);
                let d = dx.hypot(dy);
                if d >= frame.max_radius {
                    return Some((x, y));
                }
                let curve = (d / frame.max_radius * PI * 0.5).sin();
                let factor = 1.0 + (curve - 1.0) * strength;
                Some((frame.cx + dx * factor, frame.cy + dy * factor))
            })
        }
        DistortKind::Glitch => glitch(&src, p.intensity, p.frequency, p.seed),
        DistortKind::Mosaic => mosaic(&src, p.frequency),
        DistortKind::Warp => {
            let perlin = Perlin::new(p.seed);
            let fbm = Fbm::new(&perlin).octaves(4);
            let s = p.frequency / 200.0;
            let amp = p.intensity / 100.0 * 20.0;
            apply_warp(&src, |x, y| {
                let wx = fbm.sample(x * s, y * s);
                let wy = fbm.sample(x * s + NOISE_AXIS_OFFSET, y * s + NOISE_AXIS_OFFSET);
                Some((x + wx * amp, y + wy * amp))
            })
        }
    };

    Ok(out)
}

/// Apply a generic warp using a coordinate generator function.
///
/// `coord_fn(x, y)` returns the source position for destination pixel
/// (x, y), or `None` to paint black RGB while keeping the pixel's alpha.
fn apply_warp<F>(src: &Image, coord_fn: F) -> Image
where
    F: Fn(f32, f32) -> Option<(f32, f32)> + Sync + Send,
{
    let ch = src.channels();
    let w = src.width() as usize;
    let mut dst = src.blank_like();

    for_each_row(dst.data_mut(), w * ch, |y, row| {
        for x in 0..w {
            let out = &mut row[x * ch..(x + 1) * ch];
            match coord_fn(x as f32, y as f32) {
                Some((sx, sy)) => {
                    let sample = sample_bilinear(src, sx, sy);
                    out.copy_from_slice(&sample[..ch]);
                }
                None => {
                    out[..3].fill(0.0);
                    if ch == 4 {
                        out[3] = src.pixel(x as u32, y as u32)[3];
                    }
                }
            }
        }
    });

    dst
}

/// Sorts bright runs of each row by ascending luma.
///
/// A run is a maximal span of pixels with `luma >= 1 - intensity/100`;
/// runs are split into chunks of `round(frequency)` pixels (no limit at 0)
/// before sorting. The sort is stable.
fn pixel_sort(src: &Image, intensity: f32, frequency: f32) -> Image {
    let threshold = 1.0 - intensity / 100.0;
    let chunk = frequency.round() as usize;
    let ch = src.channels();
    let w = src.width() as usize;
    let mut dst = src.clone();

    for_each_row(dst.data_mut(), w * ch, |_, row| {
        let lumas: Vec<f32> = row.chunks_exact(ch).map(|p| luma(p[0], p[1], p[2])).collect();
        let mut x = 0;
        while x < w {
            if lumas[x] < threshold {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && lumas[x] >= threshold {
                x += 1;
            }
            let step = if chunk == 0 { x - start } else { chunk };
            let mut s = start;
            while s < x {
                let e = (s + step).min(x);
                sort_span(row, &lumas, s, e, ch);
                s = e;
            }
        }
    });

    dst
}

fn sort_span(row: &mut [f32], lumas: &[f32], start: usize, end: usize, ch: usize) {
    let mut order: Vec<usize> = (start..end).collect();
    order.sort_by(|&a, &b| lumas[a].total_cmp(&lumas[b]));
    let sorted: Vec<f32> = order
        .iter()
        .flat_map(|&i| row[i * ch..(i + 1) * ch].to_vec())
        .collect();
    row[start * ch..end * ch].copy_from_slice(&sorted);
}

/// Shifts seeded bands of rows horizontally with a red/blue split.
fn glitch(src: &Image, intensity: f32, frequency: f32, seed: u32) -> Image {
    let band = (frequency.round() as usize).max(1);
    let probability = intensity / 100.0;
    let split = (intensity / 20.0).round() as i64;
    let ch = src.channels();
    let w = src.width() as usize;
    let wi = w as i64;
    let data = src.data();
    let mut dst = src.clone();

    for_each_row(dst.data_mut(), w * ch, |y, row| {
        let b = (y / band) as u32;
        if hash_f32(b, 0, seed) >= probability {
            return;
        }
        let shift = ((hash_f32(b, 1, seed) * 2.0 - 1.0) * frequency).round() as i64;
        let src_row = &data[y * w * ch..(y + 1) * w * ch];
        let at = |x: i64| (x.rem_euclid(wi) as usize) * ch;
        for x in 0..wi {
            let out = &mut row[x as usize * ch..(x as usize + 1) * ch];
            let base = at(x - shift);
            out.copy_from_slice(&src_row[base..base + ch]);
            out[0] = src_row[at(x - shift - split)];
            out[2] = src_row[at(x - shift + split) + 2];
        }
    });

    dst
}

/// Replaces each block with its mean.
fn mosaic(src: &Image, frequency: f32) -> Image {
    let block = (frequency.round() as usize).max(2);
    let ch = src.channels();
    let w = src.width() as usize;
    let row_len = w * ch;
    let mut dst = src.clone();

    // one chunk per band of `block` rows; the last band may be shorter
    for_each_row(dst.data_mut(), row_len * block, |_, band| {
        let rows = band.len() / row_len;
        let mut bx = 0;
        while bx < w {
            let bw = block.min(w - bx);
            let mut sum = [0.0f32; 4];
            for r in 0..rows {
                for x in bx..bx + bw {
                    let i = r * row_len + x * ch;
                    for c in 0..ch {
                        sum[c] += band[i + c];
                    }
                }
            }
            let n = (rows * bw) as f32;
            for r in 0..rows {
                for x in bx..bx + bw {
                    let i = r * row_len + x * ch;
                    for c in 0..ch {
                        band[i + c] = sum[c] / n;
                    }
                }
            }
            bx += bw;
        }
    });

    dst
}
