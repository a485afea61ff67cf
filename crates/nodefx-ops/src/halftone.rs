//! Halftone screens and dithering.
//!
//! Every effect works on contrast-adjusted luma and produces ink/paper
//! output. Alpha passes through untouched.
//!
//! # Effects
//!
//! - [`HalftoneEffect::HalftoneDots`] - Rotated grid of dots sized by cell darkness
//! - [`HalftoneEffect::HalftoneLines`] - Rotated bars whose width encodes darkness
//! - [`HalftoneEffect::BayerDithering`] - 4x4 ordered threshold
//! - [`HalftoneEffect::OrderedDithering`] - 8x8 ordered threshold
//! - [`HalftoneEffect::FloydSteinberg`] - Sequential error diffusion
//! - [`HalftoneEffect::Newspaper`] - Small dots on warm paper
//! - [`HalftoneEffect::Crosshatch`] - Four angled hatching passes
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::Image;
//! use nodefx_ops::halftone::{halftone, HalftoneEffect, HalftoneParams};
//!
//! let img = Image::filled(16, 16, &[0.5, 0.5, 0.5]).unwrap();
//! let params = HalftoneParams {
//!     effect: HalftoneEffect::FloydSteinberg,
//!     ..Default::default()
//! };
//! let out = halftone(&img, &params).unwrap();
//! assert!(out.data().iter().all(|&v| v == 0.0 || v == 1.0));
//! ```

use crate::grade::clamp_or;
use crate::parallel::for_each_row;
use crate::OpsResult;
use nodefx_core::{Image, clamp01};
#[allow(unused_imports)]
use tracing::{debug, trace};

const BAYER4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

const INK: [f32; 3] = [0.0, 0.0, 0.0];
const PAPER: [f32; 3] = [1.0, 1.0, 1.0];

const NEWSPAPER_CELL: f32 = 4.0;
const NEWSPAPER_INK: [f32; 3] = [0.12, 0.11, 0.10];
const NEWSPAPER_PAPER: [f32; 3] = [0.96, 0.93, 0.85];

const HATCH_LEVELS: [f32; 4] = [0.8, 0.6, 0.4, 0.2];

/// Halftone or dithering effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum HalftoneEffect {
    /// Circular dots on a rotated grid.
    #[default]
    HalftoneDots,
    /// Parallel bars on a rotated grid.
    HalftoneLines,
    /// 4x4 Bayer threshold.
    BayerDithering,
    /// 8x8 Bayer threshold.
    OrderedDithering,
    /// Floyd-Steinberg error diffusion.
    FloydSteinberg,
    /// Fixed-size dots in newsprint colors.
    Newspaper,
    /// Four-pass crosshatch.
    Crosshatch,
}

crate::host_names!(HalftoneEffect, "halftone effect", {
    HalftoneDots => "halftone_dots",
    HalftoneLines => "halftone_lines",
    BayerDithering => "bayer_dithering",
    OrderedDithering => "ordered_dithering",
    FloydSteinberg => "floyd_steinberg",
    Newspaper => "newspaper",
    Crosshatch => "crosshatch",
});

/// Halftone parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HalftoneParams {
    /// Effect to apply.
    pub effect: HalftoneEffect,
    /// Screen cell size in pixels, [2, 20].
    pub dot_size: u32,
    /// Screen angle in degrees, [0, 360].
    pub angle: f32,
    /// Ink coverage multiplier, [0.1, 2.0].
    pub sharpness: f32,
    /// Luma contrast applied before screening, [0.5, 2.0].
    pub contrast: f32,
    /// Draw screen ink in the source color instead of black.
    pub colorize: bool,
}

impl Default for HalftoneParams {
    fn default() -> Self {
        Self {
            effect: HalftoneEffect::HalftoneDots,
            dot_size: 4,
            angle: 45.0,
            sharpness: 1.0,
            contrast: 1.0,
            colorize: false,
        }
    }
}

impl HalftoneParams {
    /// Returns a copy with every field clamped into range.
    pub fn clamped(&self) -> Self {
        Self {
            effect: self.effect,
            dot_size: self.dot_size.clamp(2, 20),
            angle: clamp_or(self.angle, 0.0, 360.0, 45.0),
            sharpness: clamp_or(self.sharpness, 0.1, 2.0, 1.0),
            contrast: clamp_or(self.contrast, 0.5, 2.0, 1.0),
            colorize: self.colorize,
        }
    }
}

/// Rotated screen grid with per-cell mean luma and color.
struct CellGrid {
    size: f32,
    cos: f32,
    sin: f32,
    i0: i64,
    j0: i64,
    cols: usize,
    mean_luma: Vec<f32>,
    mean_rgb: Vec<[f32; 3]>,
}

impl CellGrid {
    fn build(img: &Image, tone: &[f32], size: f32, angle_deg: f32) -> Self {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (w, h) = (img.width() as f32, img.height() as f32);

        let rotate = |x: f32, y: f32| (x * cos + y * sin, -x * sin + y * cos);
        let corners = [rotate(0.0, 0.0), rotate(w, 0.0), rotate(0.0, h), rotate(w, h)];
        let (mut umin, mut umax, mut vmin, mut vmax) = (f32::MAX, f32::MIN, f32::MAX, f32::MIN);
        for (u, v) in corners {
            umin = umin.min(u);
            umax = umax.max(u);
            vmin = vmin.min(v);
            vmax = vmax.max(v);
        }
        let i0 = (umin / size).floor() as i64;
        let j0 = (vmin / size).floor() as i64;
        let cols = ((umax / size).floor() as i64 - i0 + 1).max(1) as usize;
        let rows = ((vmax / size).floor() as i64 - j0 + 1).max(1) as usize;
        trace!(cols, rows, size, angle = angle_deg, "halftone grid");

        let mut grid = Self {
            size,
            cos,
            sin,
            i0,
            j0,
            cols,
            mean_luma: vec![0.0; cols * rows],
            mean_rgb: vec![[0.0; 3]; cols * rows],
        };

        let cells = cols * rows;
        let mut sums = vec![[0.0f64; 4]; cells];
        let mut counts = vec![0u32; cells];
        let (wu, hu) = (img.width(), img.height());
        for y in 0..hu {
            for x in 0..wu {
                let (idx, _, _) = grid.locate(x, y);
                let rgb = img.rgb(x, y);
                let s = &mut sums[idx];
                s[0] += tone[y as usize * wu as usize + x as usize] as f64;
                s[1] += rgb[0].clamp(0.0, 1.0) as f64;
                s[2] += rgb[1].clamp(0.0, 1.0) as f64;
                s[3] += rgb[2].clamp(0.0, 1.0) as f64;
                counts[idx] += 1;
            }
        }
        for (i, (s, &n)) in sums.iter().zip(&counts).enumerate() {
            if n > 0 {
                let n = n as f64;
                grid.mean_luma[i] = (s[0] / n) as f32;
                grid.mean_rgb[i] = [(s[1] / n) as f32, (s[2] / n) as f32, (s[3] / n) as f32];
            }
        }
        grid
    }

    /// Cell index of the pixel center and its rotated offset from the cell center.
    #[inline]
    fn locate(&self, x: u32, y: u32) -> (usize, f32, f32) {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let u = px * self.cos + py * self.sin;
        let v = -px * self.sin + py * self.cos;
        let ci = (u / self.size).floor();
        let cj = (v / self.size).floor();
        let du = u - (ci + 0.5) * self.size;
        let dv = v - (cj + 0.5) * self.size;
        let col = (ci as i64 - self.i0).clamp(0, self.cols as i64 - 1) as usize;
        let row = (cj as i64 - self.j0).max(0) as usize;
        let idx = (row * self.cols + col).min(self.mean_luma.len() - 1);
        (idx, du, dv)
    }
}

#[derive(Clone, Copy)]
enum Screen {
    Dots,
    Lines,
}

/// Applies a halftone or dithering effect.
pub fn halftone(img: &Image, params: &HalftoneParams) -> OpsResult<Image> {
    let p = params.clamped();
    debug!(
        width = img.width(),
        height = img.height(),
        effect = p.effect.as_str(),
        dot_size = p.dot_size,
        "halftone"
    );

    let tone: Vec<f32> = img
        .luma_plane()
        .into_iter()
        .map(|l| adjust_tone(l, p.contrast))
        .collect();

    let out = match p.effect {
        HalftoneEffect::HalftoneDots => {
            screen(img, &tone, &p, Screen::Dots, p.dot_size as f32, p.sharpness, None)
        }
        HalftoneEffect::HalftoneLines => {
            screen(img, &tone, &p, Screen::Lines, p.dot_size as f32, p.sharpness, None)
        }
        HalftoneEffect::Newspaper => screen(
            img,
            &tone,
            &p,
            Screen::Dots,
            NEWSPAPER_CELL,
            p.sharpness * 0.8,
            Some((NEWSPAPER_INK, NEWSPAPER_PAPER)),
        ),
        HalftoneEffect::BayerDithering => ordered(img, &tone, |x, y| {
            BAYER4[y % 4][x % 4] as f32 / 16.0
        }),
        HalftoneEffect::OrderedDithering => ordered(img, &tone, |x, y| {
            BAYER8[y % 8][x % 8] as f32 / 64.0
        }),
        HalftoneEffect::FloydSteinberg => floyd_steinberg(img, tone),
        HalftoneEffect::Crosshatch => crosshatch(img, &tone, &p),
    };
    Ok(out)
}

#[inline]
fn adjust_tone(l: f32, contrast: f32) -> f32 {
    clamp01((clamp01(l) - 0.5) * contrast + 0.5)
}

#[inline]
fn write_rgb(px: &mut [f32], rgb: [f32; 3]) {
    px[..3].copy_from_slice(&rgb);
}

fn screen(
    img: &Image,
    tone: &[f32],
    p: &HalftoneParams,
    shape: Screen,
    size: f32,
    sharpness: f32,
    palette: Option<([f32; 3], [f32; 3])>,
) -> Image {
    let grid = CellGrid::build(img, tone, size, p.angle);
    let (ink, paper) = palette.unwrap_or((INK, PAPER));
    let colorize = p.colorize && palette.is_none();
    let ch = img.channels();
    let w = img.width();
    let mut out = img.clone();

    for_each_row(out.data_mut(), w as usize * ch, |y, row| {
        for x in 0..w {
            let (idx, du, dv) = grid.locate(x, y as u32);
            let darkness = 1.0 - grid.mean_luma[idx];
            let inked = match shape {
                Screen::Dots => {
                    let radius = size / 2.0 * std::f32::consts::SQRT_2 * darkness * sharpness;
                    (du * du + dv * dv).sqrt() < radius
                }
                Screen::Lines => dv.abs() < size / 2.0 * darkness * sharpness,
            };
            let color = match (inked, colorize) {
                (true, true) => grid.mean_rgb[idx],
                (true, false) => ink,
                (false, _) => paper,
            };
            let i = x as usize * ch;
            write_rgb(&mut row[i..i + ch], color);
        }
    });
    out
}

fn ordered<F>(img: &Image, tone: &[f32], threshold: F) -> Image
where
    F: Fn(usize, usize) -> f32 + Sync + Send,
{
    let ch = img.channels();
    let w = img.width() as usize;
    let mut out = img.clone();
    for_each_row(out.data_mut(), w * ch, |y, row| {
        for x in 0..w {
            let color = if tone[y * w + x] > threshold(x, y) { PAPER } else { INK };
            write_rgb(&mut row[x * ch..(x + 1) * ch], color);
        }
    });
    out
}

/// Error diffusion in strict raster order; never parallel.
fn floyd_steinberg(img: &Image, mut work: Vec<f32>) -> Image {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let ch = img.channels();
    let mut out = img.clone();
    let data = out.data_mut();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let old = work[i];
            let new = if old > 0.5 { 1.0 } else { 0.0 };
            let err = old - new;
            work[i] = new;

            if x + 1 < w {
                work[i + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < h {
                let below = i + w;
                if x > 0 {
                    work[below - 1] += err * 3.0 / 16.0;
                }
                work[below] += err * 5.0 / 16.0;
                if x + 1 < w {
                    work[below + 1] += err * 1.0 / 16.0;
                }
            }
            data[i * ch..i * ch + 3].fill(new);
        }
    }
    out
}

fn crosshatch(img: &Image, tone: &[f32], p: &HalftoneParams) -> Image {
    let size = p.dot_size as f32;
    let passes: Vec<(f32, f32, f32)> = HATCH_LEVELS
        .iter()
        .enumerate()
        .map(|(k, &level)| {
            let (sin, cos) = (p.angle + 45.0 * k as f32).to_radians().sin_cos();
            (sin, cos, level)
        })
        .collect();
    trace!(passes = passes.len(), size, "crosshatch");

    let ch = img.channels();
    let w = img.width() as usize;
    let (colorize, sharpness) = (p.colorize, p.sharpness);
    let mut out = img.clone();

    for_each_row(out.data_mut(), w * ch, |y, row| {
        for x in 0..w {
            let l = tone[y * w + x];
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let inked = passes.iter().any(|&(sin, cos, level)| {
                if l >= level {
                    return false;
                }
                let v = -px * sin + py * cos;
                let r = v.rem_euclid(size);
                let dist = r.min(size - r);
                dist < size / 2.0 * (level - l) / level * sharpness
            });
            let i = x * ch;
            let px_out = &mut row[i..i + ch];
            let color = match (inked, colorize) {
                (true, true) => {
                    let c = &px_out[..3];
                    [clamp01(c[0]), clamp01(c[1]), clamp01(c[2])]
                }
                (true, false) => INK,
                (false, _) => PAPER,
            };
            write_rgb(px_out, color);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(w: u32, h: u32, v: f32) -> Image {
        Image::filled(w, h, &[v, v, v]).unwrap()
    }

    fn run(img: &Image, effect: HalftoneEffect) -> Image {
        let p = HalftoneParams { effect, ..Default::default() };
        halftone(img, &p).unwrap()
    }

    fn ink_count(img: &Image) -> usize {
        (0..img.height())
            .flat_map(|y| (0..img.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| img.rgb(x, y) == INK)
            .count()
    }

    #[test]
    fn test_effect_names() {
        assert_eq!(HalftoneEffect::ALL.len(), 7);
        for e in HalftoneEffect::ALL {
            assert_eq!(e.as_str().parse::<HalftoneEffect>().unwrap(), *e);
        }
        assert!("halftone".parse::<HalftoneEffect>().is_err());
    }

    #[test]
    fn test_shape_and_alpha_preserved() {
        let img = Image::filled(13, 9, &[0.3, 0.6, 0.2, 0.4]).unwrap();
        for e in HalftoneEffect::ALL {
            let out = run(&img, *e);
            assert_eq!(out.dimensions(), (13, 9), "{e}");
            assert_eq!(out.channels(), 4);
            assert!(out.data().chunks(4).all(|px| px[3] == 0.4), "{e}");
        }
    }

    #[test]
    fn test_bayer_half_gray() {
        let out = run(&gray(4, 4, 0.5), HalftoneEffect::BayerDithering);
        assert_eq!(ink_count(&out), 8);
        let out = run(&gray(8, 8, 0.5), HalftoneEffect::OrderedDithering);
        assert_eq!(ink_count(&out), 32);
    }

    #[test]
    fn test_floyd_steinberg_binary_and_repeatable() {
        let mut img = Image::new(23, 17, 3).unwrap();
        for y in 0..17 {
            for x in 0..23 {
                let v = (x + y * 23) as f32 / (23.0 * 17.0);
                img.set_pixel(x, y, &[v, v * 0.5, 1.0 - v]);
            }
        }
        let a = run(&img, HalftoneEffect::FloydSteinberg);
        let b = run(&img, HalftoneEffect::FloydSteinberg);
        assert_eq!(a.to_u8(), b.to_u8());
        assert!(a.data().iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_floyd_steinberg_preserves_mean() {
        let out = run(&gray(32, 32, 0.25), HalftoneEffect::FloydSteinberg);
        let white = out.pixel_count() - ink_count(&out);
        let ratio = white as f32 / out.pixel_count() as f32;
        assert!((ratio - 0.25).abs() < 0.05, "ratio {ratio}");
    }

    #[test]
    fn test_dots_extremes() {
        let p = HalftoneParams { angle: 0.0, ..Default::default() };
        let black = halftone(&gray(16, 16, 0.0), &p).unwrap();
        assert_eq!(ink_count(&black), 256);
        let white = halftone(&gray(16, 16, 1.0), &p).unwrap();
        assert_eq!(ink_count(&white), 0);
    }

    #[test]
    fn test_dots_coverage_tracks_darkness() {
        let light = ink_count(&run(&gray(32, 32, 0.8), HalftoneEffect::HalftoneDots));
        let dark = ink_count(&run(&gray(32, 32, 0.3), HalftoneEffect::HalftoneDots));
        assert!(dark > light, "dark {dark} light {light}");
    }

    #[test]
    fn test_lines_extremes() {
        let p = HalftoneParams {
            effect: HalftoneEffect::HalftoneLines,
            angle: 0.0,
            ..Default::default()
        };
        let black = halftone(&gray(12, 12, 0.0), &p).unwrap();
        assert_eq!(ink_count(&black), 144);
        let white = halftone(&gray(12, 12, 1.0), &p).unwrap();
        assert_eq!(ink_count(&white), 0);
    }

    #[test]
    fn test_newspaper_palette() {
        let out = run(&gray(8, 8, 1.0), HalftoneEffect::Newspaper);
        assert!((0..8).all(|x| out.rgb(x, 3) == NEWSPAPER_PAPER));
        let out = run(&gray(8, 8, 0.0), HalftoneEffect::Newspaper);
        let inked = (0..8).filter(|&x| out.rgb(x, 3) == NEWSPAPER_INK).count();
        assert!(inked > 0);
    }

    #[test]
    fn test_colorize_uses_cell_color() {
        let img = Image::filled(16, 16, &[0.9, 0.1, 0.1]).unwrap();
        let p = HalftoneParams { colorize: true, ..Default::default() };
        let out = halftone(&img, &p).unwrap();
        let mut inked = 0;
        for y in 0..16 {
            for x in 0..16 {
                let c = out.rgb(x, y);
                assert!(c == PAPER || (c[0] - 0.9).abs() < 1e-5, "{c:?}");
                if c != PAPER {
                    inked += 1;
                }
            }
        }
        assert!(inked > 0);
    }

    #[test]
    fn test_crosshatch_density() {
        let white = run(&gray(24, 24, 1.0), HalftoneEffect::Crosshatch);
        assert_eq!(ink_count(&white), 0);
        let mid = ink_count(&run(&gray(24, 24, 0.5), HalftoneEffect::Crosshatch));
        let dark = ink_count(&run(&gray(24, 24, 0.1), HalftoneEffect::Crosshatch));
        assert!(dark > mid, "dark {dark} mid {mid}");
        assert!(mid > 0);
    }

    #[test]
    fn test_contrast_pushes_tone() {
        assert!(adjust_tone(0.6, 2.0) > adjust_tone(0.6, 1.0));
        assert_eq!(adjust_tone(1.0, 2.0), 1.0);
        assert_eq!(adjust_tone(0.5, 0.5), 0.5);
    }

    #[test]
    fn test_params_clamped() {
        let p = HalftoneParams {
            dot_size: 100,
            angle: f32::NAN,
            sharpness: 0.0,
            contrast: 9.0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(p.dot_size, 20);
        assert_eq!(p.angle, 45.0);
        assert_eq!(p.sharpness, 0.1);
        assert_eq!(p.contrast, 2.0);
    }
}
