//! Edge detection.
//!
//! Pipeline:
//!
//! 1. Rec.709 luma plane
//! 2. Gradient magnitude (Sobel, Prewitt, Scharr, Roberts, Laplacian) with
//!    border clamping, normalized by the image maximum; or Canny
//!    (Gaussian blur, Sobel, 4-bin non-maximum suppression, hysteresis)
//! 3. Binarize at the threshold
//! 4. Dilate `thickness - 1` times with a 3x3 structuring element
//! 5. Optional inversion
//! 6. Recolor: edge color where set, background elsewhere; alpha passes through
//!
//! # Example
//!
//! ```rust
//! use nodefx_core::Image;
//! use nodefx_ops::edge::{detect_edges, EdgeParams};
//!
//! let flat = Image::filled(16, 16, &[0.4, 0.4, 0.4]).unwrap();
//! let out = detect_edges(&flat, &EdgeParams::default()).unwrap();
//! // a uniform image has no edges: everything is background (white)
//! assert!(out.data().iter().all(|&v| v == 1.0));
//! ```

use crate::grade::clamp_or;
use crate::parallel::{for_each_row, map_plane};
use crate::OpsResult;
use nodefx_core::{Image, clamp01};
#[allow(unused_imports)]
use tracing::{debug, trace};

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const PREWITT_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]];
const PREWITT_KERNEL_Y: Kernel3 = [[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

const SCHARR_KERNEL_X: Kernel3 = [[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]];
const SCHARR_KERNEL_Y: Kernel3 = [[-3.0, -10.0, -3.0], [0.0, 0.0, 0.0], [3.0, 10.0, 3.0]];

const LAPLACIAN_KERNEL: Kernel3 = [[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]];

const GAUSSIAN_KERNEL: Kernel3 = [
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
];

const TAN_22_5_DEG: f32 = 0.41421356237;

/// Edge detection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum EdgeAlgorithm {
    /// 3x3 Sobel gradient.
    #[default]
    Sobel,
    /// 3x3 Prewitt gradient.
    Prewitt,
    /// 3x3 Scharr gradient.
    Scharr,
    /// 2x2 Roberts cross.
    Roberts,
    /// Absolute 4-neighbour Laplacian.
    Laplacian,
    /// Blur, Sobel, non-maximum suppression and hysteresis.
    Canny,
}

crate::host_names!(EdgeAlgorithm, "edge algorithm", {
    Sobel => "sobel",
    Prewitt => "prewitt",
    Scharr => "scharr",
    Roberts => "roberts",
    Laplacian => "laplacian",
    Canny => "canny",
});

/// Edge detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EdgeParams {
    /// Detector.
    pub algorithm: EdgeAlgorithm,
    /// Normalized magnitude threshold, [0, 1].
    pub threshold: f32,
    /// Line thickness in pixels, [1, 5].
    pub thickness: u32,
    /// Swap edge and background.
    pub invert: bool,
    /// RGB of edge pixels.
    pub edge_color: [f32; 3],
    /// RGB of non-edge pixels.
    pub background_color: [f32; 3],
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            algorithm: EdgeAlgorithm::Sobel,
            threshold: 0.2,
            thickness: 1,
            invert: false,
            edge_color: [0.0; 3],
            background_color: [1.0; 3],
        }
    }
}

impl EdgeParams {
    /// Returns a copy with every numeric field clamped into its range.
    pub fn clamped(&self) -> Self {
        Self {
            algorithm: self.algorithm,
            threshold: clamp_or(self.threshold, 0.0, 1.0, 0.2),
            thickness: self.thickness.clamp(1, 5),
            invert: self.invert,
            edge_color: self.edge_color.map(|c| clamp_or(c, 0.0, 1.0, 0.0)),
            background_color: self.background_color.map(|c| clamp_or(c, 0.0, 1.0, 1.0)),
        }
    }
}

/// Single-channel working buffer with clamped access.
struct Plane {
    w: usize,
    h: usize,
    data: Vec<f32>,
}

impl Plane {
    #[inline]
    fn at(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.w as isize - 1) as usize;
        let cy = y.clamp(0, self.h as isize - 1) as usize;
        self.data[cy * self.w + cx]
    }

    fn with_data(&self, data: Vec<f32>) -> Plane {
        Plane {
            w: self.w,
            h: self.h,
            data,
        }
    }
}

/// 3x3 convolution with border clamping.
fn convolve3(p: &Plane, k: &Kernel3) -> Vec<f32> {
    map_plane(p.w, p.h, |x, y| {
        let (x, y) = (x as isize, y as isize);
        let mut sum = 0.0;
        for (ky, row) in k.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                sum += p.at(x + kx as isize - 1, y + ky as isize - 1) * weight;
            }
        }
        sum
    })
}

/// Roberts cross, anchored so the 2x2 window covers (x-1..=x, y-1..=y).
fn roberts(p: &Plane) -> (Vec<f32>, Vec<f32>) {
    let gx = map_plane(p.w, p.h, |x, y| {
        let (x, y) = (x as isize, y as isize);
        p.at(x - 1, y - 1) - p.at(x, y)
    });
    let gy = map_plane(p.w, p.h, |x, y| {
        let (x, y) = (x as isize, y as isize);
        p.at(x, y - 1) - p.at(x - 1, y)
    });
    (gx, gy)
}

fn hypot_plane(gx: &[f32], gy: &[f32]) -> Vec<f32> {
    gx.iter().zip(gy).map(|(x, y)| (x * x + y * y).sqrt()).collect()
}

/// Divides by the maximum; an all-zero plane stays zero.
fn normalize_by_max(v: &mut [f32]) {
    let max = v.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for x in v.iter_mut() {
            *x /= max;
        }
    }
}

/// Normalized gradient magnitude for the non-Canny detectors.
fn gradient_magnitude(p: &Plane, algorithm: EdgeAlgorithm) -> Vec<f32> {
    let mut mag = match algorithm {
        EdgeAlgorithm::Sobel | EdgeAlgorithm::Canny => {
            hypot_plane(&convolve3(p, &SOBEL_KERNEL_X), &convolve3(p, &SOBEL_KERNEL_Y))
        }
        EdgeAlgorithm::Prewitt => {
            hypot_plane(&convolve3(p, &PREWITT_KERNEL_X), &convolve3(p, &PREWITT_KERNEL_Y))
        }
        EdgeAlgorithm::Scharr => {
            hypot_plane(&convolve3(p, &SCHARR_KERNEL_X), &convolve3(p, &SCHARR_KERNEL_Y))
        }
        EdgeAlgorithm::Roberts => {
            let (gx, gy) = roberts(p);
            hypot_plane(&gx, &gy)
        }
        EdgeAlgorithm::Laplacian => convolve3(p, &LAPLACIAN_KERNEL)
            .into_iter()
            .map(f32::abs)
            .collect(),
    };
    normalize_by_max(&mut mag);
    mag
}

/// Thins the magnitude to ridge pixels along the quantized gradient direction.
///
/// Ties are broken toward the first neighbour so a two-pixel plateau keeps
/// one pixel.
fn non_max_suppression(mag: &Plane, gx: &[f32], gy: &[f32]) -> Vec<f32> {
    map_plane(mag.w, mag.h, |x, y| {
        let i = y * mag.w + x;
        let m = mag.data[i];
        if m <= 0.0 {
            return 0.0;
        }
        let (gx, gy) = (gx[i], gy[i]);
        let (ax, ay) = (gx.abs(), gy.abs());
        let same_sign = (gx >= 0.0 && gy >= 0.0) || (gx <= 0.0 && gy <= 0.0);
        let (x, y) = (x as isize, y as isize);

        let ((x1, y1), (x2, y2)) = if ax >= ay && ay <= ax * TAN_22_5_DEG {
            ((x - 1, y), (x + 1, y))
        } else if ay > ax && ax <= ay * TAN_22_5_DEG {
            ((x, y - 1), (x, y + 1))
        } else if same_sign {
            ((x - 1, y - 1), (x + 1, y + 1))
        } else {
            ((x + 1, y - 1), (x - 1, y + 1))
        };

        if m >= mag.at(x1, y1) && m > mag.at(x2, y2) { m } else { 0.0 }
    })
}

/// Double-threshold hysteresis: strong pixels (`> high`) seed an 8-connected
/// flood through weak pixels (`> low`).
fn hysteresis(nms: &[f32], w: usize, h: usize, high: f32, low: f32) -> Vec<bool> {
    let mut out = vec![false; w * h];
    let mut stack: Vec<usize> = Vec::new();

    for (i, &m) in nms.iter().enumerate() {
        if m > high {
            out[i] = true;
            stack.push(i);
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = ((i % w) as isize, (i / w) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if !out[j] && nms[j] > low {
                    out[j] = true;
                    stack.push(j);
                }
            }
        }
    }

    out
}

fn canny(p: &Plane, threshold: f32) -> Vec<bool> {
    let blurred = p.with_data(convolve3(p, &GAUSSIAN_KERNEL));
    let gx = convolve3(&blurred, &SOBEL_KERNEL_X);
    let gy = convolve3(&blurred, &SOBEL_KERNEL_Y);
    let mut mag = hypot_plane(&gx, &gy);
    normalize_by_max(&mut mag);
    let nms = non_max_suppression(&p.with_data(mag), &gx, &gy);
    hysteresis(&nms, p.w, p.h, threshold, threshold / 2.0)
}

/// One pass of 3x3 binary dilation. Border pixels use the clamped neighbourhood.
fn dilate(mask: &[bool], w: usize, h: usize) -> Vec<bool> {
    map_plane(w, h, |x, y| {
        let x0 = x.saturating_sub(1);
        let x1 = (x + 1).min(w - 1);
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(h - 1);
        (y0..=y1).any(|yy| (x0..=x1).any(|xx| mask[yy * w + xx]))
    })
}

/// Computes the final edge mask (after threshold, dilation and inversion).
pub fn edge_mask(img: &Image, params: &EdgeParams) -> Vec<bool> {
    let p = params.clamped();
    let plane = Plane {
        w: img.width() as usize,
        h: img.height() as usize,
        data: img.luma_plane(),
    };

    let mut mask = match p.algorithm {
        EdgeAlgorithm::Canny => canny(&plane, p.threshold),
        algorithm => gradient_magnitude(&plane, algorithm)
            .into_iter()
            .map(|m| m > p.threshold)
            .collect(),
    };

    for _ in 1..p.thickness {
        mask = dilate(&mask, plane.w, plane.h);
    }

    if p.invert {
        mask.iter_mut().for_each(|m| *m = !*m);
    }

    trace!(
        edges = mask.iter().filter(|&&m| m).count(),
        "edge mask"
    );
    mask
}

/// Detects edges and renders them as a two-color image.
pub fn detect_edges(img: &Image, params: &EdgeParams) -> OpsResult<Image> {
    let p = params.clamped();
    debug!(
        width = img.width(),
        height = img.height(),
        algorithm = p.algorithm.as_str(),
        threshold = p.threshold,
        thickness = p.thickness,
        "detect_edges"
    );

    let mask = edge_mask(img, &p);
    let ch = img.channels();
    let w = img.width() as usize;
    let src = img.data();
    let edge = p.edge_color.map(clamp01);
    let background = p.background_color.map(clamp01);
    let mut out = img.blank_like();

    for_each_row(out.data_mut(), w * ch, |y, row| {
        for x in 0..w {
            let i = y * w + x;
            let px = &mut row[x * ch..(x + 1) * ch];
            px[..3].copy_from_slice(if mask[i] { &edge } else { &background });
            if ch == 4 {
                px[3] = src[i * 4 + 3];
            }
        }
    });

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_image(w: u32, h: u32, split: u32) -> Image {
        let mut img = Image::new(w, h, 4).unwrap();
        for y in 0..h {
            for x in 0..w {
                let v = if x < split { 0.0 } else { 1.0 };
                img.set_pixel(x, y, &[v, v, v, 0.6]);
            }
        }
        img
    }

    fn with(algorithm: EdgeAlgorithm) -> EdgeParams {
        EdgeParams {
            algorithm,
            ..Default::default()
        }
    }

    #[test]
    fn test_uniform_has_no_edges() {
        let img = Image::filled(12, 9, &[0.3, 0.5, 0.7]).unwrap();
        for algorithm in EdgeAlgorithm::ALL {
            let p = EdgeParams {
                threshold: 0.0,
                ..with(*algorithm)
            };
            assert!(edge_mask(&img, &p).iter().all(|&m| !m), "{algorithm}");
        }
    }

    #[test]
    fn test_step_edge_found_by_every_algorithm() {
        let img = step_image(16, 8, 8);
        for algorithm in EdgeAlgorithm::ALL {
            let mask = edge_mask(&img, &with(*algorithm));
            let row = &mask[4 * 16..5 * 16];
            assert!(row[7] || row[8], "{algorithm}");
            assert!(!row[0] && !row[15], "{algorithm}");
        }
    }

    #[test]
    fn test_canny_thin_line() {
        let img = step_image(20, 10, 10);
        let mask = edge_mask(&img, &with(EdgeAlgorithm::Canny));
        for y in 0..10 {
            let count = mask[y * 20..(y + 1) * 20].iter().filter(|&&m| m).count();
            assert_eq!(count, 1, "row {y}");
        }
    }

    #[test]
    fn test_thickness_monotonic() {
        let img = step_image(24, 12, 9);
        let mut previous = 0;
        for thickness in 1..=5 {
            let p = EdgeParams {
                thickness,
                ..Default::default()
            };
            let count = edge_mask(&img, &p).iter().filter(|&&m| m).count();
            assert!(count >= previous);
            previous = count;
        }
    }

    #[test]
    fn test_invert_and_colors() {
        let img = step_image(10, 4, 5);
        let p = EdgeParams {
            invert: true,
            edge_color: [1.0, 0.0, 0.0],
            background_color: [0.0, 0.0, 1.0],
            ..Default::default()
        };
        let out = detect_edges(&img, &p).unwrap();
        // far left is not an edge, inverted -> edge color
        assert_eq!(out.pixel(0, 0), &[1.0, 0.0, 0.0, 0.6]);
        assert_eq!(out.pixel(5, 1)[2], 1.0);
    }

    #[test]
    fn test_hysteresis_connects_weak() {
        // strong at 0, weak chain at 1..3, isolated weak at 6
        let nms = [0.9, 0.3, 0.3, 0.3, 0.0, 0.0, 0.3];
        let mask = hysteresis(&nms, 7, 1, 0.5, 0.25);
        assert_eq!(mask, vec![true, true, true, true, false, false, false]);
    }

    #[test]
    fn test_dilate_grows_borders() {
        let mut mask = vec![false; 9];
        mask[0] = true;
        let out = dilate(&mask, 3, 3);
        assert_eq!(
            out,
            vec![true, true, false, true, true, false, false, false, false]
        );
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("scharr".parse::<EdgeAlgorithm>().unwrap(), EdgeAlgorithm::Scharr);
        assert!("sobel5".parse::<EdgeAlgorithm>().is_err());
    }
}
