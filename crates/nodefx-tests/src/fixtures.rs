//! Synthetic input images shared by the integration tests and benchmarks.

use nodefx_core::Image;
use nodefx_ops::rng::hash_f32;

/// Diagonal RGB gradient; alpha (if any) ramps top to bottom.
pub fn gradient(width: u32, height: u32, channels: u8) -> Image {
    let mut img = blank(width, height, channels);
    let (fw, fh) = ((width.max(2) - 1) as f32, (height.max(2) - 1) as f32);
    for y in 0..height {
        for x in 0..width {
            let (u, v) = (x as f32 / fw, y as f32 / fh);
            let px = [u, v, (u + v) * 0.5, 1.0 - v * 0.5];
            img.set_pixel(x, y, &px[..channels as usize]);
        }
    }
    img
}

/// Black and white checkerboard with `cell`-pixel squares, opaque alpha.
pub fn checker(width: u32, height: u32, channels: u8, cell: u32) -> Image {
    let cell = cell.max(1);
    let mut img = blank(width, height, channels);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 { 1.0 } else { 0.0 };
            img.set_pixel(x, y, &[v, v, v, 1.0][..channels as usize]);
        }
    }
    img
}

/// Per-pixel hash noise, reproducible for a given seed.
pub fn hashed(width: u32, height: u32, channels: u8, seed: u32) -> Image {
    let mut img = blank(width, height, channels);
    let ch = channels as u32;
    for y in 0..height {
        for x in 0..width {
            let px: Vec<f32> = (0..ch)
                .map(|c| hash_f32(x * ch + c, y, seed))
                .collect();
            img.set_pixel(x, y, &px);
        }
    }
    img
}

fn blank(width: u32, height: u32, channels: u8) -> Image {
    Image::new(width, height, channels).expect("fixture dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_in_range() {
        for img in [gradient(9, 5, 4), checker(9, 5, 3, 2), hashed(9, 5, 4, 1)] {
            assert!(img.data().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_hashed_reproducible() {
        assert_eq!(hashed(6, 6, 3, 8), hashed(6, 6, 3, 8));
        assert_ne!(hashed(6, 6, 3, 8), hashed(6, 6, 3, 9));
    }
}
