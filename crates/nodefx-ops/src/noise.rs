//! Seeded 2-D gradient noise.
//!
//! [`Perlin`] builds its gradient and permutation tables from a `u32`
//! seed, so two generators with the same seed agree everywhere.
//! [`Fbm`] layers octaves of any [`Noise2D`] source; [`NoiseType`] selects
//! the shaping applied to each raw sample by the texture generator.
//!
//! ```
//! use nodefx_ops::noise::{Fbm, Noise2D, Perlin};
//!
//! let perlin = Perlin::new(7);
//! let fbm = Fbm::new(&perlin).octaves(4);
//! let v = fbm.sample(3.2, 1.7);
//! assert!(v.abs() <= 1.0);
//! ```

use crate::rng::HashRng;
use std::f32::consts::TAU;

/// Trait for 2D noise functions.
pub trait Noise2D {
    /// Sample the noise at position (x, y). Roughly in `[-1, 1]`.
    fn sample(&self, x: f32, y: f32) -> f32;
}

impl<N: Noise2D + ?Sized> Noise2D for &N {
    #[inline]
    fn sample(&self, x: f32, y: f32) -> f32 {
        (**self).sample(x, y)
    }
}

/// Classic gradient noise over a seeded table of 256 unit gradients.
#[derive(Clone)]
pub struct Perlin {
    gradients: [[f32; 2]; 256],
    perm: [u8; 512],
}

impl std::fmt::Debug for Perlin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Perlin").finish_non_exhaustive()
    }
}

impl Perlin {
    /// Builds the gradient and permutation tables for `seed`.
    pub fn new(seed: u32) -> Self {
        let mut rng = HashRng::new(seed);

        let mut gradients = [[0.0f32; 2]; 256];
        for g in gradients.iter_mut() {
            let angle = rng.next_f32() * TAU;
            *g = [angle.cos(), angle.sin()];
        }

        // Fisher-Yates shuffle, then doubled so lookups never wrap
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        for i in (1..256).rev() {
            let j = rng.index(i + 1);
            table.swap(i, j);
        }
        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);

        Self { gradients, perm }
    }

    #[inline]
    fn corner(&self, hash: usize, x: f32, y: f32) -> f32 {
        let g = self.gradients[self.perm[hash] as usize];
        g[0] * x + g[1] * y
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

impl Noise2D for Perlin {
    fn sample(&self, x: f32, y: f32) -> f32 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let x = x - xf;
        let y = y - yf;

        let u = fade(x);
        let v = fade(y);

        let a = self.perm[xi] as usize + yi;
        let b = self.perm[xi + 1] as usize + yi;

        lerp(
            lerp(self.corner(a, x, y), self.corner(b, x - 1.0, y), u),
            lerp(
                self.corner(a + 1, x, y - 1.0),
                self.corner(b + 1, x - 1.0, y - 1.0),
                u,
            ),
            v,
        )
    }
}

/// Shaping applied to each raw noise sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum NoiseType {
    /// Raw gradient noise.
    #[default]
    Perlin,
    /// Average of the sample and a sample at `sqrt(2)` times the coordinates.
    Simplex,
    /// `1 - |n|`.
    Ridged,
    /// `|n|`.
    Billow,
    /// `2|n| - 1`.
    Turbulence,
}

crate::host_names!(NoiseType, "noise type", {
    Perlin => "perlin",
    Simplex => "simplex",
    Ridged => "ridged",
    Billow => "billow",
    Turbulence => "turbulence",
});

/// A [`Perlin`] source with a [`NoiseType`] shaping applied.
#[derive(Debug, Clone, Copy)]
pub struct Shaped<'a> {
    /// Underlying noise.
    pub perlin: &'a Perlin,
    /// Shaping.
    pub kind: NoiseType,
}

impl Noise2D for Shaped<'_> {
    fn sample(&self, x: f32, y: f32) -> f32 {
        let n = self.perlin.sample(x, y);
        match self.kind {
            NoiseType::Perlin => n,
            NoiseType::Simplex => {
                (n + self.perlin.sample(x * std::f32::consts::SQRT_2, y * std::f32::consts::SQRT_2))
                    * 0.5
            }
            NoiseType::Ridged => 1.0 - n.abs(),
            NoiseType::Billow => n.abs(),
            NoiseType::Turbulence => n.abs() * 2.0 - 1.0,
        }
    }
}

/// Fractal Brownian motion: octaves of a base noise, normalized by total amplitude.
#[derive(Debug, Clone, Copy)]
pub struct Fbm<N> {
    /// Base noise function.
    pub noise: N,
    /// Number of noise layers.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
}

impl<N> Fbm<N> {
    /// Creates a new fBm with default parameters (4 octaves, 2.0 lacunarity, 0.5 persistence).
    pub fn new(noise: N) -> Self {
        Self {
            noise,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }

    /// Sets the number of octaves.
    pub fn octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves;
        self
    }

    /// Sets the lacunarity (frequency multiplier per octave).
    pub fn lacunarity(mut self, lacunarity: f32) -> Self {
        self.lacunarity = lacunarity;
        self
    }

    /// Sets the persistence (amplitude multiplier per octave).
    pub fn persistence(mut self, persistence: f32) -> Self {
        self.persistence = persistence;
        self
    }
}

impl<N: Noise2D> Noise2D for Fbm<N> {
    fn sample(&self, x: f32, y: f32) -> f32 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.octaves {
            value += self.noise.sample(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        if max_value > 0.0 { value / max_value } else { 0.0 }
    }
}
