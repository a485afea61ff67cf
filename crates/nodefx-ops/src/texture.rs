//! Procedural nebula/texture generator.
//!
//! Builds an RGB image from seeded fractal noise:
//!
//! 1. Optional domain warp of the sample coordinates
//! 2. fBm of the shaped noise, remapped to `[0, 1]`
//! 3. A [`ColorMode`] turns the value (or a geometric gradient) into `t`
//! 4. Brightness, contrast and gamma on `t`, then a color lookup
//! 5. Optional star field
//! 6. Vignette, bloom and chromatic tint
//!
//! # Example
//!
//! ```rust
//! use nodefx_ops::texture::{generate, ColorMode, TextureParams};
//!
//! let params = TextureParams {
//!     width: 64,
//!     height: 64,
//!     color_mode: ColorMode::Rainbow,
//!     seed: 7,
//!     ..Default::default()
//! };
//! let img = generate(&params).unwrap();
//! assert_eq!(img.dimensions(), (64, 64));
//! ```

use crate::grade::clamp_or;
use crate::noise::{Fbm, Noise2D, NoiseType, Perlin, Shaped};
use crate::parallel::for_each_row;
use crate::rng::HashRng;
use crate::OpsResult;
use nodefx_core::{Image, clamp01, hsl_to_rgb};
use std::f32::consts::PI;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Positions of the five color stops.
pub const STOP_POSITIONS: [f32; 5] = [0.0, 0.3, 0.6, 0.8, 1.0];

const WARP_AMPLITUDE: f32 = 50.0;
const WARP_AXIS_OFFSET: f32 = 1000.0;
const PLASMA_FREQ: f32 = 0.02;

/// How the noise value becomes a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "&'static str")
)]
pub enum ColorMode {
    /// Noise through the color stops.
    #[default]
    Custom,
    /// Noise as hue.
    Rainbow,
    /// Noise as hue over 300 degrees, lighter at the top.
    Spectrum,
    /// Distance from center through the stops.
    Radial,
    /// Angle around center through the stops.
    Angular,
    /// Rotated linear ramp through the stops.
    Gradient,
    /// Average of noise and radial distance.
    Dual,
    /// Noise mixed with a sine plasma.
    Plasma,
}

crate::host_names!(ColorMode, "color mode", {
    Custom => "custom",
    Rainbow => "rainbow",
    Spectrum => "spectrum",
    Radial => "radial",
    Angular => "angular",
    Gradient => "gradient",
    Dual => "dual",
    Plasma => "plasma",
});

/// Star field settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StarParams {
    /// Stars per pixel, [0, 0.01].
    pub density: f32,
    /// Peak star brightness, [0, 1].
    pub brightness: f32,
    /// Random hue per star instead of white.
    pub colored: bool,
    /// Give one star in ten a soft halo.
    pub twinkle: bool,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            density: 0.001,
            brightness: 0.8,
            colored: false,
            twinkle: false,
        }
    }
}

/// Post effects. Each intensity is used only when its flag is set.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PostParams {
    /// Brighten already-bright pixels.
    pub bloom: bool,
    /// [0, 1].
    pub bloom_intensity: f32,
    /// Darken toward the corners.
    pub vignette: bool,
    /// [0, 1].
    pub vignette_intensity: f32,
    /// Shift red/blue balance across the width.
    pub chromatic: bool,
    /// [0, 0.5].
    pub chromatic_intensity: f32,
}

impl Default for PostParams {
    fn default() -> Self {
        Self {
            bloom: false,
            bloom_intensity: 0.5,
            vignette: false,
            vignette_intensity: 0.3,
            chromatic: false,
            chromatic_intensity: 0.1,
        }
    }
}

/// Texture generator parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextureParams {
    /// Output width, [64, 4096].
    pub width: u32,
    /// Output height, [64, 4096].
    pub height: u32,
    /// Base noise frequency, [0.001, 0.05].
    pub scale: f32,
    /// fBm octaves, [1, 8].
    pub octaves: u32,
    /// Amplitude falloff per octave, [0.1, 1].
    pub persistence: f32,
    /// Frequency growth per octave, [1, 3].
    pub lacunarity: f32,
    /// Noise and star seed.
    pub seed: u32,
    /// Color mapping.
    pub color_mode: ColorMode,
    /// Noise shaping.
    pub noise_type: NoiseType,
    /// Colors at [`STOP_POSITIONS`].
    pub colors: [[f32; 3]; 5],
    /// Degrees, [0, 360]. Used by `angular` and `gradient`.
    pub gradient_rotation: f32,
    /// [0.1, 3]. Used by `radial` and `gradient`.
    pub gradient_scale: f32,
    /// Degrees, [0, 360]. Used by `rainbow` and `spectrum`.
    pub hue_shift: f32,
    /// [-1, 1]. Used by `spectrum`.
    pub saturation_boost: f32,
    /// [0.1, 2].
    pub brightness: f32,
    /// Exponent on `t`, [0.1, 3].
    pub contrast: f32,
    /// [0.1, 3].
    pub gamma: f32,
    /// Invert the final colors before stars.
    pub invert: bool,
    /// Domain warp strength, [0, 2]; 0 disables.
    pub warp_strength: f32,
    /// Domain warp frequency, [0.001, 0.05].
    pub warp_frequency: f32,
    /// Star field.
    pub stars: StarParams,
    /// Post effects.
    pub post: PostParams,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            scale: 0.01,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 0,
            color_mode: ColorMode::Custom,
            noise_type: NoiseType::Perlin,
            colors: [
                [0.02, 0.02, 0.06],
                [0.10, 0.06, 0.24],
                [0.47, 0.16, 0.59],
                [1.0, 0.39, 0.78],
                [1.0, 1.0, 1.0],
            ],
            gradient_rotation: 0.0,
            gradient_scale: 1.0,
            hue_shift: 0.0,
            saturation_boost: 0.0,
            brightness: 1.0,
            contrast: 1.0,
            gamma: 1.0,
            invert: false,
            warp_strength: 0.0,
            warp_frequency: 0.01,
            stars: StarParams::default(),
            post: PostParams::default(),
        }
    }
}

impl TextureParams {
    /// Returns a copy with every field clamped into range.
    pub fn clamped(&self) -> Self {
        let d = Self::default();
        let mut colors = self.colors;
        for c in colors.iter_mut().flatten() {
            *c = clamp_or(*c, 0.0, 1.0, 0.0);
        }
        Self {
            width: self.width.clamp(64, 4096),
            height: self.height.clamp(64, 4096),
            scale: clamp_or(self.scale, 0.001, 0.05, d.scale),
            octaves: self.octaves.clamp(1, 8),
            persistence: clamp_or(self.persistence, 0.1, 1.0, d.persistence),
            lacunarity: clamp_or(self.lacunarity, 1.0, 3.0, d.lacunarity),
            seed: self.seed,
            color_mode: self.color_mode,
            noise_type: self.noise_type,
            colors,
            gradient_rotation: clamp_or(self.gradient_rotation, 0.0, 360.0, 0.0),
            gradient_scale: clamp_or(self.gradient_scale, 0.1, 3.0, 1.0),
            hue_shift: clamp_or(self.hue_shift, 0.0, 360.0, 0.0),
            saturation_boost: clamp_or(self.saturation_boost, -1.0, 1.0, 0.0),
            brightness: clamp_or(self.brightness, 0.1, 2.0, 1.0),
            contrast: clamp_or(self.contrast, 0.1, 3.0, 1.0),
            gamma: clamp_or(self.gamma, 0.1, 3.0, 1.0),
            invert: self.invert,
            warp_strength: clamp_or(self.warp_strength, 0.0, 2.0, 0.0),
            warp_frequency: clamp_or(self.warp_frequency, 0.001, 0.05, d.warp_frequency),
            stars: StarParams {
                density: clamp_or(self.stars.density, 0.0, 0.01, 0.0),
                brightness: clamp_or(self.stars.brightness, 0.0, 1.0, d.stars.brightness),
                ..self.stars
            },
            post: PostParams {
                bloom_intensity: clamp_or(self.post.bloom_intensity, 0.0, 1.0, 0.0),
                vignette_intensity: clamp_or(self.post.vignette_intensity, 0.0, 1.0, 0.0),
                chromatic_intensity: clamp_or(self.post.chromatic_intensity, 0.0, 0.5, 0.0),
                ..self.post
            },
        }
    }
}

#[inline]
fn tuple_rgb((r, g, b): (f32, f32, f32)) -> [f32; 3] {
    [r, g, b]
}

/// Linear interpolation through the five stops. `t` is clamped to [0, 1].
pub fn interpolate_stops(colors: &[[f32; 3]; 5], t: f32) -> [f32; 3] {
    let t = clamp01(t);
    for i in 0..STOP_POSITIONS.len() - 1 {
        let (p1, p2) = (STOP_POSITIONS[i], STOP_POSITIONS[i + 1]);
        if t >= p1 && t <= p2 {
            let local = if p2 > p1 { (t - p1) / (p2 - p1) } else { 0.0 };
            let (a, b) = (colors[i], colors[i + 1]);
            return [
                a[0] + (b[0] - a[0]) * local,
                a[1] + (b[1] - a[1]) * local,
                a[2] + (b[2] - a[2]) * local,
            ];
        }
    }
    colors[4]
}

fn colorize(p: &TextureParams, t: f32) -> [f32; 3] {
    let t = clamp01(t);
    match p.color_mode {
        ColorMode::Rainbow => tuple_rgb(hsl_to_rgb(t + p.hue_shift / 360.0, 1.0, 0.5)),
        ColorMode::Spectrum => tuple_rgb(hsl_to_rgb(
            t * 300.0 / 360.0 + p.hue_shift / 360.0,
            0.8 + p.saturation_boost * 0.2,
            0.4 + t * 0.4,
        )),
        _ => interpolate_stops(&p.colors, t),
    }
}

/// Generates a texture.
pub fn generate(params: &TextureParams) -> OpsResult<Image> {
    let p = params.clamped();
    debug!(
        width = p.width,
        height = p.height,
        seed = p.seed,
        color_mode = p.color_mode.as_str(),
        noise_type = p.noise_type.as_str(),
        "generate texture"
    );

    let perlin = Perlin::new(p.seed);
    let fbm = Fbm::new(Shaped { perlin: &perlin, kind: p.noise_type })
        .octaves(p.octaves)
        .persistence(p.persistence)
        .lacunarity(p.lacunarity);

    let (w, h) = (p.width as usize, p.height as usize);
    let (wf, hf) = (p.width as f32, p.height as f32);
    let (cx, cy) = (wf / 2.0, hf / 2.0);
    let (sin_rot, cos_rot) = p.gradient_rotation.to_radians().sin_cos();

    let mut img = Image::new(p.width, p.height, 3)?;
    for_each_row(img.data_mut(), w * 3, |y, row| {
        let yf = y as f32;
        for x in 0..w {
            let xf = x as f32;
            let (mut sx, mut sy) = (xf, yf);
            if p.warp_strength > 0.0 {
                let f = p.warp_frequency;
                sx += p.warp_strength * perlin.sample(xf * f, yf * f) * WARP_AMPLITUDE;
                sy += p.warp_strength
                    * perlin.sample((xf + WARP_AXIS_OFFSET) * f, yf * f)
                    * WARP_AMPLITUDE;
            }
            let noise = (fbm.sample(sx * p.scale, sy * p.scale) + 1.0) / 2.0;

            let (dx, dy) = (xf - cx, yf - cy);
            let t = match p.color_mode {
                ColorMode::Radial => ((dx / wf).powi(2) + (dy / hf).powi(2)).sqrt() * p.gradient_scale,
                ColorMode::Angular => {
                    let a = (dy.atan2(dx) + PI) / (2.0 * PI);
                    (a + p.gradient_rotation / 360.0).rem_euclid(1.0)
                }
                ColorMode::Gradient => {
                    let rotated = dx * cos_rot - dy * sin_rot;
                    (rotated / wf + 0.5) * p.gradient_scale
                }
                ColorMode::Dual => (noise + ((dx / wf).powi(2) + (dy / hf).powi(2)).sqrt()) * 0.5,
                ColorMode::Plasma => {
                    let plasma = (xf * PLASMA_FREQ).sin() * (yf * PLASMA_FREQ).cos()
                        + ((xf * xf + yf * yf).sqrt() * PLASMA_FREQ).sin();
                    (noise + plasma * 0.5) * 0.5
                }
                ColorMode::Custom | ColorMode::Rainbow | ColorMode::Spectrum => noise,
            };

            let t = (t * p.brightness).max(0.0).powf(p.contrast).powf(1.0 / p.gamma);
            let mut rgb = colorize(&p, t);
            if p.invert {
                rgb = rgb.map(|c| 1.0 - c);
            }
            row[x * 3..x * 3 + 3].copy_from_slice(&rgb);
        }
    });

    if p.stars.density > 0.0 {
        scatter_stars(&mut img, &p);
    }
    post_process(&mut img, &p.post);
    Ok(img)
}

fn add_light(img: &mut Image, x: usize, y: usize, rgb: [f32; 3], amount: f32) {
    let px = img.pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        px[c] = (px[c] + rgb[c] * amount).min(1.0);
    }
}

/// Star scatter is sequential: every star draws from one seeded stream.
fn scatter_stars(img: &mut Image, p: &TextureParams) {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let count = (w as f64 * h as f64 * p.stars.density as f64) as usize;
    trace!(count, "stars");

    let mut rng = HashRng::new(p.seed);
    let star_color = |rng: &mut HashRng| {
        if p.stars.colored {
            tuple_rgb(hsl_to_rgb(rng.next_f32(), 0.8, 0.7))
        } else {
            [1.0; 3]
        }
    };

    for _ in 0..count {
        let x = rng.index(w);
        let y = rng.index(h);
        let brightness = rng.next_f32() * p.stars.brightness;
        let color = star_color(&mut rng);
        add_light(img, x, y, color, brightness);

        if p.stars.twinkle && rng.next_f32() < 0.1 {
            let size = 1 + rng.index(2) as i64;
            for dx in -size..=size {
                for dy in -size..=size {
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let dist = ((dx * dx + dy * dy) as f32).sqrt();
                    let falloff = (1.0 - dist / size as f32).max(0.0);
                    let color = star_color(&mut rng);
                    add_light(img, nx as usize, ny as usize, color, brightness * falloff * 0.5);
                }
            }
        }
    }
}

fn post_process(img: &mut Image, post: &PostParams) {
    if !(post.vignette || post.bloom || post.chromatic) {
        for v in img.data_mut() {
            *v = clamp01(*v);
        }
        return;
    }
    let (w, h) = (img.width() as usize, img.height() as usize);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let max_dist = (cx * cx + cy * cy).sqrt();
    let post = *post;
    trace!(bloom = post.bloom, vignette = post.vignette, chromatic = post.chromatic, "texture post");

    for_each_row(img.data_mut(), w * 3, |y, row| {
        let dy = y as f32 - cy;
        for x in 0..w {
            let dx = x as f32 - cx;
            let px = &mut row[x * 3..x * 3 + 3];
            let [mut r, mut g, mut b] = [px[0], px[1], px[2]];

            if post.vignette {
                let k = 1.0 - (dx * dx + dy * dy).sqrt() / max_dist * post.vignette_intensity;
                r *= k;
                g *= k;
                b *= k;
            }
            if post.bloom {
                let mean = (r + g + b) / 3.0;
                if mean > 200.0 / 255.0 {
                    let boost = mean * post.bloom_intensity * 0.1;
                    r = (r + boost).min(1.0);
                    g = (g + boost).min(1.0);
                    b = (b + boost).min(1.0);
                }
            }
            if post.chromatic {
                let shift = dx * post.chromatic_intensity * 2.0 * 0.01;
                r *= 1.0 + shift * 0.1;
                b *= 1.0 - shift * 0.1;
            }
            px.copy_from_slice(&[clamp01(r), clamp01(g), clamp01(b)]);
        }
    });
}
