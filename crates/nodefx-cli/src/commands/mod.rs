//! CLI command implementations

pub mod blend;
pub mod crop;
pub mod distort;
pub mod edges;
pub mod grade;
pub mod halftone;
pub mod info;
pub mod scale;
pub mod texture;

use anyhow::{Context, Result, bail};
use nodefx_core::{Image, Mask};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Load image from path as 8-bit RGB or RGBA.
pub fn load_image(path: &Path) -> Result<Image> {
    let decoded =
        image::open(path).with_context(|| format!("Failed to load: {}", path.display()))?;
    let (w, h) = (decoded.width(), decoded.height());
    let img = if decoded.color().has_alpha() {
        Image::from_u8(w, h, 4, decoded.to_rgba8().as_raw())
    } else {
        Image::from_u8(w, h, 3, decoded.to_rgb8().as_raw())
    }
    .with_context(|| format!("Unsupported image: {}", path.display()))?;
    debug!(path = %path.display(), width = w, height = h, channels = img.channels(), "loaded");
    Ok(img)
}

/// Load a grayscale mask from path.
pub fn load_mask(path: &Path) -> Result<Mask> {
    let decoded =
        image::open(path).with_context(|| format!("Failed to load mask: {}", path.display()))?;
    let gray = decoded.to_luma32f();
    Mask::from_data(gray.width(), gray.height(), gray.into_raw())
        .with_context(|| format!("Unsupported mask: {}", path.display()))
}

/// Save image to path; the format follows the extension.
pub fn save_image(path: &Path, img: &Image) -> Result<()> {
    let (w, h) = img.dimensions();
    let bytes = img.to_u8();
    let result = if img.has_alpha() {
        image::RgbaImage::from_raw(w, h, bytes).map(|buf| buf.save(path))
    } else {
        image::RgbImage::from_raw(w, h, bytes).map(|buf| buf.save(path))
    };
    match result {
        Some(saved) => saved.with_context(|| format!("Failed to save: {}", path.display()))?,
        None => bail!("Buffer size mismatch while saving {}", path.display()),
    }
    info!(path = %path.display(), width = w, height = h, "saved");
    Ok(())
}

/// Load a parameter preset; `.json` is JSON, anything else YAML.
pub fn load_preset<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read preset: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let params = if is_json {
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON preset: {}", path.display()))?
    } else {
        serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML preset: {}", path.display()))?
    };
    Ok(params)
}

/// Preset from `path`, or the parameter defaults.
pub fn preset_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(p) => load_preset(p),
        None => Ok(T::default()),
    }
}

/// Parse "R,G,B" with components in [0, 1].
pub fn parse_rgb(s: &str) -> Result<[f32; 3]> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid color '{s}'"))?;
    match parts.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => bail!("Color '{s}' must have three components"),
    }
}
