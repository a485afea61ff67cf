//! Image info command.
//!
//! Displays dimensions, channel layout, file size and optional per-channel
//! statistics of the decoded image.

use crate::InfoArgs;
use anyhow::{Context, Result};
use nodefx_core::Image;
use std::fs;
use std::path::Path;

/// Per-channel (min, max, mean).
fn channel_stats(image: &Image) -> Vec<(f32, f32, f32)> {
    let ch = image.channels();
    (0..ch)
        .map(|c| {
            let mut min = f32::MAX;
            let mut max = f32::MIN;
            let mut sum = 0.0f64;
            for px in image.data().chunks_exact(ch) {
                min = min.min(px[c]);
                max = max.max(px[c]);
                sum += px[c] as f64;
            }
            (min, max, (sum / image.pixel_count() as f64) as f32)
        })
        .collect()
}

const CHANNEL_NAMES: [&str; 4] = ["R", "G", "B", "A"];

/// Runs the info command.
pub fn run(args: InfoArgs) -> Result<()> {
    for path in &args.input {
        let file_size = fs::metadata(path)
            .with_context(|| format!("Failed to stat: {}", path.display()))?
            .len();
        let image = super::load_image(path)?;

        if args.json {
            print_json(&args, path, &image, file_size)?;
        } else {
            print_text(&args, path, &image, file_size);
        }

        if args.input.len() > 1 && !args.json {
            println!();
        }
    }
    Ok(())
}

fn print_text(args: &InfoArgs, path: &Path, image: &Image, file_size: u64) {
    println!("{}", path.display());
    println!("  Resolution: {}x{}", image.width(), image.height());
    println!("  Channels:   {}", image.channels());
    println!("  Pixels:     {}", image.pixel_count());
    println!("  Megapixels: {:.3}", image.pixel_count() as f64 / (1024.0 * 1024.0));
    println!("  File size:  {}", format_size(file_size));

    if args.stats {
        for (name, (min, max, mean)) in CHANNEL_NAMES.iter().zip(channel_stats(image)) {
            println!("  {name}: min {min:.4}  max {max:.4}  mean {mean:.4}");
        }
    }
}

fn print_json(args: &InfoArgs, path: &Path, image: &Image, file_size: u64) -> Result<()> {
    let mut doc = serde_json::json!({
        "file": path.display().to_string(),
        "width": image.width(),
        "height": image.height(),
        "channels": image.channels(),
        "size_bytes": file_size,
    });
    if args.stats {
        let stats: serde_json::Map<String, serde_json::Value> = CHANNEL_NAMES
            .iter()
            .zip(channel_stats(image))
            .map(|(name, (min, max, mean))| {
                (name.to_string(), serde_json::json!({ "min": min, "max": max, "mean": mean }))
            })
            .collect();
        doc["stats"] = serde_json::Value::Object(stats);
    }
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_channel_stats() {
        let mut img = Image::filled(2, 1, &[0.0, 0.5, 1.0]).unwrap();
        img.set_pixel(1, 0, &[1.0, 0.5, 0.0]);
        let stats = channel_stats(&img);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0], (0.0, 1.0, 0.5));
        assert_eq!(stats[1], (0.5, 0.5, 0.5));
    }
}
