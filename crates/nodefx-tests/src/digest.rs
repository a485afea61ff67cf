//! Output digests for determinism checks.
//!
//! Engine output is quantized to 5 decimal places and hashed with SHA-256,
//! so two runs can be compared with a single string regardless of the
//! thread count they ran on.

use nodefx_core::Image;
use sha2::{Digest, Sha256};

/// Decimal places kept before hashing.
const HASH_PRECISION: i32 = 5;

/// SHA-256 of quantized float data, lowercase hex.
pub fn hash_f32(data: &[f32]) -> String {
    let factor = 10f64.powi(HASH_PRECISION);
    let bytes: Vec<u8> = data
        .iter()
        .map(|&v| (v as f64 * factor).round() as i64)
        .flat_map(|q| q.to_le_bytes())
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Digest of an image's dimensions, channel count and pixels.
pub fn image_digest(img: &Image) -> String {
    let header = [
        img.width() as f32,
        img.height() as f32,
        img.channels() as f32,
    ];
    let mut data = header.to_vec();
    data.extend_from_slice(img.data());
    hash_f32(&data)
}

/// Runs `f` on a dedicated rayon pool with `threads` workers.
pub fn on_threads<R: Send>(threads: usize, f: impl FnOnce() -> R + Send) -> R {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("rayon pool")
        .install(f)
}
