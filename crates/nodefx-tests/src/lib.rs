//! Integration tests for the nodefx crates.
//!
//! This crate checks the cross-engine properties of `nodefx-ops` against
//! images built from `nodefx-core`, and pins engine determinism with SHA-256
//! digests of quantized output.

pub mod digest;
pub mod fixtures;

#[cfg(test)]
mod tests {
    use crate::fixtures::{checker, gradient, hashed};
    use approx::assert_abs_diff_eq;
    use nodefx_core::{Image, Mask, hsv_to_rgb, rgb_to_hsv};
    use nodefx_ops::composite::{BlendParams, blend_channel};
    use nodefx_ops::rng::HashRng;
    use nodefx_ops::*;

    #[test]
    fn test_neutral_grade_is_identity() {
        let img = hashed(48, 32, 4, 3);
        let out = grade(&img, &GradeParams::default()).unwrap();
        for (a, b) in img.data().iter().zip(out.data()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_white_inverted_is_black() {
        let img = Image::filled(8, 8, &[1.0, 1.0, 1.0]).unwrap();
        let params = GradeParams { invert: true, ..Default::default() };
        let out = grade(&img, &params).unwrap();
        assert!(out.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_hsv_roundtrip_seeded() {
        let mut rng = HashRng::new(2024);
        for _ in 0..10_000 {
            let (r, g, b) = (rng.next_f32(), rng.next_f32(), rng.next_f32());
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r2, g2, b2) = hsv_to_rgb(h, s, v);
            assert_abs_diff_eq!(r, r2, epsilon = 1e-6);
            assert_abs_diff_eq!(g, g2, epsilon = 1e-6);
            assert_abs_diff_eq!(b, b2, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_blend_boundaries() {
        assert_eq!(blend_channel(1.0, 0.0, BlendMode::Multiply), 0.0);
        assert_eq!(blend_channel(0.0, 1.0, BlendMode::Screen), 1.0);
        assert_eq!(blend_channel(0.3, 0.7, BlendMode::Darken), 0.3);
        assert_eq!(blend_channel(0.6, 0.6, BlendMode::Add), 1.0);
    }

    #[test]
    fn test_blend_opacity_extremes() {
        let base = gradient(16, 16, 3);
        let overlay = hashed(16, 16, 3, 9);
        for mode in BlendMode::ALL {
            let zero = blend(&base, &overlay, *mode, 0.0, None).unwrap();
            assert_eq!(zero, base, "{mode}");

            let full = blend(&base, &overlay, *mode, 1.0, None).unwrap();
            for y in 0..16 {
                for x in 0..16 {
                    let (a, b) = (base.rgb(x, y), overlay.rgb(x, y));
                    let px = full.rgb(x, y);
                    for c in 0..3 {
                        assert_abs_diff_eq!(px[c], blend_channel(a[c], b[c], *mode), epsilon = 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    fn test_difference_black_white_is_white() {
        let black = Image::filled(2, 2, &[0.0, 0.0, 0.0]).unwrap();
        let white = Image::filled(2, 2, &[1.0, 1.0, 1.0]).unwrap();
        let out = blend(&black, &white, BlendMode::Difference, 1.0, None).unwrap();
        assert!(out.data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_blend_with_region_mask() {
        let base = Image::filled(10, 10, &[0.0, 0.0, 0.0]).unwrap();
        let overlay = Image::filled(10, 10, &[1.0, 1.0, 1.0]).unwrap();
        let boxes = [region::RegionBox { x: 0.0, y: 0.0, w: 50.0, h: 100.0, ..Default::default() }];
        let mask = region::region_mask(&boxes, (100, 100), 10, 10).unwrap();
        let out = blend(&base, &overlay, BlendMode::Normal, 1.0, Some(&mask)).unwrap();
        assert_eq!(out.rgb(0, 0), [1.0; 3]);
        assert_eq!(out.rgb(9, 9), [0.0; 3]);
    }

    #[test]
    fn test_blend_mismatched_inputs() {
        let base = gradient(20, 10, 4);
        let overlay = checker(7, 5, 3, 1);
        let mask = Mask::filled(3, 3, 0.5).unwrap();
        let out = blend(&base, &overlay, BlendMode::Overlay, 0.8, Some(&mask)).unwrap();
        assert_eq!(out.dimensions(), (20, 10));
        assert_eq!(out.channels(), 4);
        for y in 0..10 {
            for x in 0..20 {
                assert_eq!(out.alpha(x, y), base.alpha(x, y));
            }
        }
    }

    #[test]
    fn test_uniform_image_has_no_edges() {
        let img = Image::filled(24, 24, &[0.4, 0.5, 0.6]).unwrap();
        for algorithm in EdgeAlgorithm::ALL {
            let params = EdgeParams { algorithm: *algorithm, threshold: 0.0, ..Default::default() };
            assert!(
                edge::edge_mask(&img, &params).iter().all(|&e| !e),
                "{algorithm}"
            );
            let out = detect_edges(&img, &params).unwrap();
            assert!(out.data().iter().all(|&v| v == 1.0), "{algorithm}");
        }
    }

    #[test]
    fn test_thickness_never_decreases_edges() {
        let img = checker(40, 40, 3, 8);
        for algorithm in EdgeAlgorithm::ALL {
            let mut last = 0;
            for thickness in 1..=5 {
                let params = EdgeParams { algorithm: *algorithm, thickness, ..Default::default() };
                let count = edge::edge_mask(&img, &params).iter().filter(|&&e| e).count();
                assert!(count >= last, "{algorithm} thickness {thickness}: {count} < {last}");
                last = count;
            }
            assert!(last > 0, "{algorithm} found no edges");
        }
    }

    #[test]
    fn test_floyd_steinberg_binary_and_stable() {
        let img = gradient(37, 23, 3);
        let params = HalftoneParams { effect: HalftoneEffect::FloydSteinberg, ..Default::default() };
        let a = halftone(&img, &params).unwrap();
        let b = halftone(&img, &params).unwrap();
        assert_eq!(a.to_u8(), b.to_u8());
        assert!(a.to_u8().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_mosaic_blocks_are_constant() {
        let img = hashed(32, 24, 3, 5);
        let params = DistortParams {
            kind: DistortKind::Mosaic,
            frequency: 8.0,
            ..Default::default()
        };
        let out = distort(&img, &params).unwrap();
        for by in (0..24).step_by(8) {
            for bx in (0..32).step_by(8) {
                let first = out.pixel(bx, by).to_vec();
                for y in by..by + 8 {
                    for x in bx..bx + 8 {
                        assert_eq!(out.pixel(x, y), first.as_slice());
                    }
                }
            }
        }
    }

    #[test]
    fn test_pixel_sort_preserves_row_multiset() {
        let img = hashed(50, 6, 3, 17);
        let params = DistortParams {
            kind: DistortKind::PixelSort,
            intensity: 80.0,
            frequency: 0.0,
            ..Default::default()
        };
        let out = distort(&img, &params).unwrap();
        for y in 0..6 {
            let key = |img: &Image| {
                let mut px: Vec<[u32; 3]> = (0..50)
                    .map(|x| img.rgb(x, y).map(f32::to_bits))
                    .collect();
                px.sort_unstable();
                px
            };
            assert_eq!(key(&img), key(&out), "row {y}");
        }
    }

    #[test]
    fn test_every_distortion_keeps_shape_and_is_deterministic() {
        let img = hashed(31, 19, 4, 1);
        for kind in DistortKind::ALL {
            let params = DistortParams { kind: *kind, seed: 99, ..Default::default() };
            let a = distort(&img, &params).unwrap();
            let b = distort(&img, &params).unwrap();
            assert_eq!(a.dimensions(), (31, 19), "{kind}");
            assert_eq!(a.channels(), 4, "{kind}");
            assert_eq!(a, b, "{kind}");
        }
    }

    #[test]
    fn test_engines_never_fail_on_extreme_parameters() {
        let img = hashed(9, 7, 3, 2);
        let grade_params = GradeParams {
            exposure: 100.0,
            contrast: f32::NAN,
            saturation: -4.0,
            hue: 720.0,
            ..Default::default()
        };
        assert!(grade(&img, &grade_params).is_ok());
        for kind in DistortKind::ALL {
            let params = DistortParams {
                kind: *kind,
                intensity: 1e6,
                frequency: -5.0,
                offset_x: f32::INFINITY,
                ..Default::default()
            };
            assert!(distort(&img, &params).is_ok(), "{kind}");
        }
        let halftone_params = HalftoneParams { dot_size: 0, sharpness: 99.0, ..Default::default() };
        assert!(halftone(&img, &halftone_params).is_ok());
    }

    #[test]
    fn test_unknown_names_are_invalid_parameters() {
        for err in [
            "glow".parse::<BlendMode>().unwrap_err(),
            "sobol".parse::<EdgeAlgorithm>().unwrap_err(),
            "pixelsort".parse::<DistortKind>().unwrap_err(),
            "dots".parse::<HalftoneEffect>().unwrap_err(),
        ] {
            assert!(matches!(err, OpsError::InvalidParameter(_)), "{err}");
        }
    }

    #[test]
    fn test_params_deserialize_from_host_json() {
        let json = r#"{"kind": "pixelSort", "intensity": 30, "seed": 4}"#;
        let p: DistortParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.kind, DistortKind::PixelSort);
        assert_eq!(p.intensity, 30.0);
        assert_eq!(p.frequency, DistortParams::default().frequency);

        let blend: BlendParams = serde_json::from_str(r#"{"mode": "color_burn"}"#).unwrap();
        assert_eq!(blend.mode, BlendMode::ColorBurn);
        assert_eq!(blend.opacity, 1.0);

        assert!(serde_json::from_str::<EdgeParams>(r#"{"algorithm": "sobol"}"#).is_err());

        let out = serde_json::to_string(&HalftoneParams::default()).unwrap();
        assert!(out.contains("\"halftone_dots\""));
    }

    #[test]
    fn test_crop_then_scale_pipeline() {
        let img = gradient(300, 200, 3);
        let rect = crop::CropRect { x: 50, y: 20, width: Some(200), height: Some(100) };
        let (cropped, px) = crop::crop(&img, &rect).unwrap();
        assert_eq!((px.width, px.height), (200, 100));
        let params = scale::ScaleParams {
            megapixels: 0.05,
            width_multiple: 8,
            height_multiple: 8,
            ..Default::default()
        };
        let out = scale::scale_to_megapixels(&cropped, &params).unwrap();
        assert_eq!(out.width() % 8, 0);
        assert_eq!(out.height() % 8, 0);
        let ratio = out.width() as f32 / out.height() as f32;
        assert!((ratio - 2.0).abs() < 0.15, "aspect {ratio}");
    }
}
