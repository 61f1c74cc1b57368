//! Raster capture of a scene for host previews.
//!
//! Only the background, bones and keypoints are drawn; no selection chrome.

use std::io::Cursor;

use glam::DVec2;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;
use shared::{Scene, KEYPOINT_TABLE, PALETTE};

use crate::state::settings::RenderSettings;
use crate::transform::to_vec;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub keypoint_radius: f64,
    pub bone_width: f64,
    pub bone_alpha: f32,
    /// Skip mirror-sensitive keypoints (eyes)
    pub hide_eyes: bool,
}

impl RenderOptions {
    pub fn from_settings(settings: &RenderSettings, eyes_visible: bool) -> Self {
        Self {
            keypoint_radius: settings.keypoint_radius,
            bone_width: settings.bone_width,
            bone_alpha: settings.bone_alpha,
            hide_eyes: !eyes_visible,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default(), true)
    }
}

fn blend(color: [u8; 3], background: [u8; 3], alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |c: u8, b: u8| (c as f32 * a + b as f32 * (1.0 - a)).round() as u8;
    Rgb([
        mix(color[0], background[0]),
        mix(color[1], background[1]),
        mix(color[2], background[2]),
    ])
}

fn to_pixel(v: DVec2) -> (i32, i32) {
    (v.x.round() as i32, v.y.round() as i32)
}

/// Thick segment with round caps
fn draw_bone(img: &mut RgbImage, a: DVec2, b: DVec2, width: f64, color: Rgb<u8>) {
    let half = width / 2.0;
    let radius = half.round().max(1.0) as i32;
    let dir = b - a;
    if dir.length() >= 1.0 {
        let n = dir.perp().normalize() * half;
        let quad = [a + n, b + n, b - n, a - n].map(|p| {
            let (x, y) = to_pixel(p);
            Point::new(x, y)
        });
        // draw_polygon_mut rejects closed outlines
        if quad[0] != quad[3] {
            draw_polygon_mut(img, &quad, color);
        }
    }
    draw_filled_circle_mut(img, to_pixel(a), radius, color);
    draw_filled_circle_mut(img, to_pixel(b), radius, color);
}

/// Draw every visible bone, then every visible keypoint on top.
pub fn render_scene(scene: &Scene, options: &RenderOptions) -> RgbImage {
    let mut img = RgbImage::from_pixel(
        scene.canvas_width.max(1),
        scene.canvas_height.max(1),
        Rgb(scene.background),
    );

    for skeleton in &scene.skeletons {
        for bone in skeleton.bones.iter().filter(|b| b.visible) {
            let color = blend(bone.color, scene.background, options.bone_alpha);
            draw_bone(&mut img, to_vec(bone.start), to_vec(bone.end), options.bone_width, color);
        }
    }

    let radius = options.keypoint_radius.round().max(1.0) as i32;
    for skeleton in &scene.skeletons {
        for (i, kp) in skeleton.keypoints.iter().enumerate() {
            if !kp.visible {
                continue;
            }
            let eye = KEYPOINT_TABLE.get(i).is_some_and(|m| m.mirror_sensitive);
            if eye && options.hide_eyes {
                continue;
            }
            let color = PALETTE.get(i).copied().unwrap_or([255, 255, 255]);
            draw_filled_circle_mut(&mut img, to_pixel(to_vec(kp.position)), radius, Rgb(color));
        }
    }

    img
}

pub fn encode_png(img: &RgbImage) -> image::ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BodyPart, Skeleton, DEFAULT_POSE};

    fn scene() -> Scene {
        let mut scene = Scene::default();
        scene.skeletons.push(Skeleton::new("a".into(), &DEFAULT_POSE));
        scene
    }

    #[test]
    fn test_keypoint_drawn_in_palette_color() {
        let img = render_scene(&scene(), &RenderOptions::default());
        assert_eq!(img.dimensions(), (512, 512));
        // Face keypoint at (241, 77)
        assert_eq!(img.get_pixel(241, 77), &Rgb(PALETTE[0]));
    }

    #[test]
    fn test_empty_scene_is_background() {
        let mut s = Scene::default();
        s.background = [10, 20, 30];
        let img = render_scene(&s, &RenderOptions::default());
        assert!(img.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn test_hidden_keypoint_not_drawn() {
        let mut s = Scene::default();
        let mut sk = Skeleton::new("a".into(), &DEFAULT_POSE);
        for i in 0..18 {
            sk.set_keypoint_visible(i, false);
        }
        s.skeletons.push(sk);
        let img = render_scene(&s, &RenderOptions::default());
        assert_eq!(img.get_pixel(241, 77), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_eyes_suppressed() {
        let eye = BodyPart::RightEye.index();
        let p = DEFAULT_POSE[eye];
        let options = RenderOptions {
            hide_eyes: true,
            ..Default::default()
        };
        let img = render_scene(&scene(), &options);
        assert_ne!(img.get_pixel(p.x as u32, p.y as u32), &Rgb(PALETTE[eye]));
    }

    #[test]
    fn test_bone_alpha_blend() {
        assert_eq!(blend([255, 0, 0], [0, 0, 0], 0.5), Rgb([128, 0, 0]));
        assert_eq!(blend([255, 0, 0], [0, 0, 0], 1.0), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_zero_length_bone() {
        let mut img = RgbImage::new(20, 20);
        draw_bone(&mut img, DVec2::new(10.0, 10.0), DVec2::new(10.0, 10.0), 4.0, Rgb([1, 2, 3]));
        assert_eq!(img.get_pixel(10, 10), &Rgb([1, 2, 3]));
    }

    #[test]
    fn test_png_signature() {
        let bytes = encode_png(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
