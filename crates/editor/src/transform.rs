//! Geometry transform engine.
//!
//! Keypoints store absolute canvas positions. A group selection keeps each
//! member's local offset from the group centre and a `GroupTransform`; the
//! engine derives absolute positions from those and pushes every position
//! into the bone endpoints anchored to the keypoint. Recomputation is a pure
//! function of (offsets, transform), so reapplying it changes nothing.

use glam::{DMat2, DVec2};
use serde::{Deserialize, Serialize};
use shared::{BoneEnd, Point2D, Skeleton, KEYPOINT_TABLE};

pub fn to_vec(p: Point2D) -> DVec2 {
    DVec2::new(p.x, p.y)
}

pub fn to_point(v: DVec2) -> Point2D {
    Point2D::new(v.x, v.y)
}

/// Horizontal/vertical mirror flags of the object being transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mirror {
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Mirror {
    /// Exactly one axis mirrored.
    pub fn flipped(&self) -> bool {
        self.flip_x ^ self.flip_y
    }

    fn signs(&self) -> DVec2 {
        DVec2::new(
            if self.flip_x { -1.0 } else { 1.0 },
            if self.flip_y { -1.0 } else { 1.0 },
        )
    }
}

/// Composed transform of a group selection.
///
/// `left`/`top` is the top-left corner of the (possibly rotated) bounding
/// box, `width`/`height` its unscaled size, `angle` in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupTransform {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub angle: f64,
    #[serde(default)]
    pub mirror: Mirror,
}

impl GroupTransform {
    /// Identity transform over an axis-aligned bounding box.
    pub fn from_bounds(min: DVec2, max: DVec2) -> Self {
        Self {
            left: min.x,
            top: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            mirror: Mirror::default(),
        }
    }

    pub fn flipped(&self) -> bool {
        self.mirror.flipped()
    }

    fn rotation(&self) -> DMat2 {
        DMat2::from_angle(self.angle.to_radians())
    }

    fn scaled_extent(&self) -> DVec2 {
        DVec2::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    fn scaled_offset(&self, local: DVec2) -> DVec2 {
        local * DVec2::new(self.scale_x, self.scale_y) * self.mirror.signs()
    }

    /// Visual centre, from the box's top-left and bottom-right corners.
    pub fn center(&self) -> DVec2 {
        let tl = DVec2::new(self.left, self.top);
        let br = tl + self.rotation() * self.scaled_extent();
        (tl + br) / 2.0
    }

    /// Absolute canvas position of a member with the given local offset.
    pub fn place(&self, local: DVec2) -> DVec2 {
        if self.angle == 0.0 {
            let offset = self.scaled_offset(local);
            let half = self.scaled_extent() / 2.0;
            DVec2::new(self.left + offset.x + half.x, self.top + offset.y + half.y)
        } else {
            self.center() + self.rotation() * self.scaled_offset(local)
        }
    }

    pub fn translate(&mut self, delta: DVec2) {
        self.left += delta.x;
        self.top += delta.y;
    }

    /// Set the rotation angle, keeping the visual centre fixed.
    pub fn rotate_about_center(&mut self, angle: f64) {
        let center = self.center();
        self.angle = angle.rem_euclid(360.0);
        self.anchor_center(center);
    }

    /// Set the scale factors, keeping the visual centre fixed.
    pub fn scale_about_center(&mut self, scale_x: f64, scale_y: f64) {
        let center = self.center();
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self.anchor_center(center);
    }

    pub fn flip_horizontal(&mut self) {
        self.mirror.flip_x = !self.mirror.flip_x;
    }

    pub fn flip_vertical(&mut self) {
        self.mirror.flip_y = !self.mirror.flip_y;
    }

    fn anchor_center(&mut self, center: DVec2) {
        let tl = center - self.rotation() * (self.scaled_extent() / 2.0);
        self.left = tl.x;
        self.top = tl.y;
    }
}

/// Copy a keypoint's position into every bone anchored to it.
///
/// The first ("primary") bone of a keypoint gets its end updated, or its
/// start when the keypoint is the skeleton root; every other bone gets its
/// start updated.
pub fn propagate(skeleton: &mut Skeleton, index: usize) {
    let Some(kp) = skeleton.keypoints.get(index) else {
        return;
    };
    let position = kp.position;
    let root = KEYPOINT_TABLE.get(index).map(|m| m.root).unwrap_or(false);
    for (slot, &bone) in kp.bones.iter().enumerate() {
        let end = if slot == 0 && !root {
            BoneEnd::End
        } else {
            BoneEnd::Start
        };
        if let Some(b) = skeleton.bones.get_mut(bone) {
            b.set_endpoint(end, position);
        }
    }
}

pub fn propagate_all(skeleton: &mut Skeleton) {
    for index in 0..skeleton.keypoints.len() {
        propagate(skeleton, index);
    }
}

/// Single-point move: store the new position and refresh its bones.
pub fn move_point(skeleton: &mut Skeleton, index: usize, position: DVec2) -> bool {
    let Some(kp) = skeleton.keypoints.get_mut(index) else {
        return false;
    };
    kp.position = to_point(position);
    propagate(skeleton, index);
    true
}

/// Tracks the derived mirror state of the last transform applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformEngine {
    flipped: bool,
}

impl TransformEngine {
    pub fn flipped(&self) -> bool {
        self.flipped
    }

    pub fn observe(&mut self, mirror: Mirror) {
        self.flipped = mirror.flipped();
    }

    pub fn reset(&mut self) {
        self.flipped = false;
    }
}
