//! Фиксированная топология модели OpenPose (18 точек, 17 костей)

use crate::{BodyPart, KeypointInput};

pub const KEYPOINT_COUNT: usize = 18;
pub const BONE_COUNT: usize = 17;

/// Кости как пары индексов точек (начало, конец)
pub const BONES: [[usize; 2]; BONE_COUNT] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 4],
    [1, 5],
    [5, 6],
    [6, 7],
    [1, 8],
    [8, 9],
    [9, 10],
    [1, 11],
    [11, 12],
    [12, 13],
    [0, 14],
    [14, 16],
    [0, 15],
    [15, 17],
];

/// Цвета: кость i и точка i используют PALETTE[i]
pub const PALETTE: [[u8; 3]; KEYPOINT_COUNT] = [
    [0, 0, 255],
    [255, 0, 0],
    [255, 170, 0],
    [255, 255, 0],
    [255, 85, 0],
    [170, 255, 0],
    [85, 255, 0],
    [0, 255, 0],
    [0, 255, 85],
    [0, 255, 170],
    [0, 255, 255],
    [0, 170, 255],
    [0, 85, 255],
    [85, 0, 255],
    [170, 0, 255],
    [255, 0, 255],
    [255, 0, 170],
    [255, 0, 85],
];

/// Метаданные точки для движка трансформаций
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypointMeta {
    pub part: BodyPart,
    /// Корень скелета: основная кость обновляет начало, а не конец
    pub root: bool,
    /// Маркер зависит от зеркального отражения (глаза)
    pub mirror_sensitive: bool,
}

const fn meta(part: BodyPart) -> KeypointMeta {
    KeypointMeta {
        part,
        root: false,
        mirror_sensitive: false,
    }
}

pub const KEYPOINT_TABLE: [KeypointMeta; KEYPOINT_COUNT] = [
    KeypointMeta {
        part: BodyPart::Face,
        root: true,
        mirror_sensitive: false,
    },
    meta(BodyPart::Neck),
    meta(BodyPart::LeftShoulder),
    meta(BodyPart::LeftElbow),
    meta(BodyPart::LeftHand),
    meta(BodyPart::RightShoulder),
    meta(BodyPart::RightElbow),
    meta(BodyPart::RightHand),
    meta(BodyPart::LeftHip),
    meta(BodyPart::LeftKnee),
    meta(BodyPart::LeftFoot),
    meta(BodyPart::RightHip),
    meta(BodyPart::RightKnee),
    meta(BodyPart::RightFoot),
    KeypointMeta {
        part: BodyPart::LeftEye,
        root: false,
        mirror_sensitive: true,
    },
    KeypointMeta {
        part: BodyPart::RightEye,
        root: false,
        mirror_sensitive: true,
    },
    meta(BodyPart::LeftEar),
    meta(BodyPart::RightEar),
];

/// Стоящая поза по умолчанию (холст 512×512)
pub const DEFAULT_POSE: [KeypointInput; KEYPOINT_COUNT] = [
    KeypointInput::new(241.0, 77.0),
    KeypointInput::new(241.0, 120.0),
    KeypointInput::new(191.0, 118.0),
    KeypointInput::new(177.0, 183.0),
    KeypointInput::new(163.0, 252.0),
    KeypointInput::new(298.0, 118.0),
    KeypointInput::new(317.0, 182.0),
    KeypointInput::new(332.0, 245.0),
    KeypointInput::new(225.0, 241.0),
    KeypointInput::new(213.0, 359.0),
    KeypointInput::new(215.0, 454.0),
    KeypointInput::new(270.0, 240.0),
    KeypointInput::new(282.0, 360.0),
    KeypointInput::new(286.0, 456.0),
    KeypointInput::new(232.0, 59.0),
    KeypointInput::new(253.0, 60.0),
    KeypointInput::new(225.0, 70.0),
    KeypointInput::new(260.0, 72.0),
];

/// Кости, привязанные к точке, в порядке топологии (не более 5)
pub fn bones_of(index: usize) -> Vec<usize> {
    BONES
        .iter()
        .enumerate()
        .filter(|(_, pair)| pair.contains(&index))
        .map(|(i, _)| i)
        .collect()
}
