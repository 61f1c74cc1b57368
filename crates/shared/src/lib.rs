use serde::{Deserialize, Serialize};

mod openpose;
mod topology;

pub use openpose::{MinimalPoseFile, PersonRecord, PoseDocument, PoseFrame};
pub use topology::{
    bones_of, KeypointMeta, BONES, BONE_COUNT, DEFAULT_POSE, KEYPOINT_COUNT, KEYPOINT_TABLE,
    PALETTE,
};

/// Идентификатор скелета (группы) на холсте
pub type GroupId = String;

/// Часть тела в каноническом порядке OpenPose (18 точек)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPart {
    Face,
    Neck,
    LeftShoulder,
    LeftElbow,
    LeftHand,
    RightShoulder,
    RightElbow,
    RightHand,
    LeftHip,
    LeftKnee,
    LeftFoot,
    RightHip,
    RightKnee,
    RightFoot,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
}

impl BodyPart {
    pub const ALL: [BodyPart; KEYPOINT_COUNT] = [
        BodyPart::Face,
        BodyPart::Neck,
        BodyPart::LeftShoulder,
        BodyPart::LeftElbow,
        BodyPart::LeftHand,
        BodyPart::RightShoulder,
        BodyPart::RightElbow,
        BodyPart::RightHand,
        BodyPart::LeftHip,
        BodyPart::LeftKnee,
        BodyPart::LeftFoot,
        BodyPart::RightHip,
        BodyPart::RightKnee,
        BodyPart::RightFoot,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
    ];

    /// Индекс точки (0–17)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Метаданные точки из декларативной таблицы
    pub fn meta(self) -> &'static KeypointMeta {
        &KEYPOINT_TABLE[self.index()]
    }
}

/// 2D-точка в координатах холста
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Входные данные для одной точки при создании скелета
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeypointInput {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl KeypointInput {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, visible: true }
    }
}

/// Ключевая точка скелета
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: BodyPart,
    pub position: Point2D,
    pub visible: bool,
    /// Индексы костей, привязанных к точке; первая «основная»
    pub bones: Vec<usize>,
}

/// Конец кости
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneEnd {
    Start,
    End,
}

/// Кость: отрезок между двумя точками одного скелета
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    /// Индекс точки начала
    pub from: usize,
    /// Индекс точки конца
    pub to: usize,
    pub color: [u8; 3],
    /// Производные координаты концов (отслеживают точки)
    pub start: Point2D,
    pub end: Point2D,
    pub visible: bool,
}

impl Bone {
    pub fn set_endpoint(&mut self, end: BoneEnd, position: Point2D) {
        match end {
            BoneEnd::Start => self.start = position,
            BoneEnd::End => self.end = position,
        }
    }
}

/// Скелет: ровно 18 точек и 17 костей
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub group_id: GroupId,
    pub keypoints: Vec<Keypoint>,
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Построить скелет из 18 точек по фиксированной топологии
    pub fn new(group_id: GroupId, points: &[KeypointInput; KEYPOINT_COUNT]) -> Self {
        let bones = BONES
            .iter()
            .enumerate()
            .map(|(i, &[from, to])| Bone {
                from,
                to,
                color: PALETTE[i],
                start: Point2D::new(points[from].x, points[from].y),
                end: Point2D::new(points[to].x, points[to].y),
                visible: true,
            })
            .collect();

        let keypoints = points
            .iter()
            .enumerate()
            .map(|(i, p)| Keypoint {
                part: BodyPart::ALL[i],
                position: Point2D::new(p.x, p.y),
                visible: p.visible,
                bones: bones_of(i),
            })
            .collect();

        let mut skeleton = Self {
            group_id,
            keypoints,
            bones,
        };
        // Скрытые точки скрывают свои кости, как при переключении видимости
        for i in 0..KEYPOINT_COUNT {
            if !points[i].visible {
                skeleton.set_keypoint_visible(i, false);
            }
        }
        skeleton
    }

    /// Скрыть/показать точку вместе со всеми её костями
    pub fn set_keypoint_visible(&mut self, index: usize, visible: bool) {
        let Some(kp) = self.keypoints.get_mut(index) else {
            return;
        };
        kp.visible = visible;
        for &bone in &kp.bones {
            if let Some(b) = self.bones.get_mut(bone) {
                b.visible = visible;
            }
        }
    }

    /// Точки в каноническом порядке как входные данные
    pub fn inputs(&self) -> Vec<KeypointInput> {
        self.keypoints
            .iter()
            .map(|kp| KeypointInput {
                x: kp.position.x,
                y: kp.position.y,
                visible: kp.visible,
            })
            .collect()
    }
}

/// Сцена: все скелеты на холсте и его размеры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub canvas_width: u32,
    pub canvas_height: u32,
    #[serde(default)]
    pub background: [u8; 3],
    /// Скелеты в порядке создания
    #[serde(default)]
    pub skeletons: Vec<Skeleton>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            canvas_width: 512,
            canvas_height: 512,
            background: [0, 0, 0],
            skeletons: Vec::new(),
        }
    }
}

impl Scene {
    pub fn skeleton(&self, group_id: &str) -> Option<&Skeleton> {
        self.skeletons.iter().find(|s| s.group_id == group_id)
    }

    pub fn skeleton_mut(&mut self, group_id: &str) -> Option<&mut Skeleton> {
        self.skeletons.iter_mut().find(|s| s.group_id == group_id)
    }

    pub fn keypoint(&self, group_id: &str, index: usize) -> Option<&Keypoint> {
        self.skeleton(group_id)?.keypoints.get(index)
    }

    pub fn keypoint_count(&self) -> usize {
        self.skeletons.iter().map(|s| s.keypoints.len()).sum()
    }

    /// Найти элемент под точкой: сначала точки, затем кости
    pub fn pick(&self, at: Point2D, keypoint_radius: f64, bone_width: f64) -> Option<ElementRef> {
        // Последний добавленный скелет рисуется сверху
        for skeleton in self.skeletons.iter().rev() {
            let hit = skeleton
                .keypoints
                .iter()
                .enumerate()
                .rev()
                .find(|(_, kp)| kp.visible && kp.position.distance_to(at) <= keypoint_radius);
            if let Some((index, _)) = hit {
                return Some(ElementRef::Keypoint {
                    group_id: skeleton.group_id.clone(),
                    index,
                });
            }
        }
        for skeleton in self.skeletons.iter().rev() {
            let hit = skeleton.bones.iter().enumerate().rev().find(|(_, bone)| {
                bone.visible && distance_to_segment(at, bone.start, bone.end) <= bone_width / 2.0
            });
            if let Some((index, _)) = hit {
                return Some(ElementRef::Bone {
                    group_id: skeleton.group_id.clone(),
                    index,
                });
            }
        }
        None
    }
}

fn distance_to_segment(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point2D::new(a.x + t * dx, a.y + t * dy))
}

/// Ссылка на элемент сцены
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementRef {
    Keypoint { group_id: GroupId, index: usize },
    Bone { group_id: GroupId, index: usize },
    Skeleton { group_id: GroupId },
}

impl ElementRef {
    pub fn group_id(&self) -> &str {
        match self {
            ElementRef::Keypoint { group_id, .. }
            | ElementRef::Bone { group_id, .. }
            | ElementRef::Skeleton { group_id } => group_id,
        }
    }
}
