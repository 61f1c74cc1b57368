//! Схема обмена OpenPose JSON

use serde::{Deserialize, Serialize};

/// Документ: массив кадров (используется первый)
pub type PoseDocument = Vec<PoseFrame>;

/// Кадр: размеры холста и список людей
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub people: Vec<PersonRecord>,
}

/// Человек: плоский список троек (x, y, уверенность)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub pose_keypoints_2d: Vec<f64>,
}

/// Устаревший минимальный формат: пары [x, y], по 18 на человека
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalPoseFile {
    pub width: u32,
    pub height: u32,
    pub keypoints: Vec<[f64; 2]>,
}
