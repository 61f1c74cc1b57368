//! OpenPose JSON interchange.
//!
//! Export always writes the canonical form: an array holding one frame whose
//! people carry `(x, y, 1.0)` triples. Import additionally accepts a bare
//! frame object and the legacy `{width, height, keypoints: [[x, y], ...]}`
//! form. Every check runs before the caller touches the scene.

use serde::Deserialize;
use serde_json::ser::PrettyFormatter;
use shared::{
    KeypointInput, PersonRecord, PoseDocument, PoseFrame, Scene, KEYPOINT_COUNT,
};

use crate::error::FormatError;

/// Confidence written for every exported keypoint.
pub const EXPORT_CONFIDENCE: f64 = 1.0;

/// Validated import payload, ready to be applied to a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPoses {
    pub width: u32,
    pub height: u32,
    pub skeletons: Vec<[KeypointInput; KEYPOINT_COUNT]>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Frames(Vec<RawFrame>),
    Minimal(RawMinimal),
    Frame(RawFrame),
}

#[derive(Deserialize)]
struct RawFrame {
    canvas_width: Option<f64>,
    canvas_height: Option<f64>,
    #[serde(default)]
    people: Vec<PersonRecord>,
}

#[derive(Deserialize)]
struct RawMinimal {
    width: Option<f64>,
    height: Option<f64>,
    keypoints: Vec<[f64; 2]>,
}

/// One person record per skeleton, in creation order.
pub fn export_scene(scene: &Scene) -> Result<PoseDocument, FormatError> {
    let mut people = Vec::with_capacity(scene.skeletons.len());
    for skeleton in &scene.skeletons {
        if skeleton.keypoints.len() != KEYPOINT_COUNT {
            return Err(FormatError::SkeletonSize {
                group_id: skeleton.group_id.clone(),
                count: skeleton.keypoints.len(),
            });
        }
        let pose_keypoints_2d = skeleton
            .keypoints
            .iter()
            .flat_map(|kp| [kp.position.x, kp.position.y, EXPORT_CONFIDENCE])
            .collect();
        people.push(PersonRecord { pose_keypoints_2d });
    }
    Ok(vec![PoseFrame {
        canvas_width: scene.canvas_width,
        canvas_height: scene.canvas_height,
        people,
    }])
}

/// Serialize with a 4-space indent.
pub fn to_json(document: &PoseDocument) -> Result<String, FormatError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    serde::Serialize::serialize(document, &mut ser)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn export_json(scene: &Scene) -> Result<String, FormatError> {
    to_json(&export_scene(scene)?)
}

/// Parse and validate an interchange payload without applying it.
pub fn parse_document(json: &str) -> Result<ParsedPoses, FormatError> {
    // Syntax errors surface before shape errors
    let value: serde_json::Value = serde_json::from_str(json)?;
    let raw: RawDocument = serde_json::from_value(value)?;

    match raw {
        RawDocument::Frames(frames) => {
            let frame = frames.into_iter().next().ok_or(FormatError::Empty)?;
            parse_frame(frame)
        }
        RawDocument::Frame(frame) => parse_frame(frame),
        RawDocument::Minimal(minimal) => parse_minimal(minimal),
    }
}

fn canvas_dimension(value: Option<f64>) -> Result<u32, FormatError> {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 && v <= u32::MAX as f64 => Ok(v.round() as u32),
        _ => Err(FormatError::InvalidCanvas),
    }
}

fn parse_frame(frame: RawFrame) -> Result<ParsedPoses, FormatError> {
    let width = canvas_dimension(frame.canvas_width)?;
    let height = canvas_dimension(frame.canvas_height)?;

    let mut skeletons = Vec::new();
    for (person, record) in frame.people.iter().enumerate() {
        let values = &record.pose_keypoints_2d;
        if values.is_empty() {
            continue;
        }
        if values.len() % 3 != 0 {
            return Err(FormatError::RaggedValues {
                person,
                len: values.len(),
            });
        }
        let points: Vec<KeypointInput> = values
            .chunks_exact(3)
            .map(|t| KeypointInput::new(t[0], t[1]))
            .collect();
        push_chunks(&mut skeletons, person, &points)?;
    }

    Ok(ParsedPoses {
        width,
        height,
        skeletons,
    })
}

fn parse_minimal(minimal: RawMinimal) -> Result<ParsedPoses, FormatError> {
    let width = canvas_dimension(minimal.width)?;
    let height = canvas_dimension(minimal.height)?;
    let points: Vec<KeypointInput> = minimal
        .keypoints
        .iter()
        .map(|[x, y]| KeypointInput::new(*x, *y))
        .collect();
    let mut skeletons = Vec::new();
    push_chunks(&mut skeletons, 0, &points)?;
    Ok(ParsedPoses {
        width,
        height,
        skeletons,
    })
}

fn push_chunks(
    out: &mut Vec<[KeypointInput; KEYPOINT_COUNT]>,
    person: usize,
    points: &[KeypointInput],
) -> Result<(), FormatError> {
    if points.len() % KEYPOINT_COUNT != 0 {
        return Err(FormatError::KeypointCount {
            person,
            count: points.len(),
        });
    }
    for chunk in points.chunks_exact(KEYPOINT_COUNT) {
        let arr: [KeypointInput; KEYPOINT_COUNT] =
            chunk.try_into().map_err(|_| FormatError::KeypointCount {
                person,
                count: chunk.len(),
            })?;
        out.push(arr);
    }
    Ok(())
}
