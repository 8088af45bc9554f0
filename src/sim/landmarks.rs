//! Tracked body keypoints supplied by the camera collaborator
//!
//! Coordinates are normalized to [0, 1] in camera space. The canvas shows the
//! camera mirrored, so every mapping to pixels flips x.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::mirror_to_canvas;

/// Points per tracked hand
pub const HAND_POINTS: usize = 21;
/// Index fingertip in a 21-point hand
pub const INDEX_FINGER_TIP: usize = 8;
/// Face mesh indices
pub const NOSE_TIP: usize = 1;
pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;
pub const LEFT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_OUTER: usize = 263;

/// Hand skeleton edges, for landmark feedback drawing
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

/// A single normalized keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position on a mirrored canvas
    #[inline]
    pub fn to_canvas(&self, width: f32, height: f32) -> Vec2 {
        mirror_to_canvas(self.x, self.y, width, height)
    }

    /// Distance in normalized camera space
    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        Vec2::new(self.x - other.x, self.y - other.y).length()
    }
}

pub type Hand = Vec<Landmark>;
pub type Face = Vec<Landmark>;

/// Everything the vision collaborator reported for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub hands: Vec<Hand>,
    #[serde(default)]
    pub faces: Vec<Face>,
}

impl FrameInput {
    /// Parse the collaborator's JSON arrays (one array of points per hand/face)
    pub fn from_json(hands_json: &str, faces_json: &str) -> Result<Self, GameError> {
        let hands: Vec<Hand> = parse_or_empty(hands_json)?;
        let faces: Vec<Face> = parse_or_empty(faces_json)?;
        Ok(Self { hands, faces })
    }

    /// Index fingertip of the given hand, if tracked
    pub fn fingertip(&self, hand: usize) -> Option<Landmark> {
        self.hands.get(hand)?.get(INDEX_FINGER_TIP).copied()
    }

    /// First tracked face
    pub fn face(&self) -> Option<&Face> {
        self.faces.first()
    }

    /// All hand points mapped to canvas pixels
    pub fn hand_points(&self, width: f32, height: f32) -> impl Iterator<Item = Vec2> + '_ {
        self.hands
            .iter()
            .flat_map(|hand| hand.iter())
            .map(move |p| p.to_canvas(width, height))
    }
}

fn parse_or_empty<T: serde::de::DeserializeOwned + Default>(json: &str) -> Result<T, GameError> {
    let trimmed = json.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(trimmed)?)
}
