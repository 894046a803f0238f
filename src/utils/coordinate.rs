use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

fn default_visibility() -> f32 {
    1.0
}

/// Landmark is one body keypoint in normalized image coordinates.
///
/// `x` and `y` are fractions of the frame width and height, `z` is the
/// estimator's relative depth and `visibility` its confidence that the point
/// is in view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark {
            x,
            y,
            z: 0.0,
            visibility: default_visibility(),
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn position(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    /// offset_to returns the displacement from this landmark to `other`.
    pub fn offset_to(&self, other: &Landmark) -> Vector2<f32> {
        other.position() - self.position()
    }

    pub fn horizontal_gap(&self, other: &Landmark) -> f32 {
        self.offset_to(other).x.abs()
    }

    pub fn vertical_gap(&self, other: &Landmark) -> f32 {
        self.offset_to(other).y.abs()
    }
}
