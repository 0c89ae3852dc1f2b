use serde::{Deserialize, Serialize};

pub const SCALE_MIN: f32 = 0.8;
pub const SCALE_MAX: f32 = 1.3;
pub const OFFSET_MIN: f32 = -0.5;
pub const OFFSET_MAX: f32 = 0.5;

/// AdjustmentModel is the user's manual fit bias: a scale multiplier and
/// x/y/z offsets composed with the automatic estimate. Writes come from UI
/// slider events; the estimator reads a copy at the start of each frame, so
/// the value is `Copy` and never locked (single writer, single reader,
/// copy-on-read). It persists for the session and only affects frames
/// estimated after a change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentModel {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    offset_z: f32,
}

impl Default for AdjustmentModel {
    fn default() -> Self {
        AdjustmentModel {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
        }
    }
}

impl AdjustmentModel {
    pub fn new() -> Self {
        AdjustmentModel::default()
    }

    /// set_scale stores the scale multiplier, clamped to [0.8, 1.3].
    pub fn set_scale(&mut self, value: f32) {
        self.scale = value.clamp(SCALE_MIN, SCALE_MAX);
    }

    /// set_offset_x stores the lateral offset, clamped to [-0.5, 0.5].
    pub fn set_offset_x(&mut self, value: f32) {
        self.offset_x = value.clamp(OFFSET_MIN, OFFSET_MAX);
    }

    /// set_offset_y stores the vertical offset, clamped to [-0.5, 0.5].
    pub fn set_offset_y(&mut self, value: f32) {
        self.offset_y = value.clamp(OFFSET_MIN, OFFSET_MAX);
    }

    /// set_offset_z stores the depth offset, clamped to [-0.5, 0.5].
    pub fn set_offset_z(&mut self, value: f32) {
        self.offset_z = value.clamp(OFFSET_MIN, OFFSET_MAX);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> f32 {
        self.offset_y
    }

    pub fn offset_z(&self) -> f32 {
        self.offset_z
    }
}
