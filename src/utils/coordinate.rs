use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A single tracked landmark. `x` and `y` are screen-normalized to [0, 1];
/// `z` is a relative depth cue from the detector, not a metric distance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        LandmarkPoint { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One frame of face landmarks as delivered by the external detector.
/// Produced fresh every frame and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub bridge: LandmarkPoint,
    pub left_eye: LandmarkPoint,
    pub right_eye: LandmarkPoint,
    pub left_temple: LandmarkPoint,
    pub right_temple: LandmarkPoint,
    pub nose_tip: LandmarkPoint,
}

impl LandmarkFrame {
    pub fn is_finite(&self) -> bool {
        self.bridge.is_finite()
            && self.left_eye.is_finite()
            && self.right_eye.is_finite()
            && self.left_temple.is_finite()
            && self.right_temple.is_finite()
            && self.nose_tip.is_finite()
    }
}

/// The per-frame placement handed to the renderer. Rotation is Euler angles
/// ordered (pitch, yaw, roll) in radians; scale is uniform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
}

impl RigidTransform {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, scale: f32) -> Self {
        RigidTransform {
            position,
            rotation,
            scale,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.rotation.iter().all(|v| v.is_finite())
            && self.scale.is_finite()
    }
}

/// Mutable tracking bookkeeping owned by the pipeline's frame path.
/// `frames_since_detection` counts consecutive misses; it is reset to zero
/// whenever a valid estimate arrives.
#[derive(Debug, Clone, Default)]
pub struct TrackingState {
    pub last_known: Option<RigidTransform>,
    pub face_detected: bool,
    pub frames_since_detection: u32,
}

impl TrackingState {
    pub fn new() -> Self {
        TrackingState::default()
    }

    /// reset returns the state to its pre-tracking condition, used when the
    /// session restarts tracking.
    pub fn reset(&mut self) {
        self.last_known = None;
        self.face_detected = false;
        self.frames_since_detection = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_json_round_trip() {
        let transform = RigidTransform::new(
            Vector3::new(0.25, -0.1, -2.1),
            Vector3::new(0.14, -0.32, 0.05),
            1.5,
        );
        let encoded = serde_json::to_string(&transform).unwrap();
        let decoded: RigidTransform = serde_json::from_str(&encoded).unwrap();
        assert_eq!(transform, decoded);
    }

    #[test]
    fn test_landmark_frame_json_round_trip() {
        let frame = LandmarkFrame {
            bridge: LandmarkPoint::new(0.5, 0.5, 0.0),
            left_eye: LandmarkPoint::new(0.4, 0.5, 0.0),
            right_eye: LandmarkPoint::new(0.6, 0.5, 0.0),
            left_temple: LandmarkPoint::new(0.25, 0.5, -0.1),
            right_temple: LandmarkPoint::new(0.75, 0.5, 0.1),
            nose_tip: LandmarkPoint::new(0.5, 0.6, -0.05),
        };
        let encoded = serde_json::to_string(&frame).unwrap();
        let decoded: LandmarkFrame = serde_json::from_str(&encoded).unwrap();
        assert_eq!(frame.bridge.x, decoded.bridge.x);
        assert_eq!(frame.right_temple.z, decoded.right_temple.z);
    }
}
