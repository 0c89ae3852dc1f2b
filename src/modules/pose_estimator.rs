use nalgebra::Vector3;

use crate::modules::adjustment::AdjustmentModel;
use crate::utils::coordinate::{LandmarkFrame, RigidTransform};

// Empirical gains mapping screen-normalized landmarks into render-space
// units, tuned for a canonical camera field of view (camera at z = 5,
// fov 50). Recalibrate these together if the render camera changes.

/// Lateral gain: full screen-width head movement to render-space x shift.
pub const X_GAIN: f32 = 8.0;
/// Vertical gain for the bridge anchor.
pub const Y_GAIN: f32 = 6.0;
/// Constant vertical bias, settles frames slightly below the bridge point.
pub const Y_OFFSET: f32 = -0.1;
/// Depth gain applied to the bridge's relative depth cue.
pub const Z_GAIN: f32 = 4.0;
/// Working-distance bias placing the asset in front of the camera.
pub const Z_OFFSET: f32 = -2.1;
/// Extra gain on the user z-offset; depth cues are coarser than lateral
/// position, so the slider moves the asset 2.5x harder in z.
pub const Z_ADJUST_GAIN: f32 = 2.5;
/// Yaw gain on the temple depth-cue difference. Heuristic, saturates at
/// extreme turn angles.
pub const YAW_GAIN: f32 = 1.6;
/// Pitch gain on the nose-tip-to-bridge vertical offset.
pub const PITCH_GAIN: f32 = 1.4;
/// Scale gain on the interpupillary distance in screen space.
pub const IPD_SCALE_GAIN: f32 = 7.5;

/// PoseEstimator maps one landmark frame to a rigid transform in render
/// space. It is a pure per-frame function: no state survives between calls.
///
/// True 3D head pose from 2D landmarks is under-constrained; the estimator
/// uses domain-specific proxies (eye-line angle, temple depth-cue asymmetry,
/// nose drop) instead of a full 6-DOF solve, trading generality for
/// stability and cheap per-frame computation.
#[derive(Debug, Clone, Default)]
pub struct PoseEstimator;

impl PoseEstimator {
    pub fn new() -> Self {
        PoseEstimator
    }

    /// estimate computes the placement transform for one frame.
    /// Returns `None` when no face was detected this tick or the frame
    /// carries non-finite coordinates; callers must not render in that case.
    ///
    /// # Arguments
    /// * `frame` - the landmark frame, or `None` on a missed detection
    /// * `adjustment` - snapshot of the user's manual bias for this frame
    ///
    /// # Returns
    /// * `Option<RigidTransform>`
    pub fn estimate(
        &self,
        frame: Option<&LandmarkFrame>,
        adjustment: AdjustmentModel,
    ) -> Option<RigidTransform> {
        let frame = frame?;
        if !frame.is_finite() {
            return None;
        }

        let bridge = frame.bridge;
        let left_eye = frame.left_eye;
        let right_eye = frame.right_eye;

        // The detector output is mirrored relative to the camera; 0.5 is
        // screen center on both axes.
        let x = (0.5 - bridge.x) * X_GAIN + adjustment.offset_x();
        let y = (0.5 - bridge.y) * Y_GAIN + Y_OFFSET + adjustment.offset_y();
        let z = (0.5 - bridge.z) * Z_GAIN + Z_OFFSET + adjustment.offset_z() * Z_ADJUST_GAIN;

        let roll = (right_eye.y - left_eye.y).atan2(right_eye.x - left_eye.x);
        let yaw = (frame.left_temple.z - frame.right_temple.z) * YAW_GAIN;
        let pitch = (frame.nose_tip.y - bridge.y) * PITCH_GAIN;

        // Apparent size tracks the interpupillary distance, so the fit
        // follows the user's distance from the camera without any metric
        // depth measurement.
        let eye_dist = (right_eye.x - left_eye.x).hypot(right_eye.y - left_eye.y);
        let scale = eye_dist * IPD_SCALE_GAIN * adjustment.scale();

        let transform = RigidTransform::new(
            Vector3::new(x, y, z),
            Vector3::new(pitch, yaw, roll),
            scale,
        );
        if !transform.is_finite() {
            return None;
        }
        Some(transform)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::utils::coordinate::LandmarkPoint;

    fn centered_frame() -> LandmarkFrame {
        LandmarkFrame {
            bridge: LandmarkPoint::new(0.5, 0.5, 0.0),
            left_eye: LandmarkPoint::new(0.4, 0.5, 0.0),
            right_eye: LandmarkPoint::new(0.6, 0.5, 0.0),
            left_temple: LandmarkPoint::new(0.25, 0.5, 0.0),
            right_temple: LandmarkPoint::new(0.75, 0.5, 0.0),
            nose_tip: LandmarkPoint::new(0.5, 0.6, -0.05),
        }
    }

    #[test]
    fn test_no_frame_yields_no_transform() {
        let estimator = PoseEstimator::new();
        assert!(estimator.estimate(None, AdjustmentModel::new()).is_none());
        let mut adj = AdjustmentModel::new();
        adj.set_scale(1.3);
        adj.set_offset_x(0.5);
        assert!(estimator.estimate(None, adj).is_none());
    }

    #[test]
    fn test_centered_face_sits_at_working_distance() {
        let estimator = PoseEstimator::new();
        let t = estimator
            .estimate(Some(&centered_frame()), AdjustmentModel::new())
            .unwrap();
        assert_relative_eq!(t.position.x, 0.0);
        assert_relative_eq!(t.position.y, Y_OFFSET);
        assert_relative_eq!(t.position.z, 0.5 * Z_GAIN + Z_OFFSET);
        // roll: level eye line
        assert_relative_eq!(t.rotation.z, 0.0);
        // yaw: symmetric temples
        assert_relative_eq!(t.rotation.y, 0.0);
        assert_relative_eq!(t.rotation.x, 0.1 * PITCH_GAIN, epsilon = 1e-6);
        assert_relative_eq!(t.scale, 0.2 * IPD_SCALE_GAIN, epsilon = 1e-6);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = PoseEstimator::new();
        let frame = centered_frame();
        let a = estimator.estimate(Some(&frame), AdjustmentModel::new()).unwrap();
        let b = estimator.estimate(Some(&frame), AdjustmentModel::new()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_roll_level_eyes() {
        let estimator = PoseEstimator::new();
        let mut frame = centered_frame();
        frame.left_eye = LandmarkPoint::new(0.3, 0.5, 0.0);
        frame.right_eye = LandmarkPoint::new(0.5, 0.5, 0.0);
        let t = estimator.estimate(Some(&frame), AdjustmentModel::new()).unwrap();
        assert_relative_eq!(t.rotation.z, 0.0);
    }

    #[test]
    fn test_roll_tilted_eye_line() {
        let estimator = PoseEstimator::new();
        let mut frame = centered_frame();
        frame.left_eye = LandmarkPoint::new(0.3, 0.6, 0.0);
        frame.right_eye = LandmarkPoint::new(0.5, 0.4, 0.0);
        let t = estimator.estimate(Some(&frame), AdjustmentModel::new()).unwrap();
        // screen-space y grows downward, so this renders as an upward tilt
        assert_relative_eq!(t.rotation.z, (-0.2f32).atan2(0.2), epsilon = 1e-6);
    }

    #[test]
    fn test_yaw_follows_temple_depth_difference() {
        let estimator = PoseEstimator::new();
        let mut frame = centered_frame();
        frame.left_temple = LandmarkPoint::new(0.25, 0.5, -0.1);
        frame.right_temple = LandmarkPoint::new(0.75, 0.5, 0.1);
        let t = estimator.estimate(Some(&frame), AdjustmentModel::new()).unwrap();
        assert_relative_eq!(t.rotation.y, -0.2 * YAW_GAIN, epsilon = 1e-6);
    }

    #[test]
    fn test_scale_monotonic_in_eye_distance() {
        let estimator = PoseEstimator::new();
        let adj = AdjustmentModel::new();
        let mut near = centered_frame();
        near.left_eye = LandmarkPoint::new(0.35, 0.5, 0.0);
        near.right_eye = LandmarkPoint::new(0.65, 0.5, 0.0);
        let far = centered_frame();

        let near_t = estimator.estimate(Some(&near), adj).unwrap();
        let far_t = estimator.estimate(Some(&far), adj).unwrap();
        assert!(near_t.scale > far_t.scale);
    }

    #[test]
    fn test_adjustment_offsets_are_additive() {
        let estimator = PoseEstimator::new();
        let frame = centered_frame();
        let base = estimator.estimate(Some(&frame), AdjustmentModel::new()).unwrap();

        let mut adj = AdjustmentModel::new();
        adj.set_offset_x(0.3);
        adj.set_offset_y(-0.2);
        adj.set_offset_z(0.4);
        let biased = estimator.estimate(Some(&frame), adj).unwrap();

        assert_relative_eq!(biased.position.x - base.position.x, 0.3, epsilon = 1e-6);
        assert_relative_eq!(biased.position.y - base.position.y, -0.2, epsilon = 1e-6);
        // z slider is geared up by the adjust gain
        assert_relative_eq!(
            biased.position.z - base.position.z,
            0.4 * Z_ADJUST_GAIN,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_non_finite_frame_is_a_gap() {
        let estimator = PoseEstimator::new();
        let mut frame = centered_frame();
        frame.bridge = LandmarkPoint::new(f32::NAN, 0.5, 0.0);
        assert!(estimator.estimate(Some(&frame), AdjustmentModel::new()).is_none());
    }
}
