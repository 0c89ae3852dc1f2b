use tracing::debug;

use crate::config::config::StabilizerConfig;
use crate::utils::coordinate::{RigidTransform, TrackingState};

/// TransformStabilizer sits between the estimator and the renderer. Its one
/// mandatory job is dropout bridging: brief detector misses re-emit the last
/// known transform instead of flickering, and only a gap longer than the
/// grace period declares tracking lost. An optional exponential moving
/// average smooths the emitted transform when enabled in configuration; the
/// estimator itself stays filter-free.
#[derive(Debug, Clone)]
pub struct TransformStabilizer {
    grace_frames: u32,
    smoothing: bool,
    smoothing_alpha: f32,
}

impl TransformStabilizer {
    /// new initializes the stabilizer from configuration.
    pub fn new(config: &StabilizerConfig) -> Self {
        TransformStabilizer {
            grace_frames: config.grace_frames,
            smoothing: config.smoothing,
            smoothing_alpha: config.smoothing_alpha.clamp(0.0, 1.0),
        }
    }

    /// stabilize folds one raw estimate into the tracking state and returns
    /// what the renderer should draw this frame (`None` means draw nothing).
    ///
    /// # Arguments
    /// * `raw` - the estimator output for this frame
    /// * `state` - tracking bookkeeping, mutated in place
    ///
    /// # Returns
    /// * `Option<RigidTransform>`
    pub fn stabilize(
        &self,
        raw: Option<RigidTransform>,
        state: &mut TrackingState,
    ) -> Option<RigidTransform> {
        match raw {
            Some(transform) => {
                let emitted = if self.smoothing {
                    match state.last_known {
                        Some(prev) => blend(prev, transform, self.smoothing_alpha),
                        None => transform,
                    }
                } else {
                    transform
                };
                state.frames_since_detection = 0;
                state.face_detected = true;
                state.last_known = Some(emitted);
                Some(emitted)
            }
            None => {
                state.frames_since_detection = state.frames_since_detection.saturating_add(1);
                if state.frames_since_detection > self.grace_frames {
                    if state.face_detected {
                        debug!(
                            missed = state.frames_since_detection,
                            "tracking lost, dropping held pose"
                        );
                    }
                    state.last_known = None;
                    state.face_detected = false;
                    None
                } else {
                    // Hold the last pose through short detector dropouts.
                    state.last_known
                }
            }
        }
    }
}

/// blend linearly interpolates from `prev` toward `next` by `alpha`
/// (1.0 is pass-through). Euler angles are blended component-wise; the
/// inter-frame deltas of a tracked face stay well inside any wrap point.
fn blend(prev: RigidTransform, next: RigidTransform, alpha: f32) -> RigidTransform {
    RigidTransform {
        position: prev.position.lerp(&next.position, alpha),
        rotation: prev.rotation.lerp(&next.rotation, alpha),
        scale: prev.scale + (next.scale - prev.scale) * alpha,
    }
}
