use std::sync::Arc;

use anyhow::Error;
use tokio::task;
use tracing::{info, warn};

use crate::config::config::TryOnConfig;
use crate::error::Error as TryOnError;
use crate::helper::mesh_helper::{AssetNormalizer, MeshId, NormalizedAsset, RawMesh};
use crate::modules::adjustment::AdjustmentModel;
use crate::modules::pose_estimator::PoseEstimator;
use crate::modules::stabilizer::TransformStabilizer;
use crate::utils::coordinate::{LandmarkFrame, RigidTransform, TrackingState};

/// Lifecycle of one try-on session. `Shutdown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Calibrating,
    Tracking,
    Lost,
    Shutdown,
}

/// TryOnPipeline owns one try-on session: the normalized asset, the
/// per-frame estimation path and its tracking state, and the user's manual
/// adjustments. One instance per active session; `process_frame` is
/// synchronous and cheap enough to run on the thread that delivers frames.
#[derive(Debug)]
pub struct TryOnPipeline {
    state: PipelineState,
    estimator: PoseEstimator,
    stabilizer: TransformStabilizer,
    normalizer: AssetNormalizer,
    adjustments: AdjustmentModel,
    tracking: TrackingState,
    asset: Option<Arc<NormalizedAsset>>,
}

impl TryOnPipeline {
    /// new initializes a session pipeline from configuration.
    pub fn new(config: &TryOnConfig) -> Self {
        TryOnPipeline {
            state: PipelineState::Uninitialized,
            estimator: PoseEstimator::new(),
            stabilizer: TransformStabilizer::new(&config.stabilizer),
            normalizer: AssetNormalizer::new(&config.normalizer),
            adjustments: AdjustmentModel::new(),
            tracking: TrackingState::new(),
            asset: None,
        }
    }

    /// load_asset normalizes a mesh off the frame-delivery path and installs
    /// it as the session's active asset. Until this completes the pipeline
    /// renders nothing, exactly as if no face were detected. On failure the
    /// session falls back to "no asset loaded" and keeps refusing to render.
    ///
    /// # Arguments
    /// * `id` - opaque mesh identity (e.g. the catalog asset id)
    /// * `mesh` - the raw imported mesh
    ///
    /// # Returns
    /// * `Result<Arc<NormalizedAsset>, Error>`
    pub async fn load_asset(
        &mut self,
        id: MeshId,
        mesh: RawMesh,
    ) -> Result<Arc<NormalizedAsset>, Error> {
        if self.state == PipelineState::Shutdown {
            return Err(TryOnError::SessionClosed.into());
        }

        self.state = PipelineState::Calibrating;
        self.asset = None;
        self.tracking.reset();

        // Normalization may block on mesh traversal; keep it off the frame
        // thread. The normalizer moves into the task and back so its cache
        // survives the round trip.
        let mut normalizer = self.normalizer.clone();
        let result = task::spawn_blocking(move || {
            let asset = normalizer.normalize(id, &mesh)?;
            Ok::<_, TryOnError>((normalizer, asset))
        })
        .await?;

        match result {
            Ok((normalizer, asset)) => {
                self.normalizer = normalizer;
                self.asset = Some(Arc::clone(&asset));
                self.state = PipelineState::Tracking;
                info!(mesh_id = id.0, "asset calibrated, tracking enabled");
                Ok(asset)
            }
            Err(err) => {
                self.state = PipelineState::Uninitialized;
                warn!(mesh_id = id.0, %err, "asset calibration failed");
                Err(err.into())
            }
        }
    }

    /// process_frame runs one landmark frame through estimation and
    /// stabilization. Returns the transform the renderer should apply to the
    /// normalized asset, or `None` to draw nothing (no face, no asset, or
    /// the session is shut down).
    ///
    /// # Arguments
    /// * `frame` - the landmark frame, or `None` on a missed detection
    ///
    /// # Returns
    /// * `Option<RigidTransform>`
    pub fn process_frame(&mut self, frame: Option<&LandmarkFrame>) -> Option<RigidTransform> {
        match self.state {
            PipelineState::Tracking | PipelineState::Lost => {}
            _ => return None,
        }

        // Copy-on-read snapshot of the slider state for this frame only.
        let adjustments = self.adjustments;
        let raw = self.estimator.estimate(frame, adjustments);
        let out = self.stabilizer.stabilize(raw, &mut self.tracking);

        let next = if self.tracking.face_detected {
            PipelineState::Tracking
        } else {
            PipelineState::Lost
        };
        if next != self.state {
            info!(from = ?self.state, to = ?next, "tracking state changed");
            self.state = next;
        }
        out
    }

    /// shutdown ends the session: the asset reference and normalization
    /// cache are dropped and no further frames or assets are accepted.
    pub fn shutdown(&mut self) {
        self.state = PipelineState::Shutdown;
        self.asset = None;
        self.normalizer.clear();
        self.tracking.reset();
        info!("session shut down");
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn asset(&self) -> Option<&Arc<NormalizedAsset>> {
        self.asset.as_ref()
    }

    pub fn face_detected(&self) -> bool {
        self.tracking.face_detected
    }

    /// status returns the coarse state string shown by the UI badge.
    pub fn status(&self) -> &'static str {
        match self.state {
            PipelineState::Uninitialized => "initializing",
            PipelineState::Calibrating => "calibrating",
            PipelineState::Tracking => "locked",
            PipelineState::Lost => "scanning",
            PipelineState::Shutdown => "shutdown",
        }
    }

    pub fn adjustments(&self) -> AdjustmentModel {
        self.adjustments
    }

    /// adjustments_mut exposes the slider state to the UI. Writes take
    /// effect from the next processed frame; past frames are never
    /// reprocessed.
    pub fn adjustments_mut(&mut self) -> &mut AdjustmentModel {
        &mut self.adjustments
    }
}
