use thiserror::Error;

/// Errors produced by the try-on pipeline. Asset errors are fatal for the
/// asset that caused them: the session falls back to "no asset loaded" and
/// refuses to render rather than guess a transform. Tracking gaps and
/// degenerate geometry are recovered locally and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("mesh asset has no submeshes")]
    EmptyMesh,

    #[error("failed to parse mesh asset: {0}")]
    MeshParse(String),

    #[error("pipeline has been shut down")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
