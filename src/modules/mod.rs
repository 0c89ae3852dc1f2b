pub mod adjustment;
pub mod pose_estimator;
pub mod stabilizer;
