use const_format::concatcp;
use thiserror::Error;
use workout_tracker_lib::workout::ValidationError;

pub mod edit_session;
pub mod snapshot;
mod workout_manager;
pub mod workout_store;

pub use workout_manager::*;

pub const DATA_DIR: &str = "data/";
pub const SNAPSHOT_PATH: &str = concatcp!(DATA_DIR, "workouts.json");

#[derive(Debug, Error)]
pub enum WorkoutManagerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no workout with id {0}")]
    NotFound(String),
    #[error("duplicate workout id {0}")]
    DuplicateId(String),
    #[error("snapshot storage: {0}")]
    Snapshot(String),
    #[error("no active create or edit session")]
    NoSession,
}
