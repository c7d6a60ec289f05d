use std::fs;
use std::path::PathBuf;

use workout_tracker_lib::record::WorkoutRecord;
use workout_tracker_lib::workout::Workout;

use crate::{SNAPSHOT_PATH, WorkoutManagerError};

/// One record per workout, insertion order preserved. Only the fields of the
/// stored data format make it in; markers and labels stay behind.
pub fn encode(workouts: &[Workout]) -> Result<String, WorkoutManagerError> {
    let records: Vec<WorkoutRecord> = workouts.iter().map(WorkoutRecord::from_workout).collect();

    serde_json::to_string(&records)
        .map_err(|err| WorkoutManagerError::Snapshot(format!("failed to encode snapshot: {err}")))
}

/// Absent or malformed data decodes to "no prior workouts". That is the
/// intended degradation policy, not an oversight.
pub fn decode(text: &str) -> Vec<WorkoutRecord> {
    match serde_json::from_str(text) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!("Discarding unreadable snapshot: {err}");
            Vec::new()
        }
    }
}

/// File-backed equivalent of a single durable key. Every save replaces the
/// whole snapshot through a temp file rename, so a failed write leaves the
/// previous snapshot untouched.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Snapshot under `<project root>/data/`, created on demand.
    pub fn open_default() -> Result<Self, WorkoutManagerError> {
        let root = project_root::get_project_root().map_err(|err| {
            WorkoutManagerError::Snapshot(format!("failed to locate project root: {err}"))
        })?;
        Self::at_path(root.join(SNAPSHOT_PATH))
    }

    pub fn at_path(path: PathBuf) -> Result<Self, WorkoutManagerError> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|err| {
                    WorkoutManagerError::Snapshot(format!(
                        "failed to create data directory {dir:?}: {err}"
                    ))
                })?;
            }
        }

        Ok(SnapshotStore { path })
    }

    pub fn save(&self, contents: &str) -> Result<(), WorkoutManagerError> {
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, contents).map_err(|err| {
            tracing::error!("Failed to write snapshot {tmp:?}: {err}");
            WorkoutManagerError::Snapshot(format!("failed to write snapshot: {err}"))
        })?;

        fs::rename(&tmp, &self.path).map_err(|err| {
            tracing::error!("Failed to replace snapshot {:?}: {err}", self.path);
            WorkoutManagerError::Snapshot(format!("failed to replace snapshot: {err}"))
        })
    }

    /// `None` when no snapshot exists or it cannot be read.
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    /// Drops the stored snapshot entirely, the delete-all path.
    pub fn clear(&self) -> Result<(), WorkoutManagerError> {
        if !self.path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.path).map_err(|err| {
            WorkoutManagerError::Snapshot(format!("failed to remove snapshot: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use geo_types::Point;
    use workout_tracker_lib::marker::MarkerHandle;
    use workout_tracker_lib::workout::WorkoutKind;

    use super::*;

    fn sample_workouts() -> Vec<Workout> {
        let mut running = Workout::new(
            WorkoutKind::Running,
            Point::new(-8.6, 41.1),
            5.2,
            30.0,
            150.0,
            Some("1111111111".to_string()),
        )
        .unwrap();
        running.attach_marker(MarkerHandle(1));

        let cycling = Workout::new(
            WorkoutKind::Cycling,
            Point::new(10.2, 56.1),
            27.0,
            95.0,
            523.0,
            Some("2222222222".to_string()),
        )
        .unwrap();

        vec![running, cycling]
    }

    #[test]
    fn round_trip_preserves_ids_order_and_fields() {
        let workouts = sample_workouts();

        let text = encode(&workouts).unwrap();
        let records = decode(&text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1111111111");
        assert_eq!(records[0].kind, "running");
        assert_eq!(records[0].cadence, Some(150.0));
        assert_eq!(records[1].id, "2222222222");
        assert_eq!(records[1].kind, "cycling");
        assert_eq!(records[1].elevation_gain, Some(523.0));

        // Idempotent under repetition
        let restored: Vec<Workout> = records
            .into_iter()
            .map(|r| r.into_workout().unwrap())
            .collect();
        let again = decode(&encode(&restored).unwrap());
        assert_eq!(again, decode(&text));
    }

    #[test]
    fn encoded_records_carry_exactly_the_stored_fields() {
        let text = encode(&sample_workouts()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let running = &value[0];
        let mut keys: Vec<&str> = running
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["cadence", "coords", "distance", "duration", "id", "type"]
        );
        assert_eq!(running["coords"], serde_json::json!([41.1, -8.6]));

        let cycling = value[1].as_object().unwrap();
        assert!(cycling.contains_key("elevationGain"));
        assert!(!cycling.contains_key("cadence"));
    }

    #[test]
    fn malformed_text_decodes_to_nothing() {
        assert!(decode("not json").is_empty());
        assert!(decode("").is_empty());
        assert!(decode("{\"id\": 4}").is_empty());
    }

    #[test]
    fn snapshot_file_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::at_path(dir.path().join("data").join("workouts.json")).unwrap();

        assert_eq!(store.load(), None);

        store.save("[1]").unwrap();
        assert_eq!(store.load().as_deref(), Some("[1]"));

        // Full overwrite, not append
        store.save("[2]").unwrap();
        assert_eq!(store.load().as_deref(), Some("[2]"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }
}
