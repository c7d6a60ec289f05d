use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::workout::{ValidationError, Workout, WorkoutDetails, WorkoutKind};

/// One stored workout, in the exact shape of the persisted JSON array
/// elements. Marker handles, labels and timestamps never appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    /// [latitude, longitude]
    pub coords: [f64; 2],
    pub distance: f64,
    pub duration: f64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(rename = "elevationGain", default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
}

impl WorkoutRecord {
    pub fn from_workout(workout: &Workout) -> Self {
        let (cadence, elevation_gain) = match workout.details {
            WorkoutDetails::Running { cadence, .. } => (Some(cadence), None),
            WorkoutDetails::Cycling { elevation_gain, .. } => (None, Some(elevation_gain)),
        };

        WorkoutRecord {
            id: workout.id.clone(),
            coords: [workout.position.y(), workout.position.x()],
            distance: workout.distance_km,
            duration: workout.duration_min,
            kind: workout.kind().tag().to_string(),
            cadence,
            elevation_gain,
        }
    }

    /// Rebuilds the entity under the stored id. Unknown kind tags take the
    /// cycling branch, so the record must carry `elevationGain` to be usable.
    pub fn into_workout(self) -> Result<Workout, ValidationError> {
        let kind = WorkoutKind::from_tag(&self.kind);
        let position = Point::new(self.coords[1], self.coords[0]);

        let variant_field = match kind {
            WorkoutKind::Running => self.cadence.ok_or(ValidationError {
                field: "cadence",
                reason: "missing from stored record".to_string(),
            })?,
            WorkoutKind::Cycling => self.elevation_gain.ok_or(ValidationError {
                field: "elevation gain",
                reason: "missing from stored record".to_string(),
            })?,
        };

        Workout::new(
            kind,
            position,
            self.distance,
            self.duration,
            variant_field,
            Some(self.id),
        )
    }
}
