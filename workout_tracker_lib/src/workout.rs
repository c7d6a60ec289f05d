use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::marker::MarkerHandle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Unrecognized tags take the cycling branch, same as the stored data
    /// format does.
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("running") {
            WorkoutKind::Running
        } else {
            WorkoutKind::Cycling
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }
}

/// Kind-specific measure plus the metric derived from it. Exactly one
/// variant exists per workout, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutDetails {
    Running {
        /// Steps per minute.
        cadence: f64,
        /// min/km
        pace: f64,
    },
    Cycling {
        /// Meters. May be zero or negative on a net descent.
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl WorkoutDetails {
    fn derive(kind: WorkoutKind, distance_km: f64, duration_min: f64, variant_field: f64) -> Self {
        match kind {
            WorkoutKind::Running => WorkoutDetails::Running {
                cadence: variant_field,
                pace: duration_min / distance_km,
            },
            WorkoutKind::Cycling => WorkoutDetails::Cycling {
                elevation_gain: variant_field,
                speed: distance_km / (duration_min / 60.0),
            },
        }
    }
}

/// A single logged exercise session tied to a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// x = longitude, y = latitude. Immutable after creation.
    pub position: Point,
    pub distance_km: f64,
    pub duration_min: f64,
    pub details: WorkoutDetails,
    /// "<Kind> on <Month> <Day>", fixed at creation.
    pub label: String,
    pub marker: Option<MarkerHandle>,
}

impl Workout {
    /// Builds a validated workout. `explicit_id` is the rehydration path;
    /// when absent the id is derived from the creation timestamp.
    pub fn new(
        kind: WorkoutKind,
        position: Point,
        distance_km: f64,
        duration_min: f64,
        variant_field: f64,
        explicit_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate(kind, distance_km, duration_min, variant_field)?;

        let created_at = Utc::now();
        let id = explicit_id.unwrap_or_else(|| derive_id(created_at));
        let label = format!(
            "{} on {}",
            kind.display_name(),
            created_at.format("%B %-d")
        );

        Ok(Workout {
            id,
            created_at,
            position,
            distance_km,
            duration_min,
            details: WorkoutDetails::derive(kind, distance_km, duration_min, variant_field),
            label,
            marker: None,
        })
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.details {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub fn variant_field(&self) -> f64 {
        match self.details {
            WorkoutDetails::Running { cadence, .. } => cadence,
            WorkoutDetails::Cycling { elevation_gain, .. } => elevation_gain,
        }
    }

    /// Pace for running, speed for cycling.
    pub fn metric(&self) -> f64 {
        match self.details {
            WorkoutDetails::Running { pace, .. } => pace,
            WorkoutDetails::Cycling { speed, .. } => speed,
        }
    }

    /// Applies new measures and re-derives the metric. Identity, position,
    /// creation time, label and kind stay as they were.
    pub fn recompute(
        &mut self,
        distance_km: f64,
        duration_min: f64,
        variant_field: f64,
    ) -> Result<(), ValidationError> {
        let kind = self.kind();
        validate(kind, distance_km, duration_min, variant_field)?;

        self.distance_km = distance_km;
        self.duration_min = duration_min;
        self.details = WorkoutDetails::derive(kind, distance_km, duration_min, variant_field);

        Ok(())
    }

    pub fn attach_marker(&mut self, handle: MarkerHandle) {
        self.marker = Some(handle);
    }

    pub fn detach_marker(&mut self) -> Option<MarkerHandle> {
        self.marker.take()
    }
}

fn validate(
    kind: WorkoutKind,
    distance_km: f64,
    duration_min: f64,
    variant_field: f64,
) -> Result<(), ValidationError> {
    check_positive("distance", distance_km)?;
    check_positive("duration", duration_min)?;

    match kind {
        WorkoutKind::Running => check_positive("cadence", variant_field),
        // Elevation gain only has to be a real number
        WorkoutKind::Cycling => check_finite("elevation gain", variant_field),
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            reason: format!("{value} is not a finite number"),
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            reason: format!("{value} is not positive"),
        })
    }
}

/// Last 10 digits of the unix timestamp. Nanosecond precision, so two
/// back-to-back creations on the same thread still get distinct ids.
fn derive_id(created_at: DateTime<Utc>) -> String {
    let nanos = created_at.timestamp_nanos_opt().unwrap_or_default().to_string();
    let start = nanos.len().saturating_sub(10);
    nanos[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn porto() -> Point {
        Point::new(-8.6, 41.1)
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        let workout =
            Workout::new(WorkoutKind::Running, porto(), 5.2, 30.0, 150.0, None).unwrap();

        assert!((workout.metric() - 30.0 / 5.2).abs() < 1e-9);
        assert!((workout.metric() - 5.769).abs() < 1e-3);
        assert!(workout.label.starts_with("Running on "));
    }

    #[test]
    fn cycling_speed_is_distance_over_hours() {
        let workout =
            Workout::new(WorkoutKind::Cycling, porto(), 27.0, 95.0, 523.0, None).unwrap();

        assert!((workout.metric() - 27.0 / (95.0 / 60.0)).abs() < 1e-9);
        assert!(workout.label.starts_with("Cycling on "));
    }

    #[test]
    fn rejects_non_positive_measures() {
        assert!(Workout::new(WorkoutKind::Running, porto(), 0.0, 30.0, 150.0, None).is_err());
        assert!(Workout::new(WorkoutKind::Running, porto(), 5.0, -1.0, 150.0, None).is_err());
        assert!(Workout::new(WorkoutKind::Running, porto(), 5.0, 30.0, 0.0, None).is_err());
        assert!(
            Workout::new(WorkoutKind::Cycling, porto(), f64::NAN, 30.0, 100.0, None).is_err()
        );
        assert!(
            Workout::new(WorkoutKind::Cycling, porto(), 5.0, 30.0, f64::INFINITY, None).is_err()
        );
    }

    #[test]
    fn cycling_allows_downhill_elevation() {
        let workout =
            Workout::new(WorkoutKind::Cycling, porto(), 12.0, 25.0, -340.0, None).unwrap();
        assert_eq!(workout.variant_field(), -340.0);
    }

    #[test]
    fn explicit_id_is_used_verbatim() {
        let workout = Workout::new(
            WorkoutKind::Running,
            porto(),
            5.0,
            30.0,
            150.0,
            Some("1234567890".to_string()),
        )
        .unwrap();
        assert_eq!(workout.id, "1234567890");
    }

    #[test]
    fn derived_id_has_ten_digits() {
        let workout = Workout::new(WorkoutKind::Running, porto(), 5.0, 30.0, 150.0, None).unwrap();
        assert_eq!(workout.id.len(), 10);
        assert!(workout.id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn recompute_changes_metric_but_not_identity() {
        let mut workout =
            Workout::new(WorkoutKind::Running, porto(), 5.0, 30.0, 150.0, None).unwrap();
        let id = workout.id.clone();
        let label = workout.label.clone();

        workout.recompute(10.0, 30.0, 150.0).unwrap();

        assert!((workout.metric() - 3.0).abs() < 1e-9);
        assert_eq!(workout.id, id);
        assert_eq!(workout.label, label);
        assert_eq!(workout.position, porto());
        assert_eq!(workout.kind(), WorkoutKind::Running);
    }

    #[test]
    fn recompute_rejects_bad_input_and_keeps_state() {
        let mut workout =
            Workout::new(WorkoutKind::Running, porto(), 5.0, 30.0, 150.0, None).unwrap();

        assert!(workout.recompute(-2.0, 30.0, 150.0).is_err());
        assert_eq!(workout.distance_km, 5.0);
    }

    #[test]
    fn marker_bookkeeping() {
        let mut workout =
            Workout::new(WorkoutKind::Cycling, porto(), 10.0, 40.0, 120.0, None).unwrap();
        assert_eq!(workout.marker, None);

        workout.attach_marker(MarkerHandle(7));
        assert_eq!(workout.marker, Some(MarkerHandle(7)));
        assert_eq!(workout.detach_marker(), Some(MarkerHandle(7)));
        assert_eq!(workout.marker, None);
    }

    #[test]
    fn unknown_kind_tags_fall_back_to_cycling() {
        assert_eq!(WorkoutKind::from_tag("running"), WorkoutKind::Running);
        assert_eq!(WorkoutKind::from_tag("RUNNING"), WorkoutKind::Running);
        assert_eq!(WorkoutKind::from_tag("cycling"), WorkoutKind::Cycling);
        assert_eq!(WorkoutKind::from_tag("rowing"), WorkoutKind::Cycling);
        assert_eq!(WorkoutKind::from_tag(""), WorkoutKind::Cycling);
    }
}
