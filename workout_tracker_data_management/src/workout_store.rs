use workout_tracker_lib::marker::MarkerHandle;
use workout_tracker_lib::workout::Workout;

use crate::WorkoutManagerError;

/// Partial change applied by the edit flow. Fields left `None` keep their
/// current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkoutUpdate {
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
    pub variant_field: Option<f64>,
}

/// Exclusive owner of the workout collection. Insertion order is display
/// order; entities only leave through `remove` or `remove_all`.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the end of the collection. The id collision check is
    /// defensive; timestamp-derived ids only collide within a millisecond.
    pub fn add(&mut self, workout: Workout) -> Result<&Workout, WorkoutManagerError> {
        if self.workouts.iter().any(|w| w.id == workout.id) {
            return Err(WorkoutManagerError::DuplicateId(workout.id));
        }

        self.workouts.push(workout);
        Ok(&self.workouts[self.workouts.len() - 1])
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Applies the partial update and re-derives the metric. The workout
    /// keeps its place in the order.
    pub fn update(
        &mut self,
        id: &str,
        update: WorkoutUpdate,
    ) -> Result<&Workout, WorkoutManagerError> {
        let Some(index) = self.workouts.iter().position(|w| w.id == id) else {
            tracing::warn!("Update target {id} is not in the store");
            return Err(WorkoutManagerError::NotFound(id.to_string()));
        };

        let workout = &mut self.workouts[index];
        let distance_km = update.distance_km.unwrap_or(workout.distance_km);
        let duration_min = update.duration_min.unwrap_or(workout.duration_min);
        let variant_field = update.variant_field.unwrap_or_else(|| workout.variant_field());

        workout.recompute(distance_km, duration_min, variant_field)?;

        Ok(&self.workouts[index])
    }

    /// Removes the workout and hands its marker handle back for disposal.
    pub fn remove(&mut self, id: &str) -> Result<Option<MarkerHandle>, WorkoutManagerError> {
        let Some(index) = self.workouts.iter().position(|w| w.id == id) else {
            tracing::warn!("Remove target {id} is not in the store");
            return Err(WorkoutManagerError::NotFound(id.to_string()));
        };

        let mut workout = self.workouts.remove(index);
        Ok(workout.detach_marker())
    }

    /// Empties the store. The caller disposes of the returned marker handles.
    pub fn remove_all(&mut self) -> Vec<MarkerHandle> {
        self.workouts
            .drain(..)
            .filter_map(|mut w| w.detach_marker())
            .collect()
    }

    pub fn attach_marker(
        &mut self,
        id: &str,
        handle: MarkerHandle,
    ) -> Result<(), WorkoutManagerError> {
        let workout = self
            .workouts
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WorkoutManagerError::NotFound(id.to_string()))?;
        workout.attach_marker(handle);
        Ok(())
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}
