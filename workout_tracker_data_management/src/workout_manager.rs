use geo_types::Point;
use workout_tracker_lib::marker::MarkerHandle;
use workout_tracker_lib::workout::{ValidationError, Workout, WorkoutKind};

use crate::WorkoutManagerError;
use crate::edit_session::{EditSession, SubmitTarget};
use crate::snapshot::{self, SnapshotStore};
use crate::workout_store::{WorkoutStore, WorkoutUpdate};

/// Everything a form submission carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutForm {
    pub kind: WorkoutKind,
    pub distance_km: f64,
    pub duration_min: f64,
    /// Cadence for running, elevation gain for cycling.
    pub variant_field: f64,
}

/// Outbound contract towards the list and marker rendering layer. The core
/// hands over full workouts and freed marker handles; it never reads
/// rendering state back.
pub trait WorkoutRenderer {
    /// Called for every workout entering the store, new or rehydrated.
    /// Returns the handle of the marker placed for it, if any.
    fn workout_added(&mut self, workout: &Workout) -> Option<MarkerHandle>;

    fn workout_updated(&mut self, workout: &Workout);

    /// The handle is the one returned from `workout_added`; dispose of the
    /// marker here.
    fn workout_removed(&mut self, workout_id: &str, marker: Option<MarkerHandle>);

    fn workouts_cleared(&mut self, markers: Vec<MarkerHandle>);
}

/// Renderer that only logs. Used by the demo binary and headless setups.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl WorkoutRenderer for LogRenderer {
    fn workout_added(&mut self, workout: &Workout) -> Option<MarkerHandle> {
        tracing::info!("Added {} ({})", workout.label, workout.id);
        None
    }

    fn workout_updated(&mut self, workout: &Workout) {
        tracing::info!("Updated {} ({})", workout.label, workout.id);
    }

    fn workout_removed(&mut self, workout_id: &str, _marker: Option<MarkerHandle>) {
        tracing::info!("Removed workout {workout_id}");
    }

    fn workouts_cleared(&mut self, markers: Vec<MarkerHandle>) {
        tracing::info!("Cleared all workouts ({} markers freed)", markers.len());
    }
}

/// The one controller driving the workout collection: owns the store, the
/// snapshot and the edit session, and pushes every change out through the
/// injected renderer. Single-threaded and blocking throughout; each mutation
/// rewrites the full snapshot before returning.
pub struct WorkoutManager<R: WorkoutRenderer> {
    store: WorkoutStore,
    snapshot: SnapshotStore,
    edit_session: EditSession,
    renderer: R,
}

impl<R: WorkoutRenderer> WorkoutManager<R> {
    /// Starts with the default snapshot location under the project data dir.
    pub fn start(renderer: R) -> Result<Self, WorkoutManagerError> {
        Self::with_snapshot(SnapshotStore::open_default()?, renderer)
    }

    pub fn with_snapshot(
        snapshot: SnapshotStore,
        renderer: R,
    ) -> Result<Self, WorkoutManagerError> {
        let mut manager = WorkoutManager {
            store: WorkoutStore::new(),
            snapshot,
            edit_session: EditSession::Idle,
            renderer,
        };
        manager.rehydrate();
        Ok(manager)
    }

    /// Rebuilds the store from the stored snapshot, keeping stored ids and
    /// order. Unreadable data means starting empty; stored records that no
    /// longer validate are skipped rather than taking the rest down.
    fn rehydrate(&mut self) {
        let Some(text) = self.snapshot.load() else {
            tracing::info!("No workout snapshot found, starting empty");
            return;
        };

        for record in snapshot::decode(&text) {
            let workout = match record.into_workout() {
                Ok(workout) => workout,
                Err(err) => {
                    tracing::warn!("Skipping stored workout: {err}");
                    continue;
                }
            };

            if let Err(err) = self.add_and_render(workout) {
                tracing::warn!("Skipping stored workout: {err}");
            }
        }

        tracing::info!("Rehydrated {} workouts", self.store.len());
    }

    /// Map click: the next submission creates a workout at this position.
    pub fn pick_location(&mut self, latitude: f64, longitude: f64) {
        self.edit_session.pick_location(Point::new(longitude, latitude));
    }

    /// Edit click on a list item: the next submission updates that workout.
    /// Returns the workout so the caller can pre-fill the form.
    pub fn begin_edit(&mut self, id: &str) -> Result<&Workout, WorkoutManagerError> {
        let workout = self.store.find_by_id(id).ok_or_else(|| {
            tracing::warn!("Edit requested for unknown workout {id}");
            WorkoutManagerError::NotFound(id.to_string())
        })?;

        self.edit_session.begin_edit(id.to_string());
        Ok(workout)
    }

    /// Discards the open form, if any.
    pub fn cancel(&mut self) {
        self.edit_session.cancel();
    }

    /// Routes the submission on the edit session alone: creating adds a new
    /// workout at the picked location, editing updates the target in place.
    /// Only a successful submission closes the session.
    pub fn submit(&mut self, form: WorkoutForm) -> Result<&Workout, WorkoutManagerError> {
        let target = self
            .edit_session
            .submit_target()
            .ok_or(WorkoutManagerError::NoSession)?;

        let id = match target {
            SubmitTarget::NewAt(location) => {
                let workout = Workout::new(
                    form.kind,
                    location,
                    form.distance_km,
                    form.duration_min,
                    form.variant_field,
                    None,
                )?;
                self.add_and_render(workout)?
            }
            SubmitTarget::Existing(id) => {
                let existing = self
                    .store
                    .find_by_id(&id)
                    .ok_or_else(|| WorkoutManagerError::NotFound(id.clone()))?;
                // Kind is fixed at creation
                if existing.kind() != form.kind {
                    return Err(ValidationError {
                        field: "type",
                        reason: "the workout type cannot be changed after creation".to_string(),
                    }
                    .into());
                }

                let updated = self.store.update(
                    &id,
                    WorkoutUpdate {
                        distance_km: Some(form.distance_km),
                        duration_min: Some(form.duration_min),
                        variant_field: Some(form.variant_field),
                    },
                )?;
                self.renderer.workout_updated(updated);
                id
            }
        };

        self.persist()?;
        self.edit_session.finish();

        self.store
            .find_by_id(&id)
            .ok_or(WorkoutManagerError::NotFound(id))
    }

    /// Delete click: removes the workout, hands the freed marker to the
    /// renderer and rewrites the snapshot.
    pub fn remove_workout(&mut self, id: &str) -> Result<(), WorkoutManagerError> {
        let marker = self.store.remove(id)?;
        self.renderer.workout_removed(id, marker);
        self.persist()
    }

    /// Delete-all: empties the store and drops the stored snapshot. Returns
    /// how many workouts were removed.
    pub fn remove_all(&mut self) -> Result<usize, WorkoutManagerError> {
        let count = self.store.len();
        let markers = self.store.remove_all();
        self.renderer.workouts_cleared(markers);
        self.edit_session.cancel();
        self.snapshot.clear()?;
        Ok(count)
    }

    /// Marker bookkeeping for renderers that place markers after the fact.
    pub fn attach_marker(
        &mut self,
        id: &str,
        handle: MarkerHandle,
    ) -> Result<(), WorkoutManagerError> {
        self.store.attach_marker(id, handle)
    }

    pub fn workouts(&self) -> &[Workout] {
        self.store.workouts()
    }

    pub fn find_workout(&self, id: &str) -> Option<&Workout> {
        self.store.find_by_id(id)
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit_session
    }

    fn add_and_render(&mut self, workout: Workout) -> Result<String, WorkoutManagerError> {
        let id = workout.id.clone();

        let marker = {
            let added = self.store.add(workout)?;
            self.renderer.workout_added(added)
        };
        if let Some(handle) = marker {
            self.store.attach_marker(&id, handle)?;
        }

        Ok(id)
    }

    fn persist(&self) -> Result<(), WorkoutManagerError> {
        let encoded = snapshot::encode(self.store.workouts())?;
        self.snapshot.save(&encoded)
    }
}
