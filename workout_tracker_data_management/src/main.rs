use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_tracker_data_management::{LogRenderer, WorkoutManager};

// Rehydrates the stored workouts and lists them
fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let manager = match WorkoutManager::start(LogRenderer) {
        Ok(manager) => manager,
        Err(err) => {
            tracing::error!("Failed to start workout manager: {err}");
            return;
        }
    };

    for workout in manager.workouts() {
        tracing::info!(
            "{}: {:.1} km in {:.0} min ({:.1})",
            workout.label,
            workout.distance_km,
            workout.duration_min,
            workout.metric(),
        );
    }
}
