pub mod marker;
pub mod record;
pub mod workout;
