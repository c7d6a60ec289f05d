/// Opaque handle to a map marker owned by the rendering layer.
///
/// The core never looks inside it. It is kept on the workout only so the
/// marker's owner can be asked to dispose of it when the workout goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub i64);
