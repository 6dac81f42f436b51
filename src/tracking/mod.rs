//! Ball trajectory history and bounce detection.

mod collision;
mod trajectory;

pub use collision::{lateral_correction, BounceDetector, Collision, CollisionMemory};
pub use trajectory::TrajectoryBuffer;
