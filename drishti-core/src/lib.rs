pub mod types;
pub mod error;

pub use error::{Error, Result};
pub use types::{
    BoundingBox, Detection, Direction, Distance, EnvironmentMode, FrameSize, Language, Millis,
    Motion, Priority, Urgency, Zone,
};
