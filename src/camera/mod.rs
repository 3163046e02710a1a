//! Camera-animatie rond regio's van interesse.

pub mod animator;
pub mod highlight;
pub mod pose;

pub use animator::{AnimationPhase, Animator, Direction, Frame, RoiCursor};
pub use highlight::MeshHighlight;
pub use pose::{CameraPose, CameraRig, wrap_yaw};
