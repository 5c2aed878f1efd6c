//! Application layer: playback state machine, session context and render frames
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod playback;
pub mod render;
pub mod session;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use playback::{
    PlaybackController, PlaybackSession, PlaybackState, StepEffect, StepProgram, TimerHandle,
    ViewState, Visit,
};
pub use render::{EdgeDirection, RenderEdge, RenderFrame, RenderNode, RenderSurface, VisualState};
pub use session::{Session, DEFAULT_SLOT};
