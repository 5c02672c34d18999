pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod bridge;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::board::{PointerEvent, Whiteboard};
pub use api::config::{BoardConfig, DeviceProfile, FlightTuning};
pub use api::error::BoardError;
pub use api::types::{
    BoardEvent, GestureKind, HitTarget, HoopSide, LineId, PointerId, Slot, Team, TokenId,
};
pub use components::line::Line;
pub use components::slots::EnabledSlots;
pub use components::token::{Ball, PassLine, Token};
pub use core::geometry::{FixedSurface, SurfaceProvider, SurfaceRect};
pub use core::scene::SceneState;
pub use input::queue::{BoardCommand, InputEvent, InputQueue};
pub use input::router::{Gesture, PointerRouter};
pub use bridge::protocol::{EventRecord, FrameBuffer, ProtocolLayout, TokenInstance};
pub use systems::curve::CubicSegment;
pub use systems::flight::{BallFlight, Flight, FlightOutcome};
pub use systems::history::{HistoryStack, Snapshot};
pub use systems::roster::{Roster, RosterLayout};
pub use systems::smoothing::SmoothingConfig;

// Easing and arc helpers
pub use extensions::{Easing, lerp, lerp_vec2, arc_lift, arc_point};
