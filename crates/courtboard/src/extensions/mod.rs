// extensions/mod.rs
//
// Pure math helpers shared by the flight animator and the curve builder.

pub mod easing;

pub use easing::{Easing, lerp, lerp_vec2, arc_lift, arc_point};
