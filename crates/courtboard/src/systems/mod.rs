pub mod curve;
pub mod flight;
pub mod history;
pub mod hoop;
pub mod roster;
pub mod smoothing;
