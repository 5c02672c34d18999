pub mod queue;
pub mod router;
pub mod tap;
