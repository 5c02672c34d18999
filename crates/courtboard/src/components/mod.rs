pub mod line;
pub mod slots;
pub mod token;
