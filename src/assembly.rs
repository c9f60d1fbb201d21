//! Element-local assembly contracts and the parallel global assembly driver.
pub mod global;
pub mod local;
