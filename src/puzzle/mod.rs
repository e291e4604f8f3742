pub mod common;
pub mod cube;
pub mod notation;
pub mod solved;
