pub mod asset;
pub mod common;
pub mod generation;

pub use asset::*;
pub use common::*;
pub use generation::*;
