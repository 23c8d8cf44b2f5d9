//! Core data models for the squad board.

mod handle;
mod matches;
mod player;
mod summary;
mod team;

pub use handle::*;
pub use matches::*;
pub use player::*;
pub use summary::*;
pub use team::*;
