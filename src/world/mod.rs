mod broad_phase;
mod narrow_phase;
mod solver;
#[allow(clippy::module_inception)]
mod world;

pub use broad_phase::*;
pub use narrow_phase::*;
pub use solver::*;
pub use world::*;

#[cfg(test)]
mod world_tests;
