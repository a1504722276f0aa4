mod convex_hull;
mod die_mesh;

pub use convex_hull::*;
pub use die_mesh::*;

#[cfg(test)]
mod die_mesh_tests;
