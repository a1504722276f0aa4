mod material;
mod quaternion;
mod rigid_body;

pub use material::*;
pub use quaternion::*;
pub use rigid_body::*;

#[cfg(test)]
mod rigid_body_tests;
