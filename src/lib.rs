//! Physics-driven dice rolls.
//!
//! Dice are convex hulls built from a render mesh, thrown into a tray of static
//! half-spaces and simulated with a fixed-step rigid-body world. Once a die sleeps,
//! the face pointing up is read back from the mesh's texture coordinates.
//!
//! ```
//! use rs_dice::geometry::DieMesh;
//! use rs_dice::session::DiceSession;
//! use rs_dice::utils::SessionConfig;
//!
//! let mut session = DiceSession::with_mesh(SessionConfig::default(), DieMesh::standard_d6(1.0)).unwrap();
//! let die = session.request_roll((2.0, 1.5, 0.0)).unwrap();
//! session.run_until_settled(600);
//! assert_eq!(session.result_of(die), Ok(1));
//! ```
pub mod utils;
pub mod models;
pub mod geometry;
pub mod world;
pub mod outcome;
pub mod session;
