use std::fmt;
use std::error::Error;
use crate::models::BodyHandle;
use crate::session::DieHandle;

/// Represents errors that can occur while building, simulating or reading dice.
#[derive(Debug, Clone, PartialEq)]
pub enum DiceError {
    /// The input points cannot enclose a volume (too few, collinear, coplanar or non-finite).
    DegenerateGeometry(String),
    /// A mesh buffer is malformed (wrong length, or coordinates not matching vertices).
    InvalidMesh(String),
    /// A body with this handle is already registered with the world.
    DuplicateBody(BodyHandle),
    /// No body with this handle is registered with the world.
    UnknownBody(BodyHandle),
    /// Indicates an invalid mass value (negative, non-finite, or a moving half-space).
    InvalidMass(f64),
    /// A configuration or material value is out of range.
    InvalidConfiguration(String),
    /// A roll was requested before the die mesh was delivered.
    MeshNotLoaded,
    /// The session holds no die with this handle.
    UnknownDie(DieHandle),
    /// The die is still moving; its result cannot be read yet.
    NotSettled(DieHandle),
    /// The probe hit a surface coordinate that matches no face.
    UnresolvedFace {
        die: DieHandle,
        coordinate: (f64, f64),
    },
}

impl fmt::Display for DiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DiceError::DegenerateGeometry(msg) => write!(f, "Degenerate geometry: {}", msg),
            DiceError::InvalidMesh(msg) => write!(f, "Invalid mesh: {}", msg),
            DiceError::DuplicateBody(handle) => write!(f, "Body {} is already registered", handle),
            DiceError::UnknownBody(handle) => write!(f, "Body {} is not registered", handle),
            DiceError::InvalidMass(mass) => write!(f, "Invalid mass value: {}", mass),
            DiceError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            DiceError::MeshNotLoaded => write!(f, "Die mesh has not been loaded yet"),
            DiceError::UnknownDie(die) => write!(f, "Die {} is not part of this session", die),
            DiceError::NotSettled(die) => write!(f, "Die {} has not settled yet", die),
            DiceError::UnresolvedFace { die, coordinate } => write!(
                f,
                "Die {} shows no known face (surface coordinate ({}, {}))",
                die, coordinate.0, coordinate.1
            ),
        }
    }
}

impl Error for DiceError {}
