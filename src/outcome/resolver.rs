// src/outcome/resolver.rs
use std::sync::Arc;

use log::{debug, warn};

use crate::geometry::DieMesh;
use crate::models::{Quaternion, SleepState};
use crate::outcome::FaceTable;
use crate::session::DieHandle;
use crate::utils::{DiceError, Vector3, ZERO_VECTOR};

/// World direction that counts as "up" when reading a die
pub const PROBE_DIRECTION: Vector3 = (0.0, 1.0, 0.0);

/// Where a die is in its life from throw to result.
///
/// `Tumbling -> Settled` follows the world's sleep policy; `Settled -> Resolved` happens on
/// the first successful read. A die that is woken again goes back to `Tumbling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Tumbling,
    Settled,
    Resolved(u8),
}

impl ResolutionState {
    /// Next state after observing the body's sleep state
    pub fn observe(self, sleep_state: SleepState) -> Self {
        match (self, sleep_state) {
            (_, SleepState::Awake) => ResolutionState::Tumbling,
            (ResolutionState::Tumbling, SleepState::Sleeping) => ResolutionState::Settled,
            (state, SleepState::Sleeping) => state,
        }
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            ResolutionState::Resolved(value) => Some(*value),
            _ => None,
        }
    }
}

/// Reads the uppermost face of a die by probing its mesh.
///
/// A ray is cast from the body origin along [`PROBE_DIRECTION`], expressed in the die's
/// frame, and the surface coordinate of the first hit is looked up in the face table after
/// rounding both to a fixed number of decimals.
#[derive(Debug, Clone)]
pub struct OutcomeResolver {
    table: Arc<FaceTable>,
    decimals: u32,
}

impl OutcomeResolver {
    /// # Errors
    /// `DiceError::InvalidConfiguration` if two faces of `table` cannot be told apart at
    /// `decimals` digits.
    pub fn new(table: Arc<FaceTable>, decimals: u32) -> Result<Self, DiceError> {
        table.check_distinct(decimals)?;
        Ok(Self { table, decimals })
    }

    pub fn table(&self) -> &FaceTable {
        &self.table
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Surface coordinate seen straight above the die's origin, if the probe hits the mesh
    pub fn probe(&self, mesh: &DieMesh, orientation: Quaternion) -> Option<(f64, f64)> {
        let up = orientation.inverse_rotate_point(PROBE_DIRECTION);
        mesh.raycast(ZERO_VECTOR, up).map(|hit| hit.uv)
    }

    /// Face value of a die resting with the given orientation.
    ///
    /// # Errors
    /// * `DiceError::UnresolvedFace` - The probed coordinate matches no face, e.g. a die
    ///   cocked against a wall or another die
    /// * `DiceError::InvalidMesh` - The probe left the mesh without hitting it. A mesh closed
    ///   around its origin is hit in every orientation, so a miss is a defect of the mesh
    ///   that no later roll can fix, not an ambiguous roll.
    ///
    /// # Example
    /// ```
    /// use rs_dice::geometry::DieMesh;
    /// use rs_dice::models::Quaternion;
    /// use rs_dice::outcome::{FaceTable, OutcomeResolver};
    /// use rs_dice::session::DieHandle;
    ///
    /// let resolver = OutcomeResolver::new(FaceTable::standard_d6(), 2).unwrap();
    /// let mesh = DieMesh::standard_d6(1.0);
    /// assert_eq!(resolver.resolve(DieHandle(1), &mesh, Quaternion::identity()), Ok(1));
    /// ```
    pub fn resolve(&self, die: DieHandle, mesh: &DieMesh, orientation: Quaternion) -> Result<u8, DiceError> {
        let coordinate = self.probe(mesh, orientation).ok_or_else(|| {
            warn!("Probe for die {} hit nothing; the mesh does not enclose its origin", die);
            DiceError::InvalidMesh("probe ray left the die without hitting its surface".to_string())
        })?;

        match self.table.lookup(coordinate, self.decimals) {
            Some(value) => {
                debug!("Die {} resolved to {} (surface coordinate {:?})", die, value, coordinate);
                Ok(value)
            }
            None => Err(DiceError::UnresolvedFace { die, coordinate }),
        }
    }
}
