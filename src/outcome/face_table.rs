// src/outcome/face_table.rs
use std::sync::{Arc, OnceLock};

use crate::geometry::STANDARD_D6_FACE_CENTRES;
use crate::utils::{rounded_key, DiceError};

/// One authored face: the surface coordinate at its centre and the value it shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceEntry {
    pub coordinate: (f64, f64),
    pub value: u8,
}

/// Fixed mapping from surface coordinates to face values.
///
/// Tables carry no per-session state and are shared between sessions behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTable {
    entries: Vec<FaceEntry>,
}

static STANDARD_D6: OnceLock<Arc<FaceTable>> = OnceLock::new();

impl FaceTable {
    /// Creates a table from authored entries.
    ///
    /// # Errors
    /// `DiceError::InvalidConfiguration` for an empty table, a zero face value, or a
    /// value listed twice.
    pub fn new(entries: Vec<FaceEntry>) -> Result<Self, DiceError> {
        if entries.is_empty() {
            return Err(DiceError::InvalidConfiguration("face table is empty".to_string()));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entry.value == 0 {
                return Err(DiceError::InvalidConfiguration("face values start at 1".to_string()));
            }
            if entries[..i].iter().any(|e| e.value == entry.value) {
                return Err(DiceError::InvalidConfiguration(format!(
                    "face value {} is listed twice",
                    entry.value
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Table matching the atlas of [`DieMesh::standard_d6`](crate::geometry::DieMesh::standard_d6).
    ///
    /// Built on first use and shared by every caller afterwards.
    pub fn standard_d6() -> Arc<FaceTable> {
        Arc::clone(STANDARD_D6.get_or_init(|| {
            let entries = STANDARD_D6_FACE_CENTRES
                .iter()
                .zip(1u8..)
                .map(|(&coordinate, value)| FaceEntry { coordinate, value })
                .collect();
            Arc::new(FaceTable { entries })
        }))
    }

    pub fn entries(&self) -> &[FaceEntry] {
        &self.entries
    }

    /// Value whose coordinate equals `coordinate` once both are rounded to `decimals` digits.
    ///
    /// # Example
    /// ```
    /// use rs_dice::outcome::FaceTable;
    ///
    /// let table = FaceTable::standard_d6();
    /// assert_eq!(table.lookup((0.1699999, 0.7500001), 2), Some(1));
    /// assert_eq!(table.lookup((0.176, 0.75), 2), None);
    /// ```
    pub fn lookup(&self, coordinate: (f64, f64), decimals: u32) -> Option<u8> {
        let key = (rounded_key(coordinate.0, decimals), rounded_key(coordinate.1, decimals));
        self.entries
            .iter()
            .find(|entry| {
                (rounded_key(entry.coordinate.0, decimals), rounded_key(entry.coordinate.1, decimals)) == key
            })
            .map(|entry| entry.value)
    }

    /// Checks that no two entries collapse onto the same coordinate at this precision.
    pub fn check_distinct(&self, decimals: u32) -> Result<(), DiceError> {
        match self
            .entries
            .iter()
            .find(|entry| self.lookup(entry.coordinate, decimals) != Some(entry.value))
        {
            Some(entry) => Err(DiceError::InvalidConfiguration(format!(
                "face {} is indistinguishable from another face at {} decimals",
                entry.value, decimals
            ))),
            None => Ok(()),
        }
    }
}
