use crate::utils::DiceError;

/// Friction/restitution pair applied wherever two bodies touch.
///
/// A single instance is shared (behind an `Arc`) by every body in a world; bodies
/// only ever read it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    /// Coulomb friction coefficient (dimensionless)
    pub friction: f64,
    /// Coefficient of restitution (dimensionless, 0 = no bounce)
    pub restitution: f64,
}

impl ContactMaterial {
    /// Creates a new contact material.
    ///
    /// # Arguments
    ///
    /// * `friction` - Coulomb coefficient, must be finite and non-negative
    /// * `restitution` - Bounciness, must lie within `[0, 1]`
    ///
    /// # Returns
    ///
    /// * `Ok(ContactMaterial)` - The validated material
    /// * `Err(DiceError::InvalidConfiguration)` - If either coefficient is out of range
    ///
    /// # Example
    /// ```
    /// use rs_dice::models::ContactMaterial;
    ///
    /// let felt = ContactMaterial::new(0.4, 0.3).unwrap();
    /// assert_eq!(felt.friction, 0.4);
    /// assert!(ContactMaterial::new(0.4, 1.3).is_err());
    /// ```
    pub fn new(friction: f64, restitution: f64) -> Result<Self, DiceError> {
        let material = Self { friction, restitution };
        material.validate()?;
        Ok(material)
    }

    pub fn validate(&self) -> Result<(), DiceError> {
        if !(self.friction.is_finite() && self.friction >= 0.0) {
            return Err(DiceError::InvalidConfiguration(format!(
                "friction must be non-negative, got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(DiceError::InvalidConfiguration(format!(
                "restitution must be within [0, 1], got {}",
                self.restitution
            )));
        }
        Ok(())
    }

    /// Coefficients used for a contact between two materials.
    ///
    /// Friction takes the geometric mean and restitution the average; two identical
    /// materials therefore combine to themselves.
    pub fn combine(&self, other: &ContactMaterial) -> ContactMaterial {
        ContactMaterial {
            friction: (self.friction * other.friction).sqrt(),
            restitution: (self.restitution + other.restitution) / 2.0,
        }
    }
}
